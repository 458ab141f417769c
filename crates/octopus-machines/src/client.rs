//! Asynchronous machines client.

use crate::models::{Machine, Machines};
use crate::Result;
use octopus_core::{Lookup, OctopusClient};
use tracing::debug;

const COLLECTION: &str = "machines";

/// Client for the `/api/machines` collection.
#[derive(Debug, Clone)]
pub struct MachinesClient {
    inner: OctopusClient,
}

impl MachinesClient {
    /// Construct a client directly from the server URL and API key.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty API key or invalid URL.
    pub fn new(server_url: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::from_client(OctopusClient::new(server_url, api_key)?))
    }

    /// Wrap an existing core client.
    #[must_use]
    pub const fn from_client(inner: OctopusClient) -> Self {
        Self { inner }
    }

    /// Return the underlying core client.
    #[must_use]
    pub const fn client(&self) -> &OctopusClient {
        &self.inner
    }

    /// Fetch one page of machines, skipping the first `skip`.
    ///
    /// # Errors
    ///
    /// Returns an API error for any status other than 200.
    pub async fn list_machines(&self, skip: usize) -> Result<Machines> {
        self.inner
            .get_page(COLLECTION, skip, "Request to retrieve all machines")
            .await
    }

    /// Fetch a machine by Id or slug; a 404 yields [`Lookup::Absent`].
    ///
    /// # Errors
    ///
    /// Returns an API error for any status other than 200 or 404.
    pub async fn get_machine(&self, id_or_slug: &str) -> Result<Lookup<Machine>> {
        let path = format!("{COLLECTION}/{id_or_slug}");
        self.inner
            .lookup(&path, || format!("Request to retrieve machine '{id_or_slug}'"))
            .await
    }

    /// Find a machine by name (case-insensitive), walking every page.
    ///
    /// # Errors
    ///
    /// The first failing page fetch aborts the search.
    pub async fn find_machine_by_name(&self, name: &str) -> Result<Option<Machine>> {
        let found = self
            .inner
            .find_in_pages(COLLECTION, "Request to retrieve all machines", |machine: &Machine| {
                machine.has_name(name)
            })
            .await?;

        if found.is_none() {
            debug!(machine_name = %name, "No machine with this name");
        }

        Ok(found)
    }

    /// Fetch every machine, in server order.
    ///
    /// # Errors
    ///
    /// The first failing page fetch aborts the walk.
    pub async fn list_all_machines(&self) -> Result<Vec<Machine>> {
        self.inner
            .collect_pages(COLLECTION, "Request to retrieve all machines")
            .await
    }

    /// Delete `machine` through its `Self` link, or `machines/{id}` without one.
    ///
    /// # Errors
    ///
    /// Returns an API error for any status other than 200.
    pub async fn delete_machine(&self, machine: &Machine) -> Result<()> {
        let path = machine
            .self_link()
            .map_or_else(|| format!("{COLLECTION}/{}", machine.id), str::to_string);

        self.inner
            .delete(&path, || format!("Request to delete machine '{}'", machine.id))
            .await
    }
}
