//! Asynchronous project groups client.

use crate::models::{ProjectGroup, ProjectGroups};
use crate::Result;
use octopus_core::{Error, Lookup, OctopusClient};
use reqwest::{Method, StatusCode};
use tracing::debug;
use validator::Validate;

const COLLECTION: &str = "projectgroups";

/// Client for the `/api/projectgroups` collection.
#[derive(Debug, Clone)]
pub struct ProjectGroupsClient {
    inner: OctopusClient,
}

impl ProjectGroupsClient {
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

    /// Fetch one page of project groups, skipping the first `skip`.
    ///
    /// # Errors
    ///
    /// Returns an API error for any status other than 200.
    pub async fn list_project_groups(&self, skip: usize) -> Result<ProjectGroups> {
        self.inner
            .get_page(COLLECTION, skip, "Request to retrieve all project groups")
            .await
    }

    /// Fetch a project group by Id; a 404 yields [`Lookup::Absent`].
    ///
    /// # Errors
    ///
    /// Returns an API error for any status other than 200 or 404.
    pub async fn get_project_group(&self, id: &str) -> Result<Lookup<ProjectGroup>> {
        let path = format!("{COLLECTION}/{id}");
        self.inner
            .lookup(&path, || format!("Request to retrieve project group '{id}'"))
            .await
    }

    /// Find a project group by name (case-insensitive), walking every page.
    ///
    /// # Errors
    ///
    /// The first failing page fetch aborts the search.
    pub async fn find_project_group_by_name(&self, name: &str) -> Result<Option<ProjectGroup>> {
        self.inner
            .find_in_pages(
                COLLECTION,
                "Request to retrieve all project groups",
                |group: &ProjectGroup| group.has_name(name),
            )
            .await
    }

    /// Create a project group; the server answers 201 with the saved group.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unnamed group and an API error for any
    /// status other than 201.
    pub async fn create_project_group(&self, group: &ProjectGroup) -> Result<ProjectGroup> {
        group.validate()?;
        debug!(name = %group.name, "Creating project group");

        self.inner
            .execute(
                COLLECTION,
                Method::POST,
                Some(group),
                StatusCode::CREATED,
                || format!("Request to create project group '{}'", group.name),
            )
            .await
    }

    /// Replace an existing project group.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the group has no Id or name and an API error
    /// for any status other than 200.
    pub async fn update_project_group(&self, group: &ProjectGroup) -> Result<ProjectGroup> {
        if group.id.is_empty() {
            return Err(Error::ValidationError(
                "project group Id is required for an update".to_string(),
            ));
        }
        group.validate()?;

        let path = format!("{COLLECTION}/{}", group.id);
        self.inner
            .execute(
                &path,
                Method::PUT,
                Some(group),
                StatusCode::OK,
                || format!("Request to update project group '{}'", group.id),
            )
            .await
    }

    /// Delete a project group by Id.
    ///
    /// # Errors
    ///
    /// Returns an API error for any status other than 200.
    pub async fn delete_project_group(&self, id: &str) -> Result<()> {
        let path = format!("{COLLECTION}/{id}");
        self.inner
            .delete(&path, || format!("Request to delete project group '{id}'"))
            .await
    }
}
