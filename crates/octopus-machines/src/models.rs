//! Machine models as returned by the Octopus API.

use chrono::{DateTime, FixedOffset};
use octopus_core::de::null_as_default;
use octopus_core::Page;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the link pointing at a resource itself.
pub const SELF_LINK: &str = "Self";

/// One page of machines.
pub type Machines = Page<Machine>;

/// A machine that Octopus can target for deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Machine {
    /// Machine Id (`Machines-1`).
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Tentacle certificate thumbprint.
    #[serde(deserialize_with = "null_as_default")]
    pub thumbprint: String,
    /// Tentacle URI.
    #[serde(deserialize_with = "null_as_default")]
    pub uri: String,
    /// Whether the machine is excluded from deployments.
    #[serde(deserialize_with = "null_as_default")]
    pub is_disabled: bool,
    /// Environments the machine belongs to.
    #[serde(deserialize_with = "null_as_default")]
    pub environment_ids: Vec<String>,
    /// Target roles.
    #[serde(deserialize_with = "null_as_default")]
    pub roles: Vec<String>,
    /// Health status (`Online`, `Offline`, ...).
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// Whether the latest Calamari is installed.
    #[serde(deserialize_with = "null_as_default")]
    pub has_latest_calamari: bool,
    /// How Octopus talks to the machine.
    #[serde(deserialize_with = "null_as_default")]
    pub endpoint: Endpoint,
    /// Related resource links.
    #[serde(deserialize_with = "null_as_default")]
    pub links: HashMap<String, String>,
}

impl Machine {
    /// Returns true if the machine's name equals `name`, ignoring case.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// The machine's `Self` link, if present.
    #[must_use]
    pub fn self_link(&self) -> Option<&str> {
        self.links
            .get(SELF_LINK)
            .map(String::as_str)
            .filter(|link| !link.is_empty())
    }
}

/// Deployment endpoint of a machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Endpoint {
    /// Endpoint Id; absent on older servers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Communication style (`TentaclePassive`, `TentacleActive`, `Ssh`, ...).
    #[serde(deserialize_with = "null_as_default")]
    pub communications_style: String,
    /// Endpoint URI.
    #[serde(deserialize_with = "null_as_default")]
    pub uri: String,
    /// Endpoint certificate thumbprint.
    #[serde(deserialize_with = "null_as_default")]
    pub thumbprint: String,
    /// Tentacle version information.
    #[serde(deserialize_with = "null_as_default")]
    pub tentacle_version_details: TentacleVersionDetails,
    /// Last modification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_on: Option<DateTime<FixedOffset>>,
    /// User who last modified the endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    /// Related resource links.
    #[serde(deserialize_with = "null_as_default")]
    pub links: HashMap<String, String>,
}

/// Version information for a Tentacle agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TentacleVersionDetails {
    /// Installed version.
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    /// An upgrade is available.
    #[serde(deserialize_with = "null_as_default")]
    pub upgrade_suggested: bool,
    /// An upgrade is required before deploying.
    #[serde(deserialize_with = "null_as_default")]
    pub upgrade_required: bool,
    /// Upgrades are locked for this machine.
    #[serde(deserialize_with = "null_as_default")]
    pub upgrade_locked: bool,
}
