//! Project group models.

use octopus_core::de::null_as_default;
use octopus_core::Page;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// One page of project groups.
pub type ProjectGroups = Page<ProjectGroup>;

/// A named group of projects.
///
/// A group that has not been created yet has an empty `id`; the field is left
/// out of request bodies in that case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectGroup {
    /// Project group Id (`ProjectGroups-1`).
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(length(min = 1, message = "project group name must not be empty"))]
    pub name: String,
    /// Free text description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Environments the group is restricted to.
    #[serde(default, deserialize_with = "null_as_default")]
    pub environment_ids: Vec<String>,
    /// Retention policy, if one is assigned.
    #[serde(default)]
    pub retention_policy_id: Option<String>,
    /// Related resource links.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub links: HashMap<String, String>,
}

impl ProjectGroup {
    /// Create an unsaved project group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns true if the group's name equals `name`, ignoring case.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}
