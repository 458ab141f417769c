//! Project group client and data models for Octopus Deploy.
//!
//! Provides typed structures and an asynchronous client for the
//! `/api/projectgroups` collection.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::ProjectGroupsClient;
pub use models::{ProjectGroup, ProjectGroups};
pub use octopus_core::Lookup;

/// Convenient result alias that reuses the shared Octopus error type.
pub type Result<T> = octopus_core::Result<T>;
