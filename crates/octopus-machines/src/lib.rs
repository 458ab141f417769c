//! Machine (deployment target) client and data models for Octopus Deploy.
//!
//! Provides typed structures and an asynchronous client for the `/api/machines`
//! collection.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::MachinesClient;
pub use models::{Endpoint, Machine, Machines, TentacleVersionDetails};
pub use octopus_core::Lookup;

/// Convenient result alias that reuses the shared Octopus error type.
pub type Result<T> = octopus_core::Result<T>;
