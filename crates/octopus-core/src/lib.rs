//! # octopus-core
//!
//! Core request pipeline for the Octopus Deploy REST API.
//!
//! This crate holds everything the resource clients share: URI normalization,
//! API key authentication, JSON request building, response decoding with the
//! Octopus error envelope, and paged collection handling.
//!
//! ## Modules
//!
//! - [`error`] - Error type and conversions
//! - [`config`] - Client and HTTP configuration
//! - [`de`] - Deserialization helpers for resource models
//! - [`query`] - Query string builder for relative URIs
//! - [`uri`] - Normalization of relative paths onto `/api`
//! - [`auth`] - API key credential and request interceptors
//! - [`transport`] - Transport abstraction and the `reqwest` sender
//! - [`response`] - Response decoding and error mapping
//! - [`pagination`] - Paged collections and the skip cursor
//! - [`client`] - The [`OctopusClient`] tying the pipeline together

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod config;
pub mod de;
pub mod error;
pub mod pagination;
pub mod query;
pub mod response;
pub mod transport;
pub mod uri;

// Re-export commonly used types
pub use client::{OctopusClient, OctopusClientBuilder};
pub use error::{Error, Result};
pub use pagination::{Page, PageCursor};
pub use response::Lookup;
