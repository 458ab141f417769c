//! Normalization of relative request paths.
//!
//! Every Octopus endpoint lives under `/api`. Callers may pass paths with or
//! without that segment (resource `Links` already carry it, hand-written paths
//! usually don't); [`normalize_uri`] turns both into the same canonical form.

use crate::{Error, Result};
use std::fmt;
use url::Url;

/// First path segment of every Octopus API endpoint.
pub const API_SEGMENT: &str = "api";

// Only used to validate and re-serialize a path reference.
const PLACEHOLDER_BASE: &str = "http://octopus.invalid/";

/// A path of the form `/api/<segments...>[?query]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath(String);

impl NormalizedPath {
    /// The path and query as a string, always starting with `/api`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path without its leading `/`, suitable for [`Url::join`] against a base
    /// that ends with `/`.
    #[must_use]
    pub fn as_relative(&self) -> &str {
        self.0.strip_prefix('/').unwrap_or(&self.0)
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Rewrite `relative_uri` onto the `/api` prefix.
///
/// A single leading `/` is ignored, `api` is prepended unless it is already the
/// first segment, and the query string is carried through.
///
/// # Errors
///
/// Returns [`Error::InvalidEndpoint`] if the rewritten path does not parse as a URL
/// reference.
pub fn normalize_uri(relative_uri: &str) -> Result<NormalizedPath> {
    let trimmed = relative_uri.strip_prefix('/').unwrap_or(relative_uri);

    let mut segments: Vec<&str> = trimmed.split('/').collect();
    if segments.first() != Some(&API_SEGMENT) {
        segments.insert(0, API_SEGMENT);
    }
    let candidate = format!("/{}", segments.join("/"));

    let base = Url::parse(PLACEHOLDER_BASE)?;
    let parsed = base.join(&candidate).map_err(|err| {
        Error::InvalidEndpoint(format!("Invalid API path `{relative_uri}`: {err}"))
    })?;

    let mut normalized = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        normalized.push('?');
        normalized.push_str(query);
    }

    Ok(NormalizedPath(normalized))
}
