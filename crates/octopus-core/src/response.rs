//! Response decoding and error mapping.
//!
//! A response whose status matches what the operation expects is decoded into
//! the caller's type. Anything else is decoded as the Octopus error envelope
//! and reported as [`Error::Api`]. Single-resource lookups additionally treat
//! 404 as [`Lookup::Absent`].

use crate::transport::RawResponse;
use crate::{Error, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Message used when the server's error envelope has no `ErrorMessage`.
pub const FALLBACK_ERROR_MESSAGE: &str =
    "An unexpected response was received from the Octopus API ('ErrorMessage' field was empty or missing).";

/// Outcome of a single-resource lookup that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The resource exists.
    Found(T),
    /// The server answered 404.
    Absent,
}

impl<T> Lookup<T> {
    /// Returns true for [`Lookup::Found`].
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns true for [`Lookup::Absent`].
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Convert into an `Option`, dropping the distinction from a failed request.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Absent => None,
        }
    }

    /// Map the found value.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Lookup<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::Absent => Lookup::Absent,
        }
    }
}

impl<T> From<Lookup<T>> for Option<T> {
    fn from(lookup: Lookup<T>) -> Self {
        lookup.into_option()
    }
}

/// Error body returned by the Octopus API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorEnvelope {
    /// Human readable message; never empty after [`ErrorEnvelope::from_body`]
    #[serde(rename = "ErrorMessage", default)]
    pub message: Option<String>,
    /// Additional detail lines
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

impl ErrorEnvelope {
    /// Decode an envelope, substituting [`FALLBACK_ERROR_MESSAGE`] for a missing or
    /// empty message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the body is not a JSON object of this shape.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let mut envelope: Self = serde_json::from_slice(body)?;
        if envelope.message.as_deref().map_or(true, str::is_empty) {
            envelope.message = Some(FALLBACK_ERROR_MESSAGE.to_string());
        }
        Ok(envelope)
    }

    /// The message, or the fallback text.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .filter(|message| !message.is_empty())
            .unwrap_or(FALLBACK_ERROR_MESSAGE)
    }

    /// Combine with the operation context and status into [`Error::Api`].
    #[must_use]
    pub fn into_error(self, context: impl Into<String>, status: StatusCode) -> Error {
        let message = self.message().to_string();
        Error::api(context, status, message, self.errors.unwrap_or_default())
    }
}

/// Deserialize a JSON body into `T`.
///
/// # Errors
///
/// Returns [`Error::Decode`] on malformed JSON or a shape mismatch.
pub fn decode_body<T>(body: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(body).map_err(Error::from)
}

/// Turn a non-matching response into an error.
///
/// If the body is not a valid error envelope, that decode error is returned instead.
fn error_from_response<F>(response: &RawResponse, context: F) -> Error
where
    F: FnOnce() -> String,
{
    match ErrorEnvelope::from_body(&response.body) {
        Ok(envelope) => envelope.into_error(context(), response.status),
        Err(err) => err,
    }
}

/// Decode `response` into `T` if its status is `expected`.
///
/// `context` names the operation (and any identifier) for [`Error::Api`]; it is
/// only evaluated on failure.
///
/// # Errors
///
/// Returns [`Error::Decode`] for an undecodable body and [`Error::Api`] for any other
/// status.
pub fn decode_response<T, F>(response: &RawResponse, expected: StatusCode, context: F) -> Result<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> String,
{
    if response.status == expected {
        decode_body(&response.body)
    } else {
        Err(error_from_response(response, context))
    }
}

/// Check that `response` has status `expected`, ignoring its body.
///
/// # Errors
///
/// Same mapping as [`decode_response`] for non-matching statuses.
pub fn expect_status<F>(response: &RawResponse, expected: StatusCode, context: F) -> Result<()>
where
    F: FnOnce() -> String,
{
    if response.status == expected {
        Ok(())
    } else {
        Err(error_from_response(response, context))
    }
}

/// Decode a single-resource lookup: 200 is found, 404 is absent.
///
/// # Errors
///
/// Same mapping as [`decode_response`] for any other status.
pub fn decode_lookup<T, F>(response: &RawResponse, context: F) -> Result<Lookup<T>>
where
    T: DeserializeOwned,
    F: FnOnce() -> String,
{
    if response.status == StatusCode::NOT_FOUND {
        return Ok(Lookup::Absent);
    }

    decode_response(response, StatusCode::OK, context).map(Lookup::Found)
}
