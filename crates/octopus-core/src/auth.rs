//! API key authentication.
//!
//! Octopus authenticates API calls with an API key carried in the
//! `X-Octopus-ApiKey` header. [`ApiKeyAuthenticator`] is the only place that
//! header is set; it runs as a [`RequestInterceptor`] inside
//! [`crate::transport::InterceptedTransport`].

use crate::{Error, Result};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Request;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Name of the header used to authenticate to Octopus Deploy.
pub const API_KEY_HEADER: &str = "X-Octopus-ApiKey";

/// Rewrites an outgoing request before it reaches the transport.
pub trait RequestInterceptor: Send + Sync {
    /// Return the request to send in place of `request`.
    ///
    /// # Errors
    ///
    /// An error aborts the request before anything is sent.
    fn intercept(&self, request: Request) -> Result<Request>;
}

/// A non-empty Octopus API key.
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Wrap `key`, rejecting empty keys and keys that cannot be sent as a header value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for an empty or malformed key.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::ConfigError(
                "Must specify a valid Octopus API key".to_string(),
            ));
        }
        HeaderValue::from_str(&key).map_err(|_| {
            Error::ConfigError("Octopus API key contains invalid characters".to_string())
        })?;

        Ok(Self(SecretString::from(key)))
    }

    fn header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(self.0.expose_secret()).map_err(|_| {
            Error::ConfigError("Octopus API key contains invalid characters".to_string())
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Stamps every request with the `X-Octopus-ApiKey` header.
#[derive(Debug, Clone)]
pub struct ApiKeyAuthenticator {
    api_key: ApiKey,
}

impl ApiKeyAuthenticator {
    /// Create an authenticator for `api_key`.
    #[must_use]
    pub const fn new(api_key: ApiKey) -> Self {
        Self { api_key }
    }
}

impl RequestInterceptor for ApiKeyAuthenticator {
    fn intercept(&self, mut request: Request) -> Result<Request> {
        request.headers_mut().insert(
            HeaderName::from_static("x-octopus-apikey"),
            self.api_key.header_value()?,
        );
        Ok(request)
    }
}
