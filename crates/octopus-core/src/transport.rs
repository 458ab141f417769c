//! Transport abstraction.
//!
//! A [`Transport`] sends a fully built [`Request`] and returns the status code
//! together with the complete response body. [`HttpTransport`] is the pooled
//! `reqwest` sender; [`InterceptedTransport`] is the decorator that rewrites
//! each request (for example to attach credentials) before delegating.

use crate::auth::RequestInterceptor;
use crate::config::HttpConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Request, StatusCode};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("octopus-core/", env!("CARGO_PKG_VERSION"));

/// Status code and full body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Entire response body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Create a response from its parts.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The body as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends requests and reads whole responses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and read the complete response.
    ///
    /// # Errors
    ///
    /// Returns a transport error if sending or reading the body fails.
    async fn send(&self, request: Request) -> Result<RawResponse>;
}

/// [`Transport`] backed by a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// Build the underlying HTTP client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the CA certificate cannot be loaded or the
    /// client cannot be built.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if !config.tls_verify {
            warn!("TLS verification disabled for Octopus client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_cert) = &config.tls_ca_cert {
            debug!("loading Octopus CA certificate from {}", ca_cert.display());
            let bytes = std::fs::read(ca_cert).map_err(|err| {
                Error::ConfigError(format!(
                    "Failed to read CA certificate {}: {err}",
                    ca_cert.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&bytes)
                .map_err(|err| Error::ConfigError(format!("Invalid CA certificate: {err}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<RawResponse> {
        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        Ok(RawResponse::new(status, body.to_vec()))
    }
}

/// Decorator that passes every request through a chain of interceptors before
/// handing it to the wrapped transport.
#[derive(Clone)]
pub struct InterceptedTransport {
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
    inner: Arc<dyn Transport>,
}

impl InterceptedTransport {
    /// Wrap `inner` with an empty interceptor chain.
    #[must_use]
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self {
            interceptors: Vec::new(),
            inner,
        }
    }

    /// Append an interceptor; interceptors run in insertion order.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Number of interceptors in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns true if no interceptors are installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl fmt::Debug for InterceptedTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptedTransport")
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for InterceptedTransport {
    async fn send(&self, request: Request) -> Result<RawResponse> {
        let mut request = request;
        for interceptor in &self.interceptors {
            request = interceptor.intercept(request)?;
        }
        self.inner.send(request).await
    }
}
