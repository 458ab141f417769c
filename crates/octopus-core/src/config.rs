//! Configuration structures for Octopus clients.
//!
//! [`OctopusClientConfig`] is the serializable, validated description of which
//! server to talk to and with which API key. [`HttpConfig`] tunes the
//! underlying HTTP transport.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

/// Environment variable holding the Octopus server URL.
pub const ENV_SERVER_URL: &str = "OCTOPUS_URL";

/// Environment variable holding the Octopus API key.
pub const ENV_API_KEY: &str = "OCTOPUS_APIKEY";

/// Environment variable that enables verbatim HTTP tracing when non-empty.
pub const ENV_TRACE_HTTP: &str = "OCTOPUS_TRACE_HTTP";

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Configuration for an Octopus client instance.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct OctopusClientConfig {
    /// Octopus server base URL (e.g. `https://octopus.example.com`)
    #[validate(url)]
    pub server_url: String,

    /// API key sent in the `X-Octopus-ApiKey` header
    #[validate(length(min = 1, message = "API key must not be empty"))]
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Optional path to a custom CA certificate (PEM)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<PathBuf>,

    /// Request timeout in seconds; no timeout when unset
    #[validate(range(min = 1, max = 600))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Log every request and response body verbatim
    #[serde(default)]
    pub trace_http: bool,
}

const fn default_tls_verify() -> bool {
    true
}

impl OctopusClientConfig {
    /// Create a new client configuration with required parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the URL is invalid or the API key is empty.
    pub fn new(server_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            server_url: server_url.into(),
            api_key: api_key.into(),
            tls_verify: default_tls_verify(),
            tls_ca_cert: None,
            request_timeout_secs: None,
            trace_http: false,
        };

        config.check()?;
        Ok(config)
    }

    /// Build a configuration from `OCTOPUS_URL`, `OCTOPUS_APIKEY` and
    /// `OCTOPUS_TRACE_HTTP`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if a required variable is missing or invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_url = lookup(ENV_SERVER_URL)
            .ok_or_else(|| Error::ConfigError(format!("{ENV_SERVER_URL} is not set")))?;
        let api_key = lookup(ENV_API_KEY)
            .ok_or_else(|| Error::ConfigError(format!("{ENV_API_KEY} is not set")))?;
        let trace_http = lookup(ENV_TRACE_HTTP).is_some_and(|value| !value.is_empty());

        Ok(Self::new(server_url, api_key)?.with_trace_http(trace_http))
    }

    /// Run field validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing every failed field.
    pub fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = Some(seconds);
        self
    }

    /// Enable or disable verbatim HTTP tracing.
    #[must_use]
    pub const fn with_trace_http(mut self, enabled: bool) -> Self {
        self.trace_http = enabled;
        self
    }

    /// Derive the transport settings for this configuration.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        let mut http = HttpConfig::new()
            .with_tls_verify(self.tls_verify)
            .with_trace_http(self.trace_http);
        if let Some(seconds) = self.request_timeout_secs {
            http = http.with_timeout(Duration::from_secs(seconds));
        }
        if let Some(path) = &self.tls_ca_cert {
            http = http.with_ca_cert(path.clone());
        }
        http
    }
}

impl fmt::Debug for OctopusClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OctopusClientConfig")
            .field("server_url", &self.server_url)
            .field("api_key", &"[REDACTED]")
            .field("tls_verify", &self.tls_verify)
            .field("tls_ca_cert", &self.tls_ca_cert)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("trace_http", &self.trace_http)
            .finish()
    }
}

/// HTTP transport configuration.
///
/// Configures timeouts, connection pooling, TLS and diagnostic tracing.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Overall request deadline; none by default
    pub timeout: Option<Duration>,

    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Whether to verify TLS certificates
    pub tls_verify: bool,

    /// Extra root certificate (PEM)
    pub tls_ca_cert: Option<PathBuf>,

    /// Log method, URL, status and body of every request
    pub trace_http: bool,
}

impl HttpConfig {
    /// Create a new HTTP configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            tls_verify: true,
            tls_ca_cert: None,
            trace_http: false,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Trust an additional CA certificate.
    #[must_use]
    pub fn with_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Enable or disable verbatim HTTP tracing.
    #[must_use]
    pub const fn with_trace_http(mut self, enabled: bool) -> Self {
        self.trace_http = enabled;
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}
