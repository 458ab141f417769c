//! The Octopus API client.
//!
//! [`OctopusClient`] composes the request pipeline: a relative URI is
//! normalized onto `/api` and resolved against the server URL, a JSON body is
//! attached, the request is authenticated and sent, and the response is decoded
//! into the caller's type or mapped to an [`Error`]. Resource clients
//! (machines, project groups, ...) are thin wrappers over [`OctopusClient::execute`]
//! and friends.

use crate::auth::{ApiKey, ApiKeyAuthenticator, RequestInterceptor};
use crate::config::{HttpConfig, OctopusClientConfig};
use crate::pagination::Page;
use crate::query::QueryParams;
use crate::response::{decode_lookup, decode_response, expect_status, Lookup};
use crate::transport::{HttpTransport, InterceptedTransport, RawResponse, Transport};
use crate::uri::normalize_uri;
use crate::{Error, Result};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Body, Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const APPLICATION_JSON: &str = "application/json";

/// Builder for [`OctopusClient`].
#[derive(Clone)]
pub struct OctopusClientBuilder {
    base_url: Url,
    api_key: ApiKey,
    http_config: HttpConfig,
    transport: Option<Arc<dyn Transport>>,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl OctopusClientBuilder {
    /// Create a builder for `server_url`, authenticating with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the API key is empty or the URL is invalid.
    pub fn new(server_url: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        let api_key = ApiKey::new(api_key)?;
        let base_url = parse_base_url(server_url.as_ref())?;

        Ok(Self {
            base_url,
            api_key,
            http_config: HttpConfig::new(),
            transport: None,
            interceptors: Vec::new(),
        })
    }

    /// Override the HTTP transport configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: HttpConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Enable or disable verbatim request/response tracing.
    #[must_use]
    pub fn with_trace_http(mut self, enabled: bool) -> Self {
        self.http_config = self.http_config.with_trace_http(enabled);
        self
    }

    /// Set a deadline for each request.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_config = self.http_config.with_timeout(timeout);
        self
    }

    /// Add an interceptor; it runs after the API key has been attached.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Replace the base sender. Requests are still authenticated before reaching it.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the HTTP client cannot be created.
    pub fn build(self) -> Result<OctopusClient> {
        let base: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.http_config)?),
        };

        let mut transport = InterceptedTransport::new(base)
            .with_interceptor(Arc::new(ApiKeyAuthenticator::new(self.api_key)));
        for interceptor in self.interceptors {
            transport = transport.with_interceptor(interceptor);
        }

        Ok(OctopusClient {
            base_url: self.base_url,
            transport: Arc::new(transport),
            trace_http: self.http_config.trace_http,
        })
    }
}

fn parse_base_url(server_url: &str) -> Result<Url> {
    let mut url = Url::parse(server_url).map_err(|err| {
        Error::ConfigError(format!("Invalid Octopus server URL `{server_url}`: {err}"))
    })?;

    if url.cannot_be_a_base() {
        return Err(Error::ConfigError(format!(
            "Octopus server URL `{server_url}` cannot be used as a base URL"
        )));
    }

    // Keep any base path (`https://host/octopus`) when joining relative paths.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

// Configuration and decode failures log at `warn!`, everything else at `debug!`.
fn report<T>(relative_uri: &str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        if err.should_log() {
            warn!(uri = relative_uri, code = err.error_code(), error = %err, "Octopus call failed");
        } else {
            debug!(uri = relative_uri, code = err.error_code(), error = %err, "Octopus call failed");
        }
    }
    result
}

/// Asynchronous Octopus Deploy API client.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct OctopusClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    trace_http: bool,
}

impl fmt::Debug for OctopusClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OctopusClient")
            .field("base_url", &self.base_url.as_str())
            .field("trace_http", &self.trace_http)
            .finish_non_exhaustive()
    }
}

impl OctopusClient {
    /// Create a client for `server_url` using `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the API key is empty or the URL is invalid.
    /// Nothing is sent to the server.
    pub fn new(server_url: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        OctopusClientBuilder::new(server_url, api_key)?.build()
    }

    /// Create a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the configuration is invalid.
    pub fn from_config(config: &OctopusClientConfig) -> Result<Self> {
        config.check()?;
        OctopusClientBuilder::new(&config.server_url, config.api_key.clone())?
            .with_http_config(config.http_config())
            .build()
    }

    /// Start a builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the API key is empty or the URL is invalid.
    pub fn builder(
        server_url: impl AsRef<str>,
        api_key: impl Into<String>,
    ) -> Result<OctopusClientBuilder> {
        OctopusClientBuilder::new(server_url, api_key)
    }

    /// Return the server base URL (always ending in `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns true if requests and responses are traced verbatim.
    #[must_use]
    pub const fn trace_http(&self) -> bool {
        self.trace_http
    }

    /// Build a request for `relative_uri`.
    ///
    /// The path is normalized onto `/api` and resolved against the base URL.
    /// `Accept: application/json` is always set; a present `body` is serialized as
    /// JSON and adds `Content-Type: application/json`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] for an unusable URI and [`Error::Decode`] if
    /// the body cannot be serialized.
    pub fn new_request<B>(&self, relative_uri: &str, method: Method, body: Option<&B>) -> Result<Request>
    where
        B: Serialize + ?Sized,
    {
        let path = normalize_uri(relative_uri)?;
        let url = self.base_url.join(path.as_relative()).map_err(|err| {
            Error::InvalidEndpoint(format!("Invalid API path `{relative_uri}`: {err}"))
        })?;

        let mut request = Request::new(method, url);
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));

        if let Some(payload) = body {
            let bytes = serde_json::to_vec(payload)?;
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
            *request.body_mut() = Some(Body::from(bytes));
        }

        Ok(request)
    }

    /// Send `request` and read the whole response.
    ///
    /// # Errors
    ///
    /// Returns a transport error ([`Error::HttpError`], [`Error::Timeout`],
    /// [`Error::ServiceUnavailable`]) if the request could not be completed.
    pub async fn execute_request(&self, request: Request) -> Result<RawResponse> {
        let method = request.method().clone();
        let url = request.url().clone();

        debug!(%method, %url, "Sending Octopus request");
        if self.trace_http {
            info!("Invoking {method} request for '{url}'...");
        }

        let result = self.transport.send(request).await;

        match &result {
            Ok(response) if self.trace_http => {
                info!(
                    "Status code: {}, response body: '{}'",
                    response.status.as_u16(),
                    response.text()
                );
            }
            Ok(response) => {
                debug!(%method, %url, status = response.status.as_u16(), "Octopus response");
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "Octopus request failed");
            }
        }

        result
    }

    async fn round_trip<B>(
        &self,
        relative_uri: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        let request = self.new_request(relative_uri, method, body)?;
        self.execute_request(request).await
    }

    /// Build, send and decode a request.
    ///
    /// `expected` is the success status for the operation (200 for reads, 201 for
    /// creates). `context` names the operation for [`Error::Api`].
    ///
    /// # Errors
    ///
    /// Propagates request building, transport and decode errors unchanged; any other
    /// status becomes [`Error::Api`].
    pub async fn execute<B, R, F>(
        &self,
        relative_uri: &str,
        method: Method,
        body: Option<&B>,
        expected: StatusCode,
        context: F,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
        F: FnOnce() -> String,
    {
        let result = self
            .round_trip(relative_uri, method, body)
            .await
            .and_then(|response| decode_response(&response, expected, context));
        report(relative_uri, result)
    }

    /// Like [`OctopusClient::execute`], but the success body is ignored.
    ///
    /// # Errors
    ///
    /// Same as [`OctopusClient::execute`].
    pub async fn execute_discarding<B, F>(
        &self,
        relative_uri: &str,
        method: Method,
        body: Option<&B>,
        expected: StatusCode,
        context: F,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
        F: FnOnce() -> String,
    {
        let result = self
            .round_trip(relative_uri, method, body)
            .await
            .and_then(|response| expect_status(&response, expected, context));
        report(relative_uri, result)
    }

    /// `GET` a resource, expecting 200.
    ///
    /// # Errors
    ///
    /// Same as [`OctopusClient::execute`].
    pub async fn get<R, F>(&self, relative_uri: &str, context: F) -> Result<R>
    where
        R: DeserializeOwned,
        F: FnOnce() -> String,
    {
        self.execute::<(), R, F>(relative_uri, Method::GET, None, StatusCode::OK, context)
            .await
    }

    /// `GET` a single resource; a 404 yields [`Lookup::Absent`] instead of an error.
    ///
    /// # Errors
    ///
    /// Same as [`OctopusClient::execute`] for statuses other than 200 and 404.
    pub async fn lookup<R, F>(&self, relative_uri: &str, context: F) -> Result<Lookup<R>>
    where
        R: DeserializeOwned,
        F: FnOnce() -> String,
    {
        let result = self
            .round_trip::<()>(relative_uri, Method::GET, None)
            .await
            .and_then(|response| decode_lookup(&response, context));
        report(relative_uri, result)
    }

    /// `DELETE` a resource, expecting 200.
    ///
    /// # Errors
    ///
    /// Same as [`OctopusClient::execute`].
    pub async fn delete<F>(&self, relative_uri: &str, context: F) -> Result<()>
    where
        F: FnOnce() -> String,
    {
        self.execute_discarding::<(), F>(relative_uri, Method::DELETE, None, StatusCode::OK, context)
            .await
    }

    /// Fetch the page of `collection` starting at `skip`.
    ///
    /// # Errors
    ///
    /// Same as [`OctopusClient::execute`].
    pub async fn get_page<T>(&self, collection: &str, skip: usize, context: &str) -> Result<Page<T>>
    where
        T: DeserializeOwned,
    {
        let mut params = QueryParams::new();
        params.push("skip", skip);
        let uri = params.to_relative_uri(collection);

        let page: Page<T> = self.get(&uri, || context.to_string()).await?;
        Ok(page.with_skip(skip))
    }

    /// Walk the pages of `collection` in order and return the first item matching
    /// `predicate`.
    ///
    /// Pages are fetched one at a time; iteration stops at the first match or after
    /// the last page.
    ///
    /// # Errors
    ///
    /// The first failing page fetch aborts the search.
    pub async fn find_in_pages<T, P>(
        &self,
        collection: &str,
        context: &str,
        mut predicate: P,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        P: FnMut(&T) -> bool,
    {
        let mut skip = 0;
        loop {
            let page: Page<T> = self.get_page(collection, skip, context).await?;
            let next = page.skip_for_next_page();

            if let Some(found) = page.items.into_iter().find(|item| predicate(item)) {
                return Ok(Some(found));
            }

            match next {
                Some(next_skip) => skip = next_skip,
                None => return Ok(None),
            }
        }
    }

    /// Collect every item of `collection`, in server order.
    ///
    /// # Errors
    ///
    /// The first failing page fetch aborts the walk.
    pub async fn collect_pages<T>(&self, collection: &str, context: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut skip = 0;
        loop {
            let page: Page<T> = self.get_page(collection, skip, context).await?;
            let next = page.skip_for_next_page();
            items.extend(page.items);

            match next {
                Some(next_skip) => skip = next_skip,
                None => return Ok(items),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::API_KEY_HEADER;
    use crate::response::FALLBACK_ERROR_MESSAGE;
    use crate::transport::MockTransport;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const API_KEY: &str = "my-test-api-key";

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Environment {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        id: String,
        name: String,
    }

    fn environment(id: &str, name: &str) -> Environment {
        Environment {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn test_client(server: &MockServer) -> OctopusClient {
        OctopusClient::new(server.uri(), API_KEY).unwrap()
    }

    fn offline_client(base: &str) -> OctopusClient {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        OctopusClient::builder(base, API_KEY)
            .unwrap()
            .with_transport(Arc::new(transport))
            .build()
            .unwrap()
    }

    #[test]
    fn empty_api_key_fails_before_any_request() {
        let err = OctopusClient::new("https://octopus.example.com", "").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn invalid_server_url_is_rejected() {
        for url in ["not a url", "mailto:ops@example.com"] {
            let err = OctopusClient::new(url, API_KEY).unwrap_err();
            assert!(matches!(err, Error::ConfigError(_)), "{url}");
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = OctopusClientConfig::new("https://octopus.example.com", API_KEY).unwrap();
        config.api_key = String::new();
        let err = OctopusClient::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn from_config_carries_trace_flag() {
        let config = OctopusClientConfig::new("https://octopus.example.com", API_KEY)
            .unwrap()
            .with_trace_http(true);
        let client = OctopusClient::from_config(&config).unwrap();
        assert!(client.trace_http());
        assert_eq!(client.base_url().as_str(), "https://octopus.example.com/");
    }

    #[test]
    fn get_request_has_accept_but_no_content_type() {
        let client = offline_client("https://octopus.example.com");
        let request = client
            .new_request::<()>("machines?skip=10", Method::GET, None)
            .unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://octopus.example.com/api/machines?skip=10"
        );
        assert_eq!(request.headers()[ACCEPT], APPLICATION_JSON);
        assert!(request.headers().get(CONTENT_TYPE).is_none());
        assert!(request.body().is_none());
    }

    #[test]
    fn request_with_body_is_json() {
        let client = offline_client("https://octopus.example.com");
        let payload = environment("", "Production");
        let request = client
            .new_request("environments", Method::POST, Some(&payload))
            .unwrap();

        assert_eq!(request.headers()[ACCEPT], APPLICATION_JSON);
        assert_eq!(request.headers()[CONTENT_TYPE], APPLICATION_JSON);
        let body = request.body().and_then(Body::as_bytes).unwrap();
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(body).unwrap(),
            json!({"Name": "Production"})
        );
    }

    #[test]
    fn request_builder_never_sets_the_credential() {
        let client = offline_client("https://octopus.example.com");
        let request = client
            .new_request::<()>("machines", Method::GET, None)
            .unwrap();
        assert!(request.headers().get(API_KEY_HEADER).is_none());
    }

    #[test]
    fn base_path_is_kept() {
        let client = offline_client("https://octopus.example.com/octopus");
        assert_eq!(client.base_url().as_str(), "https://octopus.example.com/octopus/");

        for uri in ["machines/Machines-1", "/api/machines/Machines-1"] {
            let request = client.new_request::<()>(uri, Method::GET, None).unwrap();
            assert_eq!(
                request.url().as_str(),
                "https://octopus.example.com/octopus/api/machines/Machines-1"
            );
        }
    }

    #[tokio::test]
    async fn every_request_is_authenticated() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|request: &Request| {
                request
                    .headers()
                    .get(API_KEY_HEADER)
                    .is_some_and(|value| value == API_KEY)
            })
            .times(3)
            .returning(|_| Ok(RawResponse::new(StatusCode::OK, "{}")));

        let client = OctopusClient::builder("https://octopus.example.com", API_KEY)
            .unwrap()
            .with_transport(Arc::new(transport))
            .build()
            .unwrap();

        let payload = json!({"Name": "x"});
        for method in [Method::GET, Method::POST, Method::DELETE] {
            let body = (method == Method::POST).then_some(&payload);
            client
                .execute_discarding("environments", method, body, StatusCode::OK, String::new)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn transport_errors_propagate_unchanged() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(Error::Timeout("deadline elapsed".to_string())));

        let client = OctopusClient::builder("https://octopus.example.com", API_KEY)
            .unwrap()
            .with_transport(Arc::new(transport))
            .build()
            .unwrap();

        let err = client
            .get::<Environment, _>("environments/Environments-1", String::new)
            .await
            .unwrap_err();
        assert_eq!(err, Error::Timeout("deadline elapsed".to_string()));
    }

    #[tokio::test]
    async fn get_decodes_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/environments/Environments-1"))
            .and(header(API_KEY_HEADER, API_KEY))
            .and(header("Accept", APPLICATION_JSON))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"Id": "Environments-1", "Name": "Production"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let env: Environment = client
            .get("environments/Environments-1", || "Request to retrieve environment".to_string())
            .await
            .unwrap();
        assert_eq!(env, environment("Environments-1", "Production"));
    }

    #[tokio::test]
    async fn create_expects_201() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/environments"))
            .and(header("Content-Type", APPLICATION_JSON))
            .and(body_json(json!({"Name": "Staging"})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"Id": "Environments-2", "Name": "Staging"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let created: Environment = client
            .execute(
                "environments",
                Method::POST,
                Some(&environment("", "Staging")),
                StatusCode::CREATED,
                || "Request to create environment".to_string(),
            )
            .await
            .unwrap();
        assert_eq!(created.id, "Environments-2");
    }

    #[tokio::test]
    async fn lookup_not_found_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/environments/Environments-404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "ErrorMessage": "The resource 'Environments-404' was not found."
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let lookup: Lookup<Environment> = client
            .lookup("environments/Environments-404", String::new)
            .await
            .unwrap();
        assert_eq!(lookup, Lookup::Absent);
    }

    #[tokio::test]
    async fn empty_error_message_becomes_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/environments/Environments-1"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"ErrorMessage": ""})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .get::<Environment, _>("environments/Environments-1", || {
                "Request to retrieve environment 'Environments-1'".to_string()
            })
            .await
            .unwrap_err();

        assert_eq!(
            err,
            Error::Api {
                context: "Request to retrieve environment 'Environments-1'".to_string(),
                status: 500,
                message: FALLBACK_ERROR_MESSAGE.to_string(),
                details: Vec::new(),
            }
        );
    }

    #[tokio::test]
    async fn delete_ignores_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/environments/Environments-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Id": "ServerTasks-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client
            .delete("environments/Environments-1", String::new)
            .await
            .unwrap();
    }

    fn page_body(skip: usize, names: &[&str], total: usize) -> serde_json::Value {
        let items: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| json!({"Id": format!("Environments-{}", skip + i + 1), "Name": name}))
            .collect();
        json!({
            "ItemType": "Environment",
            "TotalResults": total,
            "ItemsPerPage": 2,
            "Items": items,
            "Links": {}
        })
    }

    async fn mount_pages(server: &MockServer) {
        for (skip, names) in [(0, vec!["Dev", "Test"]), (2, vec!["Staging", "Prod"]), (4, vec!["DR"])] {
            Mock::given(method("GET"))
                .and(path("/api/environments"))
                .and(query_param("skip", skip.to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(page_body(skip, &names, 5)))
                .expect(1)
                .mount(server)
                .await;
        }
    }

    #[tokio::test]
    async fn get_page_records_skip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/environments"))
            .and(query_param("skip", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(2, &["Staging", "Prod"], 5)))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let page: Page<Environment> = client
            .get_page("environments", 2, "Request to retrieve environments")
            .await
            .unwrap();
        assert_eq!(page.skip, 2);
        assert_eq!(page.skip_for_next_page(), Some(4));
        assert_eq!(page.skip_for_previous_page(), Some(0));
    }

    #[tokio::test]
    async fn collect_pages_keeps_server_order() {
        let server = MockServer::start().await;
        mount_pages(&server).await;

        let client = test_client(&server);
        let all: Vec<Environment> = client
            .collect_pages("environments", "Request to retrieve environments")
            .await
            .unwrap();
        let names: Vec<_> = all.iter().map(|env| env.name.as_str()).collect();
        assert_eq!(names, ["Dev", "Test", "Staging", "Prod", "DR"]);
    }

    #[tokio::test]
    async fn find_in_pages_walks_until_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/environments"))
            .and(query_param("skip", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0, &["Dev", "Test"], 5)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/environments"))
            .and(query_param("skip", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(2, &["Staging", "Prod"], 5)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/environments"))
            .and(query_param("skip", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(4, &["DR"], 5)))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let found: Option<Environment> = client
            .find_in_pages("environments", "Request to retrieve environments", |env: &Environment| {
                env.name == "Staging"
            })
            .await
            .unwrap();
        assert_eq!(found, Some(environment("Environments-3", "Staging")));
    }

    #[tokio::test]
    async fn find_in_pages_returns_none_after_last_page() {
        let server = MockServer::start().await;
        mount_pages(&server).await;

        let client = test_client(&server);
        let found: Option<Environment> = client
            .find_in_pages("environments", "Request to retrieve environments", |env: &Environment| {
                env.name == "Nowhere"
            })
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn paging_stops_on_first_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/environments"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"ErrorMessage": "You do not have permission"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .collect_pages::<Environment>("environments", "Request to retrieve environments")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert!(err.to_string().starts_with("Request to retrieve environments failed"));
    }

    async fn mount_environment(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/environments/Environments-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"Id": "Environments-1", "Name": "Production"})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn trace_http_logs_request_and_response() {
        let server = MockServer::start().await;
        mount_environment(&server).await;

        let client = OctopusClient::builder(server.uri(), API_KEY)
            .unwrap()
            .with_trace_http(true)
            .build()
            .unwrap();
        assert!(client.trace_http());

        let env: Environment = client
            .get("environments/Environments-1", String::new)
            .await
            .unwrap();
        assert_eq!(env.name, "Production");

        assert!(logs_contain("Invoking GET request for"));
        assert!(logs_contain("/api/environments/Environments-1"));
        assert!(logs_contain("Status code: 200"));
        assert!(logs_contain("Production"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn trace_http_off_keeps_bodies_out_of_logs() {
        let server = MockServer::start().await;
        mount_environment(&server).await;

        let client = test_client(&server);
        assert!(!client.trace_http());

        let env: Environment = client
            .get("environments/Environments-1", String::new)
            .await
            .unwrap();
        assert_eq!(env.name, "Production");

        assert!(logs_contain("Sending Octopus request"));
        assert!(!logs_contain("Invoking"));
        assert!(!logs_contain("response body"));
        assert!(!logs_contain("Production"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn decode_failures_are_logged_as_warnings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/environments/Environments-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .get::<Environment, _>("environments/Environments-1", String::new)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));

        logs_assert(|lines: &[&str]| {
            if lines
                .iter()
                .any(|line| line.contains("WARN") && line.contains("DECODE_ERROR"))
            {
                Ok(())
            } else {
                Err("expected a warning carrying DECODE_ERROR".to_string())
            }
        });
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn api_errors_are_not_warnings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/environments/Environments-1"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"ErrorMessage": "Conflict"})),
            )
            .mount(&server)
            .await;

        let err = test_client(&server)
            .get::<Environment, _>("environments/Environments-1", String::new)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));

        assert!(logs_contain("API_ERROR"));
        logs_assert(|lines: &[&str]| {
            match lines.iter().find(|line| line.contains("WARN")) {
                Some(line) => Err(format!("unexpected warning: {line}")),
                None => Ok(()),
            }
        });
    }
}
