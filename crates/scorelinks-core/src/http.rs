//! JSON-over-HTTP client for the scorelinks API.
//!
//! Every call goes through [`ApiClient::request`], which joins the endpoint
//! onto the base URL, attaches JSON headers and the session's bearer token,
//! and maps the response onto [`ApiResponse`] or an [`ApiError`]. There is no
//! retry, caching, or queueing.

use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::session::SessionStore;

pub const USER_AGENT: &str = concat!("scorelinks/", env!("CARGO_PKG_VERSION"));

/// Envelope shared by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub count: Option<u64>,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Per-request options. Defaults to a bodiless GET.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    /// Extra headers; these override the JSON defaults.
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Joins `endpoint` onto the base URL with exactly one `/` between them.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Sends one request and decodes the JSON envelope.
    ///
    /// # Errors
    /// - `Network` when no response arrives
    /// - `HttpStatus` for non-2xx responses
    /// - `InvalidResponseFormat` for 2xx bodies that are not the envelope
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ApiResult<ApiResponse<T>> {
        let url = self.endpoint_url(endpoint);
        let headers = self.build_headers(options.headers)?;

        tracing::debug!(method = %options.method, url = %url, "api request");

        let mut builder = self.http.request(options.method.clone(), &url).headers(headers);
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(method = %options.method, url = %url, "api request failed: {e}");
            ApiError::network(&e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::network(&e))?;
        let parsed = serde_json::from_str::<Value>(&text);

        if !status.is_success() {
            let err = ApiError::http_status(status.as_u16(), parsed.as_ref().ok())
                .with_details(text);
            tracing::warn!(
                method = %options.method,
                url = %url,
                status = status.as_u16(),
                "api error: {}",
                err.message
            );
            return Err(err);
        }

        let json = parsed.map_err(|e| {
            tracing::warn!(url = %url, "response is not JSON: {e}");
            ApiError::invalid_response("Invalid JSON in server response").with_details(text.clone())
        })?;

        let envelope = serde_json::from_value::<ApiResponse<T>>(json).map_err(|e| {
            tracing::warn!(url = %url, "unexpected response shape: {e}");
            ApiError::invalid_response(format!("Unexpected response shape: {e}"))
                .with_details(text.clone())
        })?;

        tracing::debug!(url = %url, status = status.as_u16(), success = envelope.success, "api response");
        Ok(envelope)
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<ApiResponse<T>> {
        self.request(endpoint, RequestOptions::new(Method::GET)).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<Value>,
    ) -> ApiResult<ApiResponse<T>> {
        self.request(endpoint, with_optional_body(Method::POST, body))
            .await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<Value>,
    ) -> ApiResult<ApiResponse<T>> {
        self.request(endpoint, with_optional_body(Method::PUT, body))
            .await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<Value>,
    ) -> ApiResult<ApiResponse<T>> {
        self.request(endpoint, with_optional_body(Method::PATCH, body))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<ApiResponse<T>> {
        self.request(endpoint, RequestOptions::new(Method::DELETE))
            .await
    }

    fn build_headers(&self, overrides: HeaderMap) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(USER_AGENT),
        );
        headers.extend(overrides);

        if let Some(token) = self.session.token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                ApiError::validation(format!("Stored token is not a valid header value: {e}"))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

fn with_optional_body(method: Method, body: Option<Value>) -> RequestOptions {
    RequestOptions {
        method,
        body,
        ..Default::default()
    }
}
