use std::env;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, CLIENT_TRANSPORT_ERRORS,
};
use crate::types::{ErrorResponse, HealthStatus, QueryRequest, QueryResponse};

const DEFAULT_BASE_URL: &str = "http://localhost:8000/";
const BASE_URL_ENV: &str = "TUTORCHAT_BASE_URL";
const QUERY_PATH: &str = "api/query";
const HEALTH_PATH: &str = "health";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Something that can answer a chat query.
///
/// [`TutorClient`] is the production implementation; the seam exists so the chat session can be
/// driven without a network.
#[async_trait::async_trait]
pub trait QueryBackend: Send + Sync {
    /// Sends one query and returns the backend's answer.
    ///
    /// A non-2xx answer must come back as [`Error::Api`] carrying the text to show the user.
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse>;
}

/// Client for the AI Tutor backend.
#[derive(Debug, Clone)]
pub struct TutorClient {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl TutorClient {
    /// Create a new client.
    ///
    /// The base URL can be provided directly or read from the TUTORCHAT_BASE_URL environment
    /// variable; it defaults to `http://localhost:8000/`.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url
            .or_else(|| env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Turn a non-2xx response into an [`Error::Api`].
    ///
    /// The user-facing message is the body's `response` field when the body is JSON and carries
    /// a non-empty string there, and `Error: {status} {reason}` otherwise.
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let status_code = status.as_u16();
        let status_text = status.canonical_reason().unwrap_or_default();

        let body = response.text().await.unwrap_or_default();
        let message = ErrorResponse::parse(&body)
            .and_then(|parsed| parsed.message().map(String::from))
            .unwrap_or_else(|| format!("Error: {} {}", status_code, status_text));

        Error::api(status_code, status_text, message)
    }

    /// Send a query to `POST /api/query`.
    pub async fn send(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let url = self.endpoint(QUERY_PATH)?;
        tracing::debug!(%url, chars = request.text.len(), "sending query");

        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self.send_inner(url, request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        match &result {
            Ok(_) => {}
            Err(err) if err.is_api() => CLIENT_REQUEST_ERRORS.click(),
            Err(_) => CLIENT_TRANSPORT_ERRORS.click(),
        }
        result
    }

    async fn send_inner(&self, url: Url, request: &QueryRequest) -> Result<QueryResponse> {
        let response = self
            .client
            .post(url)
            .headers(self.default_headers())
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<QueryResponse>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Fetch the backend's `GET /health` report.
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint(HEALTH_PATH)?;
        tracing::debug!(%url, "checking backend health");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<HealthStatus>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse health report: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

#[async_trait::async_trait]
impl QueryBackend for TutorClient {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        self.send(request).await
    }
}

/// Parse a base URL, making sure relative endpoints resolve beneath its path.
fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;
    if url.cannot_be_a_base() {
        return Err(Error::validation(
            format!("{base_url} cannot be used as a base URL"),
            Some("base_url".to_string()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = TutorClient::new(Some("http://localhost:8000".to_string())).unwrap();
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);

        let client = TutorClient::with_options(
            Some("https://tutor.example.com/".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url().as_str(), "https://tutor.example.com/");
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn endpoints_resolve_under_base_path() {
        let client = TutorClient::new(Some("http://example.com/tutor".to_string())).unwrap();
        assert_eq!(
            client.endpoint(QUERY_PATH).unwrap().as_str(),
            "http://example.com/tutor/api/query"
        );
        assert_eq!(
            client.endpoint(HEALTH_PATH).unwrap().as_str(),
            "http://example.com/tutor/health"
        );
    }

    #[test]
    fn rejects_bad_base_urls() {
        assert!(TutorClient::new(Some("not a url".to_string())).is_err());
        let err = TutorClient::new(Some("mailto:someone@example.com".to_string())).unwrap_err();
        assert!(err.is_validation());
    }
}
