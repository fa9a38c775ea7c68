//! Transport capability: request/response value types, the client trait,
//! an in-memory mock for tests and the reqwest-backed production client.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;

use super::types::Method;

/// HTTP request for executing a single call.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method verb.
    pub method: Method,
    /// Absolute target URL, query string included.
    pub url: String,
    /// Request headers.
    pub headers: Vec<(String, String)>,
    /// Optional request body bytes.
    pub body: Option<Vec<u8>>,
    /// Optional per-request timeout.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP response from executing a call.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Builds a response with the given status and body, no headers.
    pub fn with_body(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// Error type for transport-level failures.
pub type HttpClientError = Box<dyn Error + Send + Sync>;

/// Generic HTTP client interface for the session core.
pub trait HttpClient: Send + Sync + Clone + 'static {
    /// Execute an HTTP request asynchronously.
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError>> + Send + 'static>>;
}

/// In-memory HTTP client for tests. Serves canned responses by URL and
/// records every request it is handed.
#[derive(Debug, Clone)]
pub struct InMemoryHttpClient {
    responses: Arc<DashMap<String, HttpResponse>>,
    default_response: Option<HttpResponse>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl InMemoryHttpClient {
    /// Creates a client with no default response; unmatched URLs error.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(DashMap::new()),
            default_response: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a client serving `response` for any unmatched URL.
    pub fn with_default(response: HttpResponse) -> Self {
        Self {
            responses: Arc::new(DashMap::new()),
            default_response: Some(response),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a canned response for a specific URL.
    pub fn insert_response(&self, url: impl Into<String>, response: HttpResponse) {
        self.responses.insert(url.into(), response);
    }

    /// Snapshot of every request executed so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }
}

impl Default for InMemoryHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for InMemoryHttpClient {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError>> + Send + 'static>> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());
        let responses = self.responses.clone();
        let default = self.default_response.clone();
        let url = request.url.clone();
        Box::pin(async move {
            if let Some(entry) = responses.get(&url) {
                Ok(entry.value().clone())
            } else if let Some(resp) = default {
                Ok(resp)
            } else {
                Err("no mock response for url".into())
            }
        })
    }
}

/// Production transport backed by a shared reqwest client. Redirects are
/// never followed; the pipeline judges every status itself.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Creates the client. Panics only when the host TLS backend cannot be
    /// initialized at all.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("reqwest client construction failed");
        Self { client }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError>> + Send + 'static>> {
        let client = self.client.clone();
        Box::pin(async move {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Put => reqwest::Method::PUT,
                Method::Patch => reqwest::Method::PATCH,
                Method::Delete => reqwest::Method::DELETE,
            };
            let mut builder = client.request(method, &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }
            let response = builder
                .send()
                .await
                .map_err(|err| Box::new(err) as HttpClientError)?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .bytes()
                .await
                .map_err(|err| Box::new(err) as HttpClientError)?
                .to_vec();
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}
