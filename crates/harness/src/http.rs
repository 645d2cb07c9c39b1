//! Single-shot HTTP requests against the backend under test

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};

/// Default bound on a single request, connect through last body byte.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything needed to issue one request
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    /// Serialized as JSON text when present. `Content-Type` is the caller's job.
    pub body: Option<Value>,
}

impl RequestSpec {
    pub fn new(method: Method, host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self::new(Method::GET, host, port, path)
    }

    pub fn post(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self::new(Method::POST, host, port, path)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Shorthand for a JSON payload with the matching header.
    pub fn json(self, body: Value) -> Self {
        self.header("Content-Type", "application/json").body(body)
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }
}

/// Response payload, parsed as JSON when it is JSON
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    Json(Value),
    Raw(String),
}

impl ParsedBody {
    /// An empty payload is `Json(null)`. Never fails.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return ParsedBody::Json(Value::Null);
        }
        match serde_json::from_str(text) {
            Ok(value) => ParsedBody::Json(value),
            Err(_) => ParsedBody::Raw(text.to_string()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ParsedBody::Json(value) => Some(value),
            ParsedBody::Raw(_) => None,
        }
    }
}

/// Buffered response
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: ParsedBody,
}

impl ResponseRecord {
    pub fn json(&self) -> Option<&Value> {
        self.body.as_json()
    }

    /// RFC 6901 lookup into a JSON body, e.g. `/data/name`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.json().and_then(|v| v.pointer(pointer))
    }

    /// The envelope's `success` field, if it is a boolean.
    pub fn success_flag(&self) -> Option<bool> {
        self.pointer("/success").and_then(Value::as_bool)
    }
}

/// HTTP client used for health probes and API scenarios
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> HarnessResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform exactly one request and buffer the whole response.
    pub async fn send(&self, spec: &RequestSpec) -> HarnessResult<ResponseRecord> {
        let url = spec.url();
        debug!("{} {}", spec.method, url);

        let mut request = self.client.request(spec.method.clone(), &url);
        for (name, value) in &spec.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &spec.body {
            request = request.body(serde_json::to_string(body)?);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.classify(e, spec, &url))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify(e, spec, &url))?;
        let text = String::from_utf8_lossy(&bytes);

        debug!("{} {} -> {} ({} bytes)", spec.method, url, status, bytes.len());

        Ok(ResponseRecord {
            status,
            headers,
            body: ParsedBody::parse(&text),
        })
    }

    fn classify(&self, err: reqwest::Error, spec: &RequestSpec, url: &str) -> HarnessError {
        if err.is_timeout() {
            HarnessError::RequestTimeout {
                method: spec.method.to_string(),
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            HarnessError::Transport(err)
        }
    }
}
