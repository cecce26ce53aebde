// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Request transport and live-feed seams for blockchain explorer clients
//!
//! Explorer clients never talk HTTP directly. They build a [`RequestDescriptor`]
//! and hand it to a [`Transport`], which owns the host list failover policy and
//! returns the status, the URL that finally served the request, and the parsed
//! body. Push notifications are reached the same way through
//! [`LiveFeedConnector`].
//!
//! # Core Abstractions
//!
//! - **`Transport` Trait**: async request/response seam with multi-host support
//! - **`HttpTransport`**: reqwest implementation with ordered host failover
//! - **`LiveFeedConnector` Trait**: opens a long-lived event feed to one host

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

pub mod http;
pub mod live_feed;

pub use http::{HttpTransport, HttpTransportConfig};
pub use live_feed::{LiveFeedConnector, LiveFeedError, LiveFeedEvent, LiveFeedHandle, LiveFeedOptions};

/// Generic trait for explorer request transports
///
/// Implementations decide which of the descriptor's hosts serves the request.
/// Callers only ever see the final outcome.
pub trait Transport: Send + Sync {
    /// Send a request and return the response of the host that served it
    ///
    /// # Errors
    ///
    /// Returns an error if no host could produce a response
    fn send(
        &self,
        request: RequestDescriptor,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// HTTP method of an explorer request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST with a JSON body
    Post,
}

impl Method {
    /// Method name as sent on the wire
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// How the response body should be decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Parse as JSON, falling back to text when the body is not JSON
    #[default]
    Json,
    /// Keep the raw text
    Text,
}

/// Description of a single explorer request
///
/// Descriptors are built per call and consumed by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// Candidate hosts, tried in order
    pub hosts: Vec<String>,
    /// HTTP method
    pub method: Method,
    /// Path including any query string, appended to the host
    pub path: String,
    /// JSON body for POST requests
    pub body: Option<Value>,
    /// Expected body format
    pub format: ResponseFormat,
    /// Per-request timeout overriding the transport default
    pub timeout: Option<Duration>,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    /// Whether the request may be replayed against another host
    pub idempotent: bool,
}

impl RequestDescriptor {
    fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            hosts: Vec::new(),
            method,
            path: path.into(),
            body,
            format: ResponseFormat::Json,
            timeout: None,
            headers: Vec::new(),
            idempotent: true,
        }
    }

    /// GET request expecting JSON
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, None)
    }

    /// POST request with a JSON body expecting JSON
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path, Some(body))
    }

    /// Set the candidate hosts
    #[must_use]
    pub fn with_hosts(mut self, hosts: Vec<String>) -> Self {
        self.hosts = hosts;
        self
    }

    /// Add a request header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the transport timeout for this request
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Keep the body as raw text
    #[must_use]
    pub fn expect_text(mut self) -> Self {
        self.format = ResponseFormat::Text;
        self
    }

    /// Forbid replaying the request on another host once it may have been delivered
    #[must_use]
    pub fn non_idempotent(mut self) -> Self {
        self.idempotent = false;
        self
    }
}

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Body parsed as JSON
    Json(Value),
    /// Body kept as text
    Text(String),
    /// No body
    Empty,
}

impl ResponseBody {
    /// Decode raw body text according to the requested format
    pub fn decode(text: String, format: ResponseFormat) -> Self {
        if text.trim().is_empty() {
            return Self::Empty;
        }
        match format {
            ResponseFormat::Text => Self::Text(text),
            ResponseFormat::Json => match serde_json::from_str(&text) {
                Ok(value) => Self::Json(value),
                Err(_) => Self::Text(text),
            },
        }
    }
}

/// Response metadata and body as seen by explorer clients
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Full URL of the request that produced this response
    pub request_url: String,
    /// Decoded body
    pub body: ResponseBody,
}

impl TransportResponse {
    /// Whether the status is exactly 200
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Whether the status is 404
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Errors produced by transports
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum TransportError {
    /// The descriptor carried no usable host
    #[error("No hosts configured for request")]
    NoHosts,

    /// Host and path did not form a valid URL
    #[error("Invalid request URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// The request did not complete in time
    #[error("Request to {url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u128 },

    /// HTTP request failed
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    /// Whether the request certainly never reached the backend
    pub fn is_undelivered(&self) -> bool {
        match self {
            Self::NoHosts | Self::InvalidUrl { .. } => true,
            Self::Http { source, .. } => source.is_connect() || source.is_builder(),
            Self::Timeout { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn descriptor_builders() {
        let request = RequestDescriptor::post("/insight-api/tx/send", json!({"rawtx": "00"}))
            .with_hosts(vec!["http://a".to_string()])
            .with_header("User-Agent", "bws")
            .with_timeout(Duration::from_secs(5))
            .non_idempotent();

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body, Some(json!({"rawtx": "00"})));
        assert_eq!(request.headers, vec![("User-Agent".to_string(), "bws".to_string())]);
        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
        assert!(!request.idempotent);

        let request = RequestDescriptor::get("/api/getblockcount").expect_text();
        assert_eq!(request.method.as_str(), "GET");
        assert_eq!(request.format, ResponseFormat::Text);
        assert!(request.idempotent);
        assert!(request.body.is_none());
    }

    #[test]
    fn body_decoding() {
        assert_eq!(
            ResponseBody::decode("{\"a\":1}".to_string(), ResponseFormat::Json),
            ResponseBody::Json(json!({"a": 1}))
        );
        assert_eq!(
            ResponseBody::decode("12345".to_string(), ResponseFormat::Text),
            ResponseBody::Text("12345".to_string())
        );
        assert_eq!(
            ResponseBody::decode("not json".to_string(), ResponseFormat::Json),
            ResponseBody::Text("not json".to_string())
        );
        assert_eq!(
            ResponseBody::decode("  ".to_string(), ResponseFormat::Json),
            ResponseBody::Empty
        );
    }

    #[test]
    fn status_predicates() {
        let response = TransportResponse {
            status: 404,
            request_url: "http://a/x".to_string(),
            body: ResponseBody::Empty,
        };
        assert!(response.is_not_found());
        assert!(!response.is_ok());
    }

    #[test]
    fn undelivered_errors() {
        assert!(TransportError::NoHosts.is_undelivered());
        assert!(
            !TransportError::Timeout {
                url: "http://a".to_string(),
                timeout_ms: 10
            }
            .is_undelivered()
        );
    }
}
