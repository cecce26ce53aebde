// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! reqwest-backed transport with ordered host failover
//!
//! Hosts are tried in the order given. A host is skipped when the request
//! could not be delivered, timed out, or came back with a 5xx status. Requests
//! marked non-idempotent are only moved to the next host when they provably
//! never reached the previous one.

use std::time::Duration;

use reqwest::Client;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use crate::{Method, RequestDescriptor, ResponseBody, Transport, TransportError, TransportResponse};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 10;

/// Configuration for [`HttpTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    /// Timeout applied when a descriptor does not carry its own
    pub timeout_seconds: u64,
    /// TCP connect timeout
    pub connect_timeout_seconds: u64,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            connect_timeout_seconds: DEFAULT_CONNECT_TIMEOUT_SECONDS,
        }
    }
}

/// HTTP transport over a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()
            .map_err(|source| TransportError::Http {
                url: String::new(),
                source,
            })?;

        Ok(Self { client, config })
    }

    fn request_url(host: &str, path: &str) -> Result<Url, TransportError> {
        let raw = format!("{}{}", host.trim().trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| TransportError::InvalidUrl {
            url: raw,
            message: e.to_string(),
        })
    }

    async fn send_to_host(
        &self,
        host: &str,
        request: &RequestDescriptor,
    ) -> Result<TransportResponse, TransportError> {
        let url = Self::request_url(host, &request.path)?;
        let request_url = url.to_string();
        let duration = request
            .timeout
            .unwrap_or(Duration::from_secs(self.config.timeout_seconds));

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = request.method.as_str(), url = %request_url, "sending explorer request");

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        };

        let (status, text) = timeout(duration, exchange)
            .await
            .map_err(|_| TransportError::Timeout {
                url: request_url.clone(),
                timeout_ms: duration.as_millis(),
            })?
            .map_err(|source| TransportError::Http {
                url: request_url.clone(),
                source,
            })?;

        Ok(TransportResponse {
            status,
            request_url,
            body: ResponseBody::decode(text, request.format),
        })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<TransportResponse, TransportError> {
        let hosts: Vec<&str> = request
            .hosts
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .collect();
        let Some((last, rest)) = hosts.split_last() else {
            return Err(TransportError::NoHosts);
        };

        for host in rest {
            match self.send_to_host(host, &request).await {
                Ok(response) if response.status >= 500 && request.idempotent => {
                    warn!(
                        host,
                        status = response.status,
                        "explorer host returned server error, trying next host"
                    );
                }
                Ok(response) => return Ok(response),
                Err(e) if request.idempotent || e.is_undelivered() => {
                    warn!(host, error = %e, "explorer host failed, trying next host");
                }
                Err(e) => return Err(e),
            }
        }

        self.send_to_host(last, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url_joins_host_and_path() {
        let url = HttpTransport::request_url("http://explorer:3001/", "/api/getblockcount").unwrap();
        assert_eq!(url.as_str(), "http://explorer:3001/api/getblockcount");

        let url = HttpTransport::request_url("https://insight:443", "/insight-api/addrs/txs?from=0&to=10")
            .unwrap();
        assert_eq!(url.query(), Some("from=0&to=10"));
    }

    #[test]
    fn request_url_rejects_garbage() {
        let err = HttpTransport::request_url("not a host", "/x").unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn send_without_hosts_fails() {
        let transport = HttpTransport::new(HttpTransportConfig::default()).unwrap();
        let request = RequestDescriptor::get("/x").with_hosts(vec![String::new()]);
        let err = transport.send(request).await.unwrap_err();
        assert!(matches!(err, TransportError::NoHosts));
    }
}
