// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for explorer client construction and operations
//!
//! Backend error bodies are not stable API, so request failures are logged
//! with their details and surface to callers as a single opaque variant.

use explorer_transport::{LiveFeedError, TransportError, TransportResponse};
use explorer_types::Provider;
use thiserror::Error;
use tracing::warn;

/// Result type alias for explorer operations
pub type ExplorerResult<T> = Result<T, ExplorerError>;

/// Errors returned by the factory and by explorer client operations
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ExplorerError {
    /// Requested provider is not in the registry
    #[error("Provider {provider} not supported")]
    UnsupportedProvider { provider: String },

    /// Requested network is not offered by the provider
    #[error("Network {network} not supported by this provider ({provider})")]
    UnsupportedNetwork { provider: Provider, network: String },

    /// Any other invalid or missing configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Transport failure or unexpected HTTP status
    #[error("Error querying the blockchain")]
    Request,

    /// A 200 response whose payload does not have the expected shape
    #[error("Could not retrieve {operation} from blockchain: {reason}")]
    MalformedResponse {
        operation: &'static str,
        reason: String,
    },

    /// The live feed could not be opened
    #[error("Live feed error: {0}")]
    LiveFeed(#[from] LiveFeedError),
}

impl ExplorerError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            operation,
            reason: reason.into(),
        }
    }

    /// Whether this error was raised before any request was made
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedProvider { .. }
                | Self::UnsupportedNetwork { .. }
                | Self::Configuration { .. }
        )
    }

    /// Whether this is the opaque request failure
    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request)
    }

    /// Whether the backend answered with a payload of the wrong shape
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. })
    }
}

/// Log a transport failure and reduce it to the opaque request error
pub(crate) fn transport_failed(operation: &'static str, error: &TransportError) -> ExplorerError {
    warn!(operation, error = %error, "explorer request failed");
    ExplorerError::Request
}

/// Log an unexpected status and reduce it to the opaque request error
pub(crate) fn unexpected_status(
    operation: &'static str,
    response: &TransportResponse,
) -> ExplorerError {
    warn!(
        operation,
        url = %response.request_url,
        status = response.status,
        "explorer returned unexpected status"
    );
    ExplorerError::Request
}
