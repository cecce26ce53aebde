// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Live push-notification feed seam
//!
//! The event schema is defined by the backend and passed through untouched.
//! Reconnection after a drop is the connector's job.

use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

/// Options passed to [`LiveFeedConnector::connect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveFeedOptions {
    /// Whether the connector should reconnect after the feed drops
    pub reconnection: bool,
}

impl Default for LiveFeedOptions {
    fn default() -> Self {
        Self { reconnection: true }
    }
}

/// A single server-pushed event
#[derive(Debug, Clone, PartialEq)]
pub struct LiveFeedEvent {
    /// Event name as sent by the backend
    pub name: String,
    /// Event payload
    pub payload: Value,
}

/// Receiving end of a live feed
#[derive(Debug)]
pub struct LiveFeedHandle {
    host: String,
    events: mpsc::Receiver<LiveFeedEvent>,
}

impl LiveFeedHandle {
    /// Create a handle together with the sender a connector pushes events into
    pub fn channel(host: impl Into<String>, capacity: usize) -> (mpsc::Sender<LiveFeedEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            tx,
            Self {
                host: host.into(),
                events: rx,
            },
        )
    }

    /// Host this feed is connected to
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Wait for the next event, `None` once the feed is closed for good
    pub async fn next_event(&mut self) -> Option<LiveFeedEvent> {
        self.events.recv().await
    }
}

/// Errors raised while opening a live feed
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum LiveFeedError {
    /// The connector could not reach the host
    #[error("Failed to open live feed to {host}: {message}")]
    Connect { host: String, message: String },
}

/// Capability to open a live feed to one explorer host
pub trait LiveFeedConnector: Send + Sync {
    /// Open a feed to `host`
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established
    fn connect(&self, host: &str, options: LiveFeedOptions) -> Result<LiveFeedHandle, LiveFeedError>;
}
