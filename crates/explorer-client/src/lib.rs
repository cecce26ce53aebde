// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Provider-agnostic blockchain explorer client
//!
//! This crate lets a wallet backend query Insight and Iquidus explorer
//! deployments through one canonical operation set. Backend payloads are
//! reshaped into the records of `explorer-types` by a normalization layer
//! driven by per-deployment dialect tables.
//!
//! # Architecture
//!
//! - **Factory**: [`registry::ExplorerFactory`] validates provider and network
//!   and resolves endpoints from the [`registry::ProviderRegistry`]
//! - **Client**: [`client::ExplorerClient`] issues requests through any
//!   `Transport` and owns no mutable state
//! - **Dialects**: [`dialect::Dialect`] holds endpoint paths and field names
//! - **Normalizer**: [`normalize`] holds pure payload translation functions
//! - **Settings**: [`config::ExplorerSettings`] loads options from files and
//!   `EXPLORER_*` environment variables
//!
//! # Example
//!
//! ```no_run
//! use explorer_client::{ExplorerOptions, create};
//!
//! # async fn run() -> explorer_client::ExplorerResult<()> {
//! let client = create(&ExplorerOptions::new("iquidus", "livenet"))?;
//! let height = client.get_blockchain_height().await?;
//! println!("{} at height {height}", client.connection_info());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dialect;
pub mod error;
pub mod normalize;
pub mod registry;

pub use client::{DEFAULT_API_PREFIX, DEFAULT_USER_AGENT, ExplorerClient, ExplorerClientConfig};
pub use config::ExplorerSettings;
pub use dialect::{
    Dialect, HeightSource, SingleAddressUtxos, TransactionListMap, TransactionWrapperMap,
    UtxoFieldMap, UtxoFieldOverrides,
};
pub use error::{ExplorerError, ExplorerResult};
pub use registry::{ExplorerFactory, ExplorerOptions, ProviderRegistry, create};
