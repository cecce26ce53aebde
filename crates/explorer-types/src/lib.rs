// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Canonical types for the blockchain explorer adapter
//!
//! This crate holds the provider/network identifiers and the canonical result
//! schemas (UTXOs, transaction pages, fee estimates) that every explorer
//! dialect is normalized into. It has no I/O and no knowledge of any backend.

pub mod network;
pub mod records;

pub use network::{Network, NetworkParseError, Provider, ProviderParseError};
pub use records::{FeeEstimates, TransactionPage, Utxo};
