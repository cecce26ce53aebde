// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs, dead_code)]

//! Explorer test fixtures
//!
//! Payloads captured from Iquidus and Insight deployments, trimmed to the
//! fields the client reads.

use explorer_client::{ExplorerClient, ExplorerFactory, ExplorerOptions};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const ADDRESS: &str = "AVtQJdgVRZ9t8Cbs5GRHN4XSVT5bYNBW5t";
pub const TXID: &str = "9d4e1a7b6ee7a0e0a8c5f4d3f6d2b2f1c3a1e0d9c8b7a6f5e4d3c2b1a0f9e8d7";
pub const BLOCK_HASH: &str = "00000000a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c";

/// Build a client against a mock server
pub fn client(provider: &str, server: &MockServer) -> ExplorerClient {
    ExplorerFactory::default()
        .create(&ExplorerOptions::new(provider, "livenet").with_url(server.uri()))
        .unwrap()
}

#[derive(Debug)]
pub struct IquidusFixture;

impl IquidusFixture {
    pub fn listunspent_response() -> Value {
        json!({
            "unspent_outputs": [
                {
                    "tx_hash": TXID,
                    "tx_pos": 1,
                    "script": "76a914f2b1e3c5d7a9b0c1d2e3f4a5b6c7d8e9f0a1b2c388ac",
                    "value": 150_000_000,
                    "height": 990
                },
                {
                    "tx_hash": "11".repeat(32),
                    "tx_pos": 0,
                    "script": "76a914a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b088ac",
                    "value": 2_500,
                    "height": 0
                }
            ]
        })
    }

    pub fn wrapped_transactions_response() -> Value {
        json!({
            "last_txs": [
                { "addresses": TXID, "type": "vin" },
                { "addresses": "22".repeat(32), "type": "vout" }
            ]
        })
    }

    /// Mount the listunspent and block count endpoints
    pub async fn mount_utxo_endpoints(server: &MockServer, tip: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/ext/listunspent/{ADDRESS}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(Self::listunspent_response()))
            .expect(1)
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/getblockcount"))
            .respond_with(ResponseTemplate::new(200).set_body_string(tip.to_string()))
            .mount(server)
            .await;
    }
}

#[derive(Debug)]
pub struct InsightFixture;

impl InsightFixture {
    pub fn utxo_response() -> Value {
        json!([
            {
                "address": ADDRESS,
                "txid": TXID,
                "vout": 0,
                "scriptPubKey": "76a914f2b1e3c5d7a9b0c1d2e3f4a5b6c7d8e9f0a1b2c388ac",
                "amount": 0.5,
                "satoshis": 50_000_000,
                "height": 1000,
                "confirmations": 12
            },
            {
                "address": ADDRESS,
                "txid": "33".repeat(32),
                "vout": 2,
                "scriptPubKey": "76a914a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b088ac",
                "amount": 0.0001,
                "confirmations": 0
            }
        ])
    }

    pub fn status_response(blocks: u64) -> Value {
        json!({
            "info": {
                "version": 120_000,
                "blocks": blocks,
                "connections": 8,
                "difficulty": 1.5,
                "testnet": false
            }
        })
    }

    pub fn address_response(confirmed: u64, unconfirmed: u64) -> Value {
        json!({
            "addrStr": ADDRESS,
            "balance": 0,
            "txApperances": confirmed,
            "unconfirmedTxApperances": unconfirmed
        })
    }

    pub fn transaction(txid: &str) -> Value {
        json!({ "txid": txid, "version": 1, "locktime": 0, "vin": [], "vout": [] })
    }
}
