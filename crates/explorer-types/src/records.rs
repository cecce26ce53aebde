// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Canonical result records produced by every explorer dialect

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unspent transaction output in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    /// Id of the transaction that created the output
    pub txid: String,
    /// Output index within that transaction
    pub vout: u32,
    /// Address the output pays to
    pub address: String,
    /// Hex-encoded locking script
    pub script_pub_key: String,
    /// Output value in the coin's smallest unit
    pub satoshis: i64,
    /// Depth of the containing block, `None` when the backend gave no height
    ///
    /// Mempool outputs (height 0) and heights above the known tip count as 0.
    pub confirmations: Option<u64>,
}

impl Utxo {
    /// Whether the output is known to be in a block
    pub fn is_confirmed(&self) -> bool {
        self.confirmations.is_some_and(|c| c > 0)
    }
}

/// One page of an address transaction history
///
/// Transactions are passed through as the backend produced them. `total` is
/// only present when the backend reported paging metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    /// Transactions in backend order
    pub transactions: Vec<Value>,
    /// Total number of items across all pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl TransactionPage {
    /// Number of transactions on this page
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether this page holds no transactions
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Fee rate per kilobyte keyed by confirmation target in blocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeEstimates(BTreeMap<u32, f64>);

impl FeeEstimates {
    /// Same rate for every requested target, for networks with a flat fee policy
    pub fn fixed(targets: &[u32], fee_per_kb: f64) -> Self {
        Self(targets.iter().map(|&t| (t, fee_per_kb)).collect())
    }

    /// Rate for a given target, if the backend reported one
    pub fn get(&self, blocks: u32) -> Option<f64> {
        self.0.get(&blocks).copied()
    }

    /// Iterate over `(target, rate)` pairs in ascending target order
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }

    /// Number of targets
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no targets are present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<u32, f64>> for FeeEstimates {
    fn from(value: BTreeMap<u32, f64>) -> Self {
        Self(value)
    }
}

impl FromIterator<(u32, f64)> for FeeEstimates {
    fn from_iter<I: IntoIterator<Item = (u32, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn utxo_serializes_camel_case() {
        let utxo = Utxo {
            txid: "ab".to_string(),
            vout: 1,
            address: "addr".to_string(),
            script_pub_key: "76a9".to_string(),
            satoshis: 5000,
            confirmations: None,
        };
        let value = serde_json::to_value(&utxo).unwrap();
        assert_eq!(value["scriptPubKey"], "76a9");
        assert_eq!(value["confirmations"], Value::Null);
        assert!(!utxo.is_confirmed());
    }

    #[test]
    fn fixed_fee_covers_every_target() {
        let fees = FeeEstimates::fixed(&[1, 2, 6], 0.01);
        assert_eq!(fees.len(), 3);
        assert_eq!(fees.get(6), Some(0.01));
        assert_eq!(fees.get(3), None);
        assert_eq!(serde_json::to_value(&fees).unwrap(), json!({"1": 0.01, "2": 0.01, "6": 0.01}));
    }

    #[test]
    fn page_without_total_omits_field() {
        let page = TransactionPage {
            transactions: vec![json!({"txid": "a"})],
            total: None,
        };
        let value = serde_json::to_value(&page).unwrap();
        assert!(value.get("total").is_none());
        assert_eq!(page.len(), 1);
    }
}
