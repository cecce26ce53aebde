// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Per-deployment wire dialects
//!
//! Explorer software revisions disagree on endpoint paths and field names, so
//! none of them are hard-coded in the normalizer. A [`Dialect`] carries the
//! whole mapping for one deployment and can be adjusted from configuration
//! with [`UtxoFieldOverrides`].
//!
//! Path templates expand `{prefix}` to the client's API prefix and
//! `{address}` to the queried address.

use std::collections::BTreeMap;

use explorer_types::Provider;
use serde::{Deserialize, Serialize};

/// Where the current chain tip height comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeightSource {
    /// Body is the bare height as text or a JSON number
    PlainText {
        /// Path template
        path: String,
    },
    /// Height is a field inside a JSON object
    JsonField {
        /// Path template
        path: String,
        /// JSON pointer to the height, e.g. `/info/blocks`
        pointer: String,
    },
}

impl HeightSource {
    /// Path template of the height endpoint
    pub fn path(&self) -> &str {
        match self {
            Self::PlainText { path } | Self::JsonField { path, .. } => path,
        }
    }
}

/// Backend field names for one UTXO record shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoFieldMap {
    /// Transaction id field
    pub txid: String,
    /// Output index field
    pub vout: String,
    /// Address field; `None` means the queried address is used
    pub address: Option<String>,
    /// Locking script field
    pub script_pub_key: String,
    /// Value in satoshis
    pub satoshis: String,
    /// Value in whole coins, used when the satoshi field is absent
    pub amount: Option<String>,
    /// Block height of the output
    pub height: Option<String>,
    /// Confirmation count reported by the backend
    pub confirmations: Option<String>,
}

impl UtxoFieldMap {
    /// Insight-API record shape
    pub fn insight() -> Self {
        Self {
            txid: "txid".to_string(),
            vout: "vout".to_string(),
            address: Some("address".to_string()),
            script_pub_key: "scriptPubKey".to_string(),
            satoshis: "satoshis".to_string(),
            amount: Some("amount".to_string()),
            height: Some("height".to_string()),
            confirmations: Some("confirmations".to_string()),
        }
    }

    /// Iquidus `/ext/listunspent` record shape
    pub fn iquidus_listunspent() -> Self {
        Self {
            txid: "tx_hash".to_string(),
            vout: "tx_pos".to_string(),
            address: None,
            script_pub_key: "script".to_string(),
            satoshis: "value".to_string(),
            amount: None,
            height: Some("height".to_string()),
            confirmations: None,
        }
    }

    /// Apply operator overrides on top of this map
    #[must_use]
    pub fn with_overrides(mut self, overrides: &UtxoFieldOverrides) -> Self {
        let replace = |slot: &mut String, value: &Option<String>| {
            if let Some(value) = value {
                slot.clone_from(value);
            }
        };
        let replace_opt = |slot: &mut Option<String>, value: &Option<String>| {
            if value.is_some() {
                slot.clone_from(value);
            }
        };

        replace(&mut self.txid, &overrides.txid);
        replace(&mut self.vout, &overrides.vout);
        replace_opt(&mut self.address, &overrides.address);
        replace(&mut self.script_pub_key, &overrides.script_pub_key);
        replace(&mut self.satoshis, &overrides.satoshis);
        replace_opt(&mut self.amount, &overrides.amount);
        replace_opt(&mut self.height, &overrides.height);
        replace_opt(&mut self.confirmations, &overrides.confirmations);
        self
    }
}

/// Partial [`UtxoFieldMap`] supplied by configuration
///
/// Unset fields keep the preset's name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct UtxoFieldOverrides {
    pub txid: Option<String>,
    pub vout: Option<String>,
    pub address: Option<String>,
    pub script_pub_key: Option<String>,
    pub satoshis: Option<String>,
    pub amount: Option<String>,
    pub height: Option<String>,
    pub confirmations: Option<String>,
}

/// Single-address UTXO lookup endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleAddressUtxos {
    /// Path template
    pub path: String,
    /// Object field holding the record list; `None` when the body is the list
    pub list_field: Option<String>,
    /// Record field names
    pub fields: UtxoFieldMap,
    /// Whether to fetch the tip height and derive confirmations from it
    pub compute_confirmations: bool,
}

/// Dialect-specific wrapper around a transaction list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionWrapperMap {
    /// Object field holding the wrapped entries
    pub list_field: String,
    /// Canonical field name to backend field name
    pub fields: BTreeMap<String, String>,
}

/// Transaction list envelope field names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionListMap {
    /// Paged envelope item list field
    pub items_field: String,
    /// Paged envelope total count field
    pub total_field: String,
    /// Optional dialect wrapper
    pub wrapper: Option<TransactionWrapperMap>,
}

impl Default for TransactionListMap {
    fn default() -> Self {
        Self {
            items_field: "items".to_string(),
            total_field: "totalItems".to_string(),
            wrapper: None,
        }
    }
}

/// Complete endpoint and field mapping for one explorer deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialect {
    /// Explorer family, used in diagnostics
    pub provider: Provider,
    /// Tip height endpoint
    pub height: HeightSource,
    /// Bulk UTXO record field names
    pub bulk_utxo_fields: UtxoFieldMap,
    /// Single-address UTXO endpoint
    pub single_address_utxos: SingleAddressUtxos,
    /// Transaction list envelope names
    pub transaction_list: TransactionListMap,
}

impl Dialect {
    /// Preset for a provider
    pub fn for_provider(provider: Provider) -> Self {
        match provider {
            Provider::Insight => Self::insight(),
            Provider::Iquidus => Self::iquidus(),
        }
    }

    /// Insight-API deployment
    pub fn insight() -> Self {
        Self {
            provider: Provider::Insight,
            height: HeightSource::JsonField {
                path: "{prefix}/status?q=getInfo".to_string(),
                pointer: "/info/blocks".to_string(),
            },
            bulk_utxo_fields: UtxoFieldMap::insight(),
            single_address_utxos: SingleAddressUtxos {
                path: "{prefix}/addr/{address}/utxo".to_string(),
                list_field: None,
                fields: UtxoFieldMap::insight(),
                compute_confirmations: false,
            },
            transaction_list: TransactionListMap::default(),
        }
    }

    /// Iquidus deployment with its Insight-compatible API mounted under the prefix
    pub fn iquidus() -> Self {
        Self {
            provider: Provider::Iquidus,
            height: HeightSource::PlainText {
                path: "/api/getblockcount".to_string(),
            },
            bulk_utxo_fields: UtxoFieldMap::insight(),
            single_address_utxos: SingleAddressUtxos {
                path: "/ext/listunspent/{address}".to_string(),
                list_field: Some("unspent_outputs".to_string()),
                fields: UtxoFieldMap::iquidus_listunspent(),
                compute_confirmations: true,
            },
            transaction_list: TransactionListMap {
                wrapper: Some(TransactionWrapperMap {
                    list_field: "last_txs".to_string(),
                    fields: BTreeMap::from([
                        ("txid".to_string(), "addresses".to_string()),
                        ("direction".to_string(), "type".to_string()),
                    ]),
                }),
                ..TransactionListMap::default()
            },
        }
    }

    /// Apply configured field overrides
    #[must_use]
    pub fn with_field_overrides(
        mut self,
        bulk: Option<&UtxoFieldOverrides>,
        single_address: Option<&UtxoFieldOverrides>,
    ) -> Self {
        if let Some(overrides) = bulk {
            self.bulk_utxo_fields = self.bulk_utxo_fields.with_overrides(overrides);
        }
        if let Some(overrides) = single_address {
            self.single_address_utxos.fields =
                self.single_address_utxos.fields.with_overrides(overrides);
        }
        self
    }
}

/// Expand `{prefix}` and `{address}` in a path template
pub(crate) fn expand_path(template: &str, prefix: &str, address: Option<&str>) -> String {
    let path = template.replace("{prefix}", prefix);
    match address {
        Some(address) => path.replace("{address}", address),
        None => path,
    }
}
