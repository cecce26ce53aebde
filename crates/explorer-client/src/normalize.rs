// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Response normalization
//!
//! Pure functions turning backend payloads into canonical records. Every
//! function receives the mapping it needs explicitly and returns a plain
//! reason string on shape failure; the client attaches the operation name.

use explorer_transport::ResponseBody;
use explorer_types::{FeeEstimates, TransactionPage, Utxo};
use serde_json::{Map, Value};
use tracing::debug;

use crate::dialect::{HeightSource, TransactionListMap, TransactionWrapperMap, UtxoFieldMap};

const SATOSHIS_PER_COIN: f64 = 100_000_000.0;

/// Shape failure description
pub type ShapeResult<T> = Result<T, String>;

/// Transaction list payload shapes accepted from backends
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionListResponse {
    /// Bare JSON array
    Bare(Vec<Value>),
    /// `{totalItems, items}` envelope
    Paged {
        /// Items of this page
        items: Vec<Value>,
        /// Reported total, if any
        total: Option<u64>,
    },
    /// Dialect wrapper entries after reconstruction
    Wrapped(Vec<Value>),
}

impl TransactionListResponse {
    /// Classify a payload
    pub fn decode(body: ResponseBody, map: &TransactionListMap) -> ShapeResult<Self> {
        let value = match body {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(_) => return Err("response is not JSON".to_string()),
            ResponseBody::Empty => return Err("response body is empty".to_string()),
        };

        match value {
            Value::Array(items) => Ok(Self::Bare(items)),
            Value::Object(mut object) => {
                if let Some(items) = object.remove(&map.items_field) {
                    let Value::Array(items) = items else {
                        return Err(format!("`{}` is not an array", map.items_field));
                    };
                    let total = object.get(&map.total_field).and_then(Value::as_u64);
                    return Ok(Self::Paged { items, total });
                }
                if let Some(wrapper) = &map.wrapper
                    && let Some(entries) = object.remove(&wrapper.list_field)
                {
                    let Value::Array(entries) = entries else {
                        return Err(format!("`{}` is not an array", wrapper.list_field));
                    };
                    return Ok(Self::Wrapped(
                        entries.into_iter().map(|e| reconstruct(e, wrapper)).collect(),
                    ));
                }
                Err("object response carries no transaction list".to_string())
            }
            _ => Err("expected an array of transactions".to_string()),
        }
    }

    /// Validate and convert into a canonical page
    pub fn into_page(self) -> ShapeResult<TransactionPage> {
        let (transactions, total) = match self {
            Self::Bare(items) | Self::Wrapped(items) => (items, None),
            Self::Paged { items, total } => (items, total),
        };

        if let Some(index) = transactions.iter().position(is_falsy) {
            return Err(format!("transaction list has an empty entry at index {index}"));
        }

        Ok(TransactionPage {
            transactions,
            total,
        })
    }
}

/// Rename wrapper entry fields to their canonical names, keeping the rest
fn reconstruct(entry: Value, wrapper: &TransactionWrapperMap) -> Value {
    let Value::Object(mut source) = entry else {
        return entry;
    };
    let mut rebuilt = Map::with_capacity(source.len());
    for (canonical, backend) in &wrapper.fields {
        if let Some(value) = source.remove(backend) {
            rebuilt.insert(canonical.clone(), value);
        }
    }
    for (key, value) in source {
        rebuilt.entry(key).or_insert(value);
    }
    Value::Object(rebuilt)
}

/// Null, `false`, zero and the empty string count as missing entries
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Depth of a block at `height` when the tip is at `tip`
///
/// Heights of zero or below mark mempool outputs; a height above the tip
/// means the backend indexed a block the tip query has not seen yet.
pub fn confirmations(tip: u64, height: i64) -> u64 {
    match u64::try_from(height) {
        Ok(h) if h > 0 && h <= tip => tip - h + 1,
        _ => 0,
    }
}

/// Extract the record list of a UTXO payload
pub fn utxo_records(body: ResponseBody, list_field: Option<&str>) -> ShapeResult<Vec<Value>> {
    let value = match body {
        ResponseBody::Json(value) => value,
        ResponseBody::Text(_) => return Err("response is not JSON".to_string()),
        ResponseBody::Empty => return Err("response body is empty".to_string()),
    };

    let list = match (list_field, value) {
        (None, list) => list,
        (Some(field), Value::Object(mut object)) => object
            .remove(field)
            .ok_or_else(|| format!("missing `{field}` list"))?,
        (Some(field), _) => return Err(format!("expected an object with a `{field}` list")),
    };

    match list {
        Value::Array(records) => Ok(records),
        _ => Err("expected an array of unspent outputs".to_string()),
    }
}

/// Map backend UTXO records to canonical UTXOs
///
/// `address` fills records whose map has no address field. When `tip` is
/// given and a record has a height, confirmations are derived from it;
/// otherwise the backend's own confirmation count is used if mapped.
pub fn normalize_utxos(
    records: &[Value],
    fields: &UtxoFieldMap,
    address: Option<&str>,
    tip: Option<u64>,
) -> ShapeResult<Vec<Utxo>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            normalize_utxo(record, fields, address, tip).map_err(|e| format!("output {index}: {e}"))
        })
        .collect()
}

fn normalize_utxo(
    record: &Value,
    fields: &UtxoFieldMap,
    address: Option<&str>,
    tip: Option<u64>,
) -> ShapeResult<Utxo> {
    let Value::Object(record) = record else {
        return Err("record is not an object".to_string());
    };

    let string_field = |name: &str| -> ShapeResult<String> {
        record
            .get(name)
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| format!("missing string field `{name}`"))
    };

    let txid = string_field(&fields.txid)?;
    let vout = record
        .get(&fields.vout)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| format!("missing output index `{}`", fields.vout))?;
    let address = match (&fields.address, address) {
        (Some(name), _) => string_field(name)?,
        (None, Some(address)) => address.to_string(),
        (None, None) => return Err("no address field and no queried address".to_string()),
    };
    let script_pub_key = string_field(&fields.script_pub_key)?;
    let satoshis = satoshis(record, fields)?;

    let height = fields
        .height
        .as_ref()
        .and_then(|name| record.get(name))
        .and_then(Value::as_i64);
    let reported = fields
        .confirmations
        .as_ref()
        .and_then(|name| record.get(name))
        .and_then(Value::as_u64);
    let confirmations = match (tip, height) {
        (Some(tip), Some(height)) => Some(confirmations(tip, height)),
        _ => reported,
    };

    Ok(Utxo {
        txid,
        vout,
        address,
        script_pub_key,
        satoshis,
        confirmations,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn satoshis(record: &Map<String, Value>, fields: &UtxoFieldMap) -> ShapeResult<i64> {
    if let Some(value) = record.get(&fields.satoshis) {
        if let Some(sats) = value.as_i64() {
            return Ok(sats);
        }
        if let Some(sats) = value.as_f64().filter(|f| f.is_finite()) {
            return Ok(sats.round() as i64);
        }
        return Err(format!("`{}` is not a number", fields.satoshis));
    }

    fields
        .amount
        .as_ref()
        .and_then(|name| record.get(name))
        .and_then(Value::as_f64)
        .filter(|f| f.is_finite())
        .map(|coins| (coins * SATOSHIS_PER_COIN).round() as i64)
        .ok_or_else(|| format!("missing value field `{}`", fields.satoshis))
}

/// Decode the chain tip height
pub fn decode_height(body: ResponseBody, source: &HeightSource) -> ShapeResult<u64> {
    let value = match (source, body) {
        (_, ResponseBody::Empty) => return Err("response body is empty".to_string()),
        (HeightSource::PlainText { .. }, ResponseBody::Text(text)) => {
            return text
                .trim()
                .parse()
                .map_err(|_| "height is not a non-negative integer".to_string());
        }
        (HeightSource::PlainText { .. }, ResponseBody::Json(value)) => value,
        (HeightSource::JsonField { pointer, .. }, ResponseBody::Json(value)) => value
            .pointer(pointer)
            .cloned()
            .ok_or_else(|| format!("missing height at `{pointer}`"))?,
        (HeightSource::JsonField { .. }, ResponseBody::Text(_)) => {
            return Err("response is not JSON".to_string());
        }
    };

    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| "height is not a non-negative integer".to_string()),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| "height is not a non-negative integer".to_string()),
        _ => Err("height is not a number".to_string()),
    }
}

/// Decode a `{"<blocks>": <feePerKb>}` payload
///
/// Targets the backend could not estimate (a `null` fee, a non-numeric key)
/// are skipped; only a payload that is not an object is rejected.
pub fn decode_fee_estimates(body: ResponseBody) -> ShapeResult<FeeEstimates> {
    let ResponseBody::Json(Value::Object(object)) = body else {
        return Err("expected an object of fee estimates".to_string());
    };

    Ok(object
        .into_iter()
        .filter_map(|(blocks, fee)| match (blocks.parse::<u32>(), fee.as_f64()) {
            (Ok(target), Some(fee)) => Some((target, fee)),
            _ => {
                debug!(key = %blocks, value = %fee, "skipping unusable fee estimate");
                None
            }
        })
        .collect())
}

/// Decode the transaction ids of a block detail payload
pub fn decode_block_txids(body: ResponseBody) -> ShapeResult<Vec<String>> {
    let ResponseBody::Json(Value::Object(mut object)) = body else {
        return Err("expected a block object".to_string());
    };
    let Some(Value::Array(txids)) = object.remove("tx") else {
        return Err("block has no `tx` list".to_string());
    };

    txids
        .into_iter()
        .map(|txid| match txid {
            Value::String(txid) if !txid.is_empty() => Ok(txid),
            _ => Err("block `tx` list has a non-string entry".to_string()),
        })
        .collect()
}

/// Whether an address summary reports any confirmed or unconfirmed activity
pub fn decode_address_activity(body: ResponseBody) -> ShapeResult<bool> {
    let ResponseBody::Json(Value::Object(object)) = body else {
        return Err("expected an address summary object".to_string());
    };

    let count = |names: &[&str]| -> u64 {
        names
            .iter()
            .find_map(|name| object.get(*name).and_then(Value::as_u64))
            .unwrap_or(0)
    };
    let confirmed = count(&["txApperances", "txAppearances"]);
    let unconfirmed = count(&["unconfirmedTxApperances", "unconfirmedTxAppearances"]);

    Ok(confirmed.saturating_add(unconfirmed) > 0)
}

/// Transaction id echoed by a broadcast, if any
pub fn broadcast_txid(body: &ResponseBody) -> Option<String> {
    match body {
        ResponseBody::Json(value) => value
            .get("txid")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        ResponseBody::Text(_) | ResponseBody::Empty => None,
    }
}
