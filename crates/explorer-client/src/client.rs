// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Canonical explorer client
//!
//! One client type serves every dialect. Each operation builds a
//! [`RequestDescriptor`], sends it through the configured [`Transport`] and
//! passes the body through the matching normalizer in [`crate::normalize`].
//!
//! Status handling is uniform: 200 is success, 404 is an absent result for
//! entity lookups, anything else (and any transport failure) is the opaque
//! [`ExplorerError::Request`].

use std::{fmt, sync::Arc, time::Duration};

use explorer_transport::{
    HttpTransport, LiveFeedConnector, LiveFeedHandle, LiveFeedOptions, RequestDescriptor,
    ResponseBody, Transport, TransportResponse,
};
use explorer_types::{FeeEstimates, Network, TransactionPage, Utxo};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::{
    dialect::{Dialect, HeightSource, expand_path},
    error::{ExplorerError, ExplorerResult, transport_failed, unexpected_status},
    normalize::{self, TransactionListResponse},
};

/// Default API prefix of Insight-compatible endpoints
pub const DEFAULT_API_PREFIX: &str = "/insight-api";
/// Default `User-Agent` header
pub const DEFAULT_USER_AGENT: &str = "bws";

// Address history queries over many addresses are slow on every backend
const TRANSACTIONS_TIMEOUT: Duration = Duration::from_secs(120);

/// Immutable settings of an [`ExplorerClient`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerClientConfig {
    /// Network the explorer indexes
    pub network: Network,
    /// Candidate hosts, the first one also serves live feeds
    pub hosts: Vec<String>,
    /// Prefix of the Insight-compatible API
    pub api_prefix: String,
    /// `User-Agent` sent with every request
    pub user_agent: String,
    /// Flat fee rate that replaces backend fee estimation
    pub fee_per_kb: Option<f64>,
    /// Endpoint and field mapping
    pub dialect: Dialect,
}

impl ExplorerClientConfig {
    /// Configuration with default prefix and user agent for a dialect
    pub fn new(network: Network, hosts: Vec<String>, dialect: Dialect) -> Self {
        Self {
            network,
            hosts,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fee_per_kb: None,
            dialect,
        }
    }
}

/// Explorer client exposing the canonical operation set
pub struct ExplorerClient<T = HttpTransport> {
    transport: T,
    config: ExplorerClientConfig,
    live_feed: Option<Arc<dyn LiveFeedConnector>>,
}

impl<T> fmt::Debug for ExplorerClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplorerClient")
            .field("config", &self.config)
            .field("live_feed", &self.live_feed.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> ExplorerClient<T> {
    /// Create a client over a transport
    pub fn new(transport: T, config: ExplorerClientConfig) -> Self {
        Self {
            transport,
            config,
            live_feed: None,
        }
    }

    /// Attach the connector used by [`Self::open_live_feed`]
    #[must_use]
    pub fn with_live_feed(mut self, connector: Arc<dyn LiveFeedConnector>) -> Self {
        self.live_feed = Some(connector);
        self
    }

    /// Client settings
    pub fn config(&self) -> &ExplorerClientConfig {
        &self.config
    }

    /// Network the client is bound to
    pub fn network(&self) -> Network {
        self.config.network
    }

    /// Diagnostic description of the network and host set
    pub fn connection_info(&self) -> String {
        format!(
            "{} ({}) @ {}",
            self.config.dialect.provider.display_name(),
            self.config.network,
            self.config.hosts.join(",")
        )
    }

    fn prefixed(&self, suffix: &str) -> String {
        format!("{}{}", self.config.api_prefix, suffix)
    }

    fn addrs_body(addresses: &[String]) -> Value {
        json!({ "addrs": addresses.join(",") })
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestDescriptor,
    ) -> ExplorerResult<TransportResponse> {
        let request = request
            .with_hosts(self.config.hosts.clone())
            .with_header("User-Agent", self.config.user_agent.as_str());

        debug!(operation, method = request.method.as_str(), path = %request.path, "explorer request");

        self.transport
            .send(request)
            .await
            .map_err(|e| transport_failed(operation, &e))
    }

    /// Send and require a 200 status
    async fn fetch(
        &self,
        operation: &'static str,
        request: RequestDescriptor,
    ) -> ExplorerResult<ResponseBody> {
        let response = self.send(operation, request).await?;
        if response.is_ok() {
            Ok(response.body)
        } else {
            Err(unexpected_status(operation, &response))
        }
    }

    /// Send and map 404 to `None`
    async fn lookup(
        &self,
        operation: &'static str,
        request: RequestDescriptor,
    ) -> ExplorerResult<Option<ResponseBody>> {
        let response = self.send(operation, request).await?;
        if response.is_not_found() {
            debug!(operation, url = %response.request_url, "entity not found");
            return Ok(None);
        }
        if response.is_ok() {
            Ok(Some(response.body))
        } else {
            Err(unexpected_status(operation, &response))
        }
    }

    /// Unspent outputs of a set of addresses
    ///
    /// Confirmations are whatever the backend reports; no tip height is fetched.
    pub async fn get_utxos(&self, addresses: &[String]) -> ExplorerResult<Vec<Utxo>> {
        const OPERATION: &str = "unspent outputs";

        let request =
            RequestDescriptor::post(self.prefixed("/addrs/utxo"), Self::addrs_body(addresses));
        let body = self.fetch(OPERATION, request).await?;

        let records =
            normalize::utxo_records(body, None).map_err(|e| ExplorerError::malformed(OPERATION, e))?;
        normalize::normalize_utxos(&records, &self.config.dialect.bulk_utxo_fields, None, None)
            .map_err(|e| ExplorerError::malformed(OPERATION, e))
    }

    /// Unspent outputs of a single address
    ///
    /// On dialects that report per-output heights, the tip height is fetched
    /// after the listing and confirmations are derived from it.
    pub async fn get_utxos_for_address(&self, address: &str) -> ExplorerResult<Vec<Utxo>> {
        const OPERATION: &str = "unspent outputs";

        let endpoint = &self.config.dialect.single_address_utxos;
        let path = expand_path(&endpoint.path, &self.config.api_prefix, Some(address));
        let body = self.fetch(OPERATION, RequestDescriptor::get(path)).await?;

        let records = normalize::utxo_records(body, endpoint.list_field.as_deref())
            .map_err(|e| ExplorerError::malformed(OPERATION, e))?;

        let tip = if endpoint.compute_confirmations {
            Some(self.get_blockchain_height().await?)
        } else {
            None
        };

        normalize::normalize_utxos(&records, &endpoint.fields, Some(address), tip)
            .map_err(|e| ExplorerError::malformed(OPERATION, e))
    }

    /// Broadcast a raw transaction, returning the txid the backend echoes
    ///
    /// The request is never replayed once it may have reached a backend.
    pub async fn broadcast(&self, raw_tx_hex: &str) -> ExplorerResult<Option<String>> {
        let request = RequestDescriptor::post(self.prefixed("/tx/send"), json!({ "rawtx": raw_tx_hex }))
            .non_idempotent();
        let body = self.fetch("broadcast", request).await?;

        let txid = normalize::broadcast_txid(&body);
        match &txid {
            Some(txid) => info!(txid, "transaction broadcast"),
            None => warn!("broadcast response carried no txid"),
        }
        Ok(txid)
    }

    /// A transaction by id, `None` when the backend does not know it
    pub async fn get_transaction(&self, txid: &str) -> ExplorerResult<Option<Value>> {
        const OPERATION: &str = "transaction";

        let request = RequestDescriptor::get(self.prefixed(&format!("/tx/{txid}")));
        match self.lookup(OPERATION, request).await? {
            None | Some(ResponseBody::Empty) => Ok(None),
            Some(ResponseBody::Json(tx)) => Ok(Some(tx)),
            Some(ResponseBody::Text(_)) => {
                Err(ExplorerError::malformed(OPERATION, "response is not JSON"))
            }
        }
    }

    /// Transaction history of a set of addresses
    ///
    /// `from` and `to` bound the page. A payload that is not a list of
    /// non-empty entries is an error, never a short page.
    pub async fn get_transactions(
        &self,
        addresses: &[String],
        from: Option<u64>,
        to: Option<u64>,
    ) -> ExplorerResult<TransactionPage> {
        const OPERATION: &str = "transactions";

        let mut query = Vec::with_capacity(5);
        if let Some(from) = from {
            query.push(format!("from={from}"));
        }
        if let Some(to) = to {
            query.push(format!("to={to}"));
        }
        query.extend(["noAsm=1", "noScriptSig=1", "noSpent=1"].map(String::from));

        let path = self.prefixed(&format!("/addrs/txs?{}", query.join("&")));
        let request = RequestDescriptor::post(path, Self::addrs_body(addresses))
            .with_timeout(TRANSACTIONS_TIMEOUT);
        let body = self.fetch(OPERATION, request).await?;

        TransactionListResponse::decode(body, &self.config.dialect.transaction_list)
            .and_then(TransactionListResponse::into_page)
            .map_err(|reason| {
                warn!(addresses = addresses.len(), %reason, "explorer returned an invalid transaction list");
                ExplorerError::malformed(OPERATION, reason)
            })
    }

    /// Whether an address has ever been used, `None` when the backend does not know it
    pub async fn get_address_activity(&self, address: &str) -> ExplorerResult<Option<bool>> {
        const OPERATION: &str = "address activity";

        let request = RequestDescriptor::get(self.prefixed(&format!("/addr/{address}")));
        match self.lookup(OPERATION, request).await? {
            None => Ok(None),
            Some(body) => normalize::decode_address_activity(body)
                .map(Some)
                .map_err(|e| ExplorerError::malformed(OPERATION, e)),
        }
    }

    /// Fee rate per kilobyte for each confirmation target
    ///
    /// A configured flat rate answers without any request.
    pub async fn estimate_fee(&self, targets: &[u32]) -> ExplorerResult<FeeEstimates> {
        const OPERATION: &str = "fee estimates";

        if let Some(fee_per_kb) = self.config.fee_per_kb {
            debug!(fee_per_kb, "using fixed fee rate");
            return Ok(FeeEstimates::fixed(targets, fee_per_kb));
        }

        let mut path = self.prefixed("/utils/estimatefee");
        if !targets.is_empty() {
            let blocks: Vec<String> = targets.iter().map(ToString::to_string).collect();
            path.push_str(&format!("?nbBlocks={}", blocks.join(",")));
        }

        let body = self.fetch(OPERATION, RequestDescriptor::get(path)).await?;
        normalize::decode_fee_estimates(body).map_err(|e| ExplorerError::malformed(OPERATION, e))
    }

    /// Height of the current chain tip
    pub async fn get_blockchain_height(&self) -> ExplorerResult<u64> {
        const OPERATION: &str = "blockchain height";

        let source = &self.config.dialect.height;
        let mut request =
            RequestDescriptor::get(expand_path(source.path(), &self.config.api_prefix, None));
        if matches!(source, HeightSource::PlainText { .. }) {
            request = request.expect_text();
        }

        let body = self.fetch(OPERATION, request).await?;
        normalize::decode_height(body, source).map_err(|e| ExplorerError::malformed(OPERATION, e))
    }

    /// Transaction ids contained in a block
    pub async fn get_txids_in_block(&self, block_hash: &str) -> ExplorerResult<Vec<String>> {
        const OPERATION: &str = "block transactions";

        let request = RequestDescriptor::get(self.prefixed(&format!("/block/{block_hash}")));
        let body = self.fetch(OPERATION, request).await?;
        normalize::decode_block_txids(body).map_err(|e| ExplorerError::malformed(OPERATION, e))
    }

    /// Open a push feed to the first configured host
    pub fn open_live_feed(&self) -> ExplorerResult<LiveFeedHandle> {
        let connector = self
            .live_feed
            .as_ref()
            .ok_or_else(|| ExplorerError::configuration("no live feed connector configured"))?;
        let host = self
            .config
            .hosts
            .first()
            .ok_or_else(|| ExplorerError::configuration("no explorer host configured"))?;

        info!(host, "opening live feed");
        Ok(connector.connect(host, LiveFeedOptions { reconnection: true })?)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use explorer_transport::{LiveFeedError, TransportError};
    use mockall::{mock, predicate::eq};

    use super::*;

    /// Transport answering from a queue and recording every request
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
        requests: Mutex<Vec<RequestDescriptor>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn respond(self, status: u16, body: ResponseBody) -> Self {
            self.responses.lock().unwrap().push_back(Ok(TransportResponse {
                status,
                request_url: "http://explorer/test".to_string(),
                body,
            }));
            self
        }

        fn fail(self) -> Self {
            self.responses.lock().unwrap().push_back(Err(TransportError::NoHosts));
            self
        }
    }

    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            request: RequestDescriptor,
        ) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(TransportError::NoHosts))
        }
    }

    mock! {
        Connector {}
        impl LiveFeedConnector for Connector {
            fn connect(&self, host: &str, options: LiveFeedOptions) -> Result<LiveFeedHandle, LiveFeedError>;
        }
    }

    fn client(transport: ScriptedTransport, dialect: Dialect) -> ExplorerClient<ScriptedTransport> {
        ExplorerClient::new(
            transport,
            ExplorerClientConfig::new(
                Network::Livenet,
                vec!["http://one:3001".to_string(), "http://two:3001".to_string()],
                dialect,
            ),
        )
    }

    #[tokio::test]
    async fn fixed_fee_skips_transport() {
        let mut config = ExplorerClientConfig::new(Network::Livenet, vec![], Dialect::iquidus());
        config.fee_per_kb = Some(0.01);
        let client = ExplorerClient::new(ScriptedTransport::default(), config);

        let fees = client.estimate_fee(&[1, 2, 6]).await.unwrap();
        assert_eq!(fees, FeeEstimates::fixed(&[1, 2, 6], 0.01));
        assert_eq!(fees.get(2), Some(0.01));
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn requests_carry_hosts_and_user_agent() {
        let transport = ScriptedTransport::default()
            .respond(200, ResponseBody::Json(json!({"txid": "ff"})));
        let client = client(transport, Dialect::iquidus());

        let txid = client.broadcast("0100").await.unwrap();
        assert_eq!(txid, Some("ff".to_string()));

        let requests = client.transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.path, "/insight-api/tx/send");
        assert_eq!(request.body, Some(json!({"rawtx": "0100"})));
        assert_eq!(request.hosts, vec!["http://one:3001", "http://two:3001"]);
        assert!(request.headers.contains(&("User-Agent".to_string(), "bws".to_string())));
        assert!(!request.idempotent);
    }

    #[tokio::test]
    async fn single_address_lookup_fetches_height_after_listing() {
        let transport = ScriptedTransport::default()
            .respond(
                200,
                ResponseBody::Json(json!({"unspent_outputs": [
                    {"tx_hash": "aa", "tx_pos": 0, "script": "76a9", "value": 1000, "height": 41}
                ]})),
            )
            .respond(200, ResponseBody::Text("50".to_string()));
        let client = client(transport, Dialect::iquidus());

        let utxos = client.get_utxos_for_address("AddrX").await.unwrap();
        assert_eq!(utxos[0].confirmations, Some(10));
        assert_eq!(utxos[0].address, "AddrX");

        let requests = client.transport.requests.lock().unwrap();
        let paths: Vec<&str> = requests.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/ext/listunspent/AddrX", "/api/getblockcount"]);
    }

    #[tokio::test]
    async fn bulk_lookup_makes_one_request() {
        let transport = ScriptedTransport::default().respond(
            200,
            ResponseBody::Json(json!([{
                "address": "A", "txid": "aa", "vout": 3, "scriptPubKey": "76a9",
                "satoshis": 10, "height": 5, "confirmations": 2
            }])),
        );
        let client = client(transport, Dialect::iquidus());

        let utxos = client
            .get_utxos(&["A".to_string(), "B".to_string()])
            .await
            .unwrap();
        assert_eq!(utxos[0].confirmations, Some(2));
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 1);

        let requests = client.transport.requests.lock().unwrap();
        assert_eq!(requests[0].body, Some(json!({"addrs": "A,B"})));
    }

    #[tokio::test]
    async fn transport_failure_is_opaque() {
        let client = client(ScriptedTransport::default().fail(), Dialect::iquidus());
        let err = client.get_blockchain_height().await.unwrap_err();
        assert!(err.is_request());
    }

    #[tokio::test]
    async fn transactions_query_and_timeout() {
        let transport = ScriptedTransport::default().respond(200, ResponseBody::Json(json!([])));
        let client = client(transport, Dialect::insight());

        let page = client
            .get_transactions(&["A".to_string()], Some(0), Some(50))
            .await
            .unwrap();
        assert!(page.is_empty());

        let requests = client.transport.requests.lock().unwrap();
        assert_eq!(
            requests[0].path,
            "/insight-api/addrs/txs?from=0&to=50&noAsm=1&noScriptSig=1&noSpent=1"
        );
        assert_eq!(requests[0].timeout, Some(TRANSACTIONS_TIMEOUT));
    }

    #[test]
    fn connection_info_names_dialect_network_and_hosts() {
        let client = client(ScriptedTransport::default(), Dialect::iquidus());
        assert_eq!(
            client.connection_info(),
            "Iquidus (livenet) @ http://one:3001,http://two:3001"
        );
    }

    #[test]
    fn live_feed_uses_first_host() {
        let mut connector = MockConnector::new();
        connector
            .expect_connect()
            .with(eq("http://one:3001"), eq(LiveFeedOptions { reconnection: true }))
            .times(1)
            .returning(|host, _| Ok(LiveFeedHandle::channel(host, 8).1));

        let client =
            client(ScriptedTransport::default(), Dialect::iquidus()).with_live_feed(Arc::new(connector));
        let handle = client.open_live_feed().unwrap();
        assert_eq!(handle.host(), "http://one:3001");
    }

    #[test]
    fn live_feed_requires_connector_and_host() {
        let without_connector = client(ScriptedTransport::default(), Dialect::iquidus());
        assert!(without_connector.open_live_feed().unwrap_err().is_configuration());

        let without_hosts = ExplorerClient::new(
            ScriptedTransport::default(),
            ExplorerClientConfig::new(Network::Testnet, vec![], Dialect::insight()),
        )
        .with_live_feed(Arc::new(MockConnector::new()));
        assert!(without_hosts.open_live_feed().unwrap_err().is_configuration());
    }

    #[test]
    fn live_feed_connect_failure_is_reported() {
        let mut connector = MockConnector::new();
        connector.expect_connect().returning(|host, _| {
            Err(LiveFeedError::Connect {
                host: host.to_string(),
                message: "refused".to_string(),
            })
        });

        let client =
            client(ScriptedTransport::default(), Dialect::iquidus()).with_live_feed(Arc::new(connector));
        assert!(matches!(
            client.open_live_feed().unwrap_err(),
            ExplorerError::LiveFeed(_)
        ));
    }
}
