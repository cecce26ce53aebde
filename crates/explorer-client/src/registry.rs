// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Provider registry and client factory
//!
//! The factory is the entry point of the crate: it validates the requested
//! provider and network against the [`ProviderRegistry`], resolves the
//! endpoint and builds an [`ExplorerClient`] without touching the network.

use std::collections::BTreeMap;

use explorer_transport::{HttpTransport, HttpTransportConfig, Transport};
use explorer_types::{Network, Provider};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    client::{DEFAULT_API_PREFIX, DEFAULT_USER_AGENT, ExplorerClient, ExplorerClientConfig},
    dialect::{Dialect, UtxoFieldOverrides},
    error::{ExplorerError, ExplorerResult},
};

/// Default endpoint per provider and network
///
/// A network with an empty URL is supported but has no usable default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRegistry {
    endpoints: BTreeMap<Provider, BTreeMap<Network, String>>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::empty()
            .with_endpoint(
                Provider::Insight,
                Network::Livenet,
                "https://insight.alohacoin.nationofhawaii.info:443",
            )
            .with_endpoint(
                Provider::Insight,
                Network::Testnet,
                "https://test-insight.alohacoin.nationofhawaii.info:443",
            )
            .with_endpoint(
                Provider::Iquidus,
                Network::Livenet,
                "http://explorer.alohacoin.hekili.net:3001",
            )
            .with_endpoint(Provider::Iquidus, Network::Testnet, "")
    }
}

impl ProviderRegistry {
    /// Registry without any provider
    pub fn empty() -> Self {
        Self {
            endpoints: BTreeMap::new(),
        }
    }

    /// Register or replace the default URL of a provider network
    #[must_use]
    pub fn with_endpoint(
        mut self,
        provider: Provider,
        network: Network,
        url: impl Into<String>,
    ) -> Self {
        self.endpoints
            .entry(provider)
            .or_default()
            .insert(network, url.into());
        self
    }

    /// Validate a provider name, `None` meaning the default provider
    pub fn resolve_provider(&self, name: Option<&str>) -> ExplorerResult<Provider> {
        let name = name.unwrap_or(Provider::default().name());
        name.parse::<Provider>()
            .ok()
            .filter(|provider| self.endpoints.contains_key(provider))
            .ok_or_else(|| ExplorerError::UnsupportedProvider {
                provider: name.to_string(),
            })
    }

    /// Validate a network name for a provider, `None` meaning the default network
    pub fn resolve_network(&self, provider: Provider, name: Option<&str>) -> ExplorerResult<Network> {
        let name = name.unwrap_or(Network::default().name());
        let networks = self.endpoints.get(&provider);
        name.parse::<Network>()
            .ok()
            .filter(|network| networks.is_some_and(|n| n.contains_key(network)))
            .ok_or_else(|| ExplorerError::UnsupportedNetwork {
                provider,
                network: name.to_string(),
            })
    }

    /// Registered default URL, possibly empty
    pub fn default_url(&self, provider: Provider, network: Network) -> Option<&str> {
        self.endpoints
            .get(&provider)
            .and_then(|networks| networks.get(&network))
            .map(String::as_str)
    }

    /// Supported provider and network pairs
    pub fn pairs(&self) -> impl Iterator<Item = (Provider, Network)> + '_ {
        self.endpoints
            .iter()
            .flat_map(|(provider, networks)| networks.keys().map(move |network| (*provider, *network)))
    }
}

/// Caller supplied construction options; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerOptions {
    /// Provider name, defaults to `insight`
    pub provider: Option<String>,
    /// Network name, defaults to `livenet`
    pub network: Option<String>,
    /// Endpoint override; may list several comma-separated hosts
    pub url: Option<String>,
    /// API prefix, defaults to `/insight-api`
    pub api_prefix: Option<String>,
    /// User agent, defaults to `bws`
    pub user_agent: Option<String>,
    /// Flat fee rate per kilobyte replacing backend estimation
    pub fee_per_kb: Option<f64>,
    /// Field name overrides for bulk UTXO records
    pub bulk_utxo_fields: Option<UtxoFieldOverrides>,
    /// Field name overrides for single-address UTXO records
    pub utxo_fields: Option<UtxoFieldOverrides>,
}

impl ExplorerOptions {
    /// Options for a provider and network
    pub fn new(provider: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            provider: Some(provider.into()),
            network: Some(network.into()),
            ..Self::default()
        }
    }

    /// Override the endpoint URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Use a flat fee rate
    #[must_use]
    pub fn with_fee_per_kb(mut self, fee_per_kb: f64) -> Self {
        self.fee_per_kb = Some(fee_per_kb);
        self
    }
}

/// Validates options against a registry and builds clients
#[derive(Debug, Clone, Default)]
pub struct ExplorerFactory {
    registry: ProviderRegistry,
    transport_config: HttpTransportConfig,
}

impl ExplorerFactory {
    /// Factory over a custom registry
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            transport_config: HttpTransportConfig::default(),
        }
    }

    /// Use custom HTTP timeouts for clients built by [`Self::create`]
    #[must_use]
    pub fn with_transport_config(mut self, transport_config: HttpTransportConfig) -> Self {
        self.transport_config = transport_config;
        self
    }

    /// Registry used for validation
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Build a client over the reqwest transport
    pub fn create(&self, options: &ExplorerOptions) -> ExplorerResult<ExplorerClient> {
        let config = self.resolve(options)?;
        let transport = HttpTransport::new(self.transport_config.clone())
            .map_err(|e| ExplorerError::configuration(format!("could not build HTTP transport: {e}")))?;
        Ok(ExplorerClient::new(transport, config))
    }

    /// Build a client over a caller supplied transport
    pub fn create_with_transport<T: Transport>(
        &self,
        options: &ExplorerOptions,
        transport: T,
    ) -> ExplorerResult<ExplorerClient<T>> {
        Ok(ExplorerClient::new(transport, self.resolve(options)?))
    }

    /// Validate options and resolve the client configuration
    ///
    /// Provider is checked before network. An empty resolved URL is accepted
    /// and only fails once a request is made.
    pub fn resolve(&self, options: &ExplorerOptions) -> ExplorerResult<ExplorerClientConfig> {
        let provider = self.registry.resolve_provider(options.provider.as_deref())?;
        let network = self
            .registry
            .resolve_network(provider, options.network.as_deref())?;

        // A blank override falls back to the registry default
        let url = match options.url.as_deref().filter(|url| !url.trim().is_empty()) {
            Some(url) => url,
            None => self.registry.default_url(provider, network).unwrap_or_default(),
        };
        let hosts: Vec<String> = url
            .split(',')
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .map(String::from)
            .collect();
        if hosts.is_empty() {
            warn!(%provider, %network, "no explorer URL configured, requests will fail");
        }

        if let Some(fee) = options.fee_per_kb {
            if !fee.is_finite() || fee < 0.0 {
                return Err(ExplorerError::configuration(format!(
                    "feePerKb must be a non-negative number, got {fee}"
                )));
            }
        }

        let dialect = Dialect::for_provider(provider).with_field_overrides(
            options.bulk_utxo_fields.as_ref(),
            options.utxo_fields.as_ref(),
        );

        debug!(%provider, %network, hosts = hosts.len(), "resolved explorer configuration");

        Ok(ExplorerClientConfig {
            network,
            hosts,
            api_prefix: options
                .api_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string()),
            user_agent: options
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            fee_per_kb: options.fee_per_kb,
            dialect,
        })
    }
}

/// Build a client with the default registry
pub fn create(options: &ExplorerOptions) -> ExplorerResult<ExplorerClient> {
    ExplorerFactory::default().create(options)
}
