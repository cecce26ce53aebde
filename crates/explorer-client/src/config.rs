// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Explorer settings loaded from files and the environment

use std::path::Path;

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use explorer_transport::HttpTransportConfig;
use serde::{Deserialize, Serialize};

use crate::{
    client::{DEFAULT_API_PREFIX, DEFAULT_USER_AGENT, ExplorerClient},
    dialect::UtxoFieldOverrides,
    error::{ExplorerError, ExplorerResult},
    registry::{ExplorerFactory, ExplorerOptions},
};

/// Settings for one explorer client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSettings {
    /// Provider name
    pub provider: String,
    /// Network name
    pub network: String,
    /// Endpoint override, comma-separated for several hosts
    pub url: Option<String>,
    /// API prefix
    pub api_prefix: String,
    /// User agent
    pub user_agent: String,
    /// Flat fee rate per kilobyte
    pub fee_per_kb: Option<f64>,
    /// Default request timeout in seconds
    pub timeout_seconds: u64,
    /// TCP connect timeout in seconds
    pub connect_timeout_seconds: u64,
    /// Bulk UTXO field overrides
    pub bulk_utxo_fields: Option<UtxoFieldOverrides>,
    /// Single-address UTXO field overrides
    pub utxo_fields: Option<UtxoFieldOverrides>,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        let transport = HttpTransportConfig::default();
        Self {
            provider: "insight".to_string(),
            network: "livenet".to_string(),
            url: None,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fee_per_kb: None,
            timeout_seconds: transport.timeout_seconds,
            connect_timeout_seconds: transport.connect_timeout_seconds,
            bulk_utxo_fields: None,
            utxo_fields: None,
        }
    }
}

impl ExplorerSettings {
    /// Load settings and map failures to a configuration error
    pub fn from_env() -> ExplorerResult<Self> {
        Self::load().map_err(|e| {
            ExplorerError::configuration(format!("failed to load explorer settings: {e}"))
        })
    }

    /// Load settings with hierarchical sources
    ///
    /// Later sources override earlier ones:
    /// 1. Default values
    /// 2. `explorer.json`
    /// 3. `explorer.{ENVIRONMENT}.json`
    /// 4. Environment variables with the `EXPLORER_` prefix, `__` separating
    ///    nested keys (`EXPLORER_UTXO_FIELDS__VOUT`)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        defaults()?
            .add_source(File::with_name("explorer.json").required(false))
            .add_source(
                File::with_name(&format!("explorer.{}.json", env.to_lowercase())).required(false),
            )
            .add_source(
                Environment::with_prefix("EXPLORER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load settings from a single file on top of the defaults
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }

    /// Factory options described by these settings
    pub fn options(&self) -> ExplorerOptions {
        ExplorerOptions {
            provider: Some(self.provider.clone()),
            network: Some(self.network.clone()),
            url: self.url.clone(),
            api_prefix: Some(self.api_prefix.clone()),
            user_agent: Some(self.user_agent.clone()),
            fee_per_kb: self.fee_per_kb,
            bulk_utxo_fields: self.bulk_utxo_fields.clone(),
            utxo_fields: self.utxo_fields.clone(),
        }
    }

    /// HTTP transport timeouts
    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            timeout_seconds: self.timeout_seconds,
            connect_timeout_seconds: self.connect_timeout_seconds,
        }
    }

    /// Build a client with the default registry
    pub fn create_client(&self) -> ExplorerResult<ExplorerClient> {
        ExplorerFactory::default()
            .with_transport_config(self.transport_config())
            .create(&self.options())
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = ExplorerSettings::default();
    Config::builder()
        .set_default("provider", defaults.provider)?
        .set_default("network", defaults.network)?
        .set_default("api_prefix", defaults.api_prefix)?
        .set_default("user_agent", defaults.user_agent)?
        .set_default("timeout_seconds", defaults.timeout_seconds)?
        .set_default("connect_timeout_seconds", defaults.connect_timeout_seconds)
}
