// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Explorer provider and coin network identifiers
//!
//! Both identifiers arrive as free-form strings from configuration, so parsing
//! is strict and reports the rejected value. Serialization uses the lowercase
//! wire names (`insight`, `iquidus`, `livenet`, `testnet`).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Coin network an explorer deployment indexes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Network {
    /// Main network
    #[default]
    Livenet,
    /// Test network
    Testnet,
}

impl Network {
    /// Returns the wire name of the network
    pub const fn name(self) -> &'static str {
        match self {
            Self::Livenet => "livenet",
            Self::Testnet => "testnet",
        }
    }

    /// Returns all known networks
    pub const fn all() -> &'static [Self] {
        &[Self::Livenet, Self::Testnet]
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = NetworkParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "livenet" => Ok(Self::Livenet),
            "testnet" => Ok(Self::Testnet),
            _ => Err(NetworkParseError(s.to_string())),
        }
    }
}

impl Serialize for Network {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Explorer software family, which determines the wire dialect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provider {
    /// Insight-API compatible explorer
    #[default]
    Insight,
    /// Iquidus explorer (fronting an Insight-compatible API for most calls)
    Iquidus,
}

impl Provider {
    /// Returns the wire name of the provider
    pub const fn name(self) -> &'static str {
        match self {
            Self::Insight => "insight",
            Self::Iquidus => "iquidus",
        }
    }

    /// Returns the human-readable name used in diagnostics
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Insight => "Insight",
            Self::Iquidus => "Iquidus",
        }
    }

    /// Returns all known providers
    pub const fn all() -> &'static [Self] {
        &[Self::Insight, Self::Iquidus]
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = ProviderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "insight" => Ok(Self::Insight),
            "iquidus" => Ok(Self::Iquidus),
            _ => Err(ProviderParseError(s.to_string())),
        }
    }
}

impl Serialize for Provider {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Provider {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Error returned when a network name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported network: {0}. Supported networks are: livenet, testnet")]
pub struct NetworkParseError(pub String);

/// Error returned when a provider name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported provider: {0}. Supported providers are: insight, iquidus")]
pub struct ProviderParseError(pub String);
