//! Wallet kit configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use walletkit_types::NetworkType;

use crate::WalletCoreError;

/// Configuration for a wallet manager.
///
/// Can be loaded from a TOML file via [`WalletKitConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletKitConfig {
    /// Which chain the wallet manager targets.
    #[serde(default = "default_network")]
    pub network: NetworkType,

    /// The wallet's own addresses, used to decide transfer direction.
    #[serde(default)]
    pub addresses: Vec<String>,

    /// Overrides the network's default confirmations-until-final.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations_until_final: Option<u32>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkType {
    NetworkType::Btc
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl WalletKitConfig {
    pub fn for_network(network: NetworkType) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, WalletCoreError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| WalletCoreError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, WalletCoreError> {
        toml::from_str(s).map_err(|e| WalletCoreError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, WalletCoreError> {
        toml::to_string_pretty(self).map_err(|e| WalletCoreError::Config(e.to_string()))
    }

    /// Effective confirmations-until-final for the configured network.
    pub fn confirmations_until_final(&self) -> u32 {
        self.confirmations_until_final
            .unwrap_or_else(|| self.network.confirmations_until_final())
    }
}

impl Default for WalletKitConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            addresses: Vec::new(),
            confirmations_until_final: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = WalletKitConfig::for_network(NetworkType::Xtz);
        let toml_str = config.to_toml_string().unwrap();
        let parsed = WalletKitConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = WalletKitConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.network, NetworkType::Btc);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.confirmations_until_final(), 6);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            network = "xrp"
            addresses = ["rAlice"]
            confirmations_until_final = 3
        "#;
        let config = WalletKitConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.network, NetworkType::Xrp);
        assert_eq!(config.addresses, vec!["rAlice".to_string()]);
        assert_eq!(config.confirmations_until_final(), 3);
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn unknown_network_is_a_config_error() {
        let err = WalletKitConfig::from_toml_str("network = \"doge\"").unwrap_err();
        assert!(matches!(err, WalletCoreError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "network = \"hbar\"").unwrap();
        let config = WalletKitConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.network, NetworkType::Hbar);
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = WalletKitConfig::from_toml_file("/nonexistent/walletkit.toml");
        assert!(matches!(result, Err(WalletCoreError::Config(_))));
    }
}
