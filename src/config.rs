//! Ledger configuration.

use crate::ledger::GameTemplate;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Environment variable that overrides the configured API token.
pub const TOKEN_ENV: &str = "BLOCKCYPHER_TOKEN";

/// Connection and contract settings for the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// API root, without coin or chain.
    #[serde(default = "default_api_url")]
    api_url: String,

    /// Coin segment of API paths.
    #[serde(default = "default_coin")]
    coin: String,

    /// Chain segment of API paths.
    #[serde(default = "default_chain")]
    chain: String,

    /// API token, appended to every request when set.
    #[serde(default)]
    token: Option<String>,

    /// Throwaway key used to sign read-only calls.
    #[serde(default = "default_reader_key")]
    reader_key: String,

    /// Path to the game contract source.
    #[serde(default = "default_contract_source")]
    contract_source: PathBuf,

    /// Contract to publish from the source.
    #[serde(default = "default_contract_name")]
    contract_name: String,

    /// Gas limits per call family.
    #[serde(default)]
    gas: GasLimits,
}

/// Gas limit for each family of mutating calls.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GasLimits {
    /// `confirmNewGame`
    #[serde(default = "default_confirm_gas")]
    confirm: u64,
    /// `propose*`
    #[serde(default = "default_propose_gas")]
    propose: u64,
    /// `authorize*`
    #[serde(default = "default_authorize_gas")]
    authorize: u64,
    /// Contract deployment.
    #[serde(default = "default_publish_gas")]
    publish: u64,
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            confirm: default_confirm_gas(),
            propose: default_propose_gas(),
            authorize: default_authorize_gas(),
            publish: default_publish_gas(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.blockcypher.com/v1".to_string()
}

fn default_coin() -> String {
    "eth".to_string()
}

fn default_chain() -> String {
    "main".to_string()
}

fn default_reader_key() -> String {
    format!("{:0<64}", "c025")
}

fn default_contract_source() -> PathBuf {
    PathBuf::from("ethduck.sol")
}

fn default_contract_name() -> String {
    "EthDuck".to_string()
}

fn default_confirm_gas() -> u64 {
    100_000
}

fn default_propose_gas() -> u64 {
    100_000
}

fn default_authorize_gas() -> u64 {
    200_000
}

fn default_publish_gas() -> u64 {
    1_400_000
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            coin: default_coin(),
            chain: default_chain(),
            token: None,
            reader_key: default_reader_key(),
            contract_source: default_contract_source(),
            contract_name: default_contract_name(),
            gas: GasLimits::default(),
        }
    }
}

impl LedgerConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(api_url = %config.api_url, coin = %config.coin, chain = %config.chain, "Config loaded successfully");
        Ok(config)
    }

    /// Replaces the token with `BLOCKCYPHER_TOKEN` when that is set.
    #[instrument(skip(self))]
    pub fn with_env_overrides(self) -> Self {
        self.with_token_from(std::env::var(TOKEN_ENV).ok())
    }

    /// Replaces the token when `token` is a non-empty value.
    pub fn with_token_from(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            debug!("Using API token from environment");
            self.token = Some(token);
        }
        self
    }

    /// Reads the contract source and prepares it for publishing.
    ///
    /// Tabs become spaces and surrounding whitespace is trimmed, matching
    /// what the deployment endpoint compiles.
    #[instrument(skip(self), fields(source = %self.contract_source.display()))]
    pub fn load_template(&self) -> Result<GameTemplate, ConfigError> {
        let raw = std::fs::read_to_string(&self.contract_source)
            .map_err(|e| ConfigError::new(format!("Failed to read contract source: {}", e)))?;
        let solidity = raw.replace('\t', " ").trim().to_string();
        if solidity.is_empty() {
            return Err(ConfigError::new("Contract source is empty"));
        }
        Ok(GameTemplate {
            name: self.contract_name.clone(),
            solidity,
        })
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
