//! Settings document loading
//!
//! Settings are read from a YAML document with the `config` crate. Environment
//! variables prefixed with `ADDRESS_LEDGER_` override values from the file
//! (e.g. `ADDRESS_LEDGER_RPC_PASSWORD`).
//!
//! Required keys: `rpc_user`, `rpc_password`, `rpc_host`, `api_key`,
//! `address_to_search`, `output_path`. All of them must be present. The RPC
//! credentials and `api_key` may be empty: empty credentials mean the node is
//! queried without authentication, an empty `api_key` turns the reputation
//! lookup off.

use crate::types::SettingsError;
use config::{Config, ConfigError, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

/// Keys that must be present in the settings document
pub const REQUIRED_KEYS: [&str; 6] = [
    "rpc_user",
    "rpc_password",
    "rpc_host",
    "api_key",
    "address_to_search",
    "output_path",
];

/// Required keys that may be present with an empty value
const MAY_BE_EMPTY: [&str; 3] = ["rpc_user", "rpc_password", "api_key"];

pub const DEFAULT_RPC_PORT: u16 = 8332;
pub const DEFAULT_TX_VERBOSITY: u8 = 2;
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;
pub const DEFAULT_REPUTATION_URL: &str = "https://www.bitcoinabuse.com/api/reports/check";

const ENV_PREFIX: &str = "ADDRESS_LEDGER";

/// Validated settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub rpc_user: String,
    pub rpc_password: String,
    pub rpc_host: String,
    pub rpc_port: u16,

    /// Reputation service key; empty disables the lookup
    pub api_key: String,

    pub address_to_search: String,

    /// Directory receiving the report artifacts
    pub output_path: PathBuf,

    /// Verbosity passed to `getrawtransaction`
    pub tx_verbosity: u8,

    pub rpc_timeout_secs: u64,
    pub progress_interval: u64,
    pub reputation_url: String,
}

impl Settings {
    /// Load and validate the settings document at `path`
    ///
    /// # Errors
    ///
    /// * `SettingsError::Load` - the file is missing or is not valid YAML
    /// * `SettingsError::MissingKeys` - required keys are absent or empty
    /// * `SettingsError::InvalidValue` - an optional key has the wrong type
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let path_str = path.display().to_string();

        let config = Config::builder()
            .set_default("rpc_port", i64::from(DEFAULT_RPC_PORT))
            .and_then(|b| b.set_default("tx_verbosity", i64::from(DEFAULT_TX_VERBOSITY)))
            .and_then(|b| b.set_default("rpc_timeout_secs", DEFAULT_RPC_TIMEOUT_SECS as i64))
            .and_then(|b| b.set_default("progress_interval", DEFAULT_PROGRESS_INTERVAL as i64))
            .and_then(|b| b.set_default("reputation_url", DEFAULT_REPUTATION_URL))
            .map_err(|e| SettingsError::load(&path_str, e))?
            .add_source(File::from(path).format(FileFormat::Yaml).required(true))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| SettingsError::load(&path_str, e))?;

        Self::from_config(&config)
    }

    /// Validate settings from an already built configuration
    pub fn from_config(config: &Config) -> Result<Self, SettingsError> {
        let mut missing = Vec::new();
        let mut values = Vec::with_capacity(REQUIRED_KEYS.len());

        for key in REQUIRED_KEYS {
            match required_value(config, key)? {
                Some(value) if !value.trim().is_empty() || MAY_BE_EMPTY.contains(&key) => {
                    values.push(value)
                }
                _ => {
                    missing.push(key.to_string());
                    values.push(String::new());
                }
            }
        }

        if !missing.is_empty() {
            return Err(SettingsError::MissingKeys { keys: missing });
        }

        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or_default();

        Ok(Settings {
            rpc_user: next(),
            rpc_password: next(),
            rpc_host: next().trim().to_string(),
            api_key: next().trim().to_string(),
            address_to_search: next().trim().to_string(),
            output_path: PathBuf::from(next()),
            rpc_port: optional_value(config, "rpc_port")?,
            tx_verbosity: optional_value(config, "tx_verbosity")?,
            rpc_timeout_secs: optional_value(config, "rpc_timeout_secs")?,
            progress_interval: optional_value(config, "progress_interval")?,
            reputation_url: optional_value(config, "reputation_url")?,
        })
    }

    /// JSON-RPC endpoint of the node
    pub fn rpc_url(&self) -> String {
        format!("http://{}:{}/", self.rpc_host, self.rpc_port)
    }

    /// Path of the PDF report: `{output_path}/{address_to_search}.pdf`
    pub fn report_path(&self) -> PathBuf {
        self.output_path
            .join(format!("{}.pdf", self.address_to_search))
    }

    /// Path of the CSV ledger export: `{output_path}/{address_to_search}.csv`
    pub fn csv_path(&self) -> PathBuf {
        self.output_path
            .join(format!("{}.csv", self.address_to_search))
    }

    pub fn reputation_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Read a required key as a string
///
/// Returns `Ok(None)` when the key is absent or null.
fn required_value(config: &Config, key: &str) -> Result<Option<String>, SettingsError> {
    match config.get::<Option<String>>(key) {
        Ok(value) => Ok(value),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(SettingsError::invalid_value(key, e)),
    }
}

fn optional_value<T: serde::de::DeserializeOwned>(
    config: &Config,
    key: &str,
) -> Result<T, SettingsError> {
    config
        .get::<T>(key)
        .map_err(|e| SettingsError::invalid_value(key, e))
}
