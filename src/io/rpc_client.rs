//! Bitcoin node JSON-RPC client
//!
//! Thin blocking wrapper around the node's JSON-RPC 1.0 interface, covering the
//! calls the scanner needs: `getblockcount`, `getblockhash`, `getblock` and
//! `getrawtransaction`.

use crate::core::traits::ChainSource;
use crate::io::settings::Settings;
use crate::types::{Block, RawTransaction, RpcError};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// RPC client configuration
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// RPC URL (e.g., "http://127.0.0.1:8332/")
    pub url: String,
    /// RPC username; empty means no authentication
    pub user: String,
    /// RPC password
    pub pass: String,
    /// Request timeout
    pub timeout: Duration,
    /// Verbosity passed to `getrawtransaction`
    pub tx_verbosity: u8,
}

impl RpcConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            url: settings.rpc_url(),
            user: settings.rpc_user.clone(),
            pass: settings.rpc_password.clone(),
            timeout: Duration::from_secs(settings.rpc_timeout_secs),
            tx_verbosity: settings.tx_verbosity,
        }
    }
}

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Blocking JSON-RPC client for a Bitcoin node
pub struct RpcClient {
    client: Client,
    config: RpcConfig,
}

impl RpcClient {
    /// Create a new RPC client
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Transport` if the HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialise).
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RpcError::transport("client", e))?;

        Ok(Self { client, config })
    }

    /// Make an RPC call and decode its `result`
    fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let body = json!({
            "jsonrpc": "1.0",
            "id": "address-ledger",
            "method": method,
            "params": params,
        });

        let mut request = self.client.post(&self.config.url).json(&body);
        if !self.config.user.is_empty() {
            request = request.basic_auth(&self.config.user, Some(&self.config.pass));
        }

        let response = request
            .send()
            .map_err(|e| RpcError::transport(method, e))?;
        let status = response.status();

        // The node reports RPC errors with a non-2xx status and an error body,
        // so the body is inspected before the status.
        let text = response
            .text()
            .map_err(|e| RpcError::transport(method, e))?;
        let envelope: RpcResponse = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(RpcError::Status {
                    method: method.to_string(),
                    status: status.as_u16(),
                })
            }
            Err(e) => return Err(RpcError::decode(method, e)),
        };

        if let Some(error) = envelope.error {
            return Err(RpcError::Node {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            });
        }
        if !status.is_success() {
            return Err(RpcError::Status {
                method: method.to_string(),
                status: status.as_u16(),
            });
        }

        serde_json::from_value(envelope.result).map_err(|e| RpcError::decode(method, e))
    }
}

impl ChainSource for RpcClient {
    fn block_count(&self) -> Result<u64, RpcError> {
        self.call("getblockcount", json!([]))
    }

    fn block_hash(&self, height: u64) -> Result<String, RpcError> {
        self.call("getblockhash", json!([height]))
    }

    fn block(&self, hash: &str) -> Result<Block, RpcError> {
        self.call("getblock", json!([hash]))
    }

    fn transaction(&self, txid: &str, block_hash: &str) -> Result<RawTransaction, RpcError> {
        self.call(
            "getrawtransaction",
            json!([txid, self.config.tx_verbosity, block_hash]),
        )
    }
}
