//! Address reputation lookup client
//!
//! Queries an abuse-report service with one HTTP GET per address:
//! `{url}?address={address}&api_token={api_key}`.

use crate::core::traits::ReputationSource;
use crate::io::settings::Settings;
use crate::types::{AddressReputation, ReputationError};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

/// Blocking client for the reputation service
pub struct ReputationClient {
    client: Client,
    url: String,
    api_key: String,
}

impl ReputationClient {
    pub fn new(url: &str, api_key: &str, timeout: Duration) -> Result<Self, ReputationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReputationError::Transport {
                address: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            url: url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Build a client from settings
    ///
    /// Returns `Ok(None)` when the API key is empty, i.e. the lookup is disabled.
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>, ReputationError> {
        if !settings.reputation_enabled() {
            return Ok(None);
        }
        Self::new(
            &settings.reputation_url,
            &settings.api_key,
            Duration::from_secs(settings.rpc_timeout_secs),
        )
        .map(Some)
    }
}

impl ReputationSource for ReputationClient {
    fn lookup(&self, address: &str) -> Result<AddressReputation, ReputationError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("address", address), ("api_token", self.api_key.as_str())])
            .send()
            .map_err(|e| ReputationError::Transport {
                address: address.to_string(),
                message: e.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            return Err(ReputationError::Status {
                address: address.to_string(),
                status: response.status().as_u16(),
            });
        }

        let mut reputation: AddressReputation =
            response.json().map_err(|e| ReputationError::Decode {
                address: address.to_string(),
                message: e.to_string(),
            })?;
        // Some responses omit the address; keep the one that was asked for
        if reputation.address.is_empty() {
            reputation.address = address.to_string();
        }

        Ok(reputation)
    }
}
