//! Address reputation record returned by the lookup service

use serde::Deserialize;

/// Abuse-report summary for one address
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddressReputation {
    #[serde(default)]
    pub address: String,

    /// Number of abuse reports filed against the address
    #[serde(rename = "count", default)]
    pub report_count: u64,

    #[serde(default)]
    pub first_seen: Option<String>,

    #[serde(default)]
    pub last_seen: Option<String>,
}
