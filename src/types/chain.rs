//! Chain data types as returned by the node's JSON-RPC interface
//!
//! Only the fields the ledger needs are modelled. Address and value fields are
//! optional throughout: coinbase inputs, non-standard scripts and older/newer node
//! versions all omit some of them, and a missing field simply means "no match".

use rust_decimal::Decimal;
use serde::Deserialize;

/// Block body as returned by `getblock <hash>` (verbosity 1)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Block {
    pub hash: String,

    #[serde(default)]
    pub height: Option<u64>,

    /// Transaction ids in block order
    #[serde(default)]
    pub tx: Vec<String>,

    #[serde(default)]
    pub time: Option<i64>,
}

/// Decoded transaction as returned by `getrawtransaction <txid> <verbosity> <blockhash>`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTransaction {
    pub txid: String,

    #[serde(default)]
    pub time: Option<i64>,

    #[serde(default)]
    pub blocktime: Option<i64>,

    #[serde(default)]
    pub vin: Vec<TxInput>,

    #[serde(default)]
    pub vout: Vec<TxOutput>,
}

impl RawTransaction {
    /// Unix timestamp of the transaction: `time`, falling back to `blocktime`
    pub fn timestamp(&self) -> Option<i64> {
        self.time.or(self.blocktime)
    }
}

/// Transaction input
///
/// Indexer-style nodes report the spent address and value inline (`addr`,
/// `value`). Bitcoin Core at verbosity 2 reports them under `prevout` instead.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TxInput {
    #[serde(default)]
    pub txid: Option<String>,

    #[serde(default)]
    pub coinbase: Option<String>,

    #[serde(default)]
    pub addr: Option<String>,

    #[serde(default)]
    pub value: Option<Decimal>,

    #[serde(default)]
    pub prevout: Option<Prevout>,
}

impl TxInput {
    /// Address whose funds this input spends, if the node reported one
    pub fn source_address(&self) -> Option<&str> {
        self.addr.as_deref().or_else(|| {
            self.prevout
                .as_ref()
                .and_then(|prevout| prevout.script_pub_key.primary_address())
        })
    }

    /// Value spent by this input, if the node reported one
    pub fn spent_value(&self) -> Option<Decimal> {
        self.value
            .or_else(|| self.prevout.as_ref().and_then(|prevout| prevout.value))
    }
}

/// Previous output spent by an input (Bitcoin Core verbosity 2)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Prevout {
    #[serde(default)]
    pub value: Option<Decimal>,

    #[serde(rename = "scriptPubKey", default)]
    pub script_pub_key: ScriptPubKey,
}

/// Transaction output
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TxOutput {
    #[serde(default)]
    pub value: Option<Decimal>,

    #[serde(default)]
    pub n: Option<u32>,

    #[serde(rename = "scriptPubKey", default)]
    pub script_pub_key: ScriptPubKey,
}

impl TxOutput {
    /// Destination addresses of this output, in the order the node listed them
    pub fn destination_addresses(&self) -> Vec<&str> {
        self.script_pub_key.all_addresses()
    }
}

/// Locking script summary
///
/// Older nodes return an `addresses` list, newer ones a single `address`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScriptPubKey {
    #[serde(default)]
    pub addresses: Option<Vec<String>>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(rename = "type", default)]
    pub script_type: Option<String>,
}

impl ScriptPubKey {
    pub fn all_addresses(&self) -> Vec<&str> {
        match (&self.addresses, &self.address) {
            (Some(addresses), _) if !addresses.is_empty() => {
                addresses.iter().map(String::as_str).collect()
            }
            (_, Some(address)) => vec![address.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn primary_address(&self) -> Option<&str> {
        self.all_addresses().into_iter().next()
    }
}
