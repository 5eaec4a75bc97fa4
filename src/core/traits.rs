//! Core traits for the chain and reputation collaborators
//!
//! The scanner and the pipeline only depend on these traits, so the JSON-RPC
//! and HTTP clients can be swapped for in-memory fixtures in tests.

use crate::types::{AddressReputation, Block, RawTransaction, ReputationError, RpcError};

/// Read access to a blockchain node
///
/// Every call blocks until the node answers or the transport fails.
pub trait ChainSource {
    /// Height of the current chain tip (`getblockcount`)
    fn block_count(&self) -> Result<u64, RpcError>;

    /// Hash of the block at `height` (`getblockhash`)
    fn block_hash(&self, height: u64) -> Result<String, RpcError>;

    /// Block body with its transaction ids (`getblock`)
    fn block(&self, hash: &str) -> Result<Block, RpcError>;

    /// Decoded transaction (`getrawtransaction`)
    ///
    /// `block_hash` lets nodes without a transaction index locate it.
    fn transaction(&self, txid: &str, block_hash: &str) -> Result<RawTransaction, RpcError>;
}

/// Per-address reputation lookup
pub trait ReputationSource {
    fn lookup(&self, address: &str) -> Result<AddressReputation, ReputationError>;
}
