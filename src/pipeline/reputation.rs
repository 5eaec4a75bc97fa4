//! Reputation lookup over the collected address set

use crate::core::traits::ReputationSource;
use crate::types::AddressReputation;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// How the reputation stage of a run is carried out
pub enum ReputationLookup<'a> {
    /// The API key is empty
    NoApiKey,

    /// The client could not be set up
    Unavailable(String),

    Source(&'a dyn ReputationSource),
}

/// Look up every address once, in set order
///
/// When the lookup is skipped a single warning with the reason is logged.
/// Failed lookups are logged and left out of the result.
pub fn lookup_reputations(
    lookup: ReputationLookup<'_>,
    addresses: &BTreeSet<String>,
) -> Vec<AddressReputation> {
    let source = match lookup {
        ReputationLookup::Source(source) => source,
        ReputationLookup::NoApiKey => {
            warn!("No API key configured, skipping the address reputation lookup");
            return Vec::new();
        }
        ReputationLookup::Unavailable(reason) => {
            warn!(error = %reason, "Reputation client unavailable, skipping the address reputation lookup");
            return Vec::new();
        }
    };

    let mut reputations = Vec::with_capacity(addresses.len());
    for address in addresses {
        match source.lookup(address) {
            Ok(reputation) => {
                debug!(address = %address, reports = reputation.report_count, "Fetched reputation");
                reputations.push(reputation);
            }
            Err(e) => warn!(address = %address, error = %e, "Skipping reputation lookup"),
        }
    }
    reputations
}
