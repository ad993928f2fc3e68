//! Composite record keys.
//!
//! Keys are structured, but their string rendering is the record id and must
//! stay byte-for-byte stable: `referrer-visitor-campaign` for edges and
//! `txHash-logIndex` for occurrence logs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Address, TxHash};

/// Identity of a deduplicated edge. Field order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub referrer: Address,
    pub visitor: Address,
    pub campaign: Address,
}

impl EdgeKey {
    pub fn new(referrer: &Address, visitor: &Address, campaign: &Address) -> Self {
        Self {
            referrer: referrer.clone(),
            visitor: visitor.clone(),
            campaign: campaign.clone(),
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.referrer, self.visitor, self.campaign)
    }
}

/// Position of a log entry on chain: one per emitted event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogPosition {
    pub tx_hash: TxHash,
    pub log_index: u64,
}

impl LogPosition {
    pub fn new(tx_hash: &TxHash, log_index: u64) -> Self {
        Self {
            tx_hash: tx_hash.clone(),
            log_index,
        }
    }
}

impl fmt::Display for LogPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.tx_hash, self.log_index)
    }
}
