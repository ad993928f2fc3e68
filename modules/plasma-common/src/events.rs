//! Events emitted by the Plasma tracking contract.
//!
//! The host decodes chain logs into [`ChainEvent`]s and hands them over in
//! chain order. The `type` tag is the event type string.

use serde::{Deserialize, Serialize};

use crate::error::PlasmaError;
use crate::keys::LogPosition;
use crate::types::{Address, Handle, Timestamp, TxHash};

/// Kind-specific parameters of a tracking contract log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlasmaEvent {
    /// A plasma address claimed a human-readable handle.
    HandleBound { plasma: Address, handle: Handle },

    /// A plasma address was mapped to an Ethereum address.
    AddressMapped { plasma: Address, ethereum: Address },

    /// `to` joined `campaign` through a referral from `from`.
    Joined {
        from: Address,
        to: Address,
        campaign: Address,
    },

    /// `to` visited `campaign` through a referral link from `from`.
    Visited {
        from: Address,
        to: Address,
        campaign: Address,
    },
}

impl PlasmaEvent {
    /// The serde tag for this variant.
    pub fn event_type(&self) -> &'static str {
        match self {
            PlasmaEvent::HandleBound { .. } => "handle_bound",
            PlasmaEvent::AddressMapped { .. } => "address_mapped",
            PlasmaEvent::Joined { .. } => "joined",
            PlasmaEvent::Visited { .. } => "visited",
        }
    }
}

/// A decoded log plus the chain context it was emitted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEvent {
    /// Address of the emitting tracking contract.
    pub source: Address,
    pub block_timestamp: Timestamp,
    pub tx_hash: TxHash,
    pub log_index: u64,
    #[serde(flatten)]
    pub event: PlasmaEvent,
}

impl ChainEvent {
    pub fn new(
        source: Address,
        block_timestamp: Timestamp,
        tx_hash: TxHash,
        log_index: u64,
        event: PlasmaEvent,
    ) -> Self {
        Self {
            source,
            block_timestamp,
            tx_hash,
            log_index,
            event,
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }

    pub fn log_position(&self) -> LogPosition {
        LogPosition::new(&self.tx_hash, self.log_index)
    }

    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, PlasmaError> {
        Ok(Self::deserialize(payload)?)
    }

    pub fn from_json_line(line: &str) -> Result<Self, PlasmaError> {
        Ok(serde_json::from_str(line)?)
    }

    pub fn to_payload(&self) -> Result<serde_json::Value, PlasmaError> {
        Ok(serde_json::to_value(self)?)
    }
}
