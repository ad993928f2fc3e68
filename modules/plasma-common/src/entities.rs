//! Records derived from the tracking contract's events.
//!
//! Every record is addressed by `(EntityKind, id)` and stored as a whole
//! JSON document. Ids are the lower-case hex address for aggregates and the
//! rendered composite key for edges and logs.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::keys::{EdgeKey, LogPosition};
use crate::types::{
    Address, EntityKind, Handle, RelationKind, Timestamp, CAMPAIGN_SCHEMA_VERSION,
    METADATA_SCHEMA_VERSION, SOURCE_TYPE,
};

/// A storable record.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn kind(&self) -> EntityKind;
    fn id(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// The counters kept on a [`Metadata`] aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaCounter {
    Visits,
    Joins,
    Campaigns,
    PlasmaToHandle,
    PlasmaToEthereum,
}

/// Global counters for one tracking contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub id: String,
    pub visit_counter: u64,
    pub joins_counter: u64,
    pub campaign_count: u64,
    pub plasma_to_handle_counter: u64,
    pub plasma_to_ethereum_counter: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub schema_version: u32,
    pub source_type: String,
}

impl Metadata {
    pub fn new(source: &Address, timestamp: Timestamp) -> Self {
        Self {
            id: source.to_string(),
            visit_counter: 0,
            joins_counter: 0,
            campaign_count: 0,
            plasma_to_handle_counter: 0,
            plasma_to_ethereum_counter: 0,
            created_at: timestamp,
            updated_at: timestamp,
            schema_version: METADATA_SCHEMA_VERSION,
            source_type: SOURCE_TYPE.to_string(),
        }
    }

    pub fn counter(&self, counter: MetaCounter) -> u64 {
        match counter {
            MetaCounter::Visits => self.visit_counter,
            MetaCounter::Joins => self.joins_counter,
            MetaCounter::Campaigns => self.campaign_count,
            MetaCounter::PlasmaToHandle => self.plasma_to_handle_counter,
            MetaCounter::PlasmaToEthereum => self.plasma_to_ethereum_counter,
        }
    }

    /// Increment one counter and advance `updated_at`.
    pub fn bump(&mut self, counter: MetaCounter, timestamp: Timestamp) {
        let slot = match counter {
            MetaCounter::Visits => &mut self.visit_counter,
            MetaCounter::Joins => &mut self.joins_counter,
            MetaCounter::Campaigns => &mut self.campaign_count,
            MetaCounter::PlasmaToHandle => &mut self.plasma_to_handle_counter,
            MetaCounter::PlasmaToEthereum => &mut self.plasma_to_ethereum_counter,
        };
        *slot += 1;
        // never move backwards, so updated_at >= created_at holds
        self.updated_at = self.updated_at.max(timestamp);
    }
}

impl Entity for Metadata {
    fn kind(&self) -> EntityKind {
        EntityKind::Metadata
    }

    fn id(&self) -> &str {
        &self.id
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A participant identity keyed by its plasma address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub handle: Option<Handle>,
    pub bound_address: Option<Address>,
    pub created_at: Timestamp,
}

impl User {
    pub fn new(address: &Address, timestamp: Timestamp) -> Self {
        Self {
            id: address.to_string(),
            handle: None,
            bound_address: None,
            created_at: timestamp,
        }
    }
}

impl Entity for User {
    fn kind(&self) -> EntityKind {
        EntityKind::User
    }

    fn id(&self) -> &str {
        &self.id
    }
}

// ---------------------------------------------------------------------------
// Campaign
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub visit_count: u64,
    pub join_count: u64,
    pub schema_version: u32,
    pub source_type: String,
}

impl Campaign {
    pub fn new(address: &Address, timestamp: Timestamp) -> Self {
        Self {
            id: address.to_string(),
            created_at: timestamp,
            updated_at: timestamp,
            visit_count: 0,
            join_count: 0,
            schema_version: CAMPAIGN_SCHEMA_VERSION,
            source_type: SOURCE_TYPE.to_string(),
        }
    }

    pub fn bump(&mut self, relation: RelationKind, timestamp: Timestamp) {
        match relation {
            RelationKind::Join => self.join_count += 1,
            RelationKind::Visit => self.visit_count += 1,
        }
        self.updated_at = self.updated_at.max(timestamp);
    }
}

impl Entity for Campaign {
    fn kind(&self) -> EntityKind {
        EntityKind::Campaign
    }

    fn id(&self) -> &str {
        &self.id
    }
}

// ---------------------------------------------------------------------------
// Edges and occurrence logs
// ---------------------------------------------------------------------------

/// Deduplicated referrer → visitor relation within a campaign.
/// Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub relation: RelationKind,
    pub referrer: Address,
    pub visitor: Address,
    pub campaign: Address,
    pub created_at: Timestamp,
}

impl Edge {
    pub fn new(relation: RelationKind, key: &EdgeKey, timestamp: Timestamp) -> Self {
        Self {
            id: key.to_string(),
            relation,
            referrer: key.referrer.clone(),
            visitor: key.visitor.clone(),
            campaign: key.campaign.clone(),
            created_at: timestamp,
        }
    }
}

impl Entity for Edge {
    fn kind(&self) -> EntityKind {
        self.relation.edge_kind()
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// One on-chain join or visit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: String,
    pub relation: RelationKind,
    pub campaign: Address,
    pub referrer: Address,
    pub visitor: Address,
    pub timestamp: Timestamp,
}

impl Entity for Occurrence {
    fn kind(&self) -> EntityKind {
        self.relation.occurrence_kind()
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// One on-chain plasma → ethereum binding log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressMappingEvent {
    pub id: String,
    pub plasma: Address,
    pub ethereum: Address,
    pub timestamp: Timestamp,
}

impl AddressMappingEvent {
    pub fn new(
        position: &LogPosition,
        plasma: &Address,
        ethereum: &Address,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: position.to_string(),
            plasma: plasma.clone(),
            ethereum: ethereum.clone(),
            timestamp,
        }
    }
}

impl Entity for AddressMappingEvent {
    fn kind(&self) -> EntityKind {
        EntityKind::AddressMappingEvent
    }

    fn id(&self) -> &str {
        &self.id
    }
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Marks a log position as fully reduced. Written last for every event, so a
/// redelivered log can be recognised before any counter moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: String,
    pub event_type: String,
    pub source: Address,
    pub block_timestamp: Timestamp,
}

impl Delivery {
    pub fn new(
        position: &LogPosition,
        event_type: &str,
        source: &Address,
        block_timestamp: Timestamp,
    ) -> Self {
        Self {
            id: position.to_string(),
            event_type: event_type.to_string(),
            source: source.clone(),
            block_timestamp,
        }
    }
}

impl Entity for Delivery {
    fn kind(&self) -> EntityKind {
        EntityKind::Delivery
    }

    fn id(&self) -> &str {
        &self.id
    }
}
