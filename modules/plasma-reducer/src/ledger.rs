//! Deduplicated referral edges and append-only occurrence logs.
//!
//! Two independent dedup keys are in play:
//!
//! - an edge is keyed by the ordered `(referrer, visitor, campaign)` triple and
//!   written once, no matter how many times the relation recurs;
//! - an occurrence is keyed by on-chain log position `(tx_hash, log_index)`,
//!   so every distinct log gets exactly one entry and a redelivered log none.
//!
//! Neither write ever modifies an existing record.

use anyhow::Result;
use plasma_common::{
    Address, AddressMappingEvent, Edge, EdgeKey, Entity, LogPosition, Occurrence, RelationKind,
    Timestamp,
};
use plasma_store::{EntityStore, EntityStoreExt};
use tracing::debug;

use crate::outcome::Recorded;

pub struct RelationshipLedger<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: EntityStore + ?Sized> RelationshipLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Record the referrer → visitor edge for `campaign`. First write wins.
    pub async fn record_edge(
        &self,
        relation: RelationKind,
        referrer: &Address,
        visitor: &Address,
        campaign: &Address,
        timestamp: Timestamp,
    ) -> Result<Recorded<Edge>> {
        let key = EdgeKey::new(referrer, visitor, campaign);
        let recorded = self
            .insert_if_absent(Edge::new(relation, &key, timestamp))
            .await?;

        debug!(
            ?relation,
            edge = %key,
            created = recorded.was_created(),
            "Edge recorded"
        );
        Ok(recorded)
    }

    /// Append the join/visit log entry at `position`, unless it exists.
    pub async fn record_occurrence(
        &self,
        relation: RelationKind,
        position: &LogPosition,
        campaign: &Address,
        referrer: &Address,
        visitor: &Address,
        timestamp: Timestamp,
    ) -> Result<Recorded<Occurrence>> {
        let occurrence = Occurrence {
            id: position.to_string(),
            relation,
            campaign: campaign.clone(),
            referrer: referrer.clone(),
            visitor: visitor.clone(),
            timestamp,
        };
        self.insert_if_absent(occurrence).await
    }

    /// Append the plasma → ethereum binding log entry at `position`, unless it exists.
    pub async fn record_address_mapping(
        &self,
        position: &LogPosition,
        plasma: &Address,
        ethereum: &Address,
        timestamp: Timestamp,
    ) -> Result<Recorded<AddressMappingEvent>> {
        self.insert_if_absent(AddressMappingEvent::new(position, plasma, ethereum, timestamp))
            .await
    }

    async fn insert_if_absent<T: Entity>(&self, record: T) -> Result<Recorded<T>> {
        if let Some(existing) = self.store.load_entity::<T>(record.kind(), record.id()).await? {
            return Ok(Recorded::Existing(existing));
        }
        self.store.save_entity(&record).await?;
        Ok(Recorded::Created(record))
    }
}
