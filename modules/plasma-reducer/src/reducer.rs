//! EventReducer: dispatches one chain event to the components.
//!
//! Every event kind runs a fixed sequence with no short-circuiting on
//! entities that already exist: metadata is ensured and its counter bumped
//! first, then users and campaigns are ensured before they are used, then
//! edges and logs are recorded. Only a redelivered log position is skipped,
//! recognised by its [`Delivery`] marker, which is written last.

use anyhow::Result;
use plasma_common::{
    Address, ChainEvent, Delivery, EntityKind, MetaCounter, PlasmaEvent, RelationKind,
};
use plasma_store::{EntityStore, EntityStoreExt};
use tracing::debug;

use crate::campaign::CampaignRegistry;
use crate::identity::IdentityResolver;
use crate::ledger::RelationshipLedger;
use crate::metadata::MetadataTracker;
use crate::outcome::ReduceOutcome;

pub struct EventReducer<S> {
    store: S,
}

impl<S: EntityStore> EventReducer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Reduce a single event to completion.
    pub async fn reduce(&self, event: &ChainEvent) -> Result<ReduceOutcome> {
        let position = event.log_position();
        let event_type = event.event_type();

        if self
            .store
            .load_entity::<Delivery>(EntityKind::Delivery, &position.to_string())
            .await?
            .is_some()
        {
            debug!(position = %position, event_type, "Log already reduced, skipping");
            return Ok(ReduceOutcome::redelivery(event_type));
        }

        let source = &event.source;
        let ts = event.block_timestamp;
        let metadata = MetadataTracker::new(&self.store);
        let identity = IdentityResolver::new(&self.store);

        let mut outcome = ReduceOutcome::new(event_type);
        outcome.metadata_created = metadata.ensure(source, ts).await?.was_created();

        match &event.event {
            PlasmaEvent::HandleBound { plasma, handle } => {
                metadata.bump(source, MetaCounter::PlasmaToHandle, ts).await?;
                if identity.ensure_user(plasma, ts).await?.was_created() {
                    outcome.users_created += 1;
                }
                identity.bind_handle(plasma, handle).await?;
            }

            PlasmaEvent::AddressMapped { plasma, ethereum } => {
                metadata.bump(source, MetaCounter::PlasmaToEthereum, ts).await?;
                if identity.ensure_user(plasma, ts).await?.was_created() {
                    outcome.users_created += 1;
                }
                identity.bind_external_address(plasma, ethereum).await?;

                let logged = RelationshipLedger::new(&self.store)
                    .record_address_mapping(&position, plasma, ethereum, ts)
                    .await?;
                outcome.occurrence_created = Some(logged.was_created());
            }

            PlasmaEvent::Joined { from, to, campaign } => {
                self.reduce_referral(RelationKind::Join, event, from, to, campaign, &mut outcome)
                    .await?;
            }

            PlasmaEvent::Visited { from, to, campaign } => {
                self.reduce_referral(RelationKind::Visit, event, from, to, campaign, &mut outcome)
                    .await?;
            }
        }

        self.store
            .save_entity(&Delivery::new(&position, event_type, source, ts))
            .await?;

        debug!(position = %position, ?outcome, "Event reduced");
        Ok(outcome)
    }

    /// Shared sequence for Joined and Visited.
    async fn reduce_referral(
        &self,
        relation: RelationKind,
        event: &ChainEvent,
        referrer: &Address,
        visitor: &Address,
        campaign: &Address,
        outcome: &mut ReduceOutcome,
    ) -> Result<()> {
        let source = &event.source;
        let ts = event.block_timestamp;

        let counter = match relation {
            RelationKind::Join => MetaCounter::Joins,
            RelationKind::Visit => MetaCounter::Visits,
        };
        MetadataTracker::new(&self.store)
            .bump(source, counter, ts)
            .await?;

        let identity = IdentityResolver::new(&self.store);
        for user in [referrer, visitor] {
            if identity.ensure_user(user, ts).await?.was_created() {
                outcome.users_created += 1;
            }
        }

        let campaigns = CampaignRegistry::new(&self.store);
        outcome.campaign_created = campaigns
            .ensure_campaign(source, campaign, ts)
            .await?
            .was_created();
        match relation {
            RelationKind::Join => campaigns.bump_join(campaign, ts).await?,
            RelationKind::Visit => campaigns.bump_visit(campaign, ts).await?,
        };

        let ledger = RelationshipLedger::new(&self.store);
        outcome.edge_created = ledger
            .record_edge(relation, referrer, visitor, campaign, ts)
            .await?
            .was_created();
        outcome.occurrence_created = Some(
            ledger
                .record_occurrence(relation, &event.log_position(), campaign, referrer, visitor, ts)
                .await?
                .was_created(),
        );

        Ok(())
    }
}
