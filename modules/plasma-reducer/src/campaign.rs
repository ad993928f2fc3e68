//! Per-campaign aggregate counters.

use anyhow::Result;
use plasma_common::{Address, Campaign, EntityKind, MetaCounter, RelationKind, Timestamp};
use plasma_store::{EntityStore, EntityStoreExt};
use tracing::{debug, warn};

use crate::metadata::MetadataTracker;
use crate::outcome::Recorded;

pub struct CampaignRegistry<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: EntityStore + ?Sized> CampaignRegistry<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Load a campaign, creating it on first reference.
    ///
    /// Creation bumps the source's `campaign_count` first; the Campaign record
    /// is only written once that increment is persisted.
    pub async fn ensure_campaign(
        &self,
        source: &Address,
        campaign: &Address,
        timestamp: Timestamp,
    ) -> Result<Recorded<Campaign>> {
        if let Some(existing) = self
            .store
            .load_entity::<Campaign>(EntityKind::Campaign, campaign.as_str())
            .await?
        {
            return Ok(Recorded::Existing(existing));
        }

        MetadataTracker::new(self.store)
            .bump(source, MetaCounter::Campaigns, timestamp)
            .await?;

        let record = Campaign::new(campaign, timestamp);
        self.store.save_entity(&record).await?;
        debug!(source = %source, campaign = %campaign, "Campaign created");
        Ok(Recorded::Created(record))
    }

    pub async fn bump_visit(
        &self,
        campaign: &Address,
        timestamp: Timestamp,
    ) -> Result<Option<Campaign>> {
        self.bump(campaign, RelationKind::Visit, timestamp).await
    }

    pub async fn bump_join(
        &self,
        campaign: &Address,
        timestamp: Timestamp,
    ) -> Result<Option<Campaign>> {
        self.bump(campaign, RelationKind::Join, timestamp).await
    }

    pub async fn bump(
        &self,
        campaign: &Address,
        relation: RelationKind,
        timestamp: Timestamp,
    ) -> Result<Option<Campaign>> {
        let updated = self
            .store
            .apply_delta::<Campaign, _>(EntityKind::Campaign, campaign.as_str(), |c| {
                c.bump(relation, timestamp)
            })
            .await?;

        if updated.is_none() {
            warn!(campaign = %campaign, ?relation, "Campaign missing, counter bump ignored");
        }
        Ok(updated)
    }
}
