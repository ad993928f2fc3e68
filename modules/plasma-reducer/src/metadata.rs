//! Per-source global counters.

use anyhow::Result;
use plasma_common::{Address, EntityKind, MetaCounter, Metadata, Timestamp};
use plasma_store::{EntityStore, EntityStoreExt};
use tracing::{debug, warn};

use crate::outcome::Recorded;

/// Owns the one [`Metadata`] record per emitting contract.
pub struct MetadataTracker<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: EntityStore + ?Sized> MetadataTracker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Load the source's metadata, creating it with zeroed counters if absent.
    pub async fn ensure(
        &self,
        source: &Address,
        timestamp: Timestamp,
    ) -> Result<Recorded<Metadata>> {
        if let Some(existing) = self
            .store
            .load_entity::<Metadata>(EntityKind::Metadata, source.as_str())
            .await?
        {
            return Ok(Recorded::Existing(existing));
        }

        let metadata = Metadata::new(source, timestamp);
        self.store.save_entity(&metadata).await?;
        debug!(source = %source, timestamp, "Metadata created");
        Ok(Recorded::Created(metadata))
    }

    /// Increment one counter. A missing record is a caller bug: logged, no write.
    pub async fn bump(
        &self,
        source: &Address,
        counter: MetaCounter,
        timestamp: Timestamp,
    ) -> Result<Option<Metadata>> {
        let updated = self
            .store
            .apply_delta::<Metadata, _>(EntityKind::Metadata, source.as_str(), |m| {
                m.bump(counter, timestamp)
            })
            .await?;

        if updated.is_none() {
            warn!(source = %source, ?counter, "Metadata missing, counter bump ignored");
        }
        Ok(updated)
    }
}
