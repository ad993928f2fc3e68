//! The run loop.

use anyhow::Result;
use futures::{Stream, StreamExt};
use plasma_common::{Address, ChainEvent};
use plasma_store::EntityStore;
use serde::Serialize;
use tracing::{debug, info};

use crate::outcome::ReduceOutcome;
use crate::reducer::EventReducer;

/// Running totals for one indexer run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub events_seen: u64,
    pub applied: u64,
    pub skipped_foreign_source: u64,
    pub redeliveries: u64,
    pub users_created: u64,
    pub campaigns_created: u64,
    pub edges_created: u64,
    pub occurrences_created: u64,
}

impl IndexStats {
    fn record(&mut self, outcome: &ReduceOutcome) {
        if outcome.redelivered {
            self.redeliveries += 1;
            return;
        }
        self.applied += 1;
        self.users_created += u64::from(outcome.users_created);
        self.campaigns_created += u64::from(outcome.campaign_created);
        self.edges_created += u64::from(outcome.edge_created);
        self.occurrences_created += u64::from(outcome.occurrence_created == Some(true));
    }
}

/// Feeds events to an [`EventReducer`] strictly one at a time.
///
/// Each event is fully reduced before the next is pulled, so the store sees
/// a single writer. Events from any contract other than the tracked source
/// (when one is set) are counted and dropped.
pub struct Indexer<S> {
    reducer: EventReducer<S>,
    source: Option<Address>,
    stats: IndexStats,
}

impl<S: EntityStore> Indexer<S> {
    pub fn new(store: S) -> Self {
        Self {
            reducer: EventReducer::new(store),
            source: None,
            stats: IndexStats::default(),
        }
    }

    /// Only reduce events emitted by `source`.
    pub fn with_source(mut self, source: Option<Address>) -> Self {
        self.source = source;
        self
    }

    /// Reduce one event. Returns `None` if it was filtered out.
    pub async fn index(&mut self, event: &ChainEvent) -> Result<Option<ReduceOutcome>> {
        self.stats.events_seen += 1;

        if let Some(source) = &self.source {
            if &event.source != source {
                debug!(source = %event.source, tracked = %source, "Foreign source, skipping");
                self.stats.skipped_foreign_source += 1;
                return Ok(None);
            }
        }

        let outcome = self.reducer.reduce(event).await?;
        self.stats.record(&outcome);
        Ok(Some(outcome))
    }

    /// Reduce every event in order. Stops at the first store failure.
    pub async fn index_all<'e, I>(&mut self, events: I) -> Result<&IndexStats>
    where
        I: IntoIterator<Item = &'e ChainEvent>,
    {
        for event in events {
            self.index(event).await?;
        }
        Ok(&self.stats)
    }

    /// Drain a stream of decoded events. Stops at the first decode or store failure.
    pub async fn index_stream<St>(&mut self, events: St) -> Result<&IndexStats>
    where
        St: Stream<Item = Result<ChainEvent>>,
    {
        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            self.index(&event?).await?;
        }

        info!(
            seen = self.stats.events_seen,
            applied = self.stats.applied,
            redeliveries = self.stats.redeliveries,
            skipped = self.stats.skipped_foreign_source,
            "Event stream drained"
        );
        Ok(&self.stats)
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    pub fn into_store(self) -> S {
        self.reducer.into_store()
    }
}
