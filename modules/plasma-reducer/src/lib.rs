//! Event-to-state reducer for the Plasma tracking contract.
//!
//! Each [`ChainEvent`](plasma_common::ChainEvent) is reduced to completion,
//! through a fixed sequence of component calls, before the next one is read.
//! Components keep no state between events: every step loads by id, mutates
//! and saves through the [`EntityStore`](plasma_store::EntityStore).

pub mod campaign;
pub mod identity;
pub mod indexer;
pub mod ledger;
pub mod metadata;
pub mod outcome;
pub mod reducer;

pub use campaign::CampaignRegistry;
pub use identity::IdentityResolver;
pub use indexer::{IndexStats, Indexer};
pub use ledger::RelationshipLedger;
pub use metadata::MetadataTracker;
pub use outcome::{Recorded, ReduceOutcome};
pub use reducer::EventReducer;
