//! Keyed record storage for the reducer.
//!
//! Records are whole JSON documents addressed by `(EntityKind, id)`. The
//! contract is load by id and full upsert on save.
//! Typed access and read-modify-write live in [`EntityStoreExt`].

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryEntityStore;
pub use postgres::{PgEntityStore, StoredEntity};
pub use store::{EntityStore, EntityStoreExt};
