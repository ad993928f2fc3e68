//! Core storage traits.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use plasma_common::{Entity, EntityKind};

/// Raw keyed record storage.
///
/// Implemented by `PgEntityStore` (postgres) and `MemoryEntityStore` (tests,
/// dry runs). Also implemented for `Arc<S>` so a store can be shared with
/// test assertions.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Load the record stored under `(kind, id)`, if any.
    async fn load(&self, kind: EntityKind, id: &str) -> Result<Option<serde_json::Value>>;

    /// Full upsert: overwrite whatever is stored under `(kind, id)`.
    async fn save(&self, kind: EntityKind, id: &str, record: serde_json::Value) -> Result<()>;
}

/// Typed access on top of [`EntityStore`].
#[async_trait]
pub trait EntityStoreExt: EntityStore {
    /// Load and decode a record.
    async fn load_entity<T: Entity>(&self, kind: EntityKind, id: &str) -> Result<Option<T>> {
        match self.load(kind, id).await? {
            Some(value) => {
                let entity = serde_json::from_value(value)
                    .with_context(|| format!("Failed to decode {kind} record {id}"))?;
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    /// Encode and upsert a record under its own kind and id.
    async fn save_entity<T: Entity>(&self, entity: &T) -> Result<()> {
        let kind = entity.kind();
        let value = serde_json::to_value(entity)
            .with_context(|| format!("Failed to encode {kind} record {}", entity.id()))?;
        self.save(kind, entity.id(), value).await
    }

    /// Load, mutate and save one record in a single step.
    ///
    /// Returns the updated record, or `None` without writing anything when
    /// the record does not exist. Callers run strictly one event at a time;
    /// a concurrent store would need to make this atomic.
    async fn apply_delta<T, F>(&self, kind: EntityKind, id: &str, delta: F) -> Result<Option<T>>
    where
        T: Entity,
        F: FnOnce(&mut T) + Send,
    {
        let Some(mut entity) = self.load_entity::<T>(kind, id).await? else {
            return Ok(None);
        };
        delta(&mut entity);
        self.save_entity(&entity).await?;
        Ok(Some(entity))
    }
}

impl<S: EntityStore + ?Sized> EntityStoreExt for S {}

// ---------------------------------------------------------------------------
// Arc<S> blanket: lets tests share the store for assertions
// ---------------------------------------------------------------------------

#[async_trait]
impl<S: EntityStore + ?Sized> EntityStore for Arc<S> {
    async fn load(&self, kind: EntityKind, id: &str) -> Result<Option<serde_json::Value>> {
        (**self).load(kind, id).await
    }

    async fn save(&self, kind: EntityKind, id: &str, record: serde_json::Value) -> Result<()> {
        (**self).save(kind, id, record).await
    }
}
