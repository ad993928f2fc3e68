//! In-memory store for tests and dry runs. No database required.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use plasma_common::EntityKind;

use crate::store::EntityStore;

/// Thread-safe map of `(kind, id)` to record. Ordered, so snapshots are
/// deterministic.
#[derive(Default)]
pub struct MemoryEntityStore {
    records: Mutex<BTreeMap<(EntityKind, String), serde_json::Value>>,
    writes: AtomicU64,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored under `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.lock()
            .map(|records| records.keys().filter(|(k, _)| *k == kind).count())
            .unwrap_or(0)
    }

    /// Ids stored under `kind`, in key order.
    pub fn ids(&self, kind: EntityKind) -> Vec<String> {
        self.lock()
            .map(|records| {
                records
                    .keys()
                    .filter(|(k, _)| *k == kind)
                    .map(|(_, id)| id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Copy of every record, in key order (for test assertions).
    pub fn snapshot(&self) -> Vec<(EntityKind, String, serde_json::Value)> {
        self.lock()
            .map(|records| {
                records
                    .iter()
                    .map(|((kind, id), value)| (*kind, id.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total `save` calls, including overwrites with an identical value.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<(EntityKind, String), serde_json::Value>>> {
        self.records
            .lock()
            .map_err(|_| anyhow!("memory entity store lock poisoned"))
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn load(&self, kind: EntityKind, id: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.lock()?.get(&(kind, id.to_string())).cloned())
    }

    async fn save(&self, kind: EntityKind, id: &str, record: serde_json::Value) -> Result<()> {
        self.lock()?.insert((kind, id.to_string()), record);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
