use serde::Serialize;

/// Result of an insert-if-absent write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded<T> {
    /// No record existed under the key; this one was written.
    Created(T),
    /// A record already existed and was returned untouched.
    Existing(T),
}

impl<T> Recorded<T> {
    pub fn was_created(&self) -> bool {
        matches!(self, Recorded::Created(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Recorded::Created(t) | Recorded::Existing(t) => t,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Recorded::Created(t) | Recorded::Existing(t) => t,
        }
    }
}

/// What reducing a single event changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReduceOutcome {
    pub event_type: &'static str,
    /// The log position had already been reduced; nothing was written.
    pub redelivered: bool,
    pub metadata_created: bool,
    pub users_created: u32,
    pub campaign_created: bool,
    pub edge_created: bool,
    /// `None` for event kinds without an occurrence log.
    pub occurrence_created: Option<bool>,
}

impl ReduceOutcome {
    pub fn new(event_type: &'static str) -> Self {
        Self {
            event_type,
            ..Default::default()
        }
    }

    pub fn redelivery(event_type: &'static str) -> Self {
        Self {
            event_type,
            redelivered: true,
            ..Default::default()
        }
    }
}
