//! Primitive chain types shared by every crate in the workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlasmaError;

/// Block timestamp in seconds since the Unix epoch.
pub type Timestamp = u64;

/// Value written to `source_type` on every aggregate this indexer owns.
pub const SOURCE_TYPE: &str = "PLASMA";

/// Schema version stamped on new Metadata records.
pub const METADATA_SCHEMA_VERSION: u32 = 11;

/// Schema version stamped on new Campaign records.
pub const CAMPAIGN_SCHEMA_VERSION: u32 = 12;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account address, held in its lower-case `0x`-prefixed hex form.
///
/// Record ids and composite keys are built from this rendering, so two
/// spellings of the same address always resolve to the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = PlasmaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_hex(s, 40)
            .map(Address)
            .ok_or_else(|| PlasmaError::InvalidAddress(s.to_string()))
    }
}

impl TryFrom<String> for Address {
    type Error = PlasmaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// TxHash
// ---------------------------------------------------------------------------

/// A 32-byte transaction hash in lower-case `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash(String);

impl TxHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = PlasmaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_hex(s, 64)
            .map(TxHash)
            .ok_or_else(|| PlasmaError::InvalidTxHash(s.to_string()))
    }
}

impl TryFrom<String> for TxHash {
    type Error = PlasmaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TxHash> for String {
    fn from(hash: TxHash) -> Self {
        hash.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// A handle label exactly as the contract emitted it: raw bytes, with no
/// UTF-8 requirement. Held as lower-case `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Handle(format!("0x{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        hex::decode(&self.0[2..]).unwrap_or_default()
    }

    /// The handle as text, when its bytes are valid UTF-8.
    pub fn to_utf8(&self) -> Option<String> {
        String::from_utf8(self.to_bytes()).ok()
    }
}

impl FromStr for Handle {
    type Err = PlasmaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| PlasmaError::InvalidHandle(s.to_string()))?;
        let bytes = hex::decode(body).map_err(|_| PlasmaError::InvalidHandle(s.to_string()))?;
        Ok(Handle::from_bytes(bytes))
    }
}

impl TryFrom<String> for Handle {
    type Error = PlasmaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-case `s` if it is `0x` followed by exactly `digits` hex characters.
fn normalize_hex(s: &str, digits: usize) -> Option<String> {
    let body = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    if body.len() != digits || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("0x{}", body.to_ascii_lowercase()))
}

// ---------------------------------------------------------------------------
// Record kinds
// ---------------------------------------------------------------------------

/// Every record type the store holds. The string form is the storage
/// namespace, so it must never change for an existing kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Metadata,
    User,
    Campaign,
    Join,
    Visit,
    JoinEvent,
    VisitEvent,
    AddressMappingEvent,
    Delivery,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Metadata,
        EntityKind::User,
        EntityKind::Campaign,
        EntityKind::Join,
        EntityKind::Visit,
        EntityKind::JoinEvent,
        EntityKind::VisitEvent,
        EntityKind::AddressMappingEvent,
        EntityKind::Delivery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Metadata => "metadata",
            EntityKind::User => "user",
            EntityKind::Campaign => "campaign",
            EntityKind::Join => "join",
            EntityKind::Visit => "visit",
            EntityKind::JoinEvent => "join_event",
            EntityKind::VisitEvent => "visit_event",
            EntityKind::AddressMappingEvent => "address_mapping_event",
            EntityKind::Delivery => "delivery",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two referral relations tracked between a referrer and a visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Join,
    Visit,
}

impl RelationKind {
    /// Store namespace of the deduplicated edge.
    pub fn edge_kind(&self) -> EntityKind {
        match self {
            RelationKind::Join => EntityKind::Join,
            RelationKind::Visit => EntityKind::Visit,
        }
    }

    /// Store namespace of the per-occurrence log.
    pub fn occurrence_kind(&self) -> EntityKind {
        match self {
            RelationKind::Join => EntityKind::JoinEvent,
            RelationKind::Visit => EntityKind::VisitEvent,
        }
    }
}
