//! Component contracts in isolation: ensure/bump/bind/record semantics and
//! the missing-precondition no-ops.

use plasma_common::{
    Address, Campaign, EntityKind, Handle, LogPosition, MetaCounter, Metadata, RelationKind,
    TxHash, User,
};
use plasma_reducer::{CampaignRegistry, IdentityResolver, MetadataTracker, RelationshipLedger};
use plasma_store::{EntityStoreExt, MemoryEntityStore};

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

fn source() -> Address {
    addr("0x00000000000000000000000000000000000000aa")
}

fn position(n: u64, log_index: u64) -> LogPosition {
    let hash: TxHash = format!("0x{n:064x}").parse().unwrap();
    LogPosition::new(&hash, log_index)
}

// =========================================================================
// MetadataTracker
// =========================================================================

#[tokio::test]
async fn ensure_metadata_creates_once_and_keeps_first_timestamp() {
    let store = MemoryEntityStore::new();
    let tracker = MetadataTracker::new(&store);

    let first = tracker.ensure(&source(), 10).await.unwrap();
    assert!(first.was_created());
    assert_eq!(first.get().created_at, 10);
    assert_eq!(first.get().updated_at, 10);

    let second = tracker.ensure(&source(), 20).await.unwrap();
    assert!(!second.was_created());
    assert_eq!(second.into_inner().created_at, 10);
}

#[tokio::test]
async fn bump_without_metadata_is_a_no_op() {
    let store = MemoryEntityStore::new();
    let tracker = MetadataTracker::new(&store);

    let result = tracker.bump(&source(), MetaCounter::Visits, 1).await.unwrap();
    assert!(result.is_none());
    assert_eq!(store.count(EntityKind::Metadata), 0);
}

#[tokio::test]
async fn bump_touches_only_the_named_counter() {
    let store = MemoryEntityStore::new();
    let tracker = MetadataTracker::new(&store);
    tracker.ensure(&source(), 1).await.unwrap();

    let meta = tracker
        .bump(&source(), MetaCounter::PlasmaToEthereum, 5)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(meta.counter(MetaCounter::PlasmaToEthereum), 1);
    for other in [
        MetaCounter::Visits,
        MetaCounter::Joins,
        MetaCounter::Campaigns,
        MetaCounter::PlasmaToHandle,
    ] {
        assert_eq!(meta.counter(other), 0, "{other:?} moved");
    }
    assert_eq!(meta.updated_at, 5);
}

#[tokio::test]
async fn updated_at_never_moves_backwards() {
    let store = MemoryEntityStore::new();
    let tracker = MetadataTracker::new(&store);
    tracker.ensure(&source(), 50).await.unwrap();

    let meta = tracker
        .bump(&source(), MetaCounter::Joins, 40)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(meta.updated_at, 50);
    assert!(meta.updated_at >= meta.created_at);
}

// =========================================================================
// IdentityResolver
// =========================================================================

#[tokio::test]
async fn ensure_user_returns_existing_record_untouched() {
    let store = MemoryEntityStore::new();
    let identity = IdentityResolver::new(&store);
    let a = addr("0x000000000000000000000000000000000000000a");

    assert!(identity.ensure_user(&a, 3).await.unwrap().was_created());
    identity
        .bind_handle(&a, &Handle::from_bytes("alice"))
        .await
        .unwrap();

    let again = identity.ensure_user(&a, 9).await.unwrap();
    assert!(!again.was_created());
    let user = again.into_inner();
    assert_eq!(user.created_at, 3);
    assert_eq!(user.handle, Some(Handle::from_bytes("alice")));
}

#[tokio::test]
async fn binding_rewrites_even_when_unchanged() {
    let store = MemoryEntityStore::new();
    let identity = IdentityResolver::new(&store);
    let a = addr("0x000000000000000000000000000000000000000a");
    let eth = addr("0x00000000000000000000000000000000000000e1");
    identity.ensure_user(&a, 1).await.unwrap();

    identity.bind_external_address(&a, &eth).await.unwrap();
    let writes = store.write_count();
    identity.bind_external_address(&a, &eth).await.unwrap();
    assert_eq!(store.write_count(), writes + 1);

    let user: User = store
        .load_entity(EntityKind::User, a.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.bound_address, Some(eth));
}

#[tokio::test]
async fn binding_unknown_user_is_a_no_op() {
    let store = MemoryEntityStore::new();
    let identity = IdentityResolver::new(&store);
    let a = addr("0x000000000000000000000000000000000000000a");

    assert!(identity
        .bind_handle(&a, &Handle::from_bytes("ghost"))
        .await
        .unwrap()
        .is_none());
    assert_eq!(store.count(EntityKind::User), 0);
}

// =========================================================================
// CampaignRegistry
// =========================================================================

#[tokio::test]
async fn campaign_creation_bumps_source_count_first() {
    let store = MemoryEntityStore::new();
    MetadataTracker::new(&store).ensure(&source(), 1).await.unwrap();
    let registry = CampaignRegistry::new(&store);
    let c = addr("0x00000000000000000000000000000000000000c1");

    let created = registry.ensure_campaign(&source(), &c, 4).await.unwrap();
    assert!(created.was_created());
    let existing = registry.ensure_campaign(&source(), &c, 5).await.unwrap();
    assert!(!existing.was_created());

    let meta: Metadata = store
        .load_entity(EntityKind::Metadata, source().as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(meta.campaign_count, 1);
    assert_eq!(meta.updated_at, 4);
}

#[tokio::test]
async fn campaign_bumps_are_independent() {
    let store = MemoryEntityStore::new();
    MetadataTracker::new(&store).ensure(&source(), 1).await.unwrap();
    let registry = CampaignRegistry::new(&store);
    let c = addr("0x00000000000000000000000000000000000000c1");
    registry.ensure_campaign(&source(), &c, 1).await.unwrap();

    registry.bump_visit(&c, 2).await.unwrap();
    registry.bump_visit(&c, 3).await.unwrap();
    let campaign: Campaign = registry.bump_join(&c, 4).await.unwrap().unwrap();

    assert_eq!(campaign.visit_count, 2);
    assert_eq!(campaign.join_count, 1);
    assert_eq!(campaign.updated_at, 4);
}

#[tokio::test]
async fn bumping_unknown_campaign_is_a_no_op() {
    let store = MemoryEntityStore::new();
    let registry = CampaignRegistry::new(&store);
    let c = addr("0x00000000000000000000000000000000000000c1");

    assert!(registry.bump_join(&c, 1).await.unwrap().is_none());
    assert_eq!(store.count(EntityKind::Campaign), 0);
}

// =========================================================================
// RelationshipLedger
// =========================================================================

#[tokio::test]
async fn existing_edge_is_returned_unmodified() {
    let store = MemoryEntityStore::new();
    let ledger = RelationshipLedger::new(&store);
    let a = addr("0x000000000000000000000000000000000000000a");
    let b = addr("0x000000000000000000000000000000000000000b");
    let c = addr("0x00000000000000000000000000000000000000c1");

    let first = ledger
        .record_edge(RelationKind::Visit, &a, &b, &c, 1)
        .await
        .unwrap();
    let writes = store.write_count();
    let second = ledger
        .record_edge(RelationKind::Visit, &a, &b, &c, 2)
        .await
        .unwrap();

    assert!(first.was_created());
    assert!(!second.was_created());
    assert_eq!(second.get(), first.get());
    assert_eq!(store.write_count(), writes);
}

#[tokio::test]
async fn occurrence_dedups_on_log_position_only() {
    let store = MemoryEntityStore::new();
    let ledger = RelationshipLedger::new(&store);
    let a = addr("0x000000000000000000000000000000000000000a");
    let b = addr("0x000000000000000000000000000000000000000b");
    let c = addr("0x00000000000000000000000000000000000000c1");

    let p = position(1, 0);
    assert!(ledger
        .record_occurrence(RelationKind::Join, &p, &c, &a, &b, 1)
        .await
        .unwrap()
        .was_created());
    // same position, different payload: still the first write
    let again = ledger
        .record_occurrence(RelationKind::Join, &p, &c, &b, &a, 2)
        .await
        .unwrap();
    assert!(!again.was_created());
    assert_eq!(again.get().referrer, a);

    assert!(ledger
        .record_occurrence(RelationKind::Join, &position(1, 1), &c, &a, &b, 1)
        .await
        .unwrap()
        .was_created());
    assert_eq!(store.count(EntityKind::JoinEvent), 2);
}

#[tokio::test]
async fn address_mapping_log_is_append_only() {
    let store = MemoryEntityStore::new();
    let ledger = RelationshipLedger::new(&store);
    let a = addr("0x000000000000000000000000000000000000000a");
    let e1 = addr("0x00000000000000000000000000000000000000e1");
    let e2 = addr("0x00000000000000000000000000000000000000e2");

    let p = position(7, 2);
    ledger.record_address_mapping(&p, &a, &e1, 1).await.unwrap();
    let again = ledger.record_address_mapping(&p, &a, &e2, 2).await.unwrap();

    assert!(!again.was_created());
    assert_eq!(again.into_inner().ethereum, e1);
    assert_eq!(store.ids(EntityKind::AddressMappingEvent), vec![p.to_string()]);
}
