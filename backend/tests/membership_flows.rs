//! End-to-end membership flows over the in-memory adapter.
//!
//! These tests wire the real services to the real adapter, covering the
//! cross-service behaviour unit tests cannot see: snapshot (not live)
//! group propagation, the unlink guarantee, and the account-deletion
//! cascade.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use backend::domain::ports::ListRepository;
use backend::domain::{
    AccountCascadeService, AccountService, AdminService, EmailAddress, ErrorCode, GroupLinkService,
    GroupService, ItemService, List, ListId, ListName, ListService, ListShare, ListStatus,
    LiveQueryService, NewItem, NewList, User,
};
use backend::outbound::memory::MemoryStore;

struct World {
    store: Arc<MemoryStore>,
    accounts: AccountService<MemoryStore, MemoryStore>,
    lists: ListService<MemoryStore, MemoryStore, MemoryStore>,
    groups: GroupService<MemoryStore, MemoryStore>,
    links: GroupLinkService<MemoryStore, MemoryStore>,
    items: ItemService<MemoryStore, MemoryStore>,
    admin: AdminService<MemoryStore, MemoryStore>,
}

fn admin_email() -> EmailAddress {
    EmailAddress::new("admin@admin.com").expect("valid email")
}

fn world() -> World {
    backend::telemetry::init();
    let store = Arc::new(MemoryStore::new());
    World {
        store: Arc::clone(&store),
        accounts: AccountService::new(Arc::clone(&store), Arc::clone(&store)),
        lists: ListService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&store),
            admin_email(),
        ),
        groups: GroupService::new(Arc::clone(&store), Arc::clone(&store)),
        links: GroupLinkService::new(Arc::clone(&store), Arc::clone(&store)),
        items: ItemService::new(Arc::clone(&store), Arc::clone(&store)),
        admin: AdminService::new(Arc::clone(&store), Arc::clone(&store), admin_email()),
    }
}

async fn register(world: &World, email: &str, name: &str) -> User {
    world
        .accounts
        .register(email, "s3cret", name)
        .await
        .expect("registration succeeds")
}

fn groceries(share: ListShare) -> NewList {
    NewList {
        list_name: "Groceries".to_owned(),
        icon: "cart".to_owned(),
        color: "#4caf50".to_owned(),
        location: None,
        share,
    }
}

async fn current(world: &World, id: &ListId) -> List {
    world
        .store
        .find_by_id(id)
        .await
        .expect("query succeeds")
        .expect("list exists")
}

#[tokio::test]
async fn share_by_email_then_remove_scenario() {
    let world = world();
    let alice = register(&world, "alice@example.com", "Alice").await;
    let bob = register(&world, "bob@example.com", "Bob").await;

    let list = world
        .lists
        .create_list(&alice.id, groceries(ListShare::Private))
        .await
        .expect("create succeeds");
    assert_eq!(list.members, BTreeSet::from([alice.id]));

    world
        .lists
        .add_member_by_email(&alice.id, &list.id, "Bob@Example.COM")
        .await
        .expect("share succeeds");
    assert_eq!(
        current(&world, &list.id).await.members,
        BTreeSet::from([alice.id, bob.id])
    );

    // Bob cannot remove the creator.
    let error = world
        .lists
        .remove_member(&bob.id, &list.id, &alice.id)
        .await
        .expect_err("creator is protected");
    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert_eq!(
        current(&world, &list.id).await.members,
        BTreeSet::from([alice.id, bob.id]),
        "a refused removal must not mutate state"
    );

    // Alice removes Bob, leaving herself alone.
    world
        .lists
        .remove_member(&alice.id, &list.id, &bob.id)
        .await
        .expect("removal succeeds");
    assert_eq!(
        current(&world, &list.id).await.members,
        BTreeSet::from([alice.id])
    );
}

#[tokio::test]
async fn group_membership_propagates_only_at_link_time() {
    let world = world();
    let owner = register(&world, "owner@example.com", "Olive").await;
    let mia = register(&world, "mia@example.com", "Mia").await;
    let pete = register(&world, "pete@example.com", "Pete").await;

    let group = world
        .groups
        .create_group(&owner.id, "Household")
        .await
        .expect("group created");
    world
        .groups
        .add_member_by_email(&owner.id, &group.id, "mia@example.com")
        .await
        .expect("mia joins");

    let list = world
        .lists
        .create_list(&owner.id, groceries(ListShare::Private))
        .await
        .expect("create succeeds");
    world
        .links
        .link_list_to_group(&owner.id, &list.id, &group.id)
        .await
        .expect("link succeeds");

    // Union law: old members ∪ group members.
    let linked = current(&world, &list.id).await;
    assert!(linked.members.is_superset(&BTreeSet::from([owner.id, mia.id])));
    assert_eq!(linked.linked_group_id, Some(group.id));

    // The group grows; the list does NOT until it is re-linked.
    world
        .groups
        .add_member_by_email(&owner.id, &group.id, "pete@example.com")
        .await
        .expect("pete joins");
    assert!(
        !current(&world, &list.id).await.members.contains(&pete.id),
        "group edits must not propagate on their own"
    );

    world
        .links
        .link_list_to_group(&owner.id, &list.id, &group.id)
        .await
        .expect("re-link succeeds");
    assert!(current(&world, &list.id).await.members.contains(&pete.id));
}

#[tokio::test]
async fn unlinking_keeps_every_member() {
    let world = world();
    let owner = register(&world, "owner@example.com", "Olive").await;
    let mia = register(&world, "mia@example.com", "Mia").await;

    let group = world
        .groups
        .create_group(&owner.id, "Household")
        .await
        .expect("group created");
    world
        .groups
        .add_member_by_email(&owner.id, &group.id, "mia@example.com")
        .await
        .expect("mia joins");
    let list = world
        .lists
        .create_list(&owner.id, groceries(ListShare::WithGroup(group.id)))
        .await
        .expect("create succeeds");

    // Group-derived members cannot be removed while the link stands.
    let error = world
        .lists
        .remove_member(&owner.id, &list.id, &mia.id)
        .await
        .expect_err("group-backed member");
    assert_eq!(error.code(), ErrorCode::Forbidden);

    let before = current(&world, &list.id).await.members;
    world
        .links
        .unlink_list_from_group(&owner.id, &list.id)
        .await
        .expect("unlink succeeds");
    let after = current(&world, &list.id).await;
    assert_eq!(after.members, before, "current members stay");
    assert_eq!(after.linked_group_id, None);

    // Unlinked, the former group member is now individually removable.
    world
        .lists
        .remove_member(&owner.id, &list.id, &mia.id)
        .await
        .expect("removal succeeds after unlink");
}

#[tokio::test]
async fn account_deletion_cascade_scenario() {
    let world = world();
    let uma = register(&world, "uma@example.com", "Uma").await;
    let vic = register(&world, "vic@example.com", "Vic").await;

    // L: Uma alone, with items. L2: shared, Uma is the creator.
    let solo = world
        .lists
        .create_list(&uma.id, groceries(ListShare::Private))
        .await
        .expect("create succeeds");
    world
        .items
        .add_item(
            &uma.id,
            &solo.id,
            NewItem {
                item_name: "Milk".to_owned(),
                quantity: None,
                unit: None,
            },
        )
        .await
        .expect("item added");
    let shared = world
        .lists
        .create_list(
            &uma.id,
            groceries(ListShare::WithMembers(BTreeSet::from([vic.id]))),
        )
        .await
        .expect("create succeeds");

    let cascade = AccountCascadeService::new(Arc::clone(&world.store), Arc::clone(&world.store));
    let report = cascade.delete_user(&uma.id).await.expect("cascade runs");
    assert!(report.is_clean());
    assert_eq!(report.deleted_lists, vec![solo.id]);
    assert_eq!(report.updated_lists, vec![shared.id]);

    // The solo list and its items are gone.
    assert!(
        world
            .store
            .find_by_id(&solo.id)
            .await
            .expect("query succeeds")
            .is_none()
    );

    // The shared list survives with Vic as creator and sole member.
    let survivor = current(&world, &shared.id).await;
    assert_eq!(survivor.creator_id, vic.id);
    assert_eq!(survivor.members, BTreeSet::from([vic.id]));

    // Uma is tombstoned and can no longer log in.
    let error = world
        .accounts
        .login("uma@example.com", "s3cret")
        .await
        .expect_err("deactivated");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn cascade_reports_failures_and_keeps_going() {
    let world = world();
    let doomed = register(&world, "doomed@example.com", "Dee").await;
    let other = register(&world, "other@example.com", "Omar").await;

    // Two shared lists with forced id order, so the injected failure lands
    // on the first one the cascade visits.
    let first = List {
        id: ListId::from_uuid(Uuid::from_u128(1)),
        list_name: ListName::new("First").expect("valid"),
        icon: "cart".to_owned(),
        color: "#4caf50".to_owned(),
        location: None,
        creator_id: other.id,
        members: BTreeSet::from([other.id, doomed.id]),
        linked_group_id: None,
        status: ListStatus::Active,
        created_at: Utc::now(),
    };
    let second = List {
        id: ListId::from_uuid(Uuid::from_u128(2)),
        ..first.clone()
    };
    world.store.insert(&first).await.expect("seed first");
    world.store.insert(&second).await.expect("seed second");

    let cascade = AccountCascadeService::new(Arc::clone(&world.store), Arc::clone(&world.store));
    world.store.fail_next_write();
    let report = cascade.delete_user(&doomed.id).await.expect("cascade runs");

    assert_eq!(
        report.failures.len(),
        1,
        "exactly one list hit the injected failure"
    );
    assert_eq!(
        report.failures.first().map(|failure| failure.list_id),
        Some(first.id)
    );
    assert_eq!(report.updated_lists, vec![second.id]);

    // The second list was still processed.
    assert!(!current(&world, &second.id).await.members.contains(&doomed.id));
    // The first one kept the stale membership for the admin to retry.
    assert!(current(&world, &first.id).await.members.contains(&doomed.id));
}

#[tokio::test]
async fn dashboard_watches_track_membership_changes() {
    let world = world();
    let alice = register(&world, "alice@example.com", "Alice").await;
    let bob = register(&world, "bob@example.com", "Bob").await;

    let live = LiveQueryService::new(Arc::clone(&world.store));
    let seen: Arc<std::sync::Mutex<Vec<usize>>> = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let guard = live
        .watch_lists(
            &bob.id,
            Arc::new(move |lists| {
                sink.lock().expect("sink lock").push(lists.len());
            }),
        )
        .await
        .expect("subscribe");

    // Fired once immediately with Bob's (empty) dashboard.
    assert_eq!(*seen.lock().expect("sink lock"), vec![0]);

    // Alice shares a list with Bob: his dashboard updates without polling.
    let list = world
        .lists
        .create_list(&alice.id, groceries(ListShare::Private))
        .await
        .expect("create succeeds");
    world
        .lists
        .add_member_by_email(&alice.id, &list.id, "bob@example.com")
        .await
        .expect("share succeeds");
    assert_eq!(seen.lock().expect("sink lock").last(), Some(&1));

    // After teardown the feed stays silent.
    guard.unsubscribe();
    world
        .lists
        .remove_member(&alice.id, &list.id, &bob.id)
        .await
        .expect("removal succeeds");
    let deliveries = seen.lock().expect("sink lock").len();
    assert_eq!(deliveries, 3, "initial, creation no-op for bob, share");
}

#[tokio::test]
async fn admin_overview_reflects_the_cascade() {
    let world = world();
    register(&world, "admin@admin.com", "Admin").await;
    let admin_user = world
        .accounts
        .login("admin@admin.com", "s3cret")
        .await
        .expect("admin login");
    let alice = register(&world, "alice@example.com", "Alice").await;
    let bob = register(&world, "bob@example.com", "Bob").await;

    let kept = world
        .lists
        .create_list(&alice.id, groceries(ListShare::Private))
        .await
        .expect("create succeeds");
    world
        .lists
        .archive(&alice.id, &kept.id)
        .await
        .expect("archive succeeds");
    world
        .lists
        .create_list(&bob.id, groceries(ListShare::Private))
        .await
        .expect("create succeeds");

    let report = world
        .admin
        .delete_user(&admin_user.id, &bob.id)
        .await
        .expect("cascade runs");
    assert!(report.is_clean());

    let overview = world
        .admin
        .overview(&admin_user.id)
        .await
        .expect("overview");
    assert_eq!(overview.users.len(), 1, "bob is tombstoned, admin filtered");
    assert_eq!(overview.lists.len(), 1, "bob's list died with him");
    assert_eq!(overview.active_lists, 0);
    assert_eq!(overview.archived_lists, 1);
}
