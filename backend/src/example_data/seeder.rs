//! Replays a generated household into the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use example_data::{ExampleHousehold, SeedRegistry, generate_example_household};
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    AccountService, AdminSettings, Error, GroupLinkService, GroupService, ItemService, ListId,
    ListService, ListShare, NewItem, NewList, UserId,
};
use crate::example_data::ExampleDataSettings;
use crate::outbound::memory::MemoryStore;

/// Password shared by every seeded account. Demo data only.
const EXAMPLE_PASSWORD: &str = "example-data";

/// What a seeding run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// How many users were registered.
    pub users: usize,
    /// How many lists were created.
    pub lists: usize,
    /// How many items were added.
    pub items: usize,
}

/// Seed the store with the configured household, if seeding is enabled.
///
/// Every entity goes through the real services (registration, group
/// membership, list sharing, items), so the seeded state satisfies the
/// same invariants live traffic would.
///
/// Returns `Ok(None)` when seeding is disabled.
///
/// # Errors
/// Surfaces any domain error raised while replaying the household, plus
/// `not_found` for an unknown seed name.
pub async fn seed_memory_store(
    store: &Arc<MemoryStore>,
    settings: &ExampleDataSettings,
) -> Result<Option<SeedSummary>, Error> {
    if !settings.enabled {
        return Ok(None);
    }

    let registry = SeedRegistry::builtin()
        .map_err(|err| Error::internal(format!("builtin seed registry: {err}")))?;
    let seed_def = registry
        .find_seed(settings.seed_name())
        .ok_or_else(|| Error::not_found(format!("unknown seed '{}'", settings.seed_name())))?;
    let household = generate_example_household(&registry, seed_def)
        .map_err(|err| Error::internal(format!("example data generation: {err}")))?;

    let summary = replay(store, &household).await?;
    info!(
        seed = settings.seed_name(),
        users = summary.users,
        lists = summary.lists,
        items = summary.items,
        "example data seeded"
    );
    Ok(Some(summary))
}

async fn replay(store: &Arc<MemoryStore>, household: &ExampleHousehold) -> Result<SeedSummary, Error> {
    let accounts = AccountService::new(Arc::clone(store), Arc::clone(store));
    let groups = GroupService::new(Arc::clone(store), Arc::clone(store));
    let lists = ListService::new(
        Arc::clone(store),
        Arc::clone(store),
        Arc::clone(store),
        AdminSettings { email: None }.email(),
    );
    let links = GroupLinkService::new(Arc::clone(store), Arc::clone(store));
    let items = ItemService::new(Arc::clone(store), Arc::clone(store));

    // Register everyone, remembering seed id → live id and seed id → email.
    let mut live_user_ids: HashMap<Uuid, UserId> = HashMap::new();
    let mut emails: HashMap<Uuid, &str> = HashMap::new();
    for seed_user in &household.users {
        let user = accounts
            .register(&seed_user.email, EXAMPLE_PASSWORD, &seed_user.display_name)
            .await?;
        live_user_ids.insert(seed_user.id, user.id);
        emails.insert(seed_user.id, seed_user.email.as_str());
    }

    let lookup_user = |seed_id: &Uuid| -> Result<UserId, Error> {
        live_user_ids
            .get(seed_id)
            .copied()
            .ok_or_else(|| Error::internal("seed references an unknown user"))
    };

    // The household group, then the rest of its members by e-mail.
    let owner = lookup_user(&household.group.owner_id)?;
    let group = groups
        .create_group(&owner, &household.group.group_name)
        .await?;
    for member in &household.group.member_uids {
        if *member == household.group.owner_id {
            continue;
        }
        let email = emails
            .get(member)
            .copied()
            .ok_or_else(|| Error::internal("seed references an unknown member"))?;
        groups.add_member_by_email(&owner, &group.id, email).await?;
    }

    // Lists: the household list is group-shared, the rest are private.
    let mut live_list_ids: HashMap<Uuid, ListId> = HashMap::new();
    for seed_list in &household.lists {
        let creator = lookup_user(&seed_list.creator_id)?;
        let share = if seed_list.linked_to_group {
            ListShare::WithGroup(group.id)
        } else {
            ListShare::Private
        };
        let list = lists
            .create_list(
                &creator,
                NewList {
                    list_name: seed_list.list_name.clone(),
                    icon: seed_list.icon.clone(),
                    color: seed_list.color.clone(),
                    location: None,
                    share,
                },
            )
            .await?;
        if seed_list.linked_to_group {
            links.link_list_to_group(&owner, &list.id, &group.id).await?;
        }
        live_list_ids.insert(seed_list.id, list.id);
    }

    let mut item_count = 0_usize;
    for seed_item in &household.items {
        let list_id = live_list_ids
            .get(&seed_item.list_id)
            .ok_or_else(|| Error::internal("seed references an unknown list"))?;
        let added_by = lookup_user(&seed_item.added_by)?;
        let item = items
            .add_item(
                &added_by,
                list_id,
                NewItem {
                    item_name: seed_item.item_name.clone(),
                    quantity: Some(seed_item.quantity.clone()),
                    unit: Some(seed_item.unit.clone()),
                },
            )
            .await?;
        if seed_item.is_purchased {
            items.toggle_purchased(&added_by, &item.id).await?;
        }
        item_count += 1;
    }

    Ok(SeedSummary {
        users: household.users.len(),
        lists: household.lists.len(),
        items: item_count,
    })
}
