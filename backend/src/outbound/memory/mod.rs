//! In-process document store implementing every domain port.
//!
//! Stands in for the external backend-as-a-service in tests, demos, and
//! seeding. One mutex guards all four collections, which makes the member
//! set operations and the cross-collection delete batch trivially atomic:
//! two concurrent `add_member` calls converge to the union, and
//! `delete_with_items` can never be observed half-done. Subscriber
//! callbacks run after the data lock is released so a callback may call
//! back into the store.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::ports::{
    AuthAccount, ChangeFeed, ChangeFeedError, GroupRepository, GroupRepositoryError,
    GroupsCallback, IdentityError, IdentityProvider, ItemRepository, ItemRepositoryError,
    ItemsCallback, ListRepository, ListRepositoryError, ListsCallback, UserDirectory,
    UserDirectoryError, WatchGuard,
};
use crate::domain::{
    EmailAddress, Group, GroupId, Item, ItemId, ItemPatch, List, ListId, ListPatch, ListStatus,
    User, UserId,
};

#[derive(Default)]
struct Collections {
    users: HashMap<UserId, User>,
    lists: HashMap<ListId, List>,
    items: HashMap<ItemId, Item>,
    groups: HashMap<GroupId, Group>,
    credentials: HashMap<EmailAddress, (UserId, String)>,
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    lists: HashMap<u64, (UserId, ListsCallback)>,
    items: HashMap<u64, (ListId, ItemsCallback)>,
    groups: HashMap<u64, (UserId, GroupsCallback)>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory document store, identity provider, and change feed.
///
/// Clones share the same underlying state, mirroring how independent
/// clients share one remote backend.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Collections>>,
    subscribers: Arc<Mutex<Subscribers>>,
    fail_next_write: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next mutating operation fail with a `Query` error.
    ///
    /// The failure is checked before anything is written, so the injected
    /// fault never leaves partial state — which is exactly what the
    /// atomicity and best-effort-cascade tests need to observe.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    fn take_injected_failure(&self) -> bool {
        self.fail_next_write.swap(false, Ordering::SeqCst)
    }

    fn lists_snapshot_for(data: &Collections, member: &UserId) -> Vec<List> {
        let mut lists: Vec<List> = data
            .lists
            .values()
            .filter(|list| list.is_member(member))
            .cloned()
            .collect();
        lists.sort_by_key(|list| list.id);
        lists
    }

    fn items_snapshot_for(data: &Collections, list: &ListId) -> Vec<Item> {
        let mut items: Vec<Item> = data
            .items
            .values()
            .filter(|item| item.list_id == *list)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id);
        items
    }

    fn groups_snapshot_for(data: &Collections, owner: &UserId) -> Vec<Group> {
        let mut groups: Vec<Group> = data
            .groups
            .values()
            .filter(|group| group.owner_id == *owner)
            .cloned()
            .collect();
        groups.sort_by_key(|group| group.id);
        groups
    }

    /// Deliver fresh list snapshots to every list subscriber.
    fn notify_list_subscribers(&self) {
        let pending: Vec<(ListsCallback, Vec<List>)> = {
            let data = lock(&self.data);
            let subs = lock(&self.subscribers);
            subs.lists
                .values()
                .map(|(member, callback)| {
                    (
                        Arc::clone(callback),
                        Self::lists_snapshot_for(&data, member),
                    )
                })
                .collect()
        };
        for (callback, snapshot) in pending {
            callback(snapshot);
        }
    }

    fn notify_item_subscribers(&self, list: &ListId) {
        let pending: Vec<(ItemsCallback, Vec<Item>)> = {
            let data = lock(&self.data);
            let subs = lock(&self.subscribers);
            subs.items
                .values()
                .filter(|(watched, _)| watched == list)
                .map(|(watched, callback)| {
                    (Arc::clone(callback), Self::items_snapshot_for(&data, watched))
                })
                .collect()
        };
        for (callback, snapshot) in pending {
            callback(snapshot);
        }
    }

    fn notify_group_subscribers(&self) {
        let pending: Vec<(GroupsCallback, Vec<Group>)> = {
            let data = lock(&self.data);
            let subs = lock(&self.subscribers);
            subs.groups
                .values()
                .map(|(owner, callback)| {
                    (
                        Arc::clone(callback),
                        Self::groups_snapshot_for(&data, owner),
                    )
                })
                .collect()
        };
        for (callback, snapshot) in pending {
            callback(snapshot);
        }
    }

    fn unsubscribe_guard(subscribers: &Arc<Mutex<Subscribers>>, id: u64, kind: WatchKind) -> WatchGuard {
        let registry = Arc::clone(subscribers);
        WatchGuard::new(move || {
            let mut subs = lock(&registry);
            match kind {
                WatchKind::Lists => {
                    subs.lists.remove(&id);
                }
                WatchKind::Items => {
                    subs.items.remove(&id);
                }
                WatchKind::Groups => {
                    subs.groups.remove(&id);
                }
            }
        })
    }
}

#[derive(Clone, Copy)]
enum WatchKind {
    Lists,
    Items,
    Groups,
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn upsert(&self, user: &User) -> Result<(), UserDirectoryError> {
        if self.take_injected_failure() {
            return Err(UserDirectoryError::Query {
                message: "injected failure".to_owned(),
            });
        }
        lock(&self.data).users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserDirectoryError> {
        Ok(lock(&self.data).users.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserDirectoryError> {
        Ok(lock(&self.data)
            .users
            .values()
            .find(|user| user.email == *email)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserDirectoryError> {
        let mut users: Vec<User> = lock(&self.data).users.values().cloned().collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    async fn set_preferences(
        &self,
        id: &UserId,
        preferences: Value,
    ) -> Result<(), UserDirectoryError> {
        if self.take_injected_failure() {
            return Err(UserDirectoryError::Query {
                message: "injected failure".to_owned(),
            });
        }
        let mut data = lock(&self.data);
        let user = data
            .users
            .get_mut(id)
            .ok_or_else(|| UserDirectoryError::MissingUser { id: id.to_string() })?;
        user.preferences = preferences;
        Ok(())
    }

    async fn mark_deleted(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserDirectoryError> {
        if self.take_injected_failure() {
            return Err(UserDirectoryError::Query {
                message: "injected failure".to_owned(),
            });
        }
        let mut data = lock(&self.data);
        let user = data
            .users
            .get_mut(id)
            .ok_or_else(|| UserDirectoryError::MissingUser { id: id.to_string() })?;
        user.deleted = true;
        user.deleted_at = Some(at);
        Ok(())
    }
}

#[async_trait]
impl ListRepository for MemoryStore {
    async fn insert(&self, list: &List) -> Result<(), ListRepositoryError> {
        if self.take_injected_failure() {
            return Err(ListRepositoryError::Query {
                message: "injected failure".to_owned(),
            });
        }
        lock(&self.data).lists.insert(list.id, list.clone());
        self.notify_list_subscribers();
        Ok(())
    }

    async fn find_by_id(&self, id: &ListId) -> Result<Option<List>, ListRepositoryError> {
        Ok(lock(&self.data).lists.get(id).cloned())
    }

    async fn find_by_member(&self, member: &UserId) -> Result<Vec<List>, ListRepositoryError> {
        Ok(Self::lists_snapshot_for(&lock(&self.data), member))
    }

    async fn list_all(&self) -> Result<Vec<List>, ListRepositoryError> {
        let mut lists: Vec<List> = lock(&self.data).lists.values().cloned().collect();
        lists.sort_by_key(|list| list.id);
        Ok(lists)
    }

    async fn apply_patch(
        &self,
        id: &ListId,
        patch: &ListPatch,
    ) -> Result<(), ListRepositoryError> {
        self.mutate_list(id, |list| {
            if let Some(name) = &patch.list_name {
                list.list_name = name.clone();
            }
            if let Some(color) = &patch.color {
                list.color.clone_from(color);
            }
            if let Some(location) = &patch.location {
                if location.is_empty() {
                    list.location = None;
                } else {
                    list.location = Some(location.clone());
                }
            }
        })
        .await
    }

    async fn set_status(
        &self,
        id: &ListId,
        status: ListStatus,
    ) -> Result<(), ListRepositoryError> {
        self.mutate_list(id, |list| list.status = status).await
    }

    async fn add_member(&self, id: &ListId, member: &UserId) -> Result<(), ListRepositoryError> {
        let member = *member;
        self.mutate_list(id, move |list| {
            list.members.insert(member);
        })
        .await
    }

    async fn remove_member(
        &self,
        id: &ListId,
        member: &UserId,
    ) -> Result<(), ListRepositoryError> {
        let member = *member;
        self.mutate_list(id, move |list| {
            list.members.remove(&member);
        })
        .await
    }

    async fn link_group(
        &self,
        id: &ListId,
        group: &GroupId,
        members_to_add: &BTreeSet<UserId>,
    ) -> Result<(), ListRepositoryError> {
        let group = *group;
        let members = members_to_add.clone();
        self.mutate_list(id, move |list| {
            list.linked_group_id = Some(group);
            list.members.extend(members.iter().copied());
        })
        .await
    }

    async fn unlink_group(&self, id: &ListId) -> Result<(), ListRepositoryError> {
        self.mutate_list(id, |list| list.linked_group_id = None)
            .await
    }

    async fn replace_creator(
        &self,
        id: &ListId,
        new_creator: &UserId,
        members: &BTreeSet<UserId>,
    ) -> Result<(), ListRepositoryError> {
        let new_creator = *new_creator;
        let members = members.clone();
        self.mutate_list(id, move |list| {
            list.creator_id = new_creator;
            list.members = members.clone();
        })
        .await
    }

    async fn delete_with_items(&self, id: &ListId) -> Result<(), ListRepositoryError> {
        if self.take_injected_failure() {
            return Err(ListRepositoryError::Query {
                message: "injected failure".to_owned(),
            });
        }
        {
            let mut data = lock(&self.data);
            if data.lists.remove(id).is_none() {
                return Err(ListRepositoryError::MissingList { id: id.to_string() });
            }
            data.items.retain(|_, item| item.list_id != *id);
        }
        self.notify_list_subscribers();
        self.notify_item_subscribers(id);
        Ok(())
    }
}

impl MemoryStore {
    async fn mutate_list(
        &self,
        id: &ListId,
        mutate: impl FnOnce(&mut List) + Send,
    ) -> Result<(), ListRepositoryError> {
        if self.take_injected_failure() {
            return Err(ListRepositoryError::Query {
                message: "injected failure".to_owned(),
            });
        }
        {
            let mut data = lock(&self.data);
            let list = data
                .lists
                .get_mut(id)
                .ok_or_else(|| ListRepositoryError::MissingList { id: id.to_string() })?;
            mutate(list);
        }
        self.notify_list_subscribers();
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn insert(&self, group: &Group) -> Result<(), GroupRepositoryError> {
        if self.take_injected_failure() {
            return Err(GroupRepositoryError::Query {
                message: "injected failure".to_owned(),
            });
        }
        lock(&self.data).groups.insert(group.id, group.clone());
        self.notify_group_subscribers();
        Ok(())
    }

    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, GroupRepositoryError> {
        Ok(lock(&self.data).groups.get(id).cloned())
    }

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Group>, GroupRepositoryError> {
        Ok(Self::groups_snapshot_for(&lock(&self.data), owner))
    }

    async fn set_members(
        &self,
        id: &GroupId,
        members: &BTreeSet<UserId>,
    ) -> Result<(), GroupRepositoryError> {
        if self.take_injected_failure() {
            return Err(GroupRepositoryError::Query {
                message: "injected failure".to_owned(),
            });
        }
        {
            let mut data = lock(&self.data);
            let group = data
                .groups
                .get_mut(id)
                .ok_or_else(|| GroupRepositoryError::MissingGroup { id: id.to_string() })?;
            group.member_uids = members.clone();
        }
        self.notify_group_subscribers();
        Ok(())
    }

    async fn delete(&self, id: &GroupId) -> Result<(), GroupRepositoryError> {
        if self.take_injected_failure() {
            return Err(GroupRepositoryError::Query {
                message: "injected failure".to_owned(),
            });
        }
        {
            let mut data = lock(&self.data);
            if data.groups.remove(id).is_none() {
                return Err(GroupRepositoryError::MissingGroup { id: id.to_string() });
            }
            // Linked lists keep their dangling linkedGroupId on purpose.
        }
        self.notify_group_subscribers();
        Ok(())
    }
}

#[async_trait]
impl ItemRepository for MemoryStore {
    async fn insert(&self, item: &Item) -> Result<(), ItemRepositoryError> {
        if self.take_injected_failure() {
            return Err(ItemRepositoryError::Query {
                message: "injected failure".to_owned(),
            });
        }
        let list_id = item.list_id;
        lock(&self.data).items.insert(item.id, item.clone());
        self.notify_item_subscribers(&list_id);
        Ok(())
    }

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, ItemRepositoryError> {
        Ok(lock(&self.data).items.get(id).cloned())
    }

    async fn find_by_list(&self, list: &ListId) -> Result<Vec<Item>, ItemRepositoryError> {
        Ok(Self::items_snapshot_for(&lock(&self.data), list))
    }

    async fn set_purchased(
        &self,
        id: &ItemId,
        purchased: bool,
    ) -> Result<(), ItemRepositoryError> {
        self.mutate_item(id, move |item| item.is_purchased = purchased)
            .await
    }

    async fn apply_patch(&self, id: &ItemId, patch: &ItemPatch) -> Result<(), ItemRepositoryError> {
        let patch = patch.clone();
        self.mutate_item(id, move |item| {
            if let Some(name) = patch.item_name {
                item.item_name = name;
            }
            if let Some(quantity) = patch.quantity {
                item.quantity = quantity;
            }
            if let Some(unit) = patch.unit {
                item.unit = unit;
            }
        })
        .await
    }

    async fn delete(&self, id: &ItemId) -> Result<(), ItemRepositoryError> {
        if self.take_injected_failure() {
            return Err(ItemRepositoryError::Query {
                message: "injected failure".to_owned(),
            });
        }
        let list_id = {
            let mut data = lock(&self.data);
            let item = data
                .items
                .remove(id)
                .ok_or_else(|| ItemRepositoryError::MissingItem { id: id.to_string() })?;
            item.list_id
        };
        self.notify_item_subscribers(&list_id);
        Ok(())
    }
}

impl MemoryStore {
    async fn mutate_item(
        &self,
        id: &ItemId,
        mutate: impl FnOnce(&mut Item) + Send,
    ) -> Result<(), ItemRepositoryError> {
        if self.take_injected_failure() {
            return Err(ItemRepositoryError::Query {
                message: "injected failure".to_owned(),
            });
        }
        let list_id = {
            let mut data = lock(&self.data);
            let item = data
                .items
                .get_mut(id)
                .ok_or_else(|| ItemRepositoryError::MissingItem { id: id.to_string() })?;
            mutate(item);
            item.list_id
        };
        self.notify_item_subscribers(&list_id);
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MemoryStore {
    async fn register(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<AuthAccount, IdentityError> {
        let mut data = lock(&self.data);
        if data.credentials.contains_key(email) {
            return Err(IdentityError::EmailTaken);
        }
        let id = UserId::random();
        data.credentials
            .insert(email.clone(), (id, password.to_owned()));
        Ok(AuthAccount {
            id,
            email: email.clone(),
        })
    }

    async fn authenticate(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<AuthAccount, IdentityError> {
        let data = lock(&self.data);
        match data.credentials.get(email) {
            Some((id, stored)) if stored == password => Ok(AuthAccount {
                id: *id,
                email: email.clone(),
            }),
            _ => Err(IdentityError::InvalidCredentials),
        }
    }
}

#[async_trait]
impl ChangeFeed for MemoryStore {
    async fn watch_lists(
        &self,
        member: &UserId,
        callback: ListsCallback,
    ) -> Result<WatchGuard, ChangeFeedError> {
        let (id, snapshot) = {
            let data = lock(&self.data);
            let mut subs = lock(&self.subscribers);
            let id = subs.next_id;
            subs.next_id += 1;
            subs.lists.insert(id, (*member, Arc::clone(&callback)));
            (id, Self::lists_snapshot_for(&data, member))
        };
        callback(snapshot);
        Ok(Self::unsubscribe_guard(&self.subscribers, id, WatchKind::Lists))
    }

    async fn watch_items(
        &self,
        list: &ListId,
        callback: ItemsCallback,
    ) -> Result<WatchGuard, ChangeFeedError> {
        let (id, snapshot) = {
            let data = lock(&self.data);
            let mut subs = lock(&self.subscribers);
            let id = subs.next_id;
            subs.next_id += 1;
            subs.items.insert(id, (*list, Arc::clone(&callback)));
            (id, Self::items_snapshot_for(&data, list))
        };
        callback(snapshot);
        Ok(Self::unsubscribe_guard(&self.subscribers, id, WatchKind::Items))
    }

    async fn watch_groups(
        &self,
        owner: &UserId,
        callback: GroupsCallback,
    ) -> Result<WatchGuard, ChangeFeedError> {
        let (id, snapshot) = {
            let data = lock(&self.data);
            let mut subs = lock(&self.subscribers);
            let id = subs.next_id;
            subs.next_id += 1;
            subs.groups.insert(id, (*owner, Arc::clone(&callback)));
            (id, Self::groups_snapshot_for(&data, owner))
        };
        callback(snapshot);
        Ok(Self::unsubscribe_guard(&self.subscribers, id, WatchKind::Groups))
    }
}
