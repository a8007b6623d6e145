//! Shopping list membership policy service.
//!
//! Owns the rules for who can see and edit a list: the immutable creator,
//! the member set, and the interaction between individually shared members
//! and members derived from a linked group. Every permission check runs
//! before the first mutation so a refused operation never leaves partial
//! state behind.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{
    GroupRepository, GroupRepositoryError, ListRepository, ListRepositoryError, UserDirectory,
    UserDirectoryError,
};
use crate::domain::{
    EmailAddress, Error, GroupId, List, ListId, ListName, ListPatch, ListStatus, User, UserId,
};

pub(crate) fn map_list_repo_error(error: ListRepositoryError) -> Error {
    match error {
        ListRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("list repository unavailable: {message}"))
        }
        ListRepositoryError::Query { message } => {
            Error::internal(format!("list repository error: {message}"))
        }
        ListRepositoryError::MissingList { id } => Error::not_found(format!("list {id} not found")),
    }
}

pub(crate) fn map_group_repo_error(error: GroupRepositoryError) -> Error {
    match error {
        GroupRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("group repository unavailable: {message}"))
        }
        GroupRepositoryError::Query { message } => {
            Error::internal(format!("group repository error: {message}"))
        }
        GroupRepositoryError::MissingGroup { id } => {
            Error::not_found(format!("group {id} not found"))
        }
    }
}

pub(crate) fn map_user_directory_error(error: UserDirectoryError) -> Error {
    match error {
        UserDirectoryError::Connection { message } => {
            Error::service_unavailable(format!("user directory unavailable: {message}"))
        }
        UserDirectoryError::Query { message } => {
            Error::internal(format!("user directory error: {message}"))
        }
        UserDirectoryError::MissingUser { id } => Error::not_found(format!("user {id} not found")),
    }
}

/// Sharing choice made at list creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListShare {
    /// No sharing: the creator is the sole member.
    Private,
    /// Share with an explicit set of users.
    WithMembers(BTreeSet<UserId>),
    /// Share with a group: its current members are snapshotted in and the
    /// list is linked to the group.
    WithGroup(GroupId),
}

/// Request payload for [`ListService::create_list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewList {
    /// Raw list name; validated (trimmed, non-empty) by the service.
    pub list_name: String,
    /// Icon identifier.
    pub icon: String,
    /// Display colour.
    pub color: String,
    /// Optional shop/location tag.
    pub location: Option<String>,
    /// Sharing choice.
    pub share: ListShare,
}

/// Request payload for [`ListService::rename_or_recolor`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPatchRequest {
    /// Replacement name, validated by the service when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_name: Option<String>,
    /// Replacement colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Replacement location tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// List membership policy service.
#[derive(Clone)]
pub struct ListService<L, G, U> {
    lists: Arc<L>,
    groups: Arc<G>,
    users: Arc<U>,
    admin_email: EmailAddress,
}

impl<L, G, U> ListService<L, G, U> {
    /// Create a new service over the list, group, and user collections.
    ///
    /// `admin_email` identifies the administrator account, which can never
    /// be shared into a list.
    pub fn new(lists: Arc<L>, groups: Arc<G>, users: Arc<U>, admin_email: EmailAddress) -> Self {
        Self {
            lists,
            groups,
            users,
            admin_email,
        }
    }
}

impl<L, G, U> ListService<L, G, U>
where
    L: ListRepository,
    G: GroupRepository,
    U: UserDirectory,
{
    /// Create a list for `acting` with the requested sharing choice.
    ///
    /// The creator is always unioned into the initial member set.
    /// `ListShare::WithGroup` snapshots the group's current members and
    /// links the list.
    ///
    /// # Errors
    /// `invalid_request` for an empty name, `not_found` for an unknown
    /// share group, plus repository failures.
    pub async fn create_list(&self, acting: &UserId, request: NewList) -> Result<List, Error> {
        let list_name = ListName::new(&request.list_name)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let (members, linked_group_id) = match request.share {
            ListShare::Private => (BTreeSet::from([*acting]), None),
            ListShare::WithMembers(mut set) => {
                set.insert(*acting);
                (set, None)
            }
            ListShare::WithGroup(group_id) => {
                let group = self
                    .groups
                    .find_by_id(&group_id)
                    .await
                    .map_err(map_group_repo_error)?
                    .ok_or_else(|| Error::not_found("group not found"))?;
                let mut set = group.member_uids.clone();
                set.insert(*acting);
                (set, Some(group_id))
            }
        };

        let list = List {
            id: ListId::random(),
            list_name,
            icon: request.icon,
            color: request.color,
            location: request.location,
            creator_id: *acting,
            members,
            linked_group_id,
            status: ListStatus::Active,
            created_at: Utc::now(),
        };
        self.lists
            .insert(&list)
            .await
            .map_err(map_list_repo_error)?;
        debug!(list = %list.id, creator = %acting, "list created");
        Ok(list)
    }

    /// Every list `acting` is a member of.
    ///
    /// # Errors
    /// Repository failures only.
    pub async fn lists_for_user(&self, acting: &UserId) -> Result<Vec<List>, Error> {
        self.lists
            .find_by_member(acting)
            .await
            .map_err(map_list_repo_error)
    }

    /// Union `member` into the list's member set.
    ///
    /// Idempotent: adding a user who is already a member is a no-op
    /// success, and two concurrent calls converge to the union.
    ///
    /// # Errors
    /// `not_found` for an unknown list, `forbidden` when `acting` is not a
    /// member, plus repository failures.
    pub async fn add_member(
        &self,
        acting: &UserId,
        list_id: &ListId,
        member: &UserId,
    ) -> Result<(), Error> {
        let list = self.load(list_id).await?;
        Self::ensure_member(&list, acting)?;
        self.lists
            .add_member(list_id, member)
            .await
            .map_err(map_list_repo_error)
    }

    /// Resolve `raw_email` and share the list with that user.
    ///
    /// Checks run in order, all before the mutation: e-mail shape, sharing
    /// with yourself (`conflict`), sharing with the administrator
    /// (`forbidden`), unknown or deleted target (`not_found`), already a
    /// member (`conflict`).
    ///
    /// # Errors
    /// As above, plus repository failures.
    pub async fn add_member_by_email(
        &self,
        acting: &UserId,
        list_id: &ListId,
        raw_email: &str,
    ) -> Result<User, Error> {
        let list = self.load(list_id).await?;
        Self::ensure_member(&list, acting)?;

        let email =
            EmailAddress::new(raw_email).map_err(|err| Error::invalid_request(err.to_string()))?;

        let acting_user = self
            .users
            .find_by_id(acting)
            .await
            .map_err(map_user_directory_error)?
            .ok_or_else(|| Error::not_found("acting user not found"))?;
        if acting_user.email == email {
            return Err(Error::conflict("you are already a member of this list"));
        }
        if email == self.admin_email {
            return Err(Error::forbidden("the admin account cannot be added to lists"));
        }

        let target = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_directory_error)?
            .filter(|user| !user.deleted)
            .ok_or_else(|| Error::not_found("no user found with this email address"))?;
        if list.is_member(&target.id) {
            return Err(Error::conflict("this user is already a member of this list"));
        }

        self.lists
            .add_member(list_id, &target.id)
            .await
            .map_err(map_list_repo_error)?;
        debug!(list = %list_id, member = %target.id, "list shared by email");
        Ok(target)
    }

    /// Remove `member` from the list.
    ///
    /// Refused (`forbidden`, checked before any write) when `member` is the
    /// creator, or when the list is linked to a group that still contains
    /// `member` — the caller must remove them from the group or unlink the
    /// list first. A dangling link to a deleted group does not block
    /// removal. Otherwise removal is unconditional, even when it leaves the
    /// creator alone.
    ///
    /// # Errors
    /// `not_found`, `forbidden`, plus repository failures.
    pub async fn remove_member(
        &self,
        acting: &UserId,
        list_id: &ListId,
        member: &UserId,
    ) -> Result<(), Error> {
        let list = self.load(list_id).await?;
        Self::ensure_member(&list, acting)?;

        if *member == list.creator_id {
            return Err(Error::forbidden("the list creator cannot be removed"));
        }
        if let Some(group_id) = list.linked_group_id {
            let group = self
                .groups
                .find_by_id(&group_id)
                .await
                .map_err(map_group_repo_error)?;
            if group.is_some_and(|g| g.contains(member)) {
                return Err(Error::forbidden(
                    "this member belongs to the linked group; remove them from the group or \
                     unlink this list from the group first",
                ));
            }
        }

        self.lists
            .remove_member(list_id, member)
            .await
            .map_err(map_list_repo_error)
    }

    /// Apply a partial presentation update (name, colour, location).
    ///
    /// # Errors
    /// `invalid_request` for a provided-but-empty name, `not_found`,
    /// `forbidden` for non-members, plus repository failures.
    pub async fn rename_or_recolor(
        &self,
        acting: &UserId,
        list_id: &ListId,
        request: ListPatchRequest,
    ) -> Result<(), Error> {
        let list = self.load(list_id).await?;
        Self::ensure_member(&list, acting)?;

        let list_name = request
            .list_name
            .map(|raw| ListName::new(&raw))
            .transpose()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let patch = ListPatch {
            list_name,
            color: request.color,
            location: request.location,
        };
        if patch.is_empty() {
            return Ok(());
        }
        self.lists
            .apply_patch(list_id, &patch)
            .await
            .map_err(map_list_repo_error)
    }

    /// Archive the list. Archiving an already-archived list is a no-op
    /// success.
    ///
    /// # Errors
    /// `not_found`, `forbidden` for non-members, plus repository failures.
    pub async fn archive(&self, acting: &UserId, list_id: &ListId) -> Result<(), Error> {
        self.set_status(acting, list_id, ListStatus::Archived).await
    }

    /// Reactivate the list. Idempotent like [`archive`](Self::archive).
    ///
    /// # Errors
    /// `not_found`, `forbidden` for non-members, plus repository failures.
    pub async fn reactivate(&self, acting: &UserId, list_id: &ListId) -> Result<(), Error> {
        self.set_status(acting, list_id, ListStatus::Active).await
    }

    /// Delete the list and every one of its items as one atomic batch.
    ///
    /// Only the creator may delete a list.
    ///
    /// # Errors
    /// `not_found`, `forbidden` for non-creators, plus repository failures.
    pub async fn delete_list(&self, acting: &UserId, list_id: &ListId) -> Result<(), Error> {
        let list = self.load(list_id).await?;
        if *acting != list.creator_id {
            return Err(Error::forbidden("only the creator can delete a list"));
        }
        self.lists
            .delete_with_items(list_id)
            .await
            .map_err(map_list_repo_error)?;
        debug!(list = %list_id, "list deleted with items");
        Ok(())
    }

    async fn set_status(
        &self,
        acting: &UserId,
        list_id: &ListId,
        status: ListStatus,
    ) -> Result<(), Error> {
        let list = self.load(list_id).await?;
        Self::ensure_member(&list, acting)?;
        self.lists
            .set_status(list_id, status)
            .await
            .map_err(map_list_repo_error)
    }

    async fn load(&self, list_id: &ListId) -> Result<List, Error> {
        self.lists
            .find_by_id(list_id)
            .await
            .map_err(map_list_repo_error)?
            .ok_or_else(|| Error::not_found("list not found"))
    }

    fn ensure_member(list: &List, acting: &UserId) -> Result<(), Error> {
        if list.is_member(acting) {
            Ok(())
        } else {
            Err(Error::forbidden("you are not a member of this list"))
        }
    }
}
