//! Group membership policy service.
//!
//! Groups are owner-administered: every mutating operation checks that the
//! acting user owns the group before touching it, and the owner can never
//! be removed from the member set — deleting the whole group is the only
//! way out.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::domain::list_service::{map_group_repo_error, map_user_directory_error};
use crate::domain::ports::{GroupRepository, UserDirectory};
use crate::domain::{EmailAddress, Error, Group, GroupId, GroupName, User, UserId};

/// Group membership policy service.
#[derive(Clone)]
pub struct GroupService<G, U> {
    groups: Arc<G>,
    users: Arc<U>,
}

impl<G, U> GroupService<G, U> {
    /// Create a new service over the group and user collections.
    pub fn new(groups: Arc<G>, users: Arc<U>) -> Self {
        Self { groups, users }
    }
}

impl<G, U> GroupService<G, U>
where
    G: GroupRepository,
    U: UserDirectory,
{
    /// Create a group owned by `acting`, who becomes its sole member.
    ///
    /// # Errors
    /// `invalid_request` for an empty name, plus repository failures.
    pub async fn create_group(&self, acting: &UserId, raw_name: &str) -> Result<Group, Error> {
        let group_name =
            GroupName::new(raw_name).map_err(|err| Error::invalid_request(err.to_string()))?;
        let group = Group::new(GroupId::random(), group_name, *acting, Utc::now());
        self.groups
            .insert(&group)
            .await
            .map_err(map_group_repo_error)?;
        debug!(group = %group.id, owner = %acting, "group created");
        Ok(group)
    }

    /// Every group owned by `acting`.
    ///
    /// # Errors
    /// Repository failures only.
    pub async fn groups_for_owner(&self, acting: &UserId) -> Result<Vec<Group>, Error> {
        self.groups
            .find_by_owner(acting)
            .await
            .map_err(map_group_repo_error)
    }

    /// Replace the member set wholesale.
    ///
    /// The replacement set is validated here, not trusted from the caller:
    /// a set that does not contain the owner is refused (`forbidden`)
    /// before any write.
    ///
    /// # Errors
    /// `not_found`, `forbidden`, plus repository failures.
    pub async fn set_members(
        &self,
        acting: &UserId,
        group_id: &GroupId,
        new_members: BTreeSet<UserId>,
    ) -> Result<(), Error> {
        let group = self.load_owned(acting, group_id).await?;
        if !new_members.contains(&group.owner_id) {
            return Err(Error::forbidden("the group owner cannot be removed"));
        }
        self.groups
            .set_members(group_id, &new_members)
            .await
            .map_err(map_group_repo_error)
    }

    /// Resolve `raw_email` and add that user to the group.
    ///
    /// # Errors
    /// `invalid_request` for a malformed e-mail, `not_found` for an unknown
    /// or deleted user, `conflict` when already a member, `forbidden` when
    /// `acting` does not own the group, plus repository failures.
    pub async fn add_member_by_email(
        &self,
        acting: &UserId,
        group_id: &GroupId,
        raw_email: &str,
    ) -> Result<User, Error> {
        let group = self.load_owned(acting, group_id).await?;
        let email =
            EmailAddress::new(raw_email).map_err(|err| Error::invalid_request(err.to_string()))?;
        let target = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_directory_error)?
            .filter(|user| !user.deleted)
            .ok_or_else(|| Error::not_found("no user found with this email address"))?;
        if group.contains(&target.id) {
            return Err(Error::conflict("user is already a member"));
        }

        let mut members = group.member_uids;
        members.insert(target.id);
        self.groups
            .set_members(group_id, &members)
            .await
            .map_err(map_group_repo_error)?;
        debug!(group = %group_id, member = %target.id, "group member added");
        Ok(target)
    }

    /// Remove `member` from the group.
    ///
    /// Removing the owner is refused (`forbidden`) before any write.
    /// Removing a user who is not a member is a no-op success.
    ///
    /// # Errors
    /// `not_found`, `forbidden`, plus repository failures.
    pub async fn remove_member(
        &self,
        acting: &UserId,
        group_id: &GroupId,
        member: &UserId,
    ) -> Result<(), Error> {
        let group = self.load_owned(acting, group_id).await?;
        if *member == group.owner_id {
            return Err(Error::forbidden("the group owner cannot be removed"));
        }
        if !group.contains(member) {
            return Ok(());
        }

        let mut members = group.member_uids;
        members.remove(member);
        self.groups
            .set_members(group_id, &members)
            .await
            .map_err(map_group_repo_error)
    }

    /// Delete the group document.
    ///
    /// Lists linked to this group are untouched: they keep their members
    /// and a dangling `linkedGroupId`. The group merely stops being
    /// selectable as a share target.
    ///
    /// # Errors
    /// `not_found`, `forbidden` for non-owners, plus repository failures.
    pub async fn delete_group(&self, acting: &UserId, group_id: &GroupId) -> Result<(), Error> {
        self.load_owned(acting, group_id).await?;
        self.groups
            .delete(group_id)
            .await
            .map_err(map_group_repo_error)?;
        debug!(group = %group_id, "group deleted");
        Ok(())
    }

    async fn load_owned(&self, acting: &UserId, group_id: &GroupId) -> Result<Group, Error> {
        let group = self
            .groups
            .find_by_id(group_id)
            .await
            .map_err(map_group_repo_error)?
            .ok_or_else(|| Error::not_found("group not found"))?;
        if group.owner_id != *acting {
            return Err(Error::forbidden("only the group owner can manage the group"));
        }
        Ok(group)
    }
}
