//! Link/unlink reconciliation between groups and lists.
//!
//! Linking snapshots the group's member set into the list; it does not
//! subscribe the list to future group changes. A list linked to a group
//! that later gains members only picks them up when it is re-linked. This
//! eventual (not live) consistency is deliberate and load-bearing: the
//! individual-share and group-share flows would otherwise race each other.

use std::sync::Arc;

use tracing::debug;

use crate::domain::list_service::{map_group_repo_error, map_list_repo_error};
use crate::domain::ports::{GroupRepository, ListRepository};
use crate::domain::{Error, GroupId, List, ListId, UserId};

/// Group link reconciliation service.
#[derive(Clone)]
pub struct GroupLinkService<L, G> {
    lists: Arc<L>,
    groups: Arc<G>,
}

impl<L, G> GroupLinkService<L, G> {
    /// Create a new service over the list and group collections.
    pub fn new(lists: Arc<L>, groups: Arc<G>) -> Self {
        Self { lists, groups }
    }
}

impl<L, G> GroupLinkService<L, G>
where
    L: ListRepository,
    G: GroupRepository,
{
    /// Link the list to the group: union the group's current members into
    /// the list's member set and record the link, as one update.
    ///
    /// Re-linking an already-linked list re-snapshots the group — this is
    /// the only way group membership changes reach the list.
    ///
    /// # Errors
    /// `not_found` for an unknown list or group, `forbidden` when `acting`
    /// is not a list member or does not own the group, plus repository
    /// failures.
    pub async fn link_list_to_group(
        &self,
        acting: &UserId,
        list_id: &ListId,
        group_id: &GroupId,
    ) -> Result<(), Error> {
        let list = self.load_list(list_id).await?;
        if !list.is_member(acting) {
            return Err(Error::forbidden("you are not a member of this list"));
        }
        let group = self
            .groups
            .find_by_id(group_id)
            .await
            .map_err(map_group_repo_error)?
            .ok_or_else(|| Error::not_found("group not found"))?;
        if group.owner_id != *acting {
            return Err(Error::forbidden("only the group owner can share with the group"));
        }

        self.lists
            .link_group(list_id, group_id, &group.member_uids)
            .await
            .map_err(map_list_repo_error)?;
        debug!(list = %list_id, group = %group_id, "list linked to group");
        Ok(())
    }

    /// Unlink the list from its group.
    ///
    /// Only the link is cleared. Members gained through the group remain
    /// full list members ("current members will stay"); unlinking never
    /// prunes the member set.
    ///
    /// # Errors
    /// `not_found`, `forbidden` for non-members, plus repository failures.
    pub async fn unlink_list_from_group(
        &self,
        acting: &UserId,
        list_id: &ListId,
    ) -> Result<(), Error> {
        let list = self.load_list(list_id).await?;
        if !list.is_member(acting) {
            return Err(Error::forbidden("you are not a member of this list"));
        }
        self.lists
            .unlink_group(list_id)
            .await
            .map_err(map_list_repo_error)?;
        debug!(list = %list_id, "list unlinked from group");
        Ok(())
    }

    async fn load_list(&self, list_id: &ListId) -> Result<List, Error> {
        self.lists
            .find_by_id(list_id)
            .await
            .map_err(map_list_repo_error)?
            .ok_or_else(|| Error::not_found("list not found"))
    }
}
