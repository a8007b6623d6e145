//! Shopping list item service.
//!
//! Items inherit their access rules from the owning list: any current list
//! member may add, edit, check off, or delete items. Toggle and patch are
//! field-level writes; concurrent edits to the same field are
//! last-writer-wins, which the UI accepts.

use std::sync::Arc;

use tracing::debug;

use crate::domain::list_service::map_list_repo_error;
use crate::domain::ports::{ItemRepository, ItemRepositoryError, ListRepository};
use crate::domain::{Error, Item, ItemId, ItemName, ItemPatch, ListId, UserId};

pub(crate) fn map_item_repo_error(error: ItemRepositoryError) -> Error {
    match error {
        ItemRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("item repository unavailable: {message}"))
        }
        ItemRepositoryError::Query { message } => {
            Error::internal(format!("item repository error: {message}"))
        }
        ItemRepositoryError::MissingItem { id } => Error::not_found(format!("item {id} not found")),
    }
}

/// Request payload for [`ItemService::add_item`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewItem {
    /// Raw item name; validated (trimmed, non-empty) by the service.
    pub item_name: String,
    /// Optional free-text quantity.
    pub quantity: Option<String>,
    /// Optional free-text unit.
    pub unit: Option<String>,
}

/// Request payload for [`ItemService::update_item`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatchRequest {
    /// Replacement name, validated by the service when present.
    pub item_name: Option<String>,
    /// Replacement quantity (empty string clears it).
    pub quantity: Option<String>,
    /// Replacement unit (empty string clears it).
    pub unit: Option<String>,
}

/// Item policy service.
#[derive(Clone)]
pub struct ItemService<I, L> {
    items: Arc<I>,
    lists: Arc<L>,
}

impl<I, L> ItemService<I, L> {
    /// Create a new service over the item and list collections.
    pub fn new(items: Arc<I>, lists: Arc<L>) -> Self {
        Self { items, lists }
    }
}

impl<I, L> ItemService<I, L>
where
    I: ItemRepository,
    L: ListRepository,
{
    /// Add an item to the list, unpurchased, attributed to `acting`.
    ///
    /// # Errors
    /// `invalid_request` for an empty name, `not_found` for an unknown
    /// list, `forbidden` for non-members, plus repository failures.
    pub async fn add_item(
        &self,
        acting: &UserId,
        list_id: &ListId,
        request: NewItem,
    ) -> Result<Item, Error> {
        self.ensure_list_member(acting, list_id).await?;
        let item_name = ItemName::new(&request.item_name)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let item = Item {
            id: ItemId::random(),
            list_id: *list_id,
            item_name,
            quantity: request.quantity.unwrap_or_default(),
            unit: request.unit.unwrap_or_default(),
            is_purchased: false,
            added_by: *acting,
        };
        self.items
            .insert(&item)
            .await
            .map_err(map_item_repo_error)?;
        debug!(item = %item.id, list = %list_id, "item added");
        Ok(item)
    }

    /// Every item of the list.
    ///
    /// # Errors
    /// `not_found`, `forbidden` for non-members, plus repository failures.
    pub async fn items_for_list(
        &self,
        acting: &UserId,
        list_id: &ListId,
    ) -> Result<Vec<Item>, Error> {
        self.ensure_list_member(acting, list_id).await?;
        self.items
            .find_by_list(list_id)
            .await
            .map_err(map_item_repo_error)
    }

    /// Flip the checked-off flag.
    ///
    /// # Errors
    /// `not_found`, `forbidden` for non-members, plus repository failures.
    pub async fn toggle_purchased(&self, acting: &UserId, item_id: &ItemId) -> Result<(), Error> {
        let item = self.load(item_id).await?;
        self.ensure_list_member(acting, &item.list_id).await?;
        self.items
            .set_purchased(item_id, !item.is_purchased)
            .await
            .map_err(map_item_repo_error)
    }

    /// Apply a partial update (name, quantity, unit).
    ///
    /// # Errors
    /// `invalid_request` for a provided-but-empty name, `not_found`,
    /// `forbidden` for non-members, plus repository failures.
    pub async fn update_item(
        &self,
        acting: &UserId,
        item_id: &ItemId,
        request: ItemPatchRequest,
    ) -> Result<(), Error> {
        let item = self.load(item_id).await?;
        self.ensure_list_member(acting, &item.list_id).await?;

        let item_name = request
            .item_name
            .map(|raw| ItemName::new(&raw))
            .transpose()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let patch = ItemPatch {
            item_name,
            quantity: request.quantity,
            unit: request.unit,
        };
        if patch.is_empty() {
            return Ok(());
        }
        self.items
            .apply_patch(item_id, &patch)
            .await
            .map_err(map_item_repo_error)
    }

    /// Delete a single item.
    ///
    /// # Errors
    /// `not_found`, `forbidden` for non-members, plus repository failures.
    pub async fn delete_item(&self, acting: &UserId, item_id: &ItemId) -> Result<(), Error> {
        let item = self.load(item_id).await?;
        self.ensure_list_member(acting, &item.list_id).await?;
        self.items
            .delete(item_id)
            .await
            .map_err(map_item_repo_error)
    }

    async fn load(&self, item_id: &ItemId) -> Result<Item, Error> {
        self.items
            .find_by_id(item_id)
            .await
            .map_err(map_item_repo_error)?
            .ok_or_else(|| Error::not_found("item not found"))
    }

    async fn ensure_list_member(&self, acting: &UserId, list_id: &ListId) -> Result<(), Error> {
        let list = self
            .lists
            .find_by_id(list_id)
            .await
            .map_err(map_list_repo_error)?
            .ok_or_else(|| Error::not_found("list not found"))?;
        if list.is_member(acting) {
            Ok(())
        } else {
            Err(Error::forbidden("you are not a member of this list"))
        }
    }
}
