//! View Items Use Case
//!
//! Item reports as seen by a given viewer. Descriptions of items the viewer
//! does not own always go through redaction.

use kernel::id::{FoundItemId, LostItemId, UserId};
use std::sync::Arc;

use crate::application::config::ClaimsConfig;
use crate::domain::entities::{FoundItem, LostItem};
use crate::domain::repository::ItemRepository;
use crate::domain::services::redaction::{Redactable, Redacted, redact_batch, redact_for_viewer};
use crate::error::{ClaimsError, ClaimsResult};

#[derive(Debug, Clone)]
pub struct ItemView<T> {
    pub item: T,
    pub description: Redacted,
    pub is_owner: bool,
}

impl<T: Redactable> ItemView<T> {
    pub(crate) fn new(item: T, description: Redacted, viewer: Option<UserId>) -> Self {
        let is_owner = viewer.is_some_and(|v| v == item.owner());
        Self {
            item,
            description,
            is_owner,
        }
    }
}

/// View Items Use Case
pub struct ViewItemsUseCase<I>
where
    I: ItemRepository,
{
    item_repo: Arc<I>,
    config: Arc<ClaimsConfig>,
}

impl<I> ViewItemsUseCase<I>
where
    I: ItemRepository,
{
    pub fn new(item_repo: Arc<I>, config: Arc<ClaimsConfig>) -> Self {
        Self { item_repo, config }
    }

    pub async fn lost(
        &self,
        viewer: Option<UserId>,
        id: LostItemId,
    ) -> ClaimsResult<ItemView<LostItem>> {
        let item = self
            .item_repo
            .find_lost(id)
            .await?
            .ok_or(ClaimsError::NotFound("Lost item"))?;
        let description = redact_for_viewer(&item, viewer, self.config.redaction_budget);
        Ok(ItemView::new(item, description, viewer))
    }

    pub async fn found(
        &self,
        viewer: Option<UserId>,
        id: FoundItemId,
    ) -> ClaimsResult<ItemView<FoundItem>> {
        let item = self
            .item_repo
            .find_found(id)
            .await?
            .ok_or(ClaimsError::NotFound("Found item"))?;
        let description = redact_for_viewer(&item, viewer, self.config.redaction_budget);
        Ok(ItemView::new(item, description, viewer))
    }

    /// All open lost reports, newest first
    pub async fn list_lost(&self, viewer: Option<UserId>) -> ClaimsResult<Vec<ItemView<LostItem>>> {
        let items = self.item_repo.list_open_lost().await?;
        let descriptions = redact_batch(&items, viewer, self.config.redaction_budget);
        Ok(items
            .into_iter()
            .zip(descriptions)
            .map(|(item, description)| ItemView::new(item, description, viewer))
            .collect())
    }
}
