//! Find Matches Use Case

use kernel::id::{FoundItemId, LostItemId};
use platform::identity::{Actor, Role};
use std::sync::Arc;

use crate::application::config::ClaimsConfig;
use crate::domain::entities::{FoundItem, LostItem};
use crate::domain::repository::ItemRepository;
use crate::domain::services::matching::{MatchCandidate, find_matches_for_found, find_matches_for_lost};
use crate::domain::services::redaction::{Redactable, Redacted, redact_for_viewer};
use crate::domain::value_objects::ItemStatus;
use crate::error::{ClaimsError, ClaimsResult};

/// A ranked candidate with its description already redacted for the viewer
#[derive(Debug, Clone)]
pub struct RankedMatch<T> {
    pub candidate: MatchCandidate<T>,
    pub description: Redacted,
}

/// Find Matches Use Case
pub struct FindMatchesUseCase<I>
where
    I: ItemRepository,
{
    item_repo: Arc<I>,
    config: Arc<ClaimsConfig>,
}

impl<I> FindMatchesUseCase<I>
where
    I: ItemRepository,
{
    pub fn new(item_repo: Arc<I>, config: Arc<ClaimsConfig>) -> Self {
        Self { item_repo, config }
    }

    /// Candidates for a lost report, visible to its owner and to staff
    pub async fn for_lost(
        &self,
        actor: &Actor,
        lost_item_id: LostItemId,
    ) -> ClaimsResult<Vec<RankedMatch<FoundItem>>> {
        let lost = self
            .item_repo
            .find_lost(lost_item_id)
            .await?
            .ok_or(ClaimsError::NotFound("Lost item"))?;
        ensure_can_match(actor, lost.owner_id == actor.user_id)?;
        if lost.status == ItemStatus::Closed {
            return Ok(Vec::new());
        }

        let found_items = self.item_repo.list_open_found().await?;
        let candidates = find_matches_for_lost(&lost, &found_items, &self.config.match_rules());

        tracing::debug!(
            lost_item_id = %lost_item_id,
            scanned = found_items.len(),
            matched = candidates.len(),
            "Matched lost item"
        );

        Ok(self.rank(actor, candidates))
    }

    /// Candidates for a found report, visible to its reporter and to staff
    pub async fn for_found(
        &self,
        actor: &Actor,
        found_item_id: FoundItemId,
    ) -> ClaimsResult<Vec<RankedMatch<LostItem>>> {
        let found = self
            .item_repo
            .find_found(found_item_id)
            .await?
            .ok_or(ClaimsError::NotFound("Found item"))?;
        ensure_can_match(actor, found.reporter_id == actor.user_id)?;
        if found.status == ItemStatus::Closed {
            return Ok(Vec::new());
        }

        let lost_items = self.item_repo.list_open_lost().await?;
        let candidates = find_matches_for_found(&found, &lost_items, &self.config.match_rules());

        tracing::debug!(
            found_item_id = %found_item_id,
            scanned = lost_items.len(),
            matched = candidates.len(),
            "Matched found item"
        );

        Ok(self.rank(actor, candidates))
    }

    fn rank<T: Redactable>(
        &self,
        actor: &Actor,
        candidates: Vec<MatchCandidate<T>>,
    ) -> Vec<RankedMatch<T>> {
        candidates
            .into_iter()
            .map(|candidate| RankedMatch {
                description: redact_for_viewer(
                    &candidate.item,
                    Some(actor.user_id),
                    self.config.redaction_budget,
                ),
                candidate,
            })
            .collect()
    }
}

fn ensure_can_match(actor: &Actor, is_owner: bool) -> ClaimsResult<()> {
    if is_owner || matches!(actor.role, Role::CooperativeStaff | Role::Admin) {
        Ok(())
    } else {
        Err(ClaimsError::Unauthorized)
    }
}
