//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Each operation of the engine is one use case struct.

pub mod analyze_strength;
pub mod config;
pub mod confirm_otp;
pub mod create_claim;
pub mod find_matches;
pub mod get_claim;
pub mod issue_otp;
pub mod record_trust_event;
pub mod report_allowance;
pub mod trust_summary;
pub mod verify_claim;
pub mod view_items;

use crate::domain::entities::{Claim, FoundItem, LostItem};
use crate::domain::notification::{Notification, Notifier};
use crate::domain::repository::ItemRepository;
use crate::error::{ClaimsError, ClaimsResult, ConflictReason};

/// Hand a notification to the notifier without letting failure propagate
pub(crate) async fn dispatch<N: Notifier>(notifier: &N, notification: Notification) {
    if let Err(e) = notifier.dispatch(notification).await {
        tracing::warn!(error = %e, "Notification dispatch failed");
    }
}

/// Load both items behind a claim, refusing once either has been closed
///
/// A returned sibling claim closes the shared item; later transitions on
/// other claims for that item must not reopen or credit it again.
pub(crate) async fn load_open_items<I: ItemRepository>(
    item_repo: &I,
    claim: &Claim,
) -> ClaimsResult<(LostItem, FoundItem)> {
    let lost = item_repo
        .find_lost(claim.lost_item_id)
        .await?
        .ok_or(ClaimsError::NotFound("Lost item"))?;
    let found = item_repo
        .find_found(claim.found_item_id)
        .await?
        .ok_or(ClaimsError::NotFound("Found item"))?;

    if !lost.status.is_open() || !found.status.is_open() {
        tracing::warn!(
            claim_id = %claim.id,
            lost_status = %lost.status,
            found_status = %found.status,
            "Claim targets a closed item"
        );
        return Err(ClaimsError::Conflict(ConflictReason::ItemClosed));
    }
    Ok((lost, found))
}
