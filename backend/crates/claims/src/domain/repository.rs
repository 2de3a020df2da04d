//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::{ClaimId, FoundItemId, LostItemId, UserId};

use crate::domain::entities::{Claim, FoundItem, LostItem, TrustProfile};
use crate::domain::value_objects::{ItemStatus, TrustEvent};
use crate::error::ClaimsResult;

/// Lost/found report repository trait
#[trait_variant::make(ItemRepository: Send)]
pub trait LocalItemRepository {
    async fn find_lost(&self, id: LostItemId) -> ClaimsResult<Option<LostItem>>;

    async fn find_found(&self, id: FoundItemId) -> ClaimsResult<Option<FoundItem>>;

    /// Lost reports not yet closed, newest first
    async fn list_open_lost(&self) -> ClaimsResult<Vec<LostItem>>;

    /// Found reports not yet closed, newest first
    async fn list_open_found(&self) -> ClaimsResult<Vec<FoundItem>>;

    /// Lost plus found reports filed by `user_id` at or after `since`
    async fn count_reports_since(&self, user_id: UserId, since: DateTime<Utc>)
    -> ClaimsResult<u32>;
}

/// Claim repository trait
#[trait_variant::make(ClaimRepository: Send)]
pub trait LocalClaimRepository {
    async fn find(&self, claim_id: ClaimId) -> ClaimsResult<Option<Claim>>;

    /// The pending or verified claim on a pair, if any
    async fn find_active_for_pair(
        &self,
        lost_item_id: LostItemId,
        found_item_id: FoundItemId,
    ) -> ClaimsResult<Option<Claim>>;

    /// Number of pending or verified claims opened by `claimant_id`
    async fn count_active_for_claimant(&self, claimant_id: UserId) -> ClaimsResult<u32>;

    /// Store a new claim
    ///
    /// Fails with `Conflict(DuplicateClaim)` when an active claim already
    /// exists for the same pair.
    async fn insert(&self, claim: &Claim) -> ClaimsResult<()>;

    /// Apply a transition atomically
    ///
    /// Returns `false` without writing anything when the stored claim is no
    /// longer at `transition.expected_version`. A transition that sets item
    /// status fails with `Conflict(ItemClosed)` if either item is already
    /// closed, again without writing anything.
    async fn commit(&self, transition: &ClaimTransition) -> ClaimsResult<bool>;
}

/// Trust profile repository trait
#[trait_variant::make(TrustRepository: Send)]
pub trait LocalTrustRepository {
    /// Load a profile, creating an empty one on first touch
    async fn get_or_create(&self, user_id: UserId, now: DateTime<Utc>)
    -> ClaimsResult<TrustProfile>;

    /// Apply an event as an atomic clamped delta and return the new profile
    async fn apply_event(
        &self,
        user_id: UserId,
        event: TrustEvent,
        now: DateTime<Utc>,
    ) -> ClaimsResult<TrustProfile>;
}

/// One unit of work on a claim
///
/// Everything in here is written together or not at all: the claim's new
/// state, the trust deltas it earns, the failure counter bump and the status
/// of both underlying items.
#[derive(Debug, Clone)]
pub struct ClaimTransition {
    /// Version the stored claim must still have
    pub expected_version: i64,
    /// Claim after the change, with its version already bumped
    pub claim: Claim,
    pub trust_events: Vec<(UserId, TrustEvent)>,
    /// User whose daily failure counter is incremented
    pub record_failure_for: Option<UserId>,
    /// New status for both the lost and the found item
    pub item_status: Option<ItemStatus>,
    pub at: DateTime<Utc>,
}

impl ClaimTransition {
    pub fn new(expected_version: i64, mut claim: Claim, at: DateTime<Utc>) -> Self {
        claim.version = expected_version + 1;
        Self {
            expected_version,
            claim,
            trust_events: Vec::new(),
            record_failure_for: None,
            item_status: None,
            at,
        }
    }

    pub fn with_trust_event(mut self, user_id: UserId, event: TrustEvent) -> Self {
        self.trust_events.push((user_id, event));
        self
    }

    pub fn with_failure(mut self, user_id: UserId) -> Self {
        self.record_failure_for = Some(user_id);
        self
    }

    pub fn with_item_status(mut self, status: ItemStatus) -> Self {
        self.item_status = Some(status);
        self
    }
}
