//! In-Memory Repository Implementation
//!
//! Mutex-guarded maps. Used by tests and local development; every method
//! runs under one lock, so a transition commit is trivially atomic.

use chrono::{DateTime, Utc};
use kernel::id::{ClaimId, FoundItemId, LostItemId, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::entities::{Claim, FoundItem, LostItem, TrustProfile};
use crate::domain::repository::{ClaimRepository, ClaimTransition, ItemRepository, TrustRepository};
use crate::domain::value_objects::{ItemStatus, TrustEvent};
use crate::error::{ClaimsError, ClaimsResult, ConflictReason};

#[derive(Default)]
struct State {
    lost: HashMap<LostItemId, LostItem>,
    found: HashMap<FoundItemId, FoundItem>,
    claims: HashMap<ClaimId, Claim>,
    trust: HashMap<UserId, TrustProfile>,
}

impl State {
    fn profile_mut(&mut self, user_id: UserId, now: DateTime<Utc>) -> &mut TrustProfile {
        self.trust
            .entry(user_id)
            .or_insert_with(|| TrustProfile::new(user_id, now))
    }
}

/// In-memory repository
#[derive(Clone, Default)]
pub struct InMemoryClaimsRepository {
    state: Arc<Mutex<State>>,
}

impl InMemoryClaimsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ClaimsResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| ClaimsError::Internal("in-memory store poisoned".to_string()))
    }

    /// Seed a lost report
    pub fn insert_lost(&self, item: LostItem) -> ClaimsResult<()> {
        self.lock()?.lost.insert(item.id, item);
        Ok(())
    }

    /// Seed a found report
    pub fn insert_found(&self, item: FoundItem) -> ClaimsResult<()> {
        self.lock()?.found.insert(item.id, item);
        Ok(())
    }

    /// Seed a trust profile, e.g. with an older account or a prior score
    pub fn insert_profile(&self, profile: TrustProfile) -> ClaimsResult<()> {
        self.lock()?.trust.insert(profile.user_id, profile);
        Ok(())
    }
}

impl ItemRepository for InMemoryClaimsRepository {
    async fn find_lost(&self, id: LostItemId) -> ClaimsResult<Option<LostItem>> {
        Ok(self.lock()?.lost.get(&id).cloned())
    }

    async fn find_found(&self, id: FoundItemId) -> ClaimsResult<Option<FoundItem>> {
        Ok(self.lock()?.found.get(&id).cloned())
    }

    async fn list_open_lost(&self) -> ClaimsResult<Vec<LostItem>> {
        let mut items: Vec<_> = self
            .lock()?
            .lost
            .values()
            .filter(|i| i.status.is_open())
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn list_open_found(&self) -> ClaimsResult<Vec<FoundItem>> {
        let mut items: Vec<_> = self
            .lock()?
            .found
            .values()
            .filter(|i| i.status.is_open())
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn count_reports_since(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
    ) -> ClaimsResult<u32> {
        let state = self.lock()?;
        let lost = state
            .lost
            .values()
            .filter(|i| i.owner_id == user_id && i.created_at >= since)
            .count();
        let found = state
            .found
            .values()
            .filter(|i| i.reporter_id == user_id && i.created_at >= since)
            .count();
        Ok((lost + found) as u32)
    }
}

impl ClaimRepository for InMemoryClaimsRepository {
    async fn find(&self, claim_id: ClaimId) -> ClaimsResult<Option<Claim>> {
        Ok(self.lock()?.claims.get(&claim_id).cloned())
    }

    async fn find_active_for_pair(
        &self,
        lost_item_id: LostItemId,
        found_item_id: FoundItemId,
    ) -> ClaimsResult<Option<Claim>> {
        Ok(self
            .lock()?
            .claims
            .values()
            .find(|c| {
                c.lost_item_id == lost_item_id
                    && c.found_item_id == found_item_id
                    && c.status().is_active()
            })
            .cloned())
    }

    async fn count_active_for_claimant(&self, claimant_id: UserId) -> ClaimsResult<u32> {
        Ok(self
            .lock()?
            .claims
            .values()
            .filter(|c| c.claimant_id == claimant_id && c.status().is_active())
            .count() as u32)
    }

    async fn insert(&self, claim: &Claim) -> ClaimsResult<()> {
        let mut state = self.lock()?;
        let duplicate = state.claims.values().any(|c| {
            c.lost_item_id == claim.lost_item_id
                && c.found_item_id == claim.found_item_id
                && c.status().is_active()
        });
        if duplicate {
            return Err(ClaimsError::Conflict(ConflictReason::DuplicateClaim));
        }
        state.claims.insert(claim.id, claim.clone());
        Ok(())
    }

    async fn commit(&self, transition: &ClaimTransition) -> ClaimsResult<bool> {
        let mut state = self.lock()?;
        let claim = &transition.claim;

        match state.claims.get(&claim.id) {
            Some(stored) if stored.version == transition.expected_version => {}
            _ => return Ok(false),
        }
        if transition.item_status.is_some() {
            let closed = |status: Option<ItemStatus>| status == Some(ItemStatus::Closed);
            if closed(state.lost.get(&claim.lost_item_id).map(|l| l.status))
                || closed(state.found.get(&claim.found_item_id).map(|f| f.status))
            {
                return Err(ClaimsError::Conflict(ConflictReason::ItemClosed));
            }
        }
        state.claims.insert(claim.id, claim.clone());

        for (user_id, event) in &transition.trust_events {
            state
                .profile_mut(*user_id, transition.at)
                .apply_delta(event.delta(), transition.at);
        }
        if let Some(user_id) = transition.record_failure_for {
            state
                .profile_mut(user_id, transition.at)
                .record_failure(transition.at);
        }
        if let Some(status) = transition.item_status {
            if let Some(lost) = state.lost.get_mut(&claim.lost_item_id) {
                lost.status = status;
            }
            if let Some(found) = state.found.get_mut(&claim.found_item_id) {
                found.status = status;
            }
        }
        Ok(true)
    }
}

impl TrustRepository for InMemoryClaimsRepository {
    async fn get_or_create(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> ClaimsResult<TrustProfile> {
        Ok(self.lock()?.profile_mut(user_id, now).clone())
    }

    async fn apply_event(
        &self,
        user_id: UserId,
        event: TrustEvent,
        now: DateTime<Utc>,
    ) -> ClaimsResult<TrustProfile> {
        let mut state = self.lock()?;
        let profile = state.profile_mut(user_id, now);
        profile.apply_delta(event.delta(), now);
        Ok(profile.clone())
    }
}
