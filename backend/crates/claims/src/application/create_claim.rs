//! Create Claim Use Case

use chrono::{DateTime, Utc};
use kernel::id::{FoundItemId, LostItemId};
use platform::identity::Actor;
use std::sync::Arc;

use crate::application::config::ClaimsConfig;
use crate::domain::entities::Claim;
use crate::domain::repository::{ClaimRepository, ItemRepository, TrustRepository};
use crate::domain::services::trust::{account_age_signal, check_active_claims, ensure_may_attempt};
use crate::error::{ClaimsError, ClaimsResult, ConflictReason, RateLimitReason};

/// Input DTO for create claim
#[derive(Debug, Clone)]
pub struct CreateClaimInput {
    pub lost_item_id: LostItemId,
    pub found_item_id: FoundItemId,
}

/// Create Claim Use Case
pub struct CreateClaimUseCase<I, C, T>
where
    I: ItemRepository,
    C: ClaimRepository,
    T: TrustRepository,
{
    item_repo: Arc<I>,
    claim_repo: Arc<C>,
    trust_repo: Arc<T>,
    config: Arc<ClaimsConfig>,
}

impl<I, C, T> CreateClaimUseCase<I, C, T>
where
    I: ItemRepository,
    C: ClaimRepository,
    T: TrustRepository,
{
    pub fn new(
        item_repo: Arc<I>,
        claim_repo: Arc<C>,
        trust_repo: Arc<T>,
        config: Arc<ClaimsConfig>,
    ) -> Self {
        Self {
            item_repo,
            claim_repo,
            trust_repo,
            config,
        }
    }

    pub async fn execute(&self, actor: &Actor, input: CreateClaimInput) -> ClaimsResult<Claim> {
        self.execute_at(actor, input, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        actor: &Actor,
        input: CreateClaimInput,
        now: DateTime<Utc>,
    ) -> ClaimsResult<Claim> {
        let lost = self
            .item_repo
            .find_lost(input.lost_item_id)
            .await?
            .ok_or(ClaimsError::NotFound("Lost item"))?;
        let found = self
            .item_repo
            .find_found(input.found_item_id)
            .await?
            .ok_or(ClaimsError::NotFound("Found item"))?;

        // Only the owner of the lost report may claim against it
        if lost.owner_id != actor.user_id {
            return Err(ClaimsError::Unauthorized);
        }
        if found.reporter_id == actor.user_id {
            return Err(ClaimsError::validation(
                "cannot claim an item you reported as found",
            ));
        }
        if !lost.status.is_open() || !found.status.is_open() {
            return Err(ClaimsError::Conflict(ConflictReason::ItemClosed));
        }

        if self
            .claim_repo
            .find_active_for_pair(lost.id, found.id)
            .await?
            .is_some()
        {
            return Err(ClaimsError::Conflict(ConflictReason::DuplicateClaim));
        }

        let profile = self.trust_repo.get_or_create(actor.user_id, now).await?;
        ensure_may_attempt(&profile, now)?;

        let active = self
            .claim_repo
            .count_active_for_claimant(actor.user_id)
            .await?;
        if !check_active_claims(&profile, active).allowed {
            tracing::warn!(
                user_id = %actor.user_id,
                level = %profile.level(),
                active,
                "Active claim ceiling reached"
            );
            return Err(ClaimsError::RateLimited {
                reason: RateLimitReason::ActiveClaimCeiling,
                retry_after: None,
            });
        }

        let signal = account_age_signal(&profile, self.config.young_account_chrono(), now);
        if signal.young {
            tracing::warn!(
                user_id = %actor.user_id,
                account_age_days = signal.age_days,
                "Claim opened by a young account"
            );
        }

        let claim = Claim::open(&lost, &found, now);
        self.claim_repo.insert(&claim).await?;

        tracing::info!(
            claim_id = %claim.id,
            lost_item_id = %claim.lost_item_id,
            found_item_id = %claim.found_item_id,
            claimant_id = %claim.claimant_id,
            "Claim created"
        );

        Ok(claim)
    }
}
