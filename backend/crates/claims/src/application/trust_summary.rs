//! Trust Summary Use Case

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::identity::Actor;
use std::sync::Arc;
use std::time::Duration;

use crate::application::config::ClaimsConfig;
use crate::domain::repository::{ClaimRepository, TrustRepository};
use crate::domain::services::trust::{account_age_signal, active_cooldown};
use crate::domain::value_objects::{TrustLevel, TrustLimits};
use crate::error::{ClaimsError, ClaimsResult};

/// Output DTO for trust summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustSummary {
    pub user_id: UserId,
    pub score: i32,
    pub level: TrustLevel,
    pub limits: TrustLimits,
    pub active_claims: u32,
    pub failures_today: u32,
    pub cooldown_remaining: Option<Duration>,
    pub account_age_days: i64,
    pub young_account: bool,
}

/// Trust Summary Use Case
pub struct TrustSummaryUseCase<C, T>
where
    C: ClaimRepository,
    T: TrustRepository,
{
    claim_repo: Arc<C>,
    trust_repo: Arc<T>,
    config: Arc<ClaimsConfig>,
}

impl<C, T> TrustSummaryUseCase<C, T>
where
    C: ClaimRepository,
    T: TrustRepository,
{
    pub fn new(claim_repo: Arc<C>, trust_repo: Arc<T>, config: Arc<ClaimsConfig>) -> Self {
        Self {
            claim_repo,
            trust_repo,
            config,
        }
    }

    pub async fn execute(&self, actor: &Actor, user_id: UserId) -> ClaimsResult<TrustSummary> {
        self.execute_at(actor, user_id, Utc::now()).await
    }

    /// Users can see their own summary; admins can see anyone's
    pub async fn execute_at(
        &self,
        actor: &Actor,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> ClaimsResult<TrustSummary> {
        if actor.user_id != user_id && !actor.role.is_admin() {
            return Err(ClaimsError::Unauthorized);
        }

        let profile = self.trust_repo.get_or_create(user_id, now).await?;
        let active_claims = self.claim_repo.count_active_for_claimant(user_id).await?;
        let signal = account_age_signal(&profile, self.config.young_account_chrono(), now);

        Ok(TrustSummary {
            user_id,
            score: profile.score,
            level: profile.level(),
            limits: profile.limits(),
            active_claims,
            failures_today: profile.failures_in_window(now),
            cooldown_remaining: active_cooldown(&profile, now),
            account_age_days: signal.age_days,
            young_account: signal.young,
        })
    }
}
