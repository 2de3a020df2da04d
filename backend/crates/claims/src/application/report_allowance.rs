//! Report Allowance Use Case
//!
//! How many more lost/found reports a user may file in the trailing day.

use chrono::{DateTime, Utc};
use platform::identity::Actor;
use platform::rate_limit::RateLimitConfig;
use std::sync::Arc;

use crate::application::config::ClaimsConfig;
use crate::domain::repository::{ItemRepository, TrustRepository};
use crate::domain::value_objects::TrustLevel;
use crate::error::ClaimsResult;

/// Output DTO for report allowance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportAllowance {
    pub level: TrustLevel,
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
    pub allowed: bool,
}

/// Report Allowance Use Case
pub struct ReportAllowanceUseCase<I, T>
where
    I: ItemRepository,
    T: TrustRepository,
{
    item_repo: Arc<I>,
    trust_repo: Arc<T>,
    config: Arc<ClaimsConfig>,
}

impl<I, T> ReportAllowanceUseCase<I, T>
where
    I: ItemRepository,
    T: TrustRepository,
{
    pub fn new(item_repo: Arc<I>, trust_repo: Arc<T>, config: Arc<ClaimsConfig>) -> Self {
        Self {
            item_repo,
            trust_repo,
            config,
        }
    }

    pub async fn execute(&self, actor: &Actor) -> ClaimsResult<ReportAllowance> {
        self.execute_at(actor, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> ClaimsResult<ReportAllowance> {
        let profile = self.trust_repo.get_or_create(actor.user_id, now).await?;
        let level = profile.level();
        let limit = RateLimitConfig {
            max_requests: level.limits().max_reports_per_day,
            window: self.config.report_window,
        };

        let used = self
            .item_repo
            .count_reports_since(actor.user_id, limit.window_start(now))
            .await?;
        let result = limit.evaluate(used);

        if !result.allowed {
            tracing::debug!(
                user_id = %actor.user_id,
                level = %level,
                used,
                "Daily report ceiling reached"
            );
        }

        Ok(ReportAllowance {
            level,
            used,
            limit: limit.max_requests,
            remaining: limit.max_requests.saturating_sub(used),
            allowed: result.allowed,
        })
    }
}
