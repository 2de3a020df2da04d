//! Record Trust Event Use Case
//!
//! Admin tooling for events that happen outside the claim lifecycle:
//! scam rulings and identity/email/phone verification.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::identity::Actor;
use std::sync::Arc;

use crate::domain::entities::TrustProfile;
use crate::domain::repository::TrustRepository;
use crate::domain::value_objects::TrustEvent;
use crate::error::{ClaimsError, ClaimsResult};

/// Input DTO for record trust event
#[derive(Debug, Clone)]
pub struct RecordTrustEventInput {
    pub user_id: UserId,
    pub event: TrustEvent,
}

/// Record Trust Event Use Case
pub struct RecordTrustEventUseCase<T>
where
    T: TrustRepository,
{
    trust_repo: Arc<T>,
}

impl<T> RecordTrustEventUseCase<T>
where
    T: TrustRepository,
{
    pub fn new(trust_repo: Arc<T>) -> Self {
        Self { trust_repo }
    }

    pub async fn execute(
        &self,
        actor: &Actor,
        input: RecordTrustEventInput,
    ) -> ClaimsResult<TrustProfile> {
        self.execute_at(actor, input, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        actor: &Actor,
        input: RecordTrustEventInput,
        now: DateTime<Utc>,
    ) -> ClaimsResult<TrustProfile> {
        if !actor.role.is_admin() {
            return Err(ClaimsError::Unauthorized);
        }
        if input.event.is_claim_driven() {
            return Err(ClaimsError::validation(format!(
                "{} is recorded by the claim lifecycle",
                input.event
            )));
        }

        let profile = self
            .trust_repo
            .apply_event(input.user_id, input.event, now)
            .await?;

        tracing::info!(
            admin_id = %actor.user_id,
            user_id = %input.user_id,
            event = %input.event,
            delta = input.event.delta(),
            score = profile.score,
            level = %profile.level(),
            "Trust event recorded"
        );

        Ok(profile)
    }
}
