//! Issue OTP Use Case

use chrono::{DateTime, Utc};
use kernel::id::ClaimId;
use platform::crypto::numeric_code;
use platform::identity::Actor;
use std::sync::Arc;

use crate::application::config::ClaimsConfig;
use crate::application::{dispatch, load_open_items};
use crate::domain::entities::ClaimParty;
use crate::domain::notification::{Notification, Notifier};
use crate::domain::repository::{ClaimRepository, ClaimTransition, ItemRepository};
use crate::domain::value_objects::OtpCode;
use crate::error::{ClaimsError, ClaimsResult, ConflictReason};

/// Output DTO for issue OTP
#[derive(Debug, Clone)]
pub struct IssueOtpOutput {
    pub claim_id: ClaimId,
    pub code: OtpCode,
    pub expires_at: DateTime<Utc>,
}

/// Issue OTP Use Case
pub struct IssueOtpUseCase<I, C, N>
where
    I: ItemRepository,
    C: ClaimRepository,
    N: Notifier,
{
    item_repo: Arc<I>,
    claim_repo: Arc<C>,
    notifier: Arc<N>,
    config: Arc<ClaimsConfig>,
}

impl<I, C, N> IssueOtpUseCase<I, C, N>
where
    I: ItemRepository,
    C: ClaimRepository,
    N: Notifier,
{
    pub fn new(
        item_repo: Arc<I>,
        claim_repo: Arc<C>,
        notifier: Arc<N>,
        config: Arc<ClaimsConfig>,
    ) -> Self {
        Self {
            item_repo,
            claim_repo,
            notifier,
            config,
        }
    }

    pub async fn execute(&self, actor: &Actor, claim_id: ClaimId) -> ClaimsResult<IssueOtpOutput> {
        self.execute_at(actor, claim_id, Utc::now()).await
    }

    /// Issue a fresh handover code; any earlier code stops being valid
    pub async fn execute_at(
        &self,
        actor: &Actor,
        claim_id: ClaimId,
        now: DateTime<Utc>,
    ) -> ClaimsResult<IssueOtpOutput> {
        let mut claim = self
            .claim_repo
            .find(claim_id)
            .await?
            .ok_or(ClaimsError::NotFound("Claim"))?;
        claim.ensure_party(actor.user_id, ClaimParty::Claimant)?;
        if !claim.status().is_active() {
            return Err(ClaimsError::Conflict(ConflictReason::AlreadyResolved));
        }
        load_open_items(self.item_repo.as_ref(), &claim).await?;

        let code = OtpCode::from_generated(numeric_code(self.config.otp_digits));
        let expected_version = claim.version;
        let expires_at = claim
            .issue_otp(&code, self.config.otp_ttl_chrono(), now)?
            .expires_at;

        let transition = ClaimTransition::new(expected_version, claim, now);
        if !self.claim_repo.commit(&transition).await? {
            return Err(ClaimsError::Conflict(ConflictReason::AlreadyResolved));
        }

        tracing::info!(
            claim_id = %claim_id,
            expires_at = %expires_at,
            "Handover code issued"
        );

        dispatch(
            self.notifier.as_ref(),
            Notification::OtpIssued {
                claim_id,
                recipient: actor.user_id,
                code: code.clone(),
                expires_at,
            },
        )
        .await;

        Ok(IssueOtpOutput {
            claim_id,
            code,
            expires_at,
        })
    }
}
