//! Confirm OTP Use Case
//!
//! The finder submits the code shown by the claimant at handover.

use chrono::{DateTime, Utc};
use kernel::id::ClaimId;
use platform::identity::Actor;
use std::sync::Arc;

use crate::application::config::ClaimsConfig;
use crate::application::{dispatch, load_open_items};
use crate::domain::entities::ClaimParty;
use crate::domain::notification::{Notification, Notifier};
use crate::domain::repository::{ClaimRepository, ClaimTransition, ItemRepository};
use crate::domain::value_objects::{ClaimStatus, ItemStatus, OtpCode, TrustEvent};
use crate::error::{ClaimsError, ClaimsResult, ConflictReason};

/// Input DTO for confirm OTP
#[derive(Debug, Clone)]
pub struct ConfirmOtpInput {
    pub claim_id: ClaimId,
    pub code: String,
}

/// Output DTO for confirm OTP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmOtpOutput {
    pub claim_id: ClaimId,
    pub status: ClaimStatus,
    pub returned_at: DateTime<Utc>,
}

/// Confirm OTP Use Case
pub struct ConfirmOtpUseCase<I, C, N>
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

impl<I, C, N> ConfirmOtpUseCase<I, C, N>
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

    pub async fn execute(
        &self,
        actor: &Actor,
        input: ConfirmOtpInput,
    ) -> ClaimsResult<ConfirmOtpOutput> {
        self.execute_at(actor, input, Utc::now()).await
    }

    /// Complete the handover
    ///
    /// Wrong, superseded or expired codes are rejected without touching the
    /// claim or anyone's trust.
    pub async fn execute_at(
        &self,
        actor: &Actor,
        input: ConfirmOtpInput,
        now: DateTime<Utc>,
    ) -> ClaimsResult<ConfirmOtpOutput> {
        let code = OtpCode::parse(&input.code, self.config.otp_digits)?;

        let mut claim = self
            .claim_repo
            .find(input.claim_id)
            .await?
            .ok_or(ClaimsError::NotFound("Claim"))?;
        claim.ensure_party(actor.user_id, ClaimParty::Finder)?;
        if !claim.status().is_active() {
            return Err(ClaimsError::Conflict(ConflictReason::AlreadyResolved));
        }
        load_open_items(self.item_repo.as_ref(), &claim).await?;

        let expected_version = claim.version;
        if let Err(e) = claim.confirm_otp(&code, now) {
            tracing::warn!(claim_id = %claim.id, error = %e, "Handover code rejected");
            return Err(e);
        }

        let (claimant, finder) = (claim.claimant_id, claim.finder_id);
        let transition = ClaimTransition::new(expected_version, claim, now)
            .with_trust_event(finder, TrustEvent::SuccessfulReturnFinder)
            .with_trust_event(claimant, TrustEvent::SuccessfulReturnOwner)
            .with_item_status(ItemStatus::Closed);

        if !self.claim_repo.commit(&transition).await? {
            return Err(ClaimsError::Conflict(ConflictReason::AlreadyResolved));
        }

        tracing::info!(
            claim_id = %input.claim_id,
            claimant_id = %claimant,
            finder_id = %finder,
            "Item returned"
        );

        dispatch(
            self.notifier.as_ref(),
            Notification::ClaimStatusChanged {
                claim_id: input.claim_id,
                recipients: vec![claimant, finder],
                status: ClaimStatus::Returned,
            },
        )
        .await;

        Ok(ConfirmOtpOutput {
            claim_id: input.claim_id,
            status: ClaimStatus::Returned,
            returned_at: now,
        })
    }
}
