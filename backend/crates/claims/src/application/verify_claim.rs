//! Verify Claim Use Case
//!
//! One challenge-response round: the claimant answers the lost report's
//! three questions in order.

use chrono::{DateTime, Utc};
use kernel::id::ClaimId;
use platform::identity::Actor;
use std::sync::Arc;

use crate::application::config::ClaimsConfig;
use crate::application::{dispatch, load_open_items};
use crate::domain::entities::{AttemptOutcome, ClaimParty};
use crate::domain::notification::{Notification, Notifier};
use crate::domain::repository::{ClaimRepository, ClaimTransition, ItemRepository, TrustRepository};
use crate::domain::services::trust::ensure_may_attempt;
use crate::domain::value_objects::{ClaimStatus, ItemStatus, TrustEvent, VerificationQuestions};
use crate::error::{ClaimsError, ClaimsResult, ConflictReason};

/// Input DTO for verify claim
#[derive(Debug, Clone)]
pub struct VerifyClaimInput {
    pub claim_id: ClaimId,
    pub answers: Vec<String>,
}

/// Output DTO for verify claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyClaimOutput {
    pub claim_id: ClaimId,
    pub score: u8,
    pub passed: bool,
    pub status: ClaimStatus,
    pub attempts_remaining: u8,
}

/// Verify Claim Use Case
pub struct VerifyClaimUseCase<I, C, T, N>
where
    I: ItemRepository,
    C: ClaimRepository,
    T: TrustRepository,
    N: Notifier,
{
    item_repo: Arc<I>,
    claim_repo: Arc<C>,
    trust_repo: Arc<T>,
    notifier: Arc<N>,
    config: Arc<ClaimsConfig>,
}

impl<I, C, T, N> VerifyClaimUseCase<I, C, T, N>
where
    I: ItemRepository,
    C: ClaimRepository,
    T: TrustRepository,
    N: Notifier,
{
    pub fn new(
        item_repo: Arc<I>,
        claim_repo: Arc<C>,
        trust_repo: Arc<T>,
        notifier: Arc<N>,
        config: Arc<ClaimsConfig>,
    ) -> Self {
        Self {
            item_repo,
            claim_repo,
            trust_repo,
            notifier,
            config,
        }
    }

    pub async fn execute(
        &self,
        actor: &Actor,
        input: VerifyClaimInput,
    ) -> ClaimsResult<VerifyClaimOutput> {
        self.execute_at(actor, input, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        actor: &Actor,
        input: VerifyClaimInput,
        now: DateTime<Utc>,
    ) -> ClaimsResult<VerifyClaimOutput> {
        let count = input.answers.len();
        let answers: [String; VerificationQuestions::COUNT] =
            input.answers.try_into().map_err(|_| {
                ClaimsError::validation(format!(
                    "expected {} answers, got {}",
                    VerificationQuestions::COUNT,
                    count
                ))
            })?;

        let mut claim = self
            .claim_repo
            .find(input.claim_id)
            .await?
            .ok_or(ClaimsError::NotFound("Claim"))?;
        claim.ensure_party(actor.user_id, ClaimParty::Claimant)?;

        if claim.status() != ClaimStatus::Pending {
            return Err(ClaimsError::Conflict(ConflictReason::AlreadyResolved));
        }

        let profile = self.trust_repo.get_or_create(actor.user_id, now).await?;
        ensure_may_attempt(&profile, now)?;

        let (lost, _) = load_open_items(self.item_repo.as_ref(), &claim).await?;
        let score = lost.verification.score(&answers);

        let expected_version = claim.version;
        let outcome = claim.record_attempt(
            score,
            self.config.pass_threshold,
            self.config.max_verification_attempts,
            now,
        )?;

        let claimant = claim.claimant_id;
        let transition = ClaimTransition::new(expected_version, claim, now);
        let (transition, attempts_remaining) = match outcome {
            AttemptOutcome::Verified => (transition.with_item_status(ItemStatus::Matched), 0),
            AttemptOutcome::StillPending { attempts_remaining } => (
                transition
                    .with_trust_event(claimant, TrustEvent::FailedVerification)
                    .with_failure(claimant),
                attempts_remaining,
            ),
            AttemptOutcome::Rejected => (
                transition
                    .with_trust_event(claimant, TrustEvent::FailedVerification)
                    .with_trust_event(claimant, TrustEvent::MultipleFailedClaims)
                    .with_failure(claimant),
                0,
            ),
        };

        if !self.claim_repo.commit(&transition).await? {
            tracing::warn!(
                claim_id = %input.claim_id,
                "Verification lost a concurrent transition"
            );
            return Err(ClaimsError::Conflict(ConflictReason::AlreadyResolved));
        }

        let claim = &transition.claim;
        let status = claim.status();
        tracing::info!(
            claim_id = %claim.id,
            score,
            attempts = claim.state.attempts(),
            status = %status,
            "Verification attempt recorded"
        );

        if status != ClaimStatus::Pending {
            dispatch(
                self.notifier.as_ref(),
                Notification::ClaimStatusChanged {
                    claim_id: claim.id,
                    recipients: vec![claim.claimant_id, claim.finder_id],
                    status,
                },
            )
            .await;
        }

        Ok(VerifyClaimOutput {
            claim_id: claim.id,
            score,
            passed: outcome == AttemptOutcome::Verified,
            status,
            attempts_remaining,
        })
    }
}
