//! Domain Entities
//!
//! Core business entities for the claims domain.

use chrono::{DateTime, Duration, Utc};
use kernel::id::{ClaimId, FoundItemId, LostItemId, UserId};

use crate::domain::value_objects::{
    Category, ClaimStatus, ItemStatus, OtpCode, TrustLevel, TrustLimits, TrustScore,
    VerificationQuestions,
};
use crate::error::{ClaimsError, ClaimsResult, ConflictReason};

// ============================================================================
// Item reports
// ============================================================================

/// A report of something lost, carrying the owner's security questions
#[derive(Debug, Clone)]
pub struct LostItem {
    pub id: LostItemId,
    pub owner_id: UserId,
    pub category: Category,
    pub title: String,
    pub description: String,
    pub location_area: String,
    pub lost_date: DateTime<Utc>,
    pub status: ItemStatus,
    pub verification: VerificationQuestions,
    pub created_at: DateTime<Utc>,
}

/// A report of something found
#[derive(Debug, Clone)]
pub struct FoundItem {
    pub id: FoundItemId,
    pub reporter_id: UserId,
    pub category: Category,
    pub title: String,
    pub description: String,
    pub location_area: String,
    pub found_date: DateTime<Utc>,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Claim
// ============================================================================

/// Handover code stored on a verified claim (hash only)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedOtp {
    pub code_hash: [u8; 32],
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IssuedOtp {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Superseded codes remembered per claim so a stale code can be told apart from a wrong one
pub const MAX_SUPERSEDED_OTPS: usize = 3;

/// Claim state machine
///
/// ```text
/// Pending ──pass──▶ Verified ──otp──▶ Returned
///    │
///    └──attempts exhausted──▶ Rejected
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimState {
    Pending {
        attempts: u8,
        last_score: Option<u8>,
    },
    Verified {
        attempts: u8,
        score: u8,
        verified_at: DateTime<Utc>,
        otp: Option<IssuedOtp>,
        /// Hashes of the most recent codes replaced by a newer one, oldest first
        superseded: Vec<[u8; 32]>,
    },
    Rejected {
        attempts: u8,
        last_score: u8,
        rejected_at: DateTime<Utc>,
    },
    Returned {
        attempts: u8,
        score: u8,
        verified_at: DateTime<Utc>,
        returned_at: DateTime<Utc>,
    },
}

impl ClaimState {
    pub fn status(&self) -> ClaimStatus {
        match self {
            ClaimState::Pending { .. } => ClaimStatus::Pending,
            ClaimState::Verified { .. } => ClaimStatus::Verified,
            ClaimState::Rejected { .. } => ClaimStatus::Rejected,
            ClaimState::Returned { .. } => ClaimStatus::Returned,
        }
    }

    pub fn attempts(&self) -> u8 {
        match self {
            ClaimState::Pending { attempts, .. }
            | ClaimState::Verified { attempts, .. }
            | ClaimState::Rejected { attempts, .. }
            | ClaimState::Returned { attempts, .. } => *attempts,
        }
    }

    pub fn last_score(&self) -> Option<u8> {
        match self {
            ClaimState::Pending { last_score, .. } => *last_score,
            ClaimState::Verified { score, .. } | ClaimState::Returned { score, .. } => Some(*score),
            ClaimState::Rejected { last_score, .. } => Some(*last_score),
        }
    }
}

/// Which side of a claim a user is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimParty {
    /// Owner of the lost item, who opened the claim
    Claimant,
    /// Reporter of the found item
    Finder,
}

/// Result of one verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Verified,
    StillPending { attempts_remaining: u8 },
    Rejected,
}

/// A claim linking one lost report to one found report
#[derive(Debug, Clone)]
pub struct Claim {
    pub id: ClaimId,
    pub lost_item_id: LostItemId,
    pub found_item_id: FoundItemId,
    pub claimant_id: UserId,
    pub finder_id: UserId,
    pub state: ClaimState,
    /// Optimistic-concurrency version, bumped on every committed change
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Open a new pending claim
    pub fn open(lost: &LostItem, found: &FoundItem, now: DateTime<Utc>) -> Self {
        Self {
            id: ClaimId::new(),
            lost_item_id: lost.id,
            found_item_id: found.id,
            claimant_id: lost.owner_id,
            finder_id: found.reporter_id,
            state: ClaimState::Pending {
                attempts: 0,
                last_score: None,
            },
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn status(&self) -> ClaimStatus {
        self.state.status()
    }

    pub fn party_of(&self, user_id: UserId) -> Option<ClaimParty> {
        if user_id == self.claimant_id {
            Some(ClaimParty::Claimant)
        } else if user_id == self.finder_id {
            Some(ClaimParty::Finder)
        } else {
            None
        }
    }

    /// Require `user_id` to be on the given side of the claim
    pub fn ensure_party(&self, user_id: UserId, party: ClaimParty) -> ClaimsResult<()> {
        match self.party_of(user_id) {
            Some(p) if p == party => Ok(()),
            _ => Err(ClaimsError::Unauthorized),
        }
    }

    /// Record a verification attempt with the given score
    ///
    /// Only valid while pending. The attempt that exhausts the budget moves
    /// the claim to `Rejected` instead of leaving it pending.
    pub fn record_attempt(
        &mut self,
        score: u8,
        pass_threshold: u8,
        max_attempts: u8,
        now: DateTime<Utc>,
    ) -> ClaimsResult<AttemptOutcome> {
        let ClaimState::Pending { attempts, .. } = self.state else {
            return Err(ClaimsError::Conflict(ConflictReason::AlreadyResolved));
        };
        if attempts >= max_attempts {
            return Err(ClaimsError::Conflict(ConflictReason::AlreadyResolved));
        }

        let attempts = attempts + 1;
        let outcome = if score >= pass_threshold {
            self.state = ClaimState::Verified {
                attempts,
                score,
                verified_at: now,
                otp: None,
                superseded: Vec::new(),
            };
            AttemptOutcome::Verified
        } else if attempts >= max_attempts {
            self.state = ClaimState::Rejected {
                attempts,
                last_score: score,
                rejected_at: now,
            };
            AttemptOutcome::Rejected
        } else {
            self.state = ClaimState::Pending {
                attempts,
                last_score: Some(score),
            };
            AttemptOutcome::StillPending {
                attempts_remaining: max_attempts - attempts,
            }
        };
        self.updated_at = now;
        Ok(outcome)
    }

    /// Store a fresh handover code, superseding any earlier one
    pub fn issue_otp(&mut self, code: &OtpCode, ttl: Duration, now: DateTime<Utc>) -> ClaimsResult<&IssuedOtp> {
        if self.status() != ClaimStatus::Verified {
            return Err(self.not_verified());
        }
        let ClaimState::Verified {
            otp, superseded, ..
        } = &mut self.state
        else {
            return Err(ClaimsError::Conflict(ConflictReason::NotVerified));
        };

        if let Some(previous) = otp.take() {
            if superseded.len() >= MAX_SUPERSEDED_OTPS {
                superseded.remove(0);
            }
            superseded.push(previous.code_hash);
        }
        self.updated_at = now;
        Ok(otp.insert(IssuedOtp {
            code_hash: code.hash(),
            issued_at: now,
            expires_at: now + ttl,
        }))
    }

    /// Check a submitted handover code and complete the return
    ///
    /// Leaves the claim untouched on any failure.
    pub fn confirm_otp(&mut self, code: &OtpCode, now: DateTime<Utc>) -> ClaimsResult<()> {
        let ClaimState::Verified {
            attempts,
            score,
            verified_at,
            otp,
            superseded,
        } = &self.state
        else {
            return Err(self.not_verified());
        };

        let issued = otp
            .as_ref()
            .ok_or(ClaimsError::Conflict(ConflictReason::OtpNotIssued))?;
        let submitted = code.hash();

        if !platform::crypto::constant_time_eq(&submitted, &issued.code_hash) {
            let reason = if superseded
                .iter()
                .any(|old| platform::crypto::constant_time_eq(&submitted, old))
            {
                ConflictReason::OtpSuperseded
            } else {
                ConflictReason::OtpMismatch
            };
            return Err(ClaimsError::Conflict(reason));
        }
        if issued.is_expired(now) {
            return Err(ClaimsError::Conflict(ConflictReason::OtpExpired));
        }

        self.state = ClaimState::Returned {
            attempts: *attempts,
            score: *score,
            verified_at: *verified_at,
            returned_at: now,
        };
        self.updated_at = now;
        Ok(())
    }

    fn not_verified(&self) -> ClaimsError {
        match self.status() {
            ClaimStatus::Pending => ClaimsError::Conflict(ConflictReason::NotVerified),
            _ => ClaimsError::Conflict(ConflictReason::AlreadyResolved),
        }
    }
}

// ============================================================================
// Trust profile
// ============================================================================

/// Per-user reputation record
///
/// The level is never stored; it is always derived from `score`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustProfile {
    pub user_id: UserId,
    pub score: i32,
    /// Verification failures in the current rolling day window
    pub failures_today: u32,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub account_created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrustProfile {
    /// Failures older than this no longer count
    pub const FAILURE_WINDOW_HOURS: i64 = 24;

    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            score: 0,
            failures_today: 0,
            last_failure_at: None,
            account_created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn level(&self) -> TrustLevel {
        TrustLevel::from_score(self.score)
    }

    #[inline]
    pub fn limits(&self) -> TrustLimits {
        self.level().limits()
    }

    /// Failure count as seen at `now`
    ///
    /// The window rolls: it is reset once the most recent failure is a full
    /// day old.
    pub fn failures_in_window(&self, now: DateTime<Utc>) -> u32 {
        match self.last_failure_at {
            Some(last) if now < last + Duration::hours(Self::FAILURE_WINDOW_HOURS) => {
                self.failures_today
            }
            _ => 0,
        }
    }

    /// Apply a clamped score change
    pub fn apply_delta(&mut self, delta: i32, now: DateTime<Utc>) {
        self.score = TrustScore::apply(self.score, delta);
        self.updated_at = now;
    }

    /// Count one more verification failure
    pub fn record_failure(&mut self, now: DateTime<Utc>) {
        self.failures_today = self.failures_in_window(now) + 1;
        self.last_failure_at = Some(now);
        self.updated_at = now;
    }

    pub fn account_age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.account_created_at).max(Duration::zero())
    }
}
