//! Domain Value Objects
//!
//! Immutable value types for the claims domain.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ClaimsError, ClaimsResult};

// ============================================================================
// Category
// ============================================================================

/// Item category. Matching only ever pairs items of the same category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Id,
    Wallet,
    Phone,
    Keys,
    Bag,
    Documents,
    Electronics,
    Jewelry,
    Clothing,
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Id,
        Category::Wallet,
        Category::Phone,
        Category::Keys,
        Category::Bag,
        Category::Documents,
        Category::Electronics,
        Category::Jewelry,
        Category::Clothing,
        Category::Other,
    ];

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Category::Id => "ID",
            Category::Wallet => "WALLET",
            Category::Phone => "PHONE",
            Category::Keys => "KEYS",
            Category::Bag => "BAG",
            Category::Documents => "DOCUMENTS",
            Category::Electronics => "ELECTRONICS",
            Category::Jewelry => "JEWELRY",
            Category::Clothing => "CLOTHING",
            Category::Other => "OTHER",
        }
    }

    /// Parse a category code, case-insensitively.
    ///
    /// Never fails: anything unrecognised is `Other`.
    pub fn parse(code: &str) -> Self {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
            .unwrap_or(Category::Other)
    }

    /// Categories whose descriptions are inherently sensitive
    #[inline]
    pub const fn is_sensitive(&self) -> bool {
        matches!(self, Category::Id | Category::Wallet)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// ItemStatus
// ============================================================================

/// Lifecycle of a lost or found report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[default]
    Active,
    /// A claim on the item has been verified and handover is pending
    Matched,
    Closed,
}

impl ItemStatus {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Matched => "matched",
            ItemStatus::Closed => "closed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "active" => Some(ItemStatus::Active),
            "matched" => Some(ItemStatus::Matched),
            "closed" => Some(ItemStatus::Closed),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_open(&self) -> bool {
        !matches!(self, ItemStatus::Closed)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Verification questions
// ============================================================================

/// One owner-supplied security question with its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

impl QuestionAnswer {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Exactly three question/answer pairs, fixed at report creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationQuestions([QuestionAnswer; VerificationQuestions::COUNT]);

impl VerificationQuestions {
    pub const COUNT: usize = 3;

    pub fn new(pairs: Vec<QuestionAnswer>) -> ClaimsResult<Self> {
        if pairs
            .iter()
            .any(|p| p.question.trim().is_empty() || p.answer.trim().is_empty())
        {
            return Err(ClaimsError::validation(
                "verification questions and answers must not be empty",
            ));
        }
        let count = pairs.len();
        let pairs: [QuestionAnswer; Self::COUNT] = pairs.try_into().map_err(|_| {
            ClaimsError::validation(format!(
                "expected {} verification questions, got {}",
                Self::COUNT,
                count
            ))
        })?;
        Ok(Self(pairs))
    }

    pub fn pairs(&self) -> &[QuestionAnswer; Self::COUNT] {
        &self.0
    }

    pub fn questions(&self) -> [&str; Self::COUNT] {
        [
            self.0[0].question.as_str(),
            self.0[1].question.as_str(),
            self.0[2].question.as_str(),
        ]
    }

    /// Count of submitted answers matching the stored ones, position by
    /// position, ignoring case and surrounding whitespace.
    pub fn score(&self, submitted: &[String; Self::COUNT]) -> u8 {
        self.0
            .iter()
            .zip(submitted.iter())
            .filter(|(stored, given)| normalize_answer(&stored.answer) == normalize_answer(given))
            .count() as u8
    }
}

fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

// ============================================================================
// ClaimStatus
// ============================================================================

/// Flat claim status, used for storage and transition guards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    Pending,
    Verified,
    Rejected,
    Returned,
}

impl ClaimStatus {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Verified => "verified",
            ClaimStatus::Rejected => "rejected",
            ClaimStatus::Returned => "returned",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(ClaimStatus::Pending),
            "verified" => Some(ClaimStatus::Verified),
            "rejected" => Some(ClaimStatus::Rejected),
            "returned" => Some(ClaimStatus::Returned),
            _ => None,
        }
    }

    /// Pending or verified claims block another claim on the same pair
    #[inline]
    pub const fn is_active(&self) -> bool {
        matches!(self, ClaimStatus::Pending | ClaimStatus::Verified)
    }

    #[inline]
    pub const fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Trust
// ============================================================================

/// Reputation tier derived from the trust score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrustLevel {
    Suspended,
    Restricted,
    New,
    Established,
    Trusted,
}

/// Ceilings granted by a trust level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustLimits {
    pub max_active_claims: u32,
    pub max_reports_per_day: u32,
}

impl TrustLevel {
    pub const SUSPENDED_AT_OR_BELOW: i32 = -50;
    pub const ESTABLISHED_FROM: i32 = 20;
    pub const TRUSTED_FROM: i32 = 60;

    /// Level for a score. Pure step function, monotonic in `score`.
    pub const fn from_score(score: i32) -> Self {
        if score <= Self::SUSPENDED_AT_OR_BELOW {
            TrustLevel::Suspended
        } else if score < 0 {
            TrustLevel::Restricted
        } else if score < Self::ESTABLISHED_FROM {
            TrustLevel::New
        } else if score < Self::TRUSTED_FROM {
            TrustLevel::Established
        } else {
            TrustLevel::Trusted
        }
    }

    pub const fn limits(&self) -> TrustLimits {
        let (max_active_claims, max_reports_per_day) = match self {
            TrustLevel::Suspended => (0, 0),
            TrustLevel::Restricted => (1, 1),
            TrustLevel::New => (2, 3),
            TrustLevel::Established => (5, 10),
            TrustLevel::Trusted => (10, 25),
        };
        TrustLimits {
            max_active_claims,
            max_reports_per_day,
        }
    }

    #[inline]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, TrustLevel::Suspended)
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            TrustLevel::Suspended => "SUSPENDED",
            TrustLevel::Restricted => "RESTRICTED",
            TrustLevel::New => "NEW",
            TrustLevel::Established => "ESTABLISHED",
            TrustLevel::Trusted => "TRUSTED",
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Events that move a trust score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrustEvent {
    SuccessfulReturnFinder,
    SuccessfulReturnOwner,
    FailedVerification,
    MultipleFailedClaims,
    ScamConfirmed,
    FalseScamReport,
    IdentityVerified,
    PhoneVerified,
    EmailVerified,
}

impl TrustEvent {
    pub const fn delta(&self) -> i32 {
        match self {
            TrustEvent::SuccessfulReturnFinder => 10,
            TrustEvent::SuccessfulReturnOwner => 5,
            TrustEvent::FailedVerification => -5,
            TrustEvent::MultipleFailedClaims => -15,
            TrustEvent::ScamConfirmed => -50,
            TrustEvent::FalseScamReport => -10,
            TrustEvent::IdentityVerified => 5,
            TrustEvent::PhoneVerified => 3,
            TrustEvent::EmailVerified => 2,
        }
    }

    /// Events produced by the claim lifecycle itself. These can never be
    /// recorded by hand.
    pub const fn is_claim_driven(&self) -> bool {
        matches!(
            self,
            TrustEvent::SuccessfulReturnFinder
                | TrustEvent::SuccessfulReturnOwner
                | TrustEvent::FailedVerification
                | TrustEvent::MultipleFailedClaims
        )
    }

    pub const fn code(&self) -> &'static str {
        match self {
            TrustEvent::SuccessfulReturnFinder => "successful_return_finder",
            TrustEvent::SuccessfulReturnOwner => "successful_return_owner",
            TrustEvent::FailedVerification => "failed_verification",
            TrustEvent::MultipleFailedClaims => "multiple_failed_claims",
            TrustEvent::ScamConfirmed => "scam_confirmed",
            TrustEvent::FalseScamReport => "false_scam_report",
            TrustEvent::IdentityVerified => "identity_verified",
            TrustEvent::PhoneVerified => "phone_verified",
            TrustEvent::EmailVerified => "email_verified",
        }
    }
}

impl fmt::Display for TrustEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Bounded trust score
pub struct TrustScore;

impl TrustScore {
    pub const MIN: i32 = -100;
    pub const MAX: i32 = 100;

    /// Apply a delta, clamping into `[MIN, MAX]`
    #[inline]
    pub fn apply(score: i32, delta: i32) -> i32 {
        score.saturating_add(delta).clamp(Self::MIN, Self::MAX)
    }
}

// ============================================================================
// OTP code
// ============================================================================

/// Plain handover code. Debug output never shows the digits.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Parse a submitted code; must be exactly `digits` ASCII digits
    pub fn parse(raw: &str, digits: usize) -> ClaimsResult<Self> {
        let raw = raw.trim();
        if raw.len() != digits || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ClaimsError::validation(format!(
                "handover code must be {} digits",
                digits
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub(crate) fn from_generated(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn hash(&self) -> [u8; 32] {
        platform::crypto::sha256(self.0.as_bytes())
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(******)")
    }
}
