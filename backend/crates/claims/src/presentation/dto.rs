//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::{ClaimId, FoundItemId, LostItemId, UserId};
use serde::{Deserialize, Serialize};

use crate::application::find_matches::RankedMatch;
use crate::application::issue_otp::IssueOtpOutput;
use crate::application::confirm_otp::ConfirmOtpOutput;
use crate::application::report_allowance::ReportAllowance;
use crate::application::trust_summary::TrustSummary;
use crate::application::verify_claim::VerifyClaimOutput;
use crate::application::view_items::ItemView;
use crate::domain::entities::{Claim, ClaimState, FoundItem, LostItem, TrustProfile};
use crate::domain::services::redaction::{RedactionKind, Redacted, SensitivityLevel};
use crate::domain::services::strength::{Strength, StrengthIssue, StrengthReport};
use crate::domain::value_objects::{
    Category, ClaimStatus, ItemStatus, TrustEvent, TrustLevel, TrustLimits,
};

// ============================================================================
// Items
// ============================================================================

/// Description as rendered for the current viewer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionDto {
    pub text: String,
    pub redactions: Vec<RedactionKind>,
    pub sensitivity_level: SensitivityLevel,
    pub truncated: bool,
}

impl From<Redacted> for DescriptionDto {
    fn from(r: Redacted) -> Self {
        Self {
            text: r.text,
            redactions: r.redactions,
            sensitivity_level: r.sensitivity,
            truncated: r.truncated,
        }
    }
}

/// Response for GET /api/items/lost/{id}
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LostItemResponse {
    pub id: LostItemId,
    pub category: Category,
    pub title: String,
    pub description: DescriptionDto,
    pub location_area: String,
    pub lost_date: DateTime<Utc>,
    pub status: ItemStatus,
    /// Questions are shown to the owner only; answers never leave the server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl From<ItemView<LostItem>> for LostItemResponse {
    fn from(view: ItemView<LostItem>) -> Self {
        let item = view.item;
        let questions = view.is_owner.then(|| {
            item.verification
                .questions()
                .iter()
                .map(|q| q.to_string())
                .collect()
        });
        Self {
            id: item.id,
            category: item.category,
            title: item.title,
            description: view.description.into(),
            location_area: item.location_area,
            lost_date: item.lost_date,
            status: item.status,
            questions,
            created_at: item.created_at,
        }
    }
}

/// Response for GET /api/items/found/{id}
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundItemResponse {
    pub id: FoundItemId,
    pub category: Category,
    pub title: String,
    pub description: DescriptionDto,
    pub location_area: String,
    pub found_date: DateTime<Utc>,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
}

impl From<ItemView<FoundItem>> for FoundItemResponse {
    fn from(view: ItemView<FoundItem>) -> Self {
        let item = view.item;
        Self {
            id: item.id,
            category: item.category,
            title: item.title,
            description: view.description.into(),
            location_area: item.location_area,
            found_date: item.found_date,
            status: item.status,
            created_at: item.created_at,
        }
    }
}

/// Response for GET /api/items/lost
#[derive(Debug, Clone, Serialize)]
pub struct LostItemListResponse {
    pub items: Vec<LostItemResponse>,
}

// ============================================================================
// Matches
// ============================================================================

/// One ranked candidate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDto<I> {
    pub item_id: I,
    pub category: Category,
    pub title: String,
    pub description: DescriptionDto,
    pub location_area: String,
    pub date: DateTime<Utc>,
    pub score: u32,
    pub reasons: Vec<String>,
}

impl From<RankedMatch<FoundItem>> for MatchDto<FoundItemId> {
    fn from(m: RankedMatch<FoundItem>) -> Self {
        let item = m.candidate.item;
        Self {
            item_id: item.id,
            category: item.category,
            title: item.title,
            description: m.description.into(),
            location_area: item.location_area,
            date: item.found_date,
            score: m.candidate.score,
            reasons: m.candidate.reasons,
        }
    }
}

impl From<RankedMatch<LostItem>> for MatchDto<LostItemId> {
    fn from(m: RankedMatch<LostItem>) -> Self {
        let item = m.candidate.item;
        Self {
            item_id: item.id,
            category: item.category,
            title: item.title,
            description: m.description.into(),
            location_area: item.location_area,
            date: item.lost_date,
            score: m.candidate.score,
            reasons: m.candidate.reasons,
        }
    }
}

/// Response for GET /api/matches/{side}/{id}
#[derive(Debug, Clone, Serialize)]
pub struct MatchesResponse<I> {
    pub matches: Vec<MatchDto<I>>,
}

// ============================================================================
// Strength analysis
// ============================================================================

/// Request for POST /api/items/strength
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthRequest {
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    /// Lenient: unknown categories are treated as OTHER
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStrengthDto {
    pub index: usize,
    pub score: u8,
    pub issues: Vec<StrengthIssue>,
    pub messages: Vec<&'static str>,
    pub suggestions: Vec<String>,
}

/// Response for POST /api/items/strength
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthResponse {
    pub questions: Vec<QuestionStrengthDto>,
    pub overall_score: u8,
    pub overall_strength: Strength,
    pub redundancy_warning: Option<String>,
}

impl From<StrengthReport> for StrengthResponse {
    fn from(report: StrengthReport) -> Self {
        Self {
            questions: report
                .questions
                .into_iter()
                .enumerate()
                .map(|(index, q)| QuestionStrengthDto {
                    index,
                    score: q.score,
                    messages: q.issues.iter().map(StrengthIssue::message).collect(),
                    issues: q.issues,
                    suggestions: q.suggestions,
                })
                .collect(),
            overall_score: report.overall_score,
            overall_strength: report.overall_strength,
            redundancy_warning: report.redundancy_warning,
        }
    }
}

/// Response for GET /api/items/templates/{category}
#[derive(Debug, Clone, Serialize)]
pub struct TemplatesResponse {
    pub category: Category,
    pub templates: Vec<&'static str>,
}

// ============================================================================
// Claims
// ============================================================================

/// Request for POST /api/claims
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClaimRequest {
    pub lost_item_id: LostItemId,
    pub found_item_id: FoundItemId,
}

/// Claim as seen by its parties. Answers and codes are never included.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub id: ClaimId,
    pub lost_item_id: LostItemId,
    pub found_item_id: FoundItemId,
    pub claimant_id: UserId,
    pub finder_id: UserId,
    pub status: ClaimStatus,
    pub attempts: u8,
    pub last_score: Option<u8>,
    pub verified_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        let (verified_at, rejected_at, returned_at, otp_expires_at) = match &claim.state {
            ClaimState::Pending { .. } => (None, None, None, None),
            ClaimState::Verified {
                verified_at, otp, ..
            } => (
                Some(*verified_at),
                None,
                None,
                otp.as_ref().map(|o| o.expires_at),
            ),
            ClaimState::Rejected { rejected_at, .. } => (None, Some(*rejected_at), None, None),
            ClaimState::Returned {
                verified_at,
                returned_at,
                ..
            } => (Some(*verified_at), None, Some(*returned_at), None),
        };

        Self {
            id: claim.id,
            lost_item_id: claim.lost_item_id,
            found_item_id: claim.found_item_id,
            claimant_id: claim.claimant_id,
            finder_id: claim.finder_id,
            status: claim.status(),
            attempts: claim.state.attempts(),
            last_score: claim.state.last_score(),
            verified_at,
            rejected_at,
            returned_at,
            otp_expires_at,
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }
}

/// Request for POST /api/claims/{id}/verify
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyClaimRequest {
    pub answers: Vec<String>,
}

/// Response for POST /api/claims/{id}/verify
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyClaimResponse {
    pub claim_id: ClaimId,
    pub score: u8,
    pub passed: bool,
    pub status: ClaimStatus,
    pub attempts_remaining: u8,
}

impl From<VerifyClaimOutput> for VerifyClaimResponse {
    fn from(o: VerifyClaimOutput) -> Self {
        Self {
            claim_id: o.claim_id,
            score: o.score,
            passed: o.passed,
            status: o.status,
            attempts_remaining: o.attempts_remaining,
        }
    }
}

/// Response for POST /api/claims/{id}/otp
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueOtpResponse {
    pub claim_id: ClaimId,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssueOtpOutput> for IssueOtpResponse {
    fn from(o: IssueOtpOutput) -> Self {
        Self {
            claim_id: o.claim_id,
            code: o.code.as_str().to_string(),
            expires_at: o.expires_at,
        }
    }
}

/// Request for POST /api/claims/{id}/otp/confirm
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmOtpRequest {
    pub code: String,
}

/// Response for POST /api/claims/{id}/otp/confirm
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOtpResponse {
    pub claim_id: ClaimId,
    pub status: ClaimStatus,
    pub returned_at: DateTime<Utc>,
}

impl From<ConfirmOtpOutput> for ConfirmOtpResponse {
    fn from(o: ConfirmOtpOutput) -> Self {
        Self {
            claim_id: o.claim_id,
            status: o.status,
            returned_at: o.returned_at,
        }
    }
}

// ============================================================================
// Trust
// ============================================================================

/// Response for GET /api/trust/me and /api/trust/{user_id}
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustSummaryResponse {
    pub user_id: UserId,
    pub score: i32,
    pub level: TrustLevel,
    pub limits: TrustLimits,
    pub active_claims: u32,
    pub failures_today: u32,
    pub cooldown_remaining_secs: Option<u64>,
    pub account_age_days: i64,
    pub young_account: bool,
}

impl From<TrustSummary> for TrustSummaryResponse {
    fn from(s: TrustSummary) -> Self {
        Self {
            user_id: s.user_id,
            score: s.score,
            level: s.level,
            limits: s.limits,
            active_claims: s.active_claims,
            failures_today: s.failures_today,
            // Round up so a client never retries early
            cooldown_remaining_secs: s
                .cooldown_remaining
                .map(|d| d.as_secs() + u64::from(d.subsec_nanos() > 0)),
            account_age_days: s.account_age_days,
            young_account: s.young_account,
        }
    }
}

/// Response for GET /api/reports/allowance
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportAllowanceResponse {
    pub level: TrustLevel,
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
    pub allowed: bool,
}

impl From<ReportAllowance> for ReportAllowanceResponse {
    fn from(a: ReportAllowance) -> Self {
        Self {
            level: a.level,
            used: a.used,
            limit: a.limit,
            remaining: a.remaining,
            allowed: a.allowed,
        }
    }
}

/// Request for POST /api/admin/trust/events
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTrustEventRequest {
    pub user_id: UserId,
    pub event: TrustEvent,
}

/// Response for POST /api/admin/trust/events
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustProfileResponse {
    pub user_id: UserId,
    pub score: i32,
    pub level: TrustLevel,
    pub limits: TrustLimits,
}

impl From<TrustProfile> for TrustProfileResponse {
    fn from(p: TrustProfile) -> Self {
        Self {
            user_id: p.user_id,
            score: p.score,
            level: p.level(),
            limits: p.limits(),
        }
    }
}
