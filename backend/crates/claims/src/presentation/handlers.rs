//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use kernel::id::{ClaimId, FoundItemId, LostItemId, UserId};
use std::sync::Arc;

use crate::application::analyze_strength::{AnalyzeStrengthInput, AnalyzeStrengthUseCase};
use crate::application::config::ClaimsConfig;
use crate::application::confirm_otp::{ConfirmOtpInput, ConfirmOtpUseCase};
use crate::application::create_claim::{CreateClaimInput, CreateClaimUseCase};
use crate::application::find_matches::FindMatchesUseCase;
use crate::application::get_claim::GetClaimUseCase;
use crate::application::issue_otp::IssueOtpUseCase;
use crate::application::record_trust_event::{RecordTrustEventInput, RecordTrustEventUseCase};
use crate::application::report_allowance::ReportAllowanceUseCase;
use crate::application::trust_summary::TrustSummaryUseCase;
use crate::application::verify_claim::{VerifyClaimInput, VerifyClaimUseCase};
use crate::application::view_items::ViewItemsUseCase;
use crate::domain::notification::Notifier;
use crate::domain::repository::{ClaimRepository, ItemRepository, TrustRepository};
use crate::domain::value_objects::Category;
use crate::error::ClaimsResult;
use crate::presentation::dto::{
    ClaimResponse, ConfirmOtpRequest, ConfirmOtpResponse, CreateClaimRequest, FoundItemResponse,
    IssueOtpResponse, LostItemListResponse, LostItemResponse, MatchesResponse,
    RecordTrustEventRequest, ReportAllowanceResponse, StrengthRequest, StrengthResponse,
    TemplatesResponse, TrustProfileResponse, TrustSummaryResponse, VerifyClaimRequest,
    VerifyClaimResponse,
};
use crate::presentation::middleware::RequestActor;

/// Storage backing every claims handler
pub trait ClaimsStore:
    ItemRepository + ClaimRepository + TrustRepository + Clone + Send + Sync + 'static
{
}

impl<T> ClaimsStore for T where
    T: ItemRepository + ClaimRepository + TrustRepository + Clone + Send + Sync + 'static
{
}

/// Shared state for claims handlers
pub struct ClaimsAppState<R, N>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    pub repo: Arc<R>,
    pub notifier: Arc<N>,
    pub config: Arc<ClaimsConfig>,
}

// Manual impl: the derive would require `N: Clone`
impl<R, N> Clone for ClaimsAppState<R, N>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            notifier: self.notifier.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Matches
// ============================================================================

/// GET /api/matches/lost/{id}
pub async fn matches_for_lost<R, N>(
    State(state): State<ClaimsAppState<R, N>>,
    Extension(actor): Extension<RequestActor>,
    Path(id): Path<LostItemId>,
) -> ClaimsResult<Json<MatchesResponse<FoundItemId>>>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    let actor = actor.require()?;
    let use_case = FindMatchesUseCase::new(state.repo.clone(), state.config.clone());

    let matches = use_case.for_lost(&actor, id).await?;

    Ok(Json(MatchesResponse {
        matches: matches.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/matches/found/{id}
pub async fn matches_for_found<R, N>(
    State(state): State<ClaimsAppState<R, N>>,
    Extension(actor): Extension<RequestActor>,
    Path(id): Path<FoundItemId>,
) -> ClaimsResult<Json<MatchesResponse<LostItemId>>>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    let actor = actor.require()?;
    let use_case = FindMatchesUseCase::new(state.repo.clone(), state.config.clone());

    let matches = use_case.for_found(&actor, id).await?;

    Ok(Json(MatchesResponse {
        matches: matches.into_iter().map(Into::into).collect(),
    }))
}

// ============================================================================
// Items
// ============================================================================

/// POST /api/items/strength
pub async fn analyze_strength(
    Json(req): Json<StrengthRequest>,
) -> ClaimsResult<Json<StrengthResponse>> {
    let report = AnalyzeStrengthUseCase::new().execute(AnalyzeStrengthInput {
        questions: req.questions,
        answers: req.answers,
        category: Category::parse(&req.category),
        description: req.description,
    })?;

    Ok(Json(report.into()))
}

/// GET /api/items/templates/{category}
pub async fn category_templates(Path(category): Path<String>) -> Json<TemplatesResponse> {
    let templates = AnalyzeStrengthUseCase::new().templates(&category);

    Json(TemplatesResponse {
        category: Category::parse(&category),
        templates: templates.to_vec(),
    })
}

/// GET /api/items/lost
pub async fn list_lost_items<R, N>(
    State(state): State<ClaimsAppState<R, N>>,
    Extension(actor): Extension<RequestActor>,
) -> ClaimsResult<Json<LostItemListResponse>>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    let viewer = actor.0.map(|a| a.user_id);
    let use_case = ViewItemsUseCase::new(state.repo.clone(), state.config.clone());

    let items = use_case.list_lost(viewer).await?;

    Ok(Json(LostItemListResponse {
        items: items.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/items/lost/{id}
pub async fn get_lost_item<R, N>(
    State(state): State<ClaimsAppState<R, N>>,
    Extension(actor): Extension<RequestActor>,
    Path(id): Path<LostItemId>,
) -> ClaimsResult<Json<LostItemResponse>>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    let viewer = actor.0.map(|a| a.user_id);
    let use_case = ViewItemsUseCase::new(state.repo.clone(), state.config.clone());

    Ok(Json(use_case.lost(viewer, id).await?.into()))
}

/// GET /api/items/found/{id}
pub async fn get_found_item<R, N>(
    State(state): State<ClaimsAppState<R, N>>,
    Extension(actor): Extension<RequestActor>,
    Path(id): Path<FoundItemId>,
) -> ClaimsResult<Json<FoundItemResponse>>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    let viewer = actor.0.map(|a| a.user_id);
    let use_case = ViewItemsUseCase::new(state.repo.clone(), state.config.clone());

    Ok(Json(use_case.found(viewer, id).await?.into()))
}

// ============================================================================
// Claims
// ============================================================================

/// POST /api/claims
pub async fn create_claim<R, N>(
    State(state): State<ClaimsAppState<R, N>>,
    Extension(actor): Extension<RequestActor>,
    Json(req): Json<CreateClaimRequest>,
) -> ClaimsResult<(StatusCode, Json<ClaimResponse>)>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    let actor = actor.require()?;
    let use_case = CreateClaimUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let claim = use_case
        .execute(
            &actor,
            CreateClaimInput {
                lost_item_id: req.lost_item_id,
                found_item_id: req.found_item_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(claim.into())))
}

/// GET /api/claims/{id}
pub async fn get_claim<R, N>(
    State(state): State<ClaimsAppState<R, N>>,
    Extension(actor): Extension<RequestActor>,
    Path(id): Path<ClaimId>,
) -> ClaimsResult<Json<ClaimResponse>>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    let actor = actor.require()?;
    let use_case = GetClaimUseCase::new(state.repo.clone());

    Ok(Json(use_case.execute(&actor, id).await?.into()))
}

/// POST /api/claims/{id}/verify
pub async fn verify_claim<R, N>(
    State(state): State<ClaimsAppState<R, N>>,
    Extension(actor): Extension<RequestActor>,
    Path(id): Path<ClaimId>,
    Json(req): Json<VerifyClaimRequest>,
) -> ClaimsResult<Json<VerifyClaimResponse>>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    let actor = actor.require()?;
    let use_case = VerifyClaimUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(
            &actor,
            VerifyClaimInput {
                claim_id: id,
                answers: req.answers,
            },
        )
        .await?;

    Ok(Json(output.into()))
}

/// POST /api/claims/{id}/otp
pub async fn issue_otp<R, N>(
    State(state): State<ClaimsAppState<R, N>>,
    Extension(actor): Extension<RequestActor>,
    Path(id): Path<ClaimId>,
) -> ClaimsResult<Json<IssueOtpResponse>>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    let actor = actor.require()?;
    let use_case = IssueOtpUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );

    Ok(Json(use_case.execute(&actor, id).await?.into()))
}

/// POST /api/claims/{id}/otp/confirm
pub async fn confirm_otp<R, N>(
    State(state): State<ClaimsAppState<R, N>>,
    Extension(actor): Extension<RequestActor>,
    Path(id): Path<ClaimId>,
    Json(req): Json<ConfirmOtpRequest>,
) -> ClaimsResult<Json<ConfirmOtpResponse>>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    let actor = actor.require()?;
    let use_case = ConfirmOtpUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(
            &actor,
            ConfirmOtpInput {
                claim_id: id,
                code: req.code,
            },
        )
        .await?;

    Ok(Json(output.into()))
}

// ============================================================================
// Trust
// ============================================================================

async fn trust_summary_for<R, N>(
    state: &ClaimsAppState<R, N>,
    actor: RequestActor,
    user_id: Option<UserId>,
) -> ClaimsResult<Json<TrustSummaryResponse>>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    let actor = actor.require()?;
    let use_case = TrustSummaryUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let summary = use_case
        .execute(&actor, user_id.unwrap_or(actor.user_id))
        .await?;

    Ok(Json(summary.into()))
}

/// GET /api/trust/me
pub async fn my_trust<R, N>(
    State(state): State<ClaimsAppState<R, N>>,
    Extension(actor): Extension<RequestActor>,
) -> ClaimsResult<Json<TrustSummaryResponse>>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    trust_summary_for(&state, actor, None).await
}

/// GET /api/trust/{user_id}
pub async fn user_trust<R, N>(
    State(state): State<ClaimsAppState<R, N>>,
    Extension(actor): Extension<RequestActor>,
    Path(user_id): Path<UserId>,
) -> ClaimsResult<Json<TrustSummaryResponse>>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    trust_summary_for(&state, actor, Some(user_id)).await
}

/// GET /api/reports/allowance
pub async fn report_allowance<R, N>(
    State(state): State<ClaimsAppState<R, N>>,
    Extension(actor): Extension<RequestActor>,
) -> ClaimsResult<Json<ReportAllowanceResponse>>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    let actor = actor.require()?;
    let use_case = ReportAllowanceUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    Ok(Json(use_case.execute(&actor).await?.into()))
}

/// POST /api/admin/trust/events
pub async fn record_trust_event<R, N>(
    State(state): State<ClaimsAppState<R, N>>,
    Extension(actor): Extension<RequestActor>,
    Json(req): Json<RecordTrustEventRequest>,
) -> ClaimsResult<Json<TrustProfileResponse>>
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    let actor = actor.require()?;
    let use_case = RecordTrustEventUseCase::new(state.repo.clone());

    let profile = use_case
        .execute(
            &actor,
            RecordTrustEventInput {
                user_id: req.user_id,
                event: req.event,
            },
        )
        .await?;

    Ok(Json(profile.into()))
}
