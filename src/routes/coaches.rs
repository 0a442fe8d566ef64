use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post, put},
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::CampaignKind,
    dto::{
        campaigns::{PayTicketResponse, TicketSummary},
        coaches::{
            CoachCategoriesRequest, CoachDetail, CoachPrefillResponse,
            CompleteCoachProfileRequest, CreateCoachRequest, CreateCoachResponse,
            JoinRequestSummary, UpdateMyCoachRequest,
        },
        common::{ApprovalAction, ConsentAction, MessageResponse, StatusResponse},
        players::PlayerSummary,
    },
    error::AppError,
    services::{access::Actor, campaigns, coaches, players},
    state::SharedState,
};

/// Decision payload for coach validation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateCoachRequest {
    /// APPROVE or REJECT.
    pub action: ApprovalAction,
}

/// Decision payload for join requests.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RespondJoinRequest {
    /// ACCEPT or REJECT.
    pub action: ConsentAction,
}

/// Routes for coach management and the coach's own surface.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/coaches", post(create_coach))
        .route("/coaches/join-requests", post(send_join_request))
        .route("/coaches/me/join-requests", get(my_join_requests))
        .route("/coaches/join-requests/{id}", patch(respond_join_request))
        .route("/coaches/complete-profile", post(complete_profile))
        .route("/coaches/prefill/{token}", get(prefill))
        .route("/coaches/me", get(my_profile).put(update_my_profile))
        .route("/coaches/me/players", get(my_players))
        .route("/coaches/me/insurance", get(my_insurance_tickets))
        .route("/coaches/insurance/{id}/pay", post(pay_insurance_ticket))
        .route("/coaches/{id}/categories", put(update_categories))
        .route("/coaches/{id}/confirm-categories", post(confirm_categories))
        .route("/coaches/{id}/validate", patch(validate))
        .route("/coaches/{id}/toggle", patch(toggle))
}

/// Invite a coach, resolving conflicts with existing accounts.
#[utoipa::path(
    post,
    path = "/coaches",
    tag = "coaches",
    request_body = CreateCoachRequest,
    responses((status = 200, description = "Creation outcome", body = CreateCoachResponse))
)]
pub async fn create_coach(
    State(state): State<SharedState>,
    actor: Actor,
    Json(payload): Json<CreateCoachRequest>,
) -> Result<Json<CreateCoachResponse>, AppError> {
    payload.validate()?;
    let outcome = coaches::create_coach(&state, &actor, payload.into()).await?;
    Ok(Json(outcome.into()))
}

/// Ask an already-registered coach to join the acting admin's club.
#[utoipa::path(
    post,
    path = "/coaches/join-requests",
    tag = "coaches",
    request_body = CreateCoachRequest,
    responses((status = 200, description = "Join request created", body = JoinRequestSummary))
)]
pub async fn send_join_request(
    State(state): State<SharedState>,
    actor: Actor,
    Json(payload): Json<CreateCoachRequest>,
) -> Result<Json<JoinRequestSummary>, AppError> {
    payload.validate()?;
    let request = coaches::send_join_request(&state, &actor, payload.into()).await?;
    Ok(Json(request.into()))
}

/// Join requests awaiting the acting coach.
#[utoipa::path(
    get,
    path = "/coaches/me/join-requests",
    tag = "coaches",
    responses((status = 200, description = "Pending join requests", body = [JoinRequestSummary]))
)]
pub async fn my_join_requests(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<JoinRequestSummary>>, AppError> {
    let requests = coaches::my_join_requests(&state, &actor).await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// Answer a join request.
#[utoipa::path(
    patch,
    path = "/coaches/join-requests/{id}",
    tag = "coaches",
    params(("id" = String, Path, description = "Join request id")),
    request_body = RespondJoinRequest,
    responses((status = 200, description = "Request answered", body = MessageResponse))
)]
pub async fn respond_join_request(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<RespondJoinRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    coaches::respond_join_request(&state, &actor, id, payload.action.into()).await?;
    Ok(Json(MessageResponse::new("join request answered")))
}

/// Complete the invited coach's profile with their activation token.
#[utoipa::path(
    post,
    path = "/coaches/complete-profile",
    tag = "coaches",
    request_body = CompleteCoachProfileRequest,
    responses((status = 200, description = "Profile completed", body = MessageResponse))
)]
pub async fn complete_profile(
    State(state): State<SharedState>,
    Json(payload): Json<CompleteCoachProfileRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let token = payload.activation_token.clone();
    coaches::complete_coach_profile(&state, &token, payload.into()).await?;
    Ok(Json(MessageResponse::new("profile completed")))
}

/// Prefill data for the coach onboarding form.
#[utoipa::path(
    get,
    path = "/coaches/prefill/{token}",
    tag = "coaches",
    params(("token" = String, Path, description = "Activation token")),
    responses((status = 200, description = "Prefill data", body = CoachPrefillResponse))
)]
pub async fn prefill(
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> Result<Json<CoachPrefillResponse>, AppError> {
    let prefill = coaches::coach_prefill_by_token(&state, &token).await?;
    Ok(Json(prefill.into()))
}

/// The acting coach's own profile.
#[utoipa::path(
    get,
    path = "/coaches/me",
    tag = "coaches",
    responses((status = 200, description = "Own profile", body = CoachDetail))
)]
pub async fn my_profile(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<CoachDetail>, AppError> {
    let coach = coaches::my_coach_profile(&state, &actor).await?;
    Ok(Json(coach.into()))
}

/// Patch the acting coach's own profile.
#[utoipa::path(
    put,
    path = "/coaches/me",
    tag = "coaches",
    request_body = UpdateMyCoachRequest,
    responses((status = 200, description = "Profile updated", body = CoachDetail))
)]
pub async fn update_my_profile(
    State(state): State<SharedState>,
    actor: Actor,
    Json(payload): Json<UpdateMyCoachRequest>,
) -> Result<Json<CoachDetail>, AppError> {
    let coach =
        coaches::update_my_coach_profile(&state, &actor, payload.badge_number, payload.phone)
            .await?;
    Ok(Json(coach.into()))
}

/// Players registered by the acting coach.
#[utoipa::path(
    get,
    path = "/coaches/me/players",
    tag = "coaches",
    responses((status = 200, description = "Players of the coach", body = [PlayerSummary]))
)]
pub async fn my_players(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    let players = players::players_by_coach(&state, &actor).await?;
    Ok(Json(players.into_iter().map(Into::into).collect()))
}

/// Insurance tickets billed to the acting coach.
#[utoipa::path(
    get,
    path = "/coaches/me/insurance",
    tag = "coaches",
    responses((status = 200, description = "Insurance tickets", body = [TicketSummary]))
)]
pub async fn my_insurance_tickets(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<TicketSummary>>, AppError> {
    let tickets = campaigns::my_tickets(&state, &actor, CampaignKind::Insurance).await?;
    Ok(Json(tickets.into_iter().map(Into::into).collect()))
}

/// Settle an insurance ticket.
#[utoipa::path(
    post,
    path = "/coaches/insurance/{id}/pay",
    tag = "coaches",
    params(("id" = String, Path, description = "Ticket to settle")),
    responses((status = 200, description = "Ticket settled", body = PayTicketResponse))
)]
pub async fn pay_insurance_ticket(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<PayTicketResponse>, AppError> {
    let outcome =
        campaigns::pay_ticket(&state, CampaignKind::Insurance, id, Some(actor.id)).await?;
    Ok(Json(outcome.into()))
}

/// Replace a coach's categories at the acting admin's club.
#[utoipa::path(
    put,
    path = "/coaches/{id}/categories",
    tag = "coaches",
    params(("id" = String, Path, description = "Coach id")),
    request_body = CoachCategoriesRequest,
    responses((status = 200, description = "Categories updated", body = MessageResponse))
)]
pub async fn update_categories(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<CoachCategoriesRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    coaches::update_coach_categories(&state, &actor, id, payload.categories).await?;
    Ok(Json(MessageResponse::new("categories updated")))
}

/// Confirm a previously computed category merge.
#[utoipa::path(
    post,
    path = "/coaches/{id}/confirm-categories",
    tag = "coaches",
    params(("id" = String, Path, description = "Coach id")),
    request_body = CoachCategoriesRequest,
    responses((status = 200, description = "Categories merged", body = MessageResponse))
)]
pub async fn confirm_categories(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<CoachCategoriesRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    coaches::confirm_coach_categories(&state, &actor, id, payload.categories).await?;
    Ok(Json(MessageResponse::new("categories merged")))
}

/// Approve or reject a coach pending at the acting admin's club.
#[utoipa::path(
    patch,
    path = "/coaches/{id}/validate",
    tag = "coaches",
    params(("id" = String, Path, description = "Coach id")),
    request_body = ValidateCoachRequest,
    responses((status = 200, description = "New status", body = StatusResponse))
)]
pub async fn validate(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<ValidateCoachRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let outcome = coaches::validate_coach(&state, &actor, id, payload.action.into()).await?;
    Ok(Json(StatusResponse {
        status: outcome.status.wire_name().to_owned(),
    }))
}

/// Toggle a coach ACTIVO ↔ INACTIVO within the acting admin's club.
#[utoipa::path(
    patch,
    path = "/coaches/{id}/toggle",
    tag = "coaches",
    params(("id" = String, Path, description = "Coach id")),
    responses((status = 200, description = "New status", body = StatusResponse))
)]
pub async fn toggle(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let status = coaches::toggle_coach_status(&state, &actor, id).await?;
    Ok(Json(StatusResponse {
        status: status.wire_name().to_owned(),
    }))
}
