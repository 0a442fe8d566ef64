use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post, put},
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::CampaignKind,
    dto::{
        campaigns::{BulkPayRequest, BulkPayResponse, CampaignResponse, CreateCampaignRequest, TicketSummary},
        clubs::PendingClubAdminSummary,
        coaches::CoachDetail,
        common::{ApprovalAction, StatusResponse},
        players::PlayerSummary,
        scholarships::{ScholarshipHolderSummary, ScholarshipSummary},
        transfers::{TransferSummary, parse_transfer_status},
    },
    error::AppError,
    services::{access::Actor, campaigns, clubs, coaches, players, scholarships, transfers},
    state::SharedState,
};

/// Federation-admin decision payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateUserRequest {
    /// The pending club-admin user.
    pub user_id: Uuid,
    /// APPROVE or REJECT.
    pub action: ApprovalAction,
}

/// Federation-admin decision payload for a transfer request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferDecisionRequest {
    /// APPROVE or REJECT.
    pub action: ApprovalAction,
}

/// Status filter for transfer listings.
#[derive(Debug, Deserialize)]
pub struct TransferListQuery {
    /// Wire status to filter on; defaults to the stage awaiting the admin.
    pub status: Option<String>,
}

/// Federation-level routes (institution management, scholarships,
/// campaigns, transfers).
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/asambal/pending-users", get(pending_users))
        .route("/asambal/validate-user", patch(validate_user))
        .route("/asambal/players", get(all_players))
        .route("/asambal/players-with-scholarship", get(players_with_scholarship))
        .route("/asambal/players/{id}", get(player_detail))
        .route("/asambal/players/{id}/scholarships", get(scholarship_history))
        .route("/asambal/players/{id}/grant-scholarship", post(grant_scholarship))
        .route("/asambal/scholarships/{id}/revoke", post(revoke_scholarship))
        .route("/asambal/empadronamiento", post(create_enrollment))
        .route("/asambal/empadronamiento/tickets", get(enrollment_tickets))
        .route("/asambal/empadronamiento/pagar-masivo", put(bulk_pay_enrollment))
        .route("/asambal/membresia", post(create_membership))
        .route("/asambal/seguros", post(create_insurance))
        .route("/asambal/transfers", get(list_transfers))
        .route("/asambal/transfers/{id}", patch(decide_transfer))
        .route("/asambal/coaches", get(all_coaches))
        .route("/asambal/coaches/{id}", get(coach_detail))
}

/// Club admins awaiting federation validation.
#[utoipa::path(
    get,
    path = "/asambal/pending-users",
    tag = "asambal",
    responses((status = 200, description = "Pending club admins", body = [PendingClubAdminSummary]))
)]
pub async fn pending_users(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<PendingClubAdminSummary>>, AppError> {
    let pending = clubs::pending_club_admins(&state, &actor).await?;
    Ok(Json(pending.into_iter().map(Into::into).collect()))
}

/// Approve or reject a pending club admin (and their club).
#[utoipa::path(
    patch,
    path = "/asambal/validate-user",
    tag = "asambal",
    request_body = ValidateUserRequest,
    responses((status = 200, description = "New status", body = StatusResponse))
)]
pub async fn validate_user(
    State(state): State<SharedState>,
    actor: Actor,
    Json(payload): Json<ValidateUserRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let status =
        clubs::validate_club_admin(&state, &actor, payload.user_id, payload.action.into()).await?;
    Ok(Json(StatusResponse {
        status: status.wire_name().to_owned(),
    }))
}

/// Every player in the federation.
#[utoipa::path(
    get,
    path = "/asambal/players",
    tag = "asambal",
    responses((status = 200, description = "All players", body = [PlayerSummary]))
)]
pub async fn all_players(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    let players = players::list_all_players(&state, &actor).await?;
    Ok(Json(players.into_iter().map(Into::into).collect()))
}

/// One player's full record.
#[utoipa::path(
    get,
    path = "/asambal/players/{id}",
    tag = "asambal",
    params(("id" = String, Path, description = "Player id")),
    responses((status = 200, description = "The player", body = PlayerSummary))
)]
pub async fn player_detail(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayerSummary>, AppError> {
    let player = players::get_player_detail(&state, &actor, id).await?;
    Ok(Json(player.into()))
}

/// Players currently holding an ACTIVA scholarship.
#[utoipa::path(
    get,
    path = "/asambal/players-with-scholarship",
    tag = "asambal",
    responses((status = 200, description = "Scholarship holders", body = [ScholarshipHolderSummary]))
)]
pub async fn players_with_scholarship(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<ScholarshipHolderSummary>>, AppError> {
    let holders = scholarships::players_with_scholarship(&state, &actor).await?;
    Ok(Json(holders.into_iter().map(Into::into).collect()))
}

/// Scholarship history of one player, newest first.
#[utoipa::path(
    get,
    path = "/asambal/players/{id}/scholarships",
    tag = "asambal",
    params(("id" = String, Path, description = "Player id")),
    responses((status = 200, description = "Scholarship history", body = [ScholarshipSummary]))
)]
pub async fn scholarship_history(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ScholarshipSummary>>, AppError> {
    let history = scholarships::history(&state, &actor, id).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// Grant a scholarship to a player.
#[utoipa::path(
    post,
    path = "/asambal/players/{id}/grant-scholarship",
    tag = "asambal",
    params(("id" = String, Path, description = "Player id")),
    responses(
        (status = 200, description = "Scholarship granted", body = ScholarshipSummary),
        (status = 409, description = "An active scholarship already exists")
    )
)]
pub async fn grant_scholarship(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ScholarshipSummary>, AppError> {
    let scholarship = scholarships::grant(&state, &actor, id).await?;
    Ok(Json(scholarship.into()))
}

/// Revoke an ACTIVA scholarship.
#[utoipa::path(
    post,
    path = "/asambal/scholarships/{id}/revoke",
    tag = "asambal",
    params(("id" = String, Path, description = "Scholarship id")),
    responses((status = 200, description = "Scholarship revoked"))
)]
pub async fn revoke_scholarship(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    scholarships::revoke(&state, &actor, id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Create the yearly player-enrollment campaign.
#[utoipa::path(
    post,
    path = "/asambal/empadronamiento",
    tag = "asambal",
    request_body = CreateCampaignRequest,
    responses((status = 200, description = "Campaign created", body = CampaignResponse))
)]
pub async fn create_enrollment(
    State(state): State<SharedState>,
    actor: Actor,
    Json(payload): Json<CreateCampaignRequest>,
) -> Result<Json<CampaignResponse>, AppError> {
    payload.validate()?;
    let outcome = campaigns::create_enrollment_campaign(
        &state,
        &actor,
        campaigns::CampaignInput {
            year: payload.year,
            amount: payload.amount,
        },
    )
    .await?;
    Ok(Json(outcome.into()))
}

/// Every enrollment ticket.
#[utoipa::path(
    get,
    path = "/asambal/empadronamiento/tickets",
    tag = "asambal",
    responses((status = 200, description = "Enrollment tickets", body = [TicketSummary]))
)]
pub async fn enrollment_tickets(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<TicketSummary>>, AppError> {
    let tickets = campaigns::list_tickets(&state, &actor, CampaignKind::Enrollment).await?;
    Ok(Json(tickets.into_iter().map(Into::into).collect()))
}

/// Mass-settle enrollment tickets collected at the counter.
#[utoipa::path(
    put,
    path = "/asambal/empadronamiento/pagar-masivo",
    tag = "asambal",
    request_body = BulkPayRequest,
    responses((status = 200, description = "Settlement summary", body = BulkPayResponse))
)]
pub async fn bulk_pay_enrollment(
    State(state): State<SharedState>,
    actor: Actor,
    Json(payload): Json<BulkPayRequest>,
) -> Result<Json<BulkPayResponse>, AppError> {
    let outcome =
        campaigns::pay_tickets_bulk(&state, &actor, CampaignKind::Enrollment, &payload.ticket_ids)
            .await?;
    Ok(Json(outcome.into()))
}

/// Create the yearly club-membership campaign.
#[utoipa::path(
    post,
    path = "/asambal/membresia",
    tag = "asambal",
    request_body = CreateCampaignRequest,
    responses((status = 200, description = "Campaign created", body = CampaignResponse))
)]
pub async fn create_membership(
    State(state): State<SharedState>,
    actor: Actor,
    Json(payload): Json<CreateCampaignRequest>,
) -> Result<Json<CampaignResponse>, AppError> {
    payload.validate()?;
    let outcome = campaigns::create_membership_campaign(
        &state,
        &actor,
        campaigns::CampaignInput {
            year: payload.year,
            amount: payload.amount,
        },
    )
    .await?;
    Ok(Json(outcome.into()))
}

/// Create the yearly coach-insurance campaign.
#[utoipa::path(
    post,
    path = "/asambal/seguros",
    tag = "asambal",
    request_body = CreateCampaignRequest,
    responses((status = 200, description = "Campaign created", body = CampaignResponse))
)]
pub async fn create_insurance(
    State(state): State<SharedState>,
    actor: Actor,
    Json(payload): Json<CreateCampaignRequest>,
) -> Result<Json<CampaignResponse>, AppError> {
    payload.validate()?;
    let outcome = campaigns::create_insurance_campaign(
        &state,
        &actor,
        campaigns::CampaignInput {
            year: payload.year,
            amount: payload.amount,
        },
    )
    .await?;
    Ok(Json(outcome.into()))
}

/// Transfer requests at a given stage.
#[utoipa::path(
    get,
    path = "/asambal/transfers",
    tag = "asambal",
    params(("status" = Option<String>, Query, description = "Wire status filter")),
    responses((status = 200, description = "Transfer requests", body = [TransferSummary]))
)]
pub async fn list_transfers(
    State(state): State<SharedState>,
    actor: Actor,
    Query(query): Query<TransferListQuery>,
) -> Result<Json<Vec<TransferSummary>>, AppError> {
    let status = match query.status.as_deref() {
        Some(value) => Some(
            parse_transfer_status(value)
                .ok_or_else(|| AppError::bad_request(format!("unknown status `{value}`")))?,
        ),
        None => None,
    };
    let requests = transfers::list_transfers(&state, &actor, status).await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// Federation-admin decision on a pending transfer.
#[utoipa::path(
    patch,
    path = "/asambal/transfers/{id}",
    tag = "asambal",
    params(("id" = String, Path, description = "Transfer request id")),
    request_body = TransferDecisionRequest,
    responses((status = 200, description = "Decision applied", body = StatusResponse))
)]
pub async fn decide_transfer(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransferDecisionRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let status = transfers::admin_decide(&state, &actor, id, payload.action.into()).await?;
    let status = serde_json::to_value(status)
        .ok()
        .and_then(|value| value.as_str().map(str::to_owned))
        .unwrap_or_default();
    Ok(Json(StatusResponse { status }))
}

/// Every coach in the federation.
#[utoipa::path(
    get,
    path = "/asambal/coaches",
    tag = "asambal",
    responses((status = 200, description = "All coaches", body = [CoachDetail]))
)]
pub async fn all_coaches(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<CoachDetail>>, AppError> {
    let coaches = coaches::list_all_coaches(&state, &actor).await?;
    Ok(Json(coaches.into_iter().map(Into::into).collect()))
}

/// One coach's full record.
#[utoipa::path(
    get,
    path = "/asambal/coaches/{id}",
    tag = "asambal",
    params(("id" = String, Path, description = "Coach id")),
    responses((status = 200, description = "The coach", body = CoachDetail))
)]
pub async fn coach_detail(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<CoachDetail>, AppError> {
    let coach = coaches::get_coach_detail(&state, &actor, id).await?;
    Ok(Json(coach.into()))
}
