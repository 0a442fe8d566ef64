use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::CampaignKind,
    dto::{
        campaigns::{PayTicketResponse, TicketSummary},
        common::{ApprovalAction, ConsentAction, MessageResponse, StatusResponse},
        players::{
            CompletePlayerProfileRequest, CreatePlayerRequest, CreatePlayerResponse,
            PlayerSummary, UpdateMyPlayerRequest,
        },
        transfers::{CreateTransferRequest, TransferSummary},
    },
    error::AppError,
    services::{access::Actor, campaigns, players, transfers},
    state::SharedState,
};

/// Decision payload for player validation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidatePlayerRequest {
    /// APPROVE or REJECT.
    pub action: ApprovalAction,
}

/// Decision payload for the player stage of a transfer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferConsentRequest {
    /// ACCEPT or REJECT.
    pub action: ConsentAction,
}

/// Category merge confirmation payload.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PlayerCategoriesRequest {
    /// Categories to merge in.
    #[validate(custom(function = crate::dto::validation::validate_categories))]
    pub categories: Vec<String>,
}

/// Routes for player management and the player's own surface.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/players", post(create_player))
        .route("/players/complete-profile", post(complete_profile))
        .route("/players/me", get(my_profile).put(update_my_profile))
        .route("/players/me/tickets", get(my_tickets))
        .route("/players/me/transfers", get(my_transfers))
        .route("/players/tickets/{id}/pay", post(pay_ticket))
        .route("/players/transfers/{id}", patch(decide_transfer))
        .route("/players/{id}/validate", patch(validate))
        .route("/players/{id}/confirm-categories", post(confirm_categories))
        .route("/players/{id}/transfer-requests", post(request_transfer))
}

/// Invite a player, resolving conflicts with existing accounts.
#[utoipa::path(
    post,
    path = "/players",
    tag = "players",
    request_body = CreatePlayerRequest,
    responses((status = 200, description = "Creation outcome", body = CreatePlayerResponse))
)]
pub async fn create_player(
    State(state): State<SharedState>,
    actor: Actor,
    Json(payload): Json<CreatePlayerRequest>,
) -> Result<Json<CreatePlayerResponse>, AppError> {
    payload.validate()?;
    let outcome = players::create_player(&state, &actor, payload.into()).await?;
    Ok(Json(outcome.into()))
}

/// Complete the invited player's profile with their activation token.
#[utoipa::path(
    post,
    path = "/players/complete-profile",
    tag = "players",
    request_body = CompletePlayerProfileRequest,
    responses((status = 200, description = "Profile completed", body = MessageResponse))
)]
pub async fn complete_profile(
    State(state): State<SharedState>,
    Json(payload): Json<CompletePlayerProfileRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let token = payload.activation_token.clone();
    players::complete_player_profile(&state, &token, payload.into()).await?;
    Ok(Json(MessageResponse::new("profile completed")))
}

/// The acting player's own profile.
#[utoipa::path(
    get,
    path = "/players/me",
    tag = "players",
    responses((status = 200, description = "Own profile", body = PlayerSummary))
)]
pub async fn my_profile(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<PlayerSummary>, AppError> {
    let player = players::my_player_profile(&state, &actor).await?;
    Ok(Json(player.into()))
}

/// Patch the acting player's own profile.
#[utoipa::path(
    put,
    path = "/players/me",
    tag = "players",
    request_body = UpdateMyPlayerRequest,
    responses((status = 200, description = "Profile updated", body = PlayerSummary))
)]
pub async fn update_my_profile(
    State(state): State<SharedState>,
    actor: Actor,
    Json(payload): Json<UpdateMyPlayerRequest>,
) -> Result<Json<PlayerSummary>, AppError> {
    let player = players::update_my_player_profile(&state, &actor, payload.into()).await?;
    Ok(Json(player.into()))
}

/// Enrollment tickets billed to the acting player.
#[utoipa::path(
    get,
    path = "/players/me/tickets",
    tag = "players",
    responses((status = 200, description = "Enrollment tickets", body = [TicketSummary]))
)]
pub async fn my_tickets(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<TicketSummary>>, AppError> {
    let tickets = campaigns::my_tickets(&state, &actor, CampaignKind::Enrollment).await?;
    Ok(Json(tickets.into_iter().map(Into::into).collect()))
}

/// Transfer requests involving the acting player.
#[utoipa::path(
    get,
    path = "/players/me/transfers",
    tag = "players",
    responses((status = 200, description = "Transfer requests", body = [TransferSummary]))
)]
pub async fn my_transfers(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<TransferSummary>>, AppError> {
    let requests = transfers::my_transfer_requests(&state, &actor).await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// Settle an enrollment ticket; eligibility follows.
#[utoipa::path(
    post,
    path = "/players/tickets/{id}/pay",
    tag = "players",
    params(("id" = String, Path, description = "Ticket to settle")),
    responses((status = 200, description = "Ticket settled", body = PayTicketResponse))
)]
pub async fn pay_ticket(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<PayTicketResponse>, AppError> {
    let outcome =
        campaigns::pay_ticket(&state, CampaignKind::Enrollment, id, Some(actor.id)).await?;
    Ok(Json(outcome.into()))
}

/// The player's decision on a transfer awaiting their consent.
#[utoipa::path(
    patch,
    path = "/players/transfers/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Transfer request id")),
    request_body = TransferConsentRequest,
    responses((status = 200, description = "Decision applied", body = StatusResponse))
)]
pub async fn decide_transfer(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransferConsentRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let status = transfers::player_decide(&state, &actor, id, payload.action.into()).await?;
    let status = serde_json::to_value(status)
        .ok()
        .and_then(|value| value.as_str().map(str::to_owned))
        .unwrap_or_default();
    Ok(Json(StatusResponse { status }))
}

/// Approve or reject a player at the acting actor's club.
#[utoipa::path(
    patch,
    path = "/players/{id}/validate",
    tag = "players",
    params(("id" = String, Path, description = "Player id")),
    request_body = ValidatePlayerRequest,
    responses((status = 200, description = "New status", body = StatusResponse))
)]
pub async fn validate(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<ValidatePlayerRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let outcome = players::validate_player(&state, &actor, id, payload.action.into()).await?;
    Ok(Json(StatusResponse {
        status: outcome.status.wire_name().to_owned(),
    }))
}

/// Confirm a previously computed category merge.
#[utoipa::path(
    post,
    path = "/players/{id}/confirm-categories",
    tag = "players",
    params(("id" = String, Path, description = "Player id")),
    request_body = PlayerCategoriesRequest,
    responses((status = 200, description = "Categories merged", body = MessageResponse))
)]
pub async fn confirm_categories(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlayerCategoriesRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    players::confirm_player_categories(&state, &actor, id, payload.categories).await?;
    Ok(Json(MessageResponse::new("categories merged")))
}

/// Open a transfer request for a player at another club.
#[utoipa::path(
    post,
    path = "/players/{id}/transfer-requests",
    tag = "players",
    params(("id" = String, Path, description = "Player id")),
    request_body = CreateTransferRequest,
    responses((status = 200, description = "Transfer request opened", body = TransferSummary))
)]
pub async fn request_transfer(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateTransferRequest>,
) -> Result<Json<TransferSummary>, AppError> {
    payload.validate()?;
    let request = transfers::request_transfer(&state, &actor, id, payload.categories).await?;
    Ok(Json(request.into()))
}
