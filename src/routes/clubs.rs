use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, patch, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::CampaignKind,
    dto::{
        campaigns::{PayTicketResponse, TicketSummary},
        clubs::{
            ClubSummary, CompleteClubProfileRequest, CreateClubRequest, CreateClubResponse,
            HeroUploadResponse, UpdateClubRequest, UpdateMyClubRequest,
        },
        coaches::ClubCoachSummary,
        common::StatusResponse,
        players::PlayerSummary,
    },
    error::AppError,
    services::{access::Actor, campaigns, clubs, coaches, players},
    state::SharedState,
};

/// Routes for club management, both federation- and club-admin facing.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/clubs", get(list_clubs).post(create_club))
        .route("/clubs/me", get(my_club).put(update_my_club))
        .route("/clubs/me/coaches", get(club_coaches))
        .route("/clubs/me/coaches/pending", get(pending_coaches))
        .route("/clubs/me/players", get(club_players))
        .route("/clubs/me/players/pending", get(club_pending_players))
        .route("/clubs/me/tickets", get(membership_tickets))
        .route("/clubs/me/tickets/{id}/pay", post(pay_membership_ticket))
        .route("/clubs/{id}", get(get_club).put(update_club))
        .route("/clubs/{id}/toggle", patch(toggle_club))
        .route("/clubs/{id}/complete-profile", post(complete_profile))
        .route("/clubs/{id}/hero", post(upload_hero))
}

/// List every club.
#[utoipa::path(
    get,
    path = "/clubs",
    tag = "clubs",
    responses((status = 200, description = "All clubs", body = [ClubSummary]))
)]
pub async fn list_clubs(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<ClubSummary>>, AppError> {
    let clubs = clubs::list_clubs(&state, &actor).await?;
    Ok(Json(clubs.into_iter().map(Into::into).collect()))
}

/// Create a club together with its admin invitation.
#[utoipa::path(
    post,
    path = "/clubs",
    tag = "clubs",
    request_body = CreateClubRequest,
    responses((status = 200, description = "Club and admin created", body = CreateClubResponse))
)]
pub async fn create_club(
    State(state): State<SharedState>,
    actor: Actor,
    Json(payload): Json<CreateClubRequest>,
) -> Result<Json<CreateClubResponse>, AppError> {
    payload.validate()?;
    let outcome = clubs::create_club_with_admin(&state, &actor, payload.into()).await?;
    Ok(Json(outcome.into()))
}

/// The acting club admin's own club.
#[utoipa::path(
    get,
    path = "/clubs/me",
    tag = "clubs",
    responses((status = 200, description = "Own club profile", body = ClubSummary))
)]
pub async fn my_club(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<ClubSummary>, AppError> {
    let club = clubs::my_club_profile(&state, &actor).await?;
    Ok(Json(club.into()))
}

/// Patch the acting club admin's own club.
#[utoipa::path(
    put,
    path = "/clubs/me",
    tag = "clubs",
    request_body = UpdateMyClubRequest,
    responses((status = 200, description = "Club updated", body = ClubSummary))
)]
pub async fn update_my_club(
    State(state): State<SharedState>,
    actor: Actor,
    Json(payload): Json<UpdateMyClubRequest>,
) -> Result<Json<ClubSummary>, AppError> {
    let club = clubs::update_my_club(&state, &actor, payload.into()).await?;
    Ok(Json(club.into()))
}

/// Coaches of the acting admin's club.
#[utoipa::path(
    get,
    path = "/clubs/me/coaches",
    tag = "clubs",
    responses((status = 200, description = "Coaches of the club", body = [ClubCoachSummary]))
)]
pub async fn club_coaches(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<ClubCoachSummary>>, AppError> {
    let coaches = coaches::list_club_coaches(&state, &actor).await?;
    Ok(Json(coaches.into_iter().map(Into::into).collect()))
}

/// Coaches awaiting validation at the acting admin's club.
#[utoipa::path(
    get,
    path = "/clubs/me/coaches/pending",
    tag = "clubs",
    responses((status = 200, description = "Pending coaches", body = [ClubCoachSummary]))
)]
pub async fn pending_coaches(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<ClubCoachSummary>>, AppError> {
    let coaches = coaches::pending_club_coaches(&state, &actor).await?;
    Ok(Json(coaches.into_iter().map(Into::into).collect()))
}

/// Players of the acting admin's club.
#[utoipa::path(
    get,
    path = "/clubs/me/players",
    tag = "clubs",
    responses((status = 200, description = "Players of the club", body = [PlayerSummary]))
)]
pub async fn club_players(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    let players = players::players_by_club(&state, &actor).await?;
    Ok(Json(players.into_iter().map(Into::into).collect()))
}

/// Players awaiting validation at the acting admin's club.
#[utoipa::path(
    get,
    path = "/clubs/me/players/pending",
    tag = "clubs",
    responses((status = 200, description = "Pending players", body = [PlayerSummary]))
)]
pub async fn club_pending_players(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    let players = players::pending_players(&state, &actor).await?;
    Ok(Json(players.into_iter().map(Into::into).collect()))
}

/// Membership tickets billed to the acting admin's club.
#[utoipa::path(
    get,
    path = "/clubs/me/tickets",
    tag = "clubs",
    responses((status = 200, description = "Membership tickets", body = [TicketSummary]))
)]
pub async fn membership_tickets(
    State(state): State<SharedState>,
    actor: Actor,
) -> Result<Json<Vec<TicketSummary>>, AppError> {
    let tickets = campaigns::club_tickets(&state, &actor, CampaignKind::Membership).await?;
    Ok(Json(tickets.into_iter().map(Into::into).collect()))
}

/// Settle a membership ticket; the club's enablement flag follows.
#[utoipa::path(
    post,
    path = "/clubs/me/tickets/{id}/pay",
    tag = "clubs",
    params(("id" = String, Path, description = "Ticket to settle")),
    responses((status = 200, description = "Ticket settled", body = PayTicketResponse))
)]
pub async fn pay_membership_ticket(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<PayTicketResponse>, AppError> {
    use crate::domain::roles::Role;
    actor.require_role(Role::ClubAdmin).map_err(AppError::from)?;
    let club_id = actor.active_club().map_err(AppError::from)?.club_id;
    let outcome =
        campaigns::pay_ticket(&state, CampaignKind::Membership, id, Some(club_id)).await?;
    Ok(Json(outcome.into()))
}

/// Fetch one club.
#[utoipa::path(
    get,
    path = "/clubs/{id}",
    tag = "clubs",
    params(("id" = String, Path, description = "Club id")),
    responses((status = 200, description = "The club", body = ClubSummary))
)]
pub async fn get_club(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ClubSummary>, AppError> {
    let club = clubs::get_club(&state, &actor, id).await?;
    Ok(Json(club.into()))
}

/// Rewrite a club's profile fields.
#[utoipa::path(
    put,
    path = "/clubs/{id}",
    tag = "clubs",
    params(("id" = String, Path, description = "Club id")),
    request_body = UpdateClubRequest,
    responses((status = 200, description = "Club updated", body = ClubSummary))
)]
pub async fn update_club(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClubRequest>,
) -> Result<Json<ClubSummary>, AppError> {
    payload.validate()?;
    let club = clubs::update_club(&state, &actor, id, payload.into()).await?;
    Ok(Json(club.into()))
}

/// Toggle a club ACTIVO ↔ INACTIVO, cascading to its members.
#[utoipa::path(
    patch,
    path = "/clubs/{id}/toggle",
    tag = "clubs",
    params(("id" = String, Path, description = "Club id")),
    responses((status = 200, description = "New status", body = StatusResponse))
)]
pub async fn toggle_club(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let status = clubs::toggle_club_status(&state, &actor, id).await?;
    Ok(Json(StatusResponse {
        status: status.wire_name().to_owned(),
    }))
}

/// Complete a club profile with the admin's activation token.
#[utoipa::path(
    post,
    path = "/clubs/{id}/complete-profile",
    tag = "clubs",
    params(("id" = String, Path, description = "Club id")),
    request_body = CompleteClubProfileRequest,
    responses((status = 200, description = "Profile completed"))
)]
pub async fn complete_profile(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteClubProfileRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    payload.validate()?;
    let token = payload.activation_token.clone();
    clubs::complete_club_profile(&state, id, &token, payload.into()).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Upload and publish a club hero image.
#[utoipa::path(
    post,
    path = "/clubs/{id}/hero",
    tag = "clubs",
    params(("id" = String, Path, description = "Club id")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream", description = "Raw image bytes"),
    responses((status = 200, description = "Hero published", body = HeroUploadResponse))
)]
pub async fn upload_hero(
    State(state): State<SharedState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<HeroUploadResponse>, AppError> {
    let is_image = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("image/"));
    if !is_image {
        return Err(AppError::bad_request("payload must be an image"));
    }

    let hero_url = clubs::upload_club_hero(&state, &actor, id, &body).await?;
    Ok(Json(HeroUploadResponse { hero_url }))
}
