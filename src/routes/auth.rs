use axum::{Json, Router, extract::State, routing::post};
use validator::Validate;

use crate::{
    dto::auth::{ActivateRequest, ActivateResponse, LoginRequest, LoginResponse, RefreshRequest, TokenResponse},
    error::AppError,
    services::accounts,
    state::SharedState,
};

/// Routes handling authentication and account activation.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/activate", post(activate))
}

/// Authenticate and receive an access/refresh token pair.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Tokens issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;
    let outcome = accounts::login(&state, &payload.email, &payload.password).await?;
    Ok(Json(outcome.into()))
}

/// Exchange a refresh token for a fresh access token.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Access token refreshed", body = TokenResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh(
    State(state): State<SharedState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = accounts::refresh_session(&state, &payload.refresh_token).await?;
    Ok(Json(TokenResponse { token }))
}

/// Consume an activation token and set the account password.
#[utoipa::path(
    post,
    path = "/auth/activate",
    tag = "auth",
    request_body = ActivateRequest,
    responses(
        (status = 200, description = "Account activated", body = ActivateResponse),
        (status = 401, description = "Token mismatch or already consumed")
    )
)]
pub async fn activate(
    State(state): State<SharedState>,
    Json(payload): Json<ActivateRequest>,
) -> Result<Json<ActivateResponse>, AppError> {
    payload.validate()?;
    let outcome =
        accounts::activate_account(&state, &payload.email, &payload.password, &payload.token)
            .await?;
    Ok(Json(outcome.into()))
}
