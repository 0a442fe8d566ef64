use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::UserRecord,
    services::accounts::{ActivationOutcome, LoginOutcome},
};

/// Login payload.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    /// Login email.
    #[validate(email)]
    pub email: String,
    /// Plain password, verified by the credential provider.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Refresh payload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    /// The refresh token issued at login.
    pub refresh_token: String,
}

/// Account activation payload.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ActivateRequest {
    /// Email the invitation was sent to.
    #[validate(email)]
    pub email: String,
    /// Password the account will use from now on.
    #[validate(length(min = 8))]
    pub password: String,
    /// The single-use activation token from the invitation email.
    #[validate(length(min = 1))]
    pub token: String,
}

/// Public projection of the authenticated user.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User id.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Wire role names.
    pub roles: Vec<String>,
    /// Top-level wire status.
    pub status: String,
}

impl From<&UserRecord> for UserSummary {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            roles: user
                .roles
                .iter()
                .map(|role| role.wire_name().to_owned())
                .collect(),
            status: user.status.wire_name().to_owned(),
        }
    }
}

/// Tokens plus the user they belong to.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Short-lived access token.
    pub token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// The authenticated user.
    pub user: UserSummary,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            token: outcome.token,
            refresh_token: outcome.refresh_token,
            user: UserSummary::from(&outcome.user),
        }
    }
}

/// A fresh access token.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Short-lived access token.
    pub token: String,
}

/// Activation result.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivateResponse {
    /// The activated user's id.
    pub user_id: String,
    /// Wire role names, for the frontend to route on.
    pub roles: Vec<String>,
    /// False when the credential provider misbehaved; the activation itself
    /// is committed regardless.
    pub credential_provisioned: bool,
}

impl From<ActivationOutcome> for ActivateResponse {
    fn from(outcome: ActivationOutcome) -> Self {
        Self {
            user_id: outcome.user_id.to_string(),
            roles: outcome
                .roles
                .iter()
                .map(|role| role.wire_name().to_owned())
                .collect(),
            credential_provisioned: outcome.credential_provisioned,
        }
    }
}
