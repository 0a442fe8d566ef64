use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::ClubRecord,
    dto::{format_optional_timestamp, format_timestamp},
    services::clubs::{
        ClubProfileInput, ClubProvisionOutcome, CreateClubInput, PendingClubAdmin, UpdateClubInput,
        UpdateMyClubInput,
    },
};

/// Payload creating a club together with its admin invitation.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubRequest {
    /// Display name of the new club.
    #[validate(length(min = 1))]
    pub club_name: String,
    /// City the club plays in.
    #[validate(length(min = 1))]
    pub city: String,
    /// Email the admin invitation is sent to.
    #[validate(email)]
    pub admin_email: String,
}

impl From<CreateClubRequest> for CreateClubInput {
    fn from(request: CreateClubRequest) -> Self {
        Self {
            club_name: request.club_name,
            city: request.city,
            admin_email: request.admin_email,
        }
    }
}

/// Result of provisioning a club.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubResponse {
    /// Id of the created club.
    pub club_id: String,
    /// Id of the created admin user.
    pub admin_user_id: String,
    /// False when the activation email could not be dispatched; the records
    /// exist regardless.
    pub email_dispatched: bool,
}

impl From<ClubProvisionOutcome> for CreateClubResponse {
    fn from(outcome: ClubProvisionOutcome) -> Self {
        Self {
            club_id: outcome.club_id.to_string(),
            admin_user_id: outcome.admin_user_id.to_string(),
            email_dispatched: outcome.email_dispatched,
        }
    }
}

/// Payload completing a club profile with the activation token.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteClubProfileRequest {
    /// The single-use activation token.
    #[validate(length(min = 1))]
    pub activation_token: String,
    /// Person responsible for the club.
    #[validate(length(min = 1))]
    pub manager: String,
    /// Venue address.
    #[validate(length(min = 1))]
    pub venue: String,
    /// Contact phone.
    #[validate(length(min = 1))]
    pub phone: String,
    /// Number of regulation courts.
    pub courts: Option<u32>,
    /// Number of alternative courts.
    pub alternative_courts: Option<u32>,
}

impl From<CompleteClubProfileRequest> for ClubProfileInput {
    fn from(request: CompleteClubProfileRequest) -> Self {
        Self {
            manager: request.manager,
            venue: request.venue,
            phone: request.phone,
            courts: request.courts,
            alternative_courts: request.alternative_courts,
        }
    }
}

/// Federation-admin rewrite of a club.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateClubRequest {
    /// Display name.
    #[validate(length(min = 1))]
    pub name: String,
    /// City.
    #[validate(length(min = 1))]
    pub city: String,
    /// Responsible person.
    #[validate(length(min = 1))]
    pub manager: String,
    /// Venue address.
    #[validate(length(min = 1))]
    pub venue: String,
    /// Contact phone.
    #[validate(length(min = 1))]
    pub phone: String,
    /// Contact email.
    #[validate(email)]
    pub email: String,
}

impl From<UpdateClubRequest> for UpdateClubInput {
    fn from(request: UpdateClubRequest) -> Self {
        Self {
            name: request.name,
            city: request.city,
            manager: request.manager,
            venue: request.venue,
            phone: request.phone,
            email: request.email,
        }
    }
}

/// Club-admin patch of their own club.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMyClubRequest {
    /// City.
    pub city: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Venue address.
    pub venue: Option<String>,
    /// Responsible person.
    pub manager: Option<String>,
    /// Number of regulation courts.
    pub courts: Option<u32>,
    /// Number of alternative courts.
    pub alternative_courts: Option<u32>,
}

impl From<UpdateMyClubRequest> for UpdateMyClubInput {
    fn from(request: UpdateMyClubRequest) -> Self {
        Self {
            city: request.city,
            phone: request.phone,
            venue: request.venue,
            manager: request.manager,
            courts: request.courts,
            alternative_courts: request.alternative_courts,
        }
    }
}

/// Public projection of a club.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubSummary {
    /// Club id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// City.
    pub city: String,
    /// Contact email.
    pub email: String,
    /// Wire status.
    pub status: String,
    /// Responsible person.
    pub manager: Option<String>,
    /// Venue address.
    pub venue: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Number of regulation courts.
    pub courts: Option<u32>,
    /// Number of alternative courts.
    pub alternative_courts: Option<u32>,
    /// Whether the club settled its yearly membership.
    pub habilitado_asambal: bool,
    /// Public hero image URL.
    pub hero_url: Option<String>,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
    /// Last write timestamp, RFC 3339.
    pub updated_at: String,
}

impl From<ClubRecord> for ClubSummary {
    fn from(club: ClubRecord) -> Self {
        Self {
            id: club.id.to_string(),
            name: club.name,
            city: club.city,
            email: club.email,
            status: club.status.wire_name().to_owned(),
            manager: club.manager,
            venue: club.venue,
            phone: club.phone,
            courts: club.courts,
            alternative_courts: club.alternative_courts,
            habilitado_asambal: club.asambal_enabled,
            hero_url: club.hero_url,
            created_at: format_timestamp(club.created_at),
            updated_at: format_timestamp(club.updated_at),
        }
    }
}

/// A pending club admin with the club they would run.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingClubAdminSummary {
    /// The pending user's id.
    pub user_id: String,
    /// The pending user's email.
    pub email: String,
    /// Last time the user record changed, RFC 3339.
    pub updated_at: Option<String>,
    /// The club awaiting validation, when it still exists.
    pub club: Option<ClubSummary>,
}

impl From<PendingClubAdmin> for PendingClubAdminSummary {
    fn from(pending: PendingClubAdmin) -> Self {
        Self {
            user_id: pending.user.id.to_string(),
            email: pending.user.email.clone(),
            updated_at: format_optional_timestamp(Some(pending.user.updated_at)),
            club: pending.club.map(ClubSummary::from),
        }
    }
}

/// Hero upload result.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeroUploadResponse {
    /// Public URL of the converted hero image.
    pub hero_url: String,
}
