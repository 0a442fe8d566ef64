use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::CoachJoinRequestRecord,
    dto::{common::MembershipSummary, format_optional_timestamp, format_timestamp, validation::validate_categories},
    services::coaches::{
        ClubCoach, CoachPrefill, CoachProfileInput, CreateCoachInput, CreateCoachOutcome,
    },
};

/// Payload inviting or resolving a coach.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCoachRequest {
    /// First name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Surname.
    #[validate(length(min = 1))]
    pub surname: String,
    /// Invitation email.
    #[validate(email)]
    pub email: String,
    /// Categories the coach will run at the club.
    #[validate(custom(function = validate_categories))]
    pub categories: Vec<String>,
}

impl From<CreateCoachRequest> for CreateCoachInput {
    fn from(request: CreateCoachRequest) -> Self {
        Self {
            name: request.name,
            surname: request.surname,
            email: request.email,
            categories: request.categories,
        }
    }
}

/// Result of the coach creation decision tree.
///
/// `code` tells the frontend which confirmation flow to open; conflicting
/// cases never mutate anything on their own.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoachResponse {
    /// `CREATED`, `JOIN_REQUEST_REQUIRED` or `CATEGORY_MERGE_REQUIRED`.
    pub code: &'static str,
    /// Id of the created or existing coach.
    pub coach_id: String,
    /// Categories awaiting merge confirmation, when applicable.
    pub new_categories: Option<Vec<String>>,
    /// Whether the activation email left the building (creations only).
    pub email_dispatched: Option<bool>,
}

impl From<CreateCoachOutcome> for CreateCoachResponse {
    fn from(outcome: CreateCoachOutcome) -> Self {
        match outcome {
            CreateCoachOutcome::Created {
                user_id,
                email_dispatched,
            } => Self {
                code: "CREATED",
                coach_id: user_id.to_string(),
                new_categories: None,
                email_dispatched: Some(email_dispatched),
            },
            CreateCoachOutcome::JoinRequestRequired { coach_id } => Self {
                code: "JOIN_REQUEST_REQUIRED",
                coach_id: coach_id.to_string(),
                new_categories: None,
                email_dispatched: None,
            },
            CreateCoachOutcome::CategoryMergeRequired {
                coach_id,
                new_categories,
            } => Self {
                code: "CATEGORY_MERGE_REQUIRED",
                coach_id: coach_id.to_string(),
                new_categories: Some(new_categories),
                email_dispatched: None,
            },
        }
    }
}

/// Payload completing a coach profile with the activation token.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteCoachProfileRequest {
    /// The single-use activation token.
    #[validate(length(min = 1))]
    pub activation_token: String,
    /// Contact phone.
    #[validate(length(min = 1))]
    pub phone: String,
    /// Home address.
    #[validate(length(min = 1))]
    pub address: String,
    /// National identity document number.
    #[validate(length(min = 1))]
    pub national_id: String,
    /// Federation badge number.
    pub badge_number: Option<String>,
}

impl From<CompleteCoachProfileRequest> for CoachProfileInput {
    fn from(request: CompleteCoachProfileRequest) -> Self {
        Self {
            phone: request.phone,
            address: request.address,
            national_id: request.national_id,
            badge_number: request.badge_number,
        }
    }
}

/// Prefill served to the coach onboarding form.
#[derive(Debug, Serialize, ToSchema)]
pub struct CoachPrefillResponse {
    /// First name.
    pub name: String,
    /// Surname.
    pub surname: String,
    /// Invitation email.
    pub email: String,
    /// Categories across every membership entry.
    pub categories: Vec<String>,
}

impl From<CoachPrefill> for CoachPrefillResponse {
    fn from(prefill: CoachPrefill) -> Self {
        Self {
            name: prefill.name,
            surname: prefill.surname,
            email: prefill.email,
            categories: prefill.categories,
        }
    }
}

/// A coach projected onto one club.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubCoachSummary {
    /// Coach id.
    pub id: String,
    /// First name.
    pub name: String,
    /// Surname.
    pub surname: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// National identity document number.
    pub national_id: Option<String>,
    /// Federation badge number.
    pub badge_number: Option<String>,
    /// Per-club wire status.
    pub status: String,
    /// Categories at this club.
    pub categories: Vec<String>,
}

impl From<ClubCoach> for ClubCoachSummary {
    fn from(scoped: ClubCoach) -> Self {
        Self {
            id: scoped.coach.id.to_string(),
            name: scoped.coach.name,
            surname: scoped.coach.surname,
            email: scoped.coach.email,
            phone: scoped.coach.phone,
            national_id: scoped.coach.national_id,
            badge_number: scoped.coach.badge_number,
            status: scoped.membership.status.wire_name().to_owned(),
            categories: scoped.membership.categories,
        }
    }
}

/// Full coach projection with every membership entry.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoachDetail {
    /// Coach id.
    pub id: String,
    /// First name.
    pub name: String,
    /// Surname.
    pub surname: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Home address.
    pub address: Option<String>,
    /// National identity document number.
    pub national_id: Option<String>,
    /// Federation badge number.
    pub badge_number: Option<String>,
    /// Every membership entry.
    pub clubs: Vec<MembershipSummary>,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
    /// Last write timestamp, RFC 3339.
    pub updated_at: String,
}

impl From<crate::dao::models::CoachRecord> for CoachDetail {
    fn from(coach: crate::dao::models::CoachRecord) -> Self {
        Self {
            id: coach.id.to_string(),
            name: coach.name,
            surname: coach.surname,
            email: coach.email,
            phone: coach.phone,
            address: coach.address,
            national_id: coach.national_id,
            badge_number: coach.badge_number,
            clubs: coach.clubs.iter().map(MembershipSummary::from).collect(),
            created_at: format_timestamp(coach.created_at),
            updated_at: format_timestamp(coach.updated_at),
        }
    }
}

/// A join request as listed to the coach.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequestSummary {
    /// Request id.
    pub id: String,
    /// Inviting club id.
    pub club_id: String,
    /// Inviting club display name.
    pub club_name: String,
    /// Categories the club wants the coach for.
    pub categories: Vec<String>,
    /// Wire status of the request.
    pub status: String,
    /// When the request was created, RFC 3339.
    pub created_at: String,
    /// When the coach answered, RFC 3339.
    pub responded_at: Option<String>,
}

impl From<CoachJoinRequestRecord> for JoinRequestSummary {
    fn from(request: CoachJoinRequestRecord) -> Self {
        let status = match request.status {
            crate::dao::models::JoinRequestStatus::Pending => "PENDIENTE",
            crate::dao::models::JoinRequestStatus::Accepted => "ACEPTADA",
            crate::dao::models::JoinRequestStatus::Rejected => "RECHAZADA",
        };
        Self {
            id: request.id.to_string(),
            club_id: request.club_id.to_string(),
            club_name: request.club_name,
            categories: request.categories,
            status: status.to_owned(),
            created_at: format_timestamp(request.created_at),
            responded_at: format_optional_timestamp(request.responded_at),
        }
    }
}

/// Patch of the acting coach's own profile.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMyCoachRequest {
    /// Federation badge number.
    pub badge_number: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

/// Category replacement or merge payload.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CoachCategoriesRequest {
    /// Categories to apply.
    #[validate(custom(function = validate_categories))]
    pub categories: Vec<String>,
}
