use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{PlayerRecord, Tutor},
    dto::{common::MembershipSummary, format_timestamp, validation::validate_categories},
    services::players::{
        CreatePlayerInput, CreatePlayerOutcome, PlayerProfileInput, UpdateMyPlayerInput,
    },
};

/// Payload inviting or resolving a player.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePlayerRequest {
    /// First name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Surname.
    #[validate(length(min = 1))]
    pub surname: String,
    /// Invitation email.
    #[validate(email)]
    pub email: String,
    /// Categories the player will play at the club.
    #[validate(custom(function = validate_categories))]
    pub categories: Vec<String>,
}

impl From<CreatePlayerRequest> for CreatePlayerInput {
    fn from(request: CreatePlayerRequest) -> Self {
        Self {
            name: request.name,
            surname: request.surname,
            email: request.email,
            categories: request.categories,
        }
    }
}

/// Result of the player creation decision tree.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerResponse {
    /// `CREATED`, `TRANSFER_REQUESTED` or `CATEGORY_MERGE_REQUIRED`.
    pub code: &'static str,
    /// Id of the created player, existing player or opened transfer request.
    pub id: String,
    /// Categories awaiting merge confirmation, when applicable.
    pub new_categories: Option<Vec<String>>,
    /// Whether the activation email left the building (creations only).
    pub email_dispatched: Option<bool>,
}

impl From<CreatePlayerOutcome> for CreatePlayerResponse {
    fn from(outcome: CreatePlayerOutcome) -> Self {
        match outcome {
            CreatePlayerOutcome::Created {
                user_id,
                email_dispatched,
            } => Self {
                code: "CREATED",
                id: user_id.to_string(),
                new_categories: None,
                email_dispatched: Some(email_dispatched),
            },
            CreatePlayerOutcome::TransferRequested { request_id } => Self {
                code: "TRANSFER_REQUESTED",
                id: request_id.to_string(),
                new_categories: None,
                email_dispatched: None,
            },
            CreatePlayerOutcome::CategoryMergeRequired {
                player_id,
                new_categories,
            } => Self {
                code: "CATEGORY_MERGE_REQUIRED",
                id: player_id.to_string(),
                new_categories: Some(new_categories),
                email_dispatched: None,
            },
        }
    }
}

/// Legal tutor payload.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TutorDto {
    /// Tutor first name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Tutor surname.
    #[validate(length(min = 1))]
    pub surname: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// National identity document number.
    pub national_id: Option<String>,
}

impl From<TutorDto> for Tutor {
    fn from(dto: TutorDto) -> Self {
        Self {
            name: dto.name,
            surname: dto.surname,
            phone: dto.phone,
            national_id: dto.national_id,
        }
    }
}

impl From<&Tutor> for TutorDto {
    fn from(tutor: &Tutor) -> Self {
        Self {
            name: tutor.name.clone(),
            surname: tutor.surname.clone(),
            phone: tutor.phone.clone(),
            national_id: tutor.national_id.clone(),
        }
    }
}

/// Payload completing a player profile with the activation token.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompletePlayerProfileRequest {
    /// The single-use activation token.
    #[validate(length(min = 1))]
    pub activation_token: String,
    /// Birth date in `YYYY-MM-DD` form.
    #[validate(length(min = 10, max = 10))]
    pub birth_date: String,
    /// Legal tutor, mandatory while underage.
    #[validate(nested)]
    pub tutor: Option<TutorDto>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Home address.
    pub address: Option<String>,
    /// Height in centimeters.
    pub height: Option<f64>,
    /// Weight in kilograms.
    pub weight: Option<f64>,
}

impl From<CompletePlayerProfileRequest> for PlayerProfileInput {
    fn from(request: CompletePlayerProfileRequest) -> Self {
        Self {
            birth_date: request.birth_date,
            tutor: request.tutor.map(Tutor::from),
            phone: request.phone,
            address: request.address,
            height: request.height,
            weight: request.weight,
        }
    }
}

/// Patch of the acting player's own profile.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMyPlayerRequest {
    /// Contact phone.
    pub phone: Option<String>,
    /// Home address.
    pub address: Option<String>,
    /// Height in centimeters.
    pub height: Option<f64>,
    /// Weight in kilograms.
    pub weight: Option<f64>,
}

impl From<UpdateMyPlayerRequest> for UpdateMyPlayerInput {
    fn from(request: UpdateMyPlayerRequest) -> Self {
        Self {
            phone: request.phone,
            address: request.address,
            height: request.height,
            weight: request.weight,
        }
    }
}

/// Public projection of a player.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    /// Player id.
    pub id: String,
    /// First name.
    pub name: String,
    /// Surname.
    pub surname: String,
    /// Contact email.
    pub email: String,
    /// Birth date in `YYYY-MM-DD` form.
    pub birth_date: Option<String>,
    /// Legal tutor, when one is registered.
    pub tutor: Option<TutorDto>,
    /// Whether the player holds a scholarship.
    pub becado: bool,
    /// Whether the player may take the court.
    pub habilitado_para_jugar: bool,
    /// Why not, when they may not.
    pub motivo_inhabilitacion: Option<String>,
    /// Every membership entry.
    pub clubs: Vec<MembershipSummary>,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
    /// Last write timestamp, RFC 3339.
    pub updated_at: String,
}

impl From<PlayerRecord> for PlayerSummary {
    fn from(player: PlayerRecord) -> Self {
        let motivo = player.ineligibility_reason.map(|reason| {
            match reason {
                crate::domain::scholarship::IneligibilityReason::EnrollmentPending => {
                    "EMPADRONAMIENTO_PENDIENTE".to_owned()
                }
            }
        });
        Self {
            id: player.id.to_string(),
            name: player.name,
            surname: player.surname,
            email: player.email,
            birth_date: player.birth_date,
            tutor: player.tutor.as_ref().map(TutorDto::from),
            becado: player.scholarship_holder,
            habilitado_para_jugar: player.enabled_to_play,
            motivo_inhabilitacion: motivo,
            clubs: player.clubs.iter().map(MembershipSummary::from).collect(),
            created_at: format_timestamp(player.created_at),
            updated_at: format_timestamp(player.updated_at),
        }
    }
}
