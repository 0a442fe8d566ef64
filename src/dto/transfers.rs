use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::TransferRequestRecord,
    dto::{format_optional_timestamp, format_timestamp, validation::validate_categories},
};

/// Payload opening a transfer request for an existing player.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTransferRequest {
    /// Categories the destination club wants the player in.
    #[validate(custom(function = validate_categories))]
    pub categories: Vec<String>,
}

/// Parse a wire status filter into a [`TransferStatus`].
pub fn parse_transfer_status(value: &str) -> Option<crate::domain::transfer::TransferStatus> {
    use crate::domain::transfer::TransferStatus;
    match value {
        "PENDIENTE" => Some(TransferStatus::Pending),
        "PENDIENTE_JUGADOR" => Some(TransferStatus::PendingPlayer),
        "CONFIRMADO" => Some(TransferStatus::Confirmed),
        "RECHAZADO_ADMIN" => Some(TransferStatus::RejectedByAdmin),
        "RECHAZADO_JUGADOR" => Some(TransferStatus::RejectedByPlayer),
        _ => None,
    }
}

/// One side of a transfer, as listed.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferClubSummary {
    /// Club id.
    pub club_id: String,
    /// Club display name.
    pub name: String,
}

/// A transfer request as listed to admins and players.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferSummary {
    /// Request id.
    pub id: String,
    /// The player being moved.
    pub player_id: String,
    /// Display name of the player.
    pub player_name: String,
    /// Club the player would leave.
    pub origin: TransferClubSummary,
    /// Club requesting the player.
    pub destination: TransferClubSummary,
    /// Categories requested.
    pub categories: Vec<String>,
    /// Wire status of the request.
    pub status: String,
    /// When the request was created, RFC 3339.
    pub created_at: String,
    /// When the federation admin decided, RFC 3339.
    pub admin_decided_at: Option<String>,
    /// When the player decided, RFC 3339.
    pub player_decided_at: Option<String>,
}

impl From<TransferRequestRecord> for TransferSummary {
    fn from(request: TransferRequestRecord) -> Self {
        let status = serde_json::to_value(request.status)
            .ok()
            .and_then(|value| value.as_str().map(str::to_owned))
            .unwrap_or_default();
        Self {
            id: request.id.to_string(),
            player_id: request.player_id.to_string(),
            player_name: request.player_name,
            origin: TransferClubSummary {
                club_id: request.origin.club_id.to_string(),
                name: request.origin.name,
            },
            destination: TransferClubSummary {
                club_id: request.destination.club_id.to_string(),
                name: request.destination.name,
            },
            categories: request.categories,
            status,
            created_at: format_timestamp(request.created_at),
            admin_decided_at: format_optional_timestamp(request.admin_decided_at),
            player_decided_at: format_optional_timestamp(request.player_decided_at),
        }
    }
}
