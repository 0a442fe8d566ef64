use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dao::models::ScholarshipRecord,
    dto::{format_optional_timestamp, format_timestamp, players::PlayerSummary},
    services::scholarships::ScholarshipHolder,
};

/// A scholarship as listed in histories and holder views.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipSummary {
    /// Scholarship id.
    pub id: String,
    /// Player holding it.
    pub player_id: String,
    /// Club snapshotted at grant time.
    pub club_name: String,
    /// Wire status (`ACTIVA` or `REVOCADA`).
    pub status: String,
    /// When it was granted, RFC 3339.
    pub granted_at: String,
    /// When it expires, RFC 3339.
    pub expires_at: String,
    /// When it was revoked, RFC 3339.
    pub revoked_at: Option<String>,
}

impl From<ScholarshipRecord> for ScholarshipSummary {
    fn from(scholarship: ScholarshipRecord) -> Self {
        let status = match scholarship.status {
            crate::domain::scholarship::ScholarshipStatus::Active => "ACTIVA",
            crate::domain::scholarship::ScholarshipStatus::Revoked => "REVOCADA",
        };
        Self {
            id: scholarship.id.to_string(),
            player_id: scholarship.player_id.to_string(),
            club_name: scholarship.club.name,
            status: status.to_owned(),
            granted_at: format_timestamp(scholarship.granted_at),
            expires_at: format_timestamp(scholarship.expires_at),
            revoked_at: format_optional_timestamp(scholarship.revoked_at),
        }
    }
}

/// A player together with their ACTIVA scholarship.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipHolderSummary {
    /// The holding player.
    pub player: PlayerSummary,
    /// The active scholarship.
    pub scholarship: ScholarshipSummary,
}

impl From<ScholarshipHolder> for ScholarshipHolderSummary {
    fn from(holder: ScholarshipHolder) -> Self {
        Self {
            player: PlayerSummary::from(holder.player),
            scholarship: ScholarshipSummary::from(holder.scholarship),
        }
    }
}
