use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    membership::ClubMembership,
    status::Decision,
};

/// Approver decision carried by validation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum ApprovalAction {
    /// Accept the pending record.
    #[serde(rename = "APPROVE")]
    Approve,
    /// Turn the pending record down.
    #[serde(rename = "REJECT")]
    Reject,
}

impl From<ApprovalAction> for Decision {
    fn from(action: ApprovalAction) -> Self {
        match action {
            ApprovalAction::Approve => Decision::Approve,
            ApprovalAction::Reject => Decision::Reject,
        }
    }
}

/// Consent decision carried by join-request and transfer endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum ConsentAction {
    /// Accept the proposal.
    #[serde(rename = "ACCEPT")]
    Accept,
    /// Turn the proposal down.
    #[serde(rename = "REJECT")]
    Reject,
}

impl From<ConsentAction> for Decision {
    fn from(action: ConsentAction) -> Self {
        match action {
            ConsentAction::Accept => Decision::Approve,
            ConsentAction::Reject => Decision::Reject,
        }
    }
}

/// Plain success message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

impl MessageResponse {
    /// Build a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Status returned by toggle and validation endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// The resulting wire status.
    pub status: String,
}

/// Public projection of one membership entry.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipSummary {
    /// Club the entry refers to.
    pub club_id: String,
    /// Club display name.
    pub club_name: String,
    /// Categories at this club.
    pub categories: Vec<String>,
    /// Per-club wire status.
    pub status: String,
}

impl From<&ClubMembership> for MembershipSummary {
    fn from(entry: &ClubMembership) -> Self {
        Self {
            club_id: entry.club_id.to_string(),
            club_name: entry.club_name.clone(),
            categories: entry.categories.clone(),
            status: entry.status.wire_name().to_owned(),
        }
    }
}
