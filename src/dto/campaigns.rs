use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{CampaignKind, TicketRecord, TicketStatus},
    dto::{format_optional_timestamp, format_timestamp},
    services::campaigns::{BulkSettlementOutcome, CampaignOutcome, SettlementOutcome},
};

/// Payload creating a yearly campaign.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema, Validate)]
pub struct CreateCampaignRequest {
    /// Membership year the round bills for.
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    /// Unit amount billed per ticket.
    #[validate(range(min = 1))]
    pub amount: i64,
}

/// Result of a campaign fan-out.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignResponse {
    /// Campaign id.
    pub id: String,
    /// Kind wire name.
    pub kind: String,
    /// Billed year.
    pub year: i32,
    /// Unit amount.
    pub amount: i64,
    /// Tickets created by this run.
    pub tickets_created: usize,
    /// Entities that received the enablement flag directly.
    pub exempted: usize,
    /// Entities skipped because an earlier run already issued their ticket.
    pub skipped_existing: usize,
}

impl From<CampaignOutcome> for CampaignResponse {
    fn from(outcome: CampaignOutcome) -> Self {
        Self {
            id: outcome.campaign.id.to_string(),
            kind: kind_wire_name(outcome.campaign.kind).to_owned(),
            year: outcome.campaign.year,
            amount: outcome.campaign.amount,
            tickets_created: outcome.tickets_created,
            exempted: outcome.exempted,
            skipped_existing: outcome.skipped_existing,
        }
    }
}

fn kind_wire_name(kind: CampaignKind) -> &'static str {
    match kind {
        CampaignKind::Enrollment => "empadronamiento",
        CampaignKind::Membership => "membresia",
        CampaignKind::Insurance => "seguro",
    }
}

/// A ticket as listed to its owner or an admin.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketSummary {
    /// Ticket id.
    pub id: String,
    /// Campaign that generated it.
    pub campaign_id: String,
    /// Billed year.
    pub year: i32,
    /// Amount owed.
    pub amount: i64,
    /// Owning entity id.
    pub owner_id: String,
    /// Club scope, when the owner has one.
    pub club_id: Option<String>,
    /// `pendiente` or `pagado`.
    pub status: String,
    /// When it was settled, RFC 3339.
    pub paid_at: Option<String>,
    /// When it was created, RFC 3339.
    pub created_at: String,
}

impl From<TicketRecord> for TicketSummary {
    fn from(ticket: TicketRecord) -> Self {
        let status = match ticket.status {
            TicketStatus::Pending => "pendiente",
            TicketStatus::Paid => "pagado",
        };
        Self {
            id: ticket.id.to_string(),
            campaign_id: ticket.campaign_id.to_string(),
            year: ticket.year,
            amount: ticket.amount,
            owner_id: ticket.owner_id.to_string(),
            club_id: ticket.club_id.map(|id| id.to_string()),
            status: status.to_owned(),
            paid_at: format_optional_timestamp(ticket.paid_at),
            created_at: format_timestamp(ticket.created_at),
        }
    }
}

/// Settlement result.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayTicketResponse {
    /// True when the ticket had already been settled; the call is a success
    /// either way.
    pub already_paid: bool,
}

impl From<SettlementOutcome> for PayTicketResponse {
    fn from(outcome: SettlementOutcome) -> Self {
        Self {
            already_paid: outcome.already_paid,
        }
    }
}

/// Federation-admin bulk settlement payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkPayRequest {
    /// Tickets to settle.
    pub ticket_ids: Vec<Uuid>,
}

/// Bulk settlement result.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkPayResponse {
    /// Tickets settled by this call.
    pub paid: usize,
    /// Tickets that were already settled.
    pub already_paid: usize,
}

impl From<BulkSettlementOutcome> for BulkPayResponse {
    fn from(outcome: BulkSettlementOutcome) -> Self {
        Self {
            paid: outcome.paid,
            already_paid: outcome.already_paid,
        }
    }
}
