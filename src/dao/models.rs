use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::{
    membership::ClubMembership,
    roles::RoleSet,
    scholarship::{IneligibilityReason, ScholarshipStatus},
    status::MembershipStatus,
    transfer::TransferStatus,
};

/// Identity record stored in the `usuarios` collection.
///
/// The activation token is only ever non-null while the record is
/// INCOMPLETO; completing the profile consumes it in the same transaction
/// that flips the status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Stable identifier, also used as the document id.
    pub id: Uuid,
    /// Login email, unique across the collection.
    pub email: String,
    /// Normalized role set.
    pub roles: RoleSet,
    /// Top-level lifecycle status.
    pub status: MembershipStatus,
    /// Single-use invitation secret, consumed at profile completion.
    pub activation_token: Option<String>,
    /// Email of the actor that created this user.
    pub created_by: String,
    /// Club associations, one entry per club.
    #[serde(default)]
    pub clubs: Vec<ClubMembership>,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last write timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Tenant record stored in the `clubes` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubRecord {
    /// Stable identifier, also used as the document id.
    pub id: Uuid,
    /// Club display name.
    pub name: String,
    /// City the club plays in.
    pub city: String,
    /// Contact email (the club admin's email at creation time).
    pub email: String,
    /// Lifecycle status.
    pub status: MembershipStatus,
    /// Person responsible for the club, filled at profile completion.
    pub manager: Option<String>,
    /// Venue address, filled at profile completion.
    pub venue: Option<String>,
    /// Contact phone, filled at profile completion.
    pub phone: Option<String>,
    /// Number of regulation courts.
    pub courts: Option<u32>,
    /// Number of alternative courts.
    pub alternative_courts: Option<u32>,
    /// Whether the club settled its federation membership for the year.
    #[serde(rename = "habilitadoAsambal")]
    pub asambal_enabled: bool,
    /// Public hero image URL, when one was uploaded.
    pub hero_url: Option<String>,
    /// When the hero image last changed.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub hero_updated_at: Option<OffsetDateTime>,
    /// Email of the actor that created this club.
    pub created_by: String,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last write timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Coach profile stored in the `profesores` collection, keyed by the id of
/// its owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachRecord {
    /// Document id; identical to `user_id`.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// First name.
    pub name: String,
    /// Surname.
    pub surname: String,
    /// Contact email.
    pub email: String,
    /// Contact phone, filled at profile completion.
    pub phone: Option<String>,
    /// Home address, filled at profile completion.
    pub address: Option<String>,
    /// National identity document number.
    pub national_id: Option<String>,
    /// Federation badge number.
    pub badge_number: Option<String>,
    /// Club associations, one entry per club, each with its own status.
    #[serde(default)]
    pub clubs: Vec<ClubMembership>,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last write timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Legal tutor of an underage player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tutor {
    /// Tutor first name.
    pub name: String,
    /// Tutor surname.
    pub surname: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// National identity document number.
    pub national_id: Option<String>,
}

/// Player profile stored in the `jugadores` collection, keyed by the id of
/// its owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    /// Document id; identical to `user_id`.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Coach that registered the player, when one did.
    pub coach_id: Option<Uuid>,
    /// First name.
    pub name: String,
    /// Surname.
    pub surname: String,
    /// Contact email.
    pub email: String,
    /// Birth date in `YYYY-MM-DD` form, filled at profile completion.
    pub birth_date: Option<String>,
    /// Legal tutor; required while the player is underage, null otherwise.
    pub tutor: Option<Tutor>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Home address.
    pub address: Option<String>,
    /// Height in centimeters.
    pub height: Option<f64>,
    /// Weight in kilograms.
    pub weight: Option<f64>,
    /// Whether the player currently holds a scholarship.
    #[serde(rename = "becado")]
    pub scholarship_holder: bool,
    /// Whether the player is eligible to play federation games.
    #[serde(rename = "habilitadoParaJugar")]
    pub enabled_to_play: bool,
    /// Why the player is not eligible; null whenever `enabled_to_play`.
    #[serde(rename = "motivoInhabilitacion")]
    pub ineligibility_reason: Option<IneligibilityReason>,
    /// Club associations, one entry per club, each with its own status.
    #[serde(default)]
    pub clubs: Vec<ClubMembership>,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last write timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Club data snapshotted into scholarships and transfer requests at the
/// moment they are created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubSnapshot {
    /// Club the snapshot refers to.
    pub club_id: Uuid,
    /// Display name at snapshot time.
    pub name: String,
    /// Categories involved at snapshot time.
    pub categories: Vec<String>,
}

/// Scholarship record stored in the `becas` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipRecord {
    /// Stable identifier, also used as the document id.
    pub id: Uuid,
    /// Player holding the scholarship.
    pub player_id: Uuid,
    /// Primary club of the player at grant time.
    pub club: ClubSnapshot,
    /// Federation admin that granted it.
    pub granted_by: Uuid,
    /// ACTIVA or REVOCADA.
    pub status: ScholarshipStatus,
    /// When the scholarship was granted.
    #[serde(with = "time::serde::rfc3339")]
    pub granted_at: OffsetDateTime,
    /// End of the membership year the grant covers.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    /// When it was revoked, if it was.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub revoked_at: Option<OffsetDateTime>,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last write timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Transfer request stored in the `transferRequests` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequestRecord {
    /// Stable identifier, also used as the document id.
    pub id: Uuid,
    /// Player the request moves.
    pub player_id: Uuid,
    /// Display name of the player, denormalized for listings.
    pub player_name: String,
    /// Club the player would leave.
    pub origin: ClubSnapshot,
    /// Club requesting the player.
    pub destination: ClubSnapshot,
    /// Categories the destination club wants the player in.
    pub categories: Vec<String>,
    /// Current stage of the three-party machine.
    pub status: TransferStatus,
    /// Club admin that opened the request.
    pub requested_by: Uuid,
    /// When the federation admin decided, if they did.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub admin_decided_at: Option<OffsetDateTime>,
    /// When the player decided, if they did.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub player_decided_at: Option<OffsetDateTime>,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last write timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Status of a coach join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinRequestStatus {
    /// Awaiting the coach's answer.
    #[serde(rename = "PENDIENTE")]
    Pending,
    /// Accepted; membership was appended.
    #[serde(rename = "ACEPTADA")]
    Accepted,
    /// Turned down by the coach.
    #[serde(rename = "RECHAZADA")]
    Rejected,
}

/// Request from a club to an already-registered coach, stored in the
/// `coachRequests` collection. Membership is only appended once the coach
/// explicitly accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachJoinRequestRecord {
    /// Stable identifier, also used as the document id.
    pub id: Uuid,
    /// Coach being invited.
    pub coach_id: Uuid,
    /// Coach email, denormalized for listings.
    pub coach_email: String,
    /// Inviting club.
    pub club_id: Uuid,
    /// Inviting club display name.
    pub club_name: String,
    /// Categories the club wants the coach for.
    pub categories: Vec<String>,
    /// Current status of the invitation.
    pub status: JoinRequestStatus,
    /// When the coach answered, if they did.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub responded_at: Option<OffsetDateTime>,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last write timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Kind of yearly bulk-billing round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignKind {
    /// Player registration round (`empadronamiento`).
    #[serde(rename = "empadronamiento")]
    Enrollment,
    /// Club membership round (`membresia`).
    #[serde(rename = "membresia")]
    Membership,
    /// Coach insurance round (`seguro`).
    #[serde(rename = "seguro")]
    Insurance,
}

impl std::fmt::Display for CampaignKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CampaignKind::Enrollment => "empadronamiento",
            CampaignKind::Membership => "membresia",
            CampaignKind::Insurance => "seguro",
        })
    }
}

impl CampaignKind {
    /// Collection holding the campaign records of this kind.
    pub fn campaign_collection(self) -> &'static str {
        match self {
            CampaignKind::Enrollment => "empadronamientos",
            CampaignKind::Membership => "membresias",
            CampaignKind::Insurance => "seguros",
        }
    }

    /// Collection holding the fanned-out tickets of this kind.
    pub fn ticket_collection(self) -> &'static str {
        match self {
            CampaignKind::Enrollment => "tickets",
            CampaignKind::Membership => "ticketsMembresias",
            CampaignKind::Insurance => "seguroProfesores",
        }
    }
}

/// Status of a campaign record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    /// Fan-out finished; every target entity was processed.
    #[serde(rename = "ACTIVA")]
    Active,
    /// Fan-out was cut short; re-running the creation resumes it.
    #[serde(rename = "INTERRUMPIDA")]
    Interrupted,
}

/// Yearly campaign record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    /// Stable identifier, also used as the document id.
    pub id: Uuid,
    /// Which billing round this is.
    pub kind: CampaignKind,
    /// Membership year the round bills for.
    pub year: i32,
    /// Unit amount billed per ticket.
    pub amount: i64,
    /// Whether the fan-out completed.
    pub status: CampaignStatus,
    /// Federation admin that created the round.
    pub created_by: Uuid,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last write timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Payment status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Awaiting payment.
    #[serde(rename = "pendiente")]
    Pending,
    /// Settled.
    #[serde(rename = "pagado")]
    Paid,
}

/// One billing ticket fanned out to a player, club or coach.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRecord {
    /// Stable identifier, also used as the document id.
    pub id: Uuid,
    /// Campaign that generated the ticket.
    pub campaign_id: Uuid,
    /// Kind of the generating campaign.
    pub kind: CampaignKind,
    /// Membership year billed.
    pub year: i32,
    /// Amount owed.
    pub amount: i64,
    /// Entity that owes the ticket (player, club or coach id).
    pub owner_id: Uuid,
    /// Club the owner belongs to, for club-scoped listings.
    pub club_id: Option<Uuid>,
    /// Payment status.
    pub status: TicketStatus,
    /// When the ticket was settled, if it was.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last write timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Playing category stored in the `categorias` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    /// Stable identifier, also used as the document id.
    pub id: Uuid,
    /// Category display name.
    pub name: String,
    /// Gender bracket the category belongs to.
    pub gender: String,
}

/// Best-effort audit trail entry stored in the `auditoria` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Stable identifier, also used as the document id.
    pub id: Uuid,
    /// Email of the actor performing the action.
    pub actor: String,
    /// Short action name, e.g. `toggle-club-status`.
    pub action: String,
    /// Entity kind the action touched.
    pub entity: String,
    /// Identifier of the touched entity.
    pub entity_id: String,
    /// When the action happened.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
