use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Login, refresh and account activation flows.
pub mod accounts;
/// The authenticated actor and the role/club-scope guard.
pub mod access;
/// Bulk enrollment, membership and insurance campaigns plus ticket
/// settlement.
pub mod campaigns;
/// Club provisioning, profile completion, validation and the activity
/// cascade.
pub mod clubs;
/// Coach creation decision tree, join requests and validation.
pub mod coaches;
/// OpenAPI documentation aggregation.
pub mod documentation;
/// Token issuing and the credential provider gateway.
pub mod identity;
/// Activation mail delivery contract.
pub mod mailer;
/// Image conversion and upload contract.
pub mod media;
/// Player creation decision tree, profile completion and validation.
pub mod players;
/// Scholarship grant and revocation lifecycle.
pub mod scholarships;
/// Transfer request arbitration.
pub mod transfers;

/// Render a timestamp the way the stored documents carry it.
pub(crate) fn rfc3339_string(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
