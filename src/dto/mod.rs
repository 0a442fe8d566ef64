use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Login, refresh and activation payloads.
pub mod auth;
/// Campaign and ticket payloads.
pub mod campaigns;
/// Playing category payloads.
pub mod categories;
/// Club payloads.
pub mod clubs;
/// Coach payloads.
pub mod coaches;
/// Shared action and message payloads.
pub mod common;
/// Health payloads.
pub mod health;
/// Player payloads.
pub mod players;
/// Scholarship payloads.
pub mod scholarships;
/// Transfer request payloads.
pub mod transfers;
/// Validation helpers for DTOs.
pub mod validation;

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

fn format_optional_timestamp(timestamp: Option<OffsetDateTime>) -> Option<String> {
    timestamp.map(format_timestamp)
}
