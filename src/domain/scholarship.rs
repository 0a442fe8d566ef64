use serde::{Deserialize, Serialize};
use time::{Date, Month, OffsetDateTime, Time};

/// Status of a scholarship record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScholarshipStatus {
    /// The scholarship is in force.
    #[serde(rename = "ACTIVA")]
    Active,
    /// The scholarship was revoked before expiring.
    #[serde(rename = "REVOCADA")]
    Revoked,
}

/// Reason a player is currently not allowed to play.
///
/// Mutually exclusive with the eligibility flag: an eligible player carries
/// no reason at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IneligibilityReason {
    /// The yearly enrollment fee has not been settled.
    #[serde(rename = "EMPADRONAMIENTO_PENDIENTE")]
    EnrollmentPending,
}

/// Compute when a scholarship granted at `granted_at` expires.
///
/// The membership year closes at the end of February: a grant from March
/// onward runs until the last day of February of the following year, an
/// earlier grant only until the February of the same year. Expiry lands on
/// 23:59:59 of that day, leap years included.
pub fn scholarship_expiry(granted_at: OffsetDateTime) -> OffsetDateTime {
    let year = if granted_at.month() as u8 >= Month::March as u8 {
        granted_at.year() + 1
    } else {
        granted_at.year()
    };

    let last_day = time::util::days_in_year_month(year, Month::February);
    let date = Date::from_calendar_date(year, Month::February, last_day)
        .expect("last day of February is always a valid date");
    let end_of_day = Time::from_hms(23, 59, 59).expect("23:59:59 is a valid time");

    date.with_time(end_of_day).assume_utc()
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn grant_from_march_runs_into_the_next_membership_year() {
        let expiry = scholarship_expiry(datetime!(2024-03-15 12:00:00 UTC));
        assert_eq!(expiry, datetime!(2025-02-28 23:59:59 UTC));
    }

    #[test]
    fn grant_before_march_expires_the_same_year() {
        // 2024 is a leap year, so February ends on the 29th.
        let expiry = scholarship_expiry(datetime!(2024-01-15 12:00:00 UTC));
        assert_eq!(expiry, datetime!(2024-02-29 23:59:59 UTC));
    }

    #[test]
    fn grant_late_in_the_year_targets_a_leap_february() {
        let expiry = scholarship_expiry(datetime!(2023-09-01 00:00:00 UTC));
        assert_eq!(expiry, datetime!(2024-02-29 23:59:59 UTC));
    }

    #[test]
    fn first_of_march_already_counts_as_the_new_year() {
        let expiry = scholarship_expiry(datetime!(2023-03-01 00:00:00 UTC));
        assert_eq!(expiry, datetime!(2024-02-29 23:59:59 UTC));
    }
}
