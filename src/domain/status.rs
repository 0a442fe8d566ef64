use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status shared by users, clubs and membership entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipStatus {
    /// Invited but the profile was never completed.
    #[serde(rename = "INCOMPLETO")]
    Incomplete,
    /// Profile completed, awaiting an approver's decision.
    #[serde(rename = "PENDIENTE")]
    Pending,
    /// Approved and operating.
    #[serde(rename = "ACTIVO")]
    Active,
    /// Rejected by an approver.
    #[serde(rename = "RECHAZADO")]
    Rejected,
    /// Deactivated, can be re-activated by a federation admin.
    #[serde(rename = "INACTIVO")]
    Inactive,
}

impl MembershipStatus {
    /// The string this status is stored and transmitted as.
    pub fn wire_name(self) -> &'static str {
        match self {
            MembershipStatus::Incomplete => "INCOMPLETO",
            MembershipStatus::Pending => "PENDIENTE",
            MembershipStatus::Active => "ACTIVO",
            MembershipStatus::Rejected => "RECHAZADO",
            MembershipStatus::Inactive => "INACTIVO",
        }
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Outcome chosen by an approver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Accept the pending record.
    Approve,
    /// Turn the pending record down.
    Reject,
}

/// Events that drive the status machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    /// The invited party completed their profile with a valid token.
    CompleteProfile,
    /// An authorized approver decided on a pending record.
    Decide(Decision),
    /// A federation admin toggled activity on or off.
    ToggleActivity,
}

/// Error returned when an event cannot be applied from the current status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from}")]
pub struct InvalidTransition {
    /// Status the record was in when the event arrived.
    pub from: MembershipStatus,
    /// The event that is not legal from that status.
    pub event: StatusEvent,
}

/// Compute the status resulting from applying `event` while in `from`.
pub fn apply_status_event(
    from: MembershipStatus,
    event: StatusEvent,
) -> Result<MembershipStatus, InvalidTransition> {
    let next = match (from, event) {
        (MembershipStatus::Incomplete, StatusEvent::CompleteProfile) => MembershipStatus::Pending,
        (MembershipStatus::Pending, StatusEvent::Decide(Decision::Approve)) => {
            MembershipStatus::Active
        }
        (MembershipStatus::Pending, StatusEvent::Decide(Decision::Reject)) => {
            MembershipStatus::Rejected
        }
        (MembershipStatus::Active, StatusEvent::ToggleActivity) => MembershipStatus::Inactive,
        (MembershipStatus::Inactive, StatusEvent::ToggleActivity) => MembershipStatus::Active,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(from: MembershipStatus, event: StatusEvent) -> MembershipStatus {
        apply_status_event(from, event).unwrap()
    }

    #[test]
    fn full_happy_path_through_activation() {
        let status = apply(MembershipStatus::Incomplete, StatusEvent::CompleteProfile);
        assert_eq!(status, MembershipStatus::Pending);

        let status = apply(status, StatusEvent::Decide(Decision::Approve));
        assert_eq!(status, MembershipStatus::Active);

        let status = apply(status, StatusEvent::ToggleActivity);
        assert_eq!(status, MembershipStatus::Inactive);

        let status = apply(status, StatusEvent::ToggleActivity);
        assert_eq!(status, MembershipStatus::Active);
    }

    #[test]
    fn rejection_is_terminal() {
        let status = apply(
            MembershipStatus::Pending,
            StatusEvent::Decide(Decision::Reject),
        );
        assert_eq!(status, MembershipStatus::Rejected);

        let err = apply_status_event(status, StatusEvent::ToggleActivity).unwrap_err();
        assert_eq!(err.from, MembershipStatus::Rejected);
    }

    #[test]
    fn pending_records_cannot_be_toggled() {
        let err =
            apply_status_event(MembershipStatus::Pending, StatusEvent::ToggleActivity).unwrap_err();
        assert_eq!(err.from, MembershipStatus::Pending);
        assert_eq!(err.event, StatusEvent::ToggleActivity);
    }

    #[test]
    fn profile_completion_requires_incomplete() {
        for from in [
            MembershipStatus::Pending,
            MembershipStatus::Active,
            MembershipStatus::Rejected,
            MembershipStatus::Inactive,
        ] {
            assert!(apply_status_event(from, StatusEvent::CompleteProfile).is_err());
        }
    }
}
