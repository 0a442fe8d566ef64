use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::status::Decision;

/// Stages of a player transfer request.
///
/// A request is opened by the destination club, then waits for the
/// federation admin and finally for the player; each party can turn it
/// down, and only the player's acceptance moves the player between clubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    /// Awaiting the federation admin.
    #[serde(rename = "PENDIENTE")]
    Pending,
    /// Accepted by the admin, awaiting the player's consent.
    #[serde(rename = "PENDIENTE_JUGADOR")]
    PendingPlayer,
    /// Confirmed by the player; the membership move has been applied.
    #[serde(rename = "CONFIRMADO")]
    Confirmed,
    /// Turned down by the federation admin.
    #[serde(rename = "RECHAZADO_ADMIN")]
    RejectedByAdmin,
    /// Turned down by the player.
    #[serde(rename = "RECHAZADO_JUGADOR")]
    RejectedByPlayer,
}

impl TransferStatus {
    /// Whether the request reached a final stage.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransferStatus::Pending | TransferStatus::PendingPlayer)
    }

    /// Wire names of the non-terminal stages, for open-request queries.
    pub fn open_wire_names() -> [&'static str; 2] {
        ["PENDIENTE", "PENDIENTE_JUGADOR"]
    }
}

/// Events driving a transfer request forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEvent {
    /// Decision taken by the federation admin.
    AdminDecision(Decision),
    /// Decision taken by the player.
    PlayerDecision(Decision),
}

/// Error returned when a decision arrives at the wrong stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransferTransition {
    /// Stage the request was in.
    pub from: TransferStatus,
    /// The decision that is not legal at that stage.
    pub event: TransferEvent,
}

/// Compute the stage resulting from applying `event` while in `from`.
pub fn apply_transfer_event(
    from: TransferStatus,
    event: TransferEvent,
) -> Result<TransferStatus, InvalidTransferTransition> {
    let next = match (from, event) {
        (TransferStatus::Pending, TransferEvent::AdminDecision(Decision::Approve)) => {
            TransferStatus::PendingPlayer
        }
        (TransferStatus::Pending, TransferEvent::AdminDecision(Decision::Reject)) => {
            TransferStatus::RejectedByAdmin
        }
        (TransferStatus::PendingPlayer, TransferEvent::PlayerDecision(Decision::Approve)) => {
            TransferStatus::Confirmed
        }
        (TransferStatus::PendingPlayer, TransferEvent::PlayerDecision(Decision::Reject)) => {
            TransferStatus::RejectedByPlayer
        }
        (from, event) => return Err(InvalidTransferTransition { from, event }),
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(from: TransferStatus, event: TransferEvent) -> TransferStatus {
        apply_transfer_event(from, event).unwrap()
    }

    #[test]
    fn happy_path_reaches_confirmed() {
        let status = apply(
            TransferStatus::Pending,
            TransferEvent::AdminDecision(Decision::Approve),
        );
        assert_eq!(status, TransferStatus::PendingPlayer);

        let status = apply(status, TransferEvent::PlayerDecision(Decision::Approve));
        assert_eq!(status, TransferStatus::Confirmed);
        assert!(status.is_terminal());
    }

    #[test]
    fn either_party_can_reject() {
        assert_eq!(
            apply(
                TransferStatus::Pending,
                TransferEvent::AdminDecision(Decision::Reject)
            ),
            TransferStatus::RejectedByAdmin
        );
        assert_eq!(
            apply(
                TransferStatus::PendingPlayer,
                TransferEvent::PlayerDecision(Decision::Reject)
            ),
            TransferStatus::RejectedByPlayer
        );
    }

    #[test]
    fn player_cannot_decide_before_the_admin() {
        let err = apply_transfer_event(
            TransferStatus::Pending,
            TransferEvent::PlayerDecision(Decision::Approve),
        )
        .unwrap_err();
        assert_eq!(err.from, TransferStatus::Pending);
    }

    #[test]
    fn terminal_stages_accept_no_decision() {
        for from in [
            TransferStatus::Confirmed,
            TransferStatus::RejectedByAdmin,
            TransferStatus::RejectedByPlayer,
        ] {
            assert!(
                apply_transfer_event(from, TransferEvent::AdminDecision(Decision::Approve))
                    .is_err()
            );
            assert!(
                apply_transfer_event(from, TransferEvent::PlayerDecision(Decision::Reject))
                    .is_err()
            );
        }
    }
}
