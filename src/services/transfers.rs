use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    dao::{
        audit,
        models::{ClubSnapshot, PlayerRecord, TransferRequestRecord},
        players::{self, PlayerRepository},
        transfers::{self, TransferRepository},
        users,
    },
    domain::{
        membership::{MembershipPatch, membership_for, remove_membership, upsert_membership},
        roles::Role,
        status::{Decision, MembershipStatus},
        transfer::{TransferEvent, TransferStatus, apply_transfer_event},
    },
    error::WorkflowError,
    services::{access::Actor, identity::ClubClaim},
    state::SharedState,
};

/// Open a transfer request from `destination` for an existing player.
///
/// Shared by the explicit request endpoint and the player-creation conflict
/// path. Fails when the player already belongs to the destination club or
/// when a non-terminal request for them is in flight.
pub(crate) async fn open_request(
    state: &SharedState,
    destination: &ClubClaim,
    requested_by: Uuid,
    player: &PlayerRecord,
    categories: Vec<String>,
) -> Result<TransferRequestRecord, WorkflowError> {
    if membership_for(&player.clubs, destination.club_id).is_some() {
        return Err(WorkflowError::AlreadyMember(
            "the player already belongs to this club".to_owned(),
        ));
    }

    let origin = player
        .clubs
        .first()
        .ok_or_else(|| {
            WorkflowError::InvalidState("player has no current club to transfer from".to_owned())
        })?
        .clone();

    let player_id = player.id;
    let player_name = format!("{} {}", player.name, player.surname);
    let destination = destination.clone();

    state
        .store()
        .run_transaction::<TransferRequestRecord, WorkflowError, _>(|tx| {
            let origin = origin.clone();
            let destination = destination.clone();
            let player_name = player_name.clone();
            let categories = categories.clone();
            Box::pin(async move {
                if transfers::find_open_for_player_in_tx(tx, player_id)
                    .await?
                    .is_some()
                {
                    return Err(WorkflowError::InvalidState(
                        "a transfer request for this player is already open".to_owned(),
                    ));
                }

                let now = OffsetDateTime::now_utc();
                let request = TransferRequestRecord {
                    id: Uuid::new_v4(),
                    player_id,
                    player_name,
                    origin: ClubSnapshot {
                        club_id: origin.club_id,
                        name: origin.club_name,
                        categories: origin.categories,
                    },
                    destination: ClubSnapshot {
                        club_id: destination.club_id,
                        name: destination.name,
                        categories: categories.clone(),
                    },
                    categories,
                    status: TransferStatus::Pending,
                    requested_by,
                    admin_decided_at: None,
                    player_decided_at: None,
                    created_at: now,
                    updated_at: now,
                };
                transfers::save_in_tx(tx, &request)?;
                Ok(request)
            })
        })
        .await
}

/// Open a transfer request for a player not yet at the acting admin's club.
pub async fn request_transfer(
    state: &SharedState,
    actor: &Actor,
    player_id: Uuid,
    categories: Vec<String>,
) -> Result<TransferRequestRecord, WorkflowError> {
    actor.require_role(Role::ClubAdmin)?;
    let destination = actor.active_club()?.clone();
    if categories.is_empty() {
        return Err(WorkflowError::Validation(
            "at least one category is required".to_owned(),
        ));
    }

    let player = PlayerRepository::new(state.store().clone())
        .find_by_id(player_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("player `{player_id}`")))?;

    let request = open_request(state, &destination, actor.id, &player, categories).await?;
    audit::record(
        state.store(),
        &actor.email,
        "request-transfer",
        "transferRequest",
        &request.id.to_string(),
    )
    .await;
    Ok(request)
}

/// Federation admin decision: PENDIENTE → PENDIENTE_JUGADOR or
/// RECHAZADO_ADMIN. Player data is never touched at this stage.
pub async fn admin_decide(
    state: &SharedState,
    actor: &Actor,
    request_id: Uuid,
    decision: Decision,
) -> Result<TransferStatus, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;

    let status = state
        .store()
        .run_transaction::<TransferStatus, WorkflowError, _>(|tx| {
            Box::pin(async move {
                let mut request = transfers::get_in_tx(tx, request_id)
                    .await?
                    .ok_or_else(|| {
                        WorkflowError::NotFound(format!("transfer request `{request_id}`"))
                    })?;

                let now = OffsetDateTime::now_utc();
                request.status =
                    apply_transfer_event(request.status, TransferEvent::AdminDecision(decision))?;
                request.admin_decided_at = Some(now);
                request.updated_at = now;
                transfers::save_in_tx(tx, &request)?;
                Ok(request.status)
            })
        })
        .await?;

    audit::record(
        state.store(),
        &actor.email,
        "decide-transfer",
        "transferRequest",
        &request_id.to_string(),
    )
    .await;

    Ok(status)
}

/// The player's own decision on a request awaiting their consent.
///
/// Acceptance atomically swaps the origin membership entry for an ACTIVO
/// destination entry on the player and their user record, and marks the
/// request CONFIRMADO. Rejection closes the request and touches nothing
/// else.
pub async fn player_decide(
    state: &SharedState,
    actor: &Actor,
    request_id: Uuid,
    decision: Decision,
) -> Result<TransferStatus, WorkflowError> {
    actor.require_role(Role::Player)?;
    let actor_id = actor.id;

    state
        .store()
        .run_transaction::<TransferStatus, WorkflowError, _>(|tx| {
            Box::pin(async move {
                let mut request = transfers::get_in_tx(tx, request_id)
                    .await?
                    .ok_or_else(|| {
                        WorkflowError::NotFound(format!("transfer request `{request_id}`"))
                    })?;

                if request.player_id != actor_id {
                    return Err(WorkflowError::Forbidden(
                        "transfer request concerns another player".to_owned(),
                    ));
                }

                let now = OffsetDateTime::now_utc();
                request.status =
                    apply_transfer_event(request.status, TransferEvent::PlayerDecision(decision))?;
                request.player_decided_at = Some(now);
                request.updated_at = now;

                if request.status == TransferStatus::Confirmed {
                    let mut player = players::get_in_tx(tx, request.player_id)
                        .await?
                        .ok_or_else(|| {
                            WorkflowError::NotFound(format!("player `{}`", request.player_id))
                        })?;

                    move_membership(&mut player.clubs, &request, now);
                    player.updated_at = now;
                    players::save_in_tx(tx, &player)?;

                    if let Some(mut user) = users::get_in_tx(tx, player.user_id).await? {
                        move_membership(&mut user.clubs, &request, now);
                        user.updated_at = now;
                        users::save_in_tx(tx, &user)?;
                    }
                }

                transfers::save_in_tx(tx, &request)?;
                Ok(request.status)
            })
        })
        .await
}

/// Swap the origin entry for an ACTIVO destination entry.
fn move_membership(
    entries: &mut Vec<crate::domain::membership::ClubMembership>,
    request: &TransferRequestRecord,
    now: OffsetDateTime,
) {
    remove_membership(entries, request.origin.club_id);
    upsert_membership(
        entries,
        request.destination.club_id,
        MembershipPatch {
            club_name: Some(request.destination.name.clone()),
            categories: Some(request.categories.clone()),
            status: Some(MembershipStatus::Active),
        },
        now,
    );
}

/// Requests sitting at a given stage (federation admin view); defaults to
/// the ones awaiting the admin.
pub async fn list_transfers(
    state: &SharedState,
    actor: &Actor,
    status: Option<TransferStatus>,
) -> Result<Vec<TransferRequestRecord>, WorkflowError> {
    actor.require_any_role(&[Role::FederationAdmin, Role::ClubAdmin])?;
    let status = status.unwrap_or(TransferStatus::Pending);
    Ok(TransferRepository::new(state.store().clone())
        .list_by_status(status)
        .await?)
}

/// Every request involving the acting player, newest first.
pub async fn my_transfer_requests(
    state: &SharedState,
    actor: &Actor,
) -> Result<Vec<TransferRequestRecord>, WorkflowError> {
    actor.require_role(Role::Player)?;
    Ok(TransferRepository::new(state.store().clone())
        .list_for_player(actor.id)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        club_admin_actor, fed_admin_actor, player_actor, seed_active_club, seed_player, test_state,
    };

    async fn open_for_seeded_player(
        state: &crate::state::SharedState,
    ) -> (TransferRequestRecord, PlayerRecord, Uuid, Uuid) {
        let muni = seed_active_club(state, "Municipalidad").await;
        let olimpia = seed_active_club(state, "Olimpia").await;
        let player = seed_player(
            state,
            "lucia@club.test",
            &[(olimpia.id, "Olimpia", MembershipStatus::Active)],
        )
        .await;

        let admin = club_admin_actor(muni.id, "Municipalidad");
        let request = request_transfer(state, &admin, player.id, vec!["cadetes".to_owned()])
            .await
            .unwrap();
        (request, player, muni.id, olimpia.id)
    }

    #[tokio::test]
    async fn full_arbitration_happy_path_moves_the_membership() {
        let state = test_state();
        let (request, player, muni_id, olimpia_id) = open_for_seeded_player(&state).await;

        let admin = fed_admin_actor();
        let status = admin_decide(&state, &admin, request.id, Decision::Approve)
            .await
            .unwrap();
        assert_eq!(status, TransferStatus::PendingPlayer);

        let as_player = player_actor(player.id, "lucia@club.test");
        let status = player_decide(&state, &as_player, request.id, Decision::Approve)
            .await
            .unwrap();
        assert_eq!(status, TransferStatus::Confirmed);

        let stored = PlayerRepository::new(state.store().clone())
            .find_by_id(player.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.clubs.len(), 1);
        assert_eq!(stored.clubs[0].club_id, muni_id);
        assert_eq!(stored.clubs[0].status, MembershipStatus::Active);
        assert!(membership_for(&stored.clubs, olimpia_id).is_none());
    }

    #[tokio::test]
    async fn rejection_at_either_stage_leaves_the_player_untouched() {
        let state = test_state();
        let (request, player, _, olimpia_id) = open_for_seeded_player(&state).await;
        let admin = fed_admin_actor();

        let status = admin_decide(&state, &admin, request.id, Decision::Reject)
            .await
            .unwrap();
        assert_eq!(status, TransferStatus::RejectedByAdmin);

        let stored = PlayerRepository::new(state.store().clone())
            .find_by_id(player.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.clubs.len(), 1);
        assert_eq!(stored.clubs[0].club_id, olimpia_id);

        // Second arbitration attempt on a closed request.
        let err = admin_decide(&state, &admin, request.id, Decision::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[tokio::test]
    async fn player_rejection_closes_without_moving_anything() {
        let state = test_state();
        let (request, player, _, olimpia_id) = open_for_seeded_player(&state).await;
        let admin = fed_admin_actor();
        admin_decide(&state, &admin, request.id, Decision::Approve)
            .await
            .unwrap();

        let as_player = player_actor(player.id, "lucia@club.test");
        let status = player_decide(&state, &as_player, request.id, Decision::Reject)
            .await
            .unwrap();
        assert_eq!(status, TransferStatus::RejectedByPlayer);

        let stored = PlayerRepository::new(state.store().clone())
            .find_by_id(player.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.clubs[0].club_id, olimpia_id);
    }

    #[tokio::test]
    async fn the_player_stage_is_fenced_to_the_named_player() {
        let state = test_state();
        let (request, _, _, _) = open_for_seeded_player(&state).await;
        let admin = fed_admin_actor();
        admin_decide(&state, &admin, request.id, Decision::Approve)
            .await
            .unwrap();

        let impostor = player_actor(Uuid::new_v4(), "someone-else@club.test");
        let err = player_decide(&state, &impostor, request.id, Decision::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        // And the player cannot jump the admin stage on a fresh request.
        let state2 = test_state();
        let (request2, player2, _, _) = open_for_seeded_player(&state2).await;
        let as_player = player_actor(player2.id, "lucia@club.test");
        let err = player_decide(&state2, &as_player, request2.id, Decision::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[tokio::test]
    async fn only_one_open_request_per_player() {
        let state = test_state();
        let (_, player, _, _) = open_for_seeded_player(&state).await;

        let third = seed_active_club(&state, "Estrella").await;
        let other_admin = club_admin_actor(third.id, "Estrella");
        let err = request_transfer(&state, &other_admin, player.id, vec!["cadetes".to_owned()])
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }
}
