use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    dao::{
        audit,
        models::{ClubSnapshot, PlayerRecord, ScholarshipRecord},
        players::{self, PlayerRepository},
        scholarships::{self, ScholarshipRepository},
    },
    domain::{
        roles::Role,
        scholarship::{IneligibilityReason, ScholarshipStatus, scholarship_expiry},
    },
    error::WorkflowError,
    services::access::Actor,
    state::SharedState,
};

/// A scholarship holder with the active scholarship record.
pub struct ScholarshipHolder {
    /// The player holding the scholarship.
    pub player: PlayerRecord,
    /// The ACTIVA scholarship.
    pub scholarship: ScholarshipRecord,
}

/// Grant a scholarship to a player.
///
/// At most one ACTIVA scholarship may exist per player; the check and the
/// grant share one transaction, so concurrent grant attempts cannot both
/// succeed. The grant snapshots the player's primary club and flips the
/// eligibility flags in the same commit.
pub async fn grant(
    state: &SharedState,
    actor: &Actor,
    player_id: Uuid,
) -> Result<ScholarshipRecord, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;
    let granted_by = actor.id;

    let scholarship = state
        .store()
        .run_transaction::<ScholarshipRecord, WorkflowError, _>(|tx| {
            Box::pin(async move {
                let mut player = players::get_in_tx(tx, player_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("player `{player_id}`")))?;

                if scholarships::find_active_for_player_in_tx(tx, player_id)
                    .await?
                    .is_some()
                {
                    return Err(WorkflowError::DuplicateActiveScholarship);
                }

                let club = player
                    .clubs
                    .first()
                    .map(|entry| ClubSnapshot {
                        club_id: entry.club_id,
                        name: entry.club_name.clone(),
                        categories: entry.categories.clone(),
                    })
                    .ok_or_else(|| {
                        WorkflowError::InvalidState("player has no club membership".to_owned())
                    })?;

                let now = OffsetDateTime::now_utc();
                let scholarship = ScholarshipRecord {
                    id: Uuid::new_v4(),
                    player_id,
                    club,
                    granted_by,
                    status: ScholarshipStatus::Active,
                    granted_at: now,
                    expires_at: scholarship_expiry(now),
                    revoked_at: None,
                    created_at: now,
                    updated_at: now,
                };

                player.scholarship_holder = true;
                player.enabled_to_play = true;
                player.ineligibility_reason = None;
                player.updated_at = now;

                scholarships::save_in_tx(tx, &scholarship)?;
                players::save_in_tx(tx, &player)?;
                Ok(scholarship)
            })
        })
        .await?;

    audit::record(
        state.store(),
        &actor.email,
        "grant-scholarship",
        "scholarship",
        &scholarship.id.to_string(),
    )
    .await;

    Ok(scholarship)
}

/// Revoke an ACTIVA scholarship.
///
/// The record flips to REVOCADA with a revocation timestamp, and the player
/// drops back to ineligible with the enrollment-pending code, all in one
/// transaction.
pub async fn revoke(
    state: &SharedState,
    actor: &Actor,
    scholarship_id: Uuid,
) -> Result<(), WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;

    state
        .store()
        .run_transaction::<(), WorkflowError, _>(|tx| {
            Box::pin(async move {
                let mut scholarship = scholarships::get_in_tx(tx, scholarship_id)
                    .await?
                    .ok_or_else(|| {
                        WorkflowError::NotFound(format!("scholarship `{scholarship_id}`"))
                    })?;

                if scholarship.status != ScholarshipStatus::Active {
                    return Err(WorkflowError::InvalidState(
                        "scholarship is not active".to_owned(),
                    ));
                }

                let mut player = players::get_in_tx(tx, scholarship.player_id)
                    .await?
                    .ok_or_else(|| {
                        WorkflowError::NotFound(format!("player `{}`", scholarship.player_id))
                    })?;

                let now = OffsetDateTime::now_utc();
                scholarship.status = ScholarshipStatus::Revoked;
                scholarship.revoked_at = Some(now);
                scholarship.updated_at = now;

                player.scholarship_holder = false;
                player.enabled_to_play = false;
                player.ineligibility_reason = Some(IneligibilityReason::EnrollmentPending);
                player.updated_at = now;

                scholarships::save_in_tx(tx, &scholarship)?;
                players::save_in_tx(tx, &player)?;
                Ok(())
            })
        })
        .await?;

    audit::record(
        state.store(),
        &actor.email,
        "revoke-scholarship",
        "scholarship",
        &scholarship_id.to_string(),
    )
    .await;

    Ok(())
}

/// Every player currently holding an ACTIVA scholarship.
pub async fn players_with_scholarship(
    state: &SharedState,
    actor: &Actor,
) -> Result<Vec<ScholarshipHolder>, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;

    let scholarships = ScholarshipRepository::new(state.store().clone());
    let players = PlayerRepository::new(state.store().clone());

    let mut holders = Vec::new();
    for scholarship in scholarships.list_active().await? {
        let Some(player) = players.find_by_id(scholarship.player_id).await? else {
            continue;
        };
        holders.push(ScholarshipHolder {
            player,
            scholarship,
        });
    }
    Ok(holders)
}

/// Full scholarship history of one player, newest grant first.
pub async fn history(
    state: &SharedState,
    actor: &Actor,
    player_id: Uuid,
) -> Result<Vec<ScholarshipRecord>, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;
    Ok(ScholarshipRepository::new(state.store().clone())
        .history_for_player(player_id)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::status::MembershipStatus,
        testing::{fed_admin_actor, seed_active_club, seed_player, test_state},
    };

    async fn seeded_player(state: &crate::state::SharedState) -> PlayerRecord {
        let club = seed_active_club(state, "Municipalidad").await;
        seed_player(
            state,
            "lucia@club.test",
            &[(club.id, "Municipalidad", MembershipStatus::Active)],
        )
        .await
    }

    #[tokio::test]
    async fn granting_flips_the_eligibility_flags() {
        let state = test_state();
        let admin = fed_admin_actor();
        let player = seeded_player(&state).await;

        let scholarship = grant(&state, &admin, player.id).await.unwrap();
        assert_eq!(scholarship.status, ScholarshipStatus::Active);
        assert_eq!(scholarship.club.name, "Municipalidad");

        let stored = PlayerRepository::new(state.store().clone())
            .find_by_id(player.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.scholarship_holder);
        assert!(stored.enabled_to_play);
        assert_eq!(stored.ineligibility_reason, None);
    }

    #[tokio::test]
    async fn a_second_grant_is_rejected_as_duplicate() {
        let state = test_state();
        let admin = fed_admin_actor();
        let player = seeded_player(&state).await;

        grant(&state, &admin, player.id).await.unwrap();
        let err = grant(&state, &admin, player.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::DuplicateActiveScholarship));
    }

    #[tokio::test]
    async fn concurrent_grants_end_with_exactly_one_active_scholarship() {
        let state = test_state();
        let admin = fed_admin_actor();
        let player = seeded_player(&state).await;

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let state = state.clone();
            let admin = admin.clone();
            let player_id = player.id;
            tasks.push(tokio::spawn(async move {
                grant(&state, &admin, player_id).await
            }));
        }

        let mut granted = 0;
        let mut duplicates = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => granted += 1,
                Err(WorkflowError::DuplicateActiveScholarship) => duplicates += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(granted, 1);
        assert_eq!(duplicates, 7);

        let active = ScholarshipRepository::new(state.store().clone())
            .list_active()
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn revocation_is_one_shot_and_resets_the_player() {
        let state = test_state();
        let admin = fed_admin_actor();
        let player = seeded_player(&state).await;
        let scholarship = grant(&state, &admin, player.id).await.unwrap();

        revoke(&state, &admin, scholarship.id).await.unwrap();

        let stored = ScholarshipRepository::new(state.store().clone())
            .find_by_id(scholarship.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ScholarshipStatus::Revoked);
        assert!(stored.revoked_at.is_some());

        let stored_player = PlayerRepository::new(state.store().clone())
            .find_by_id(player.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!stored_player.scholarship_holder);
        assert!(!stored_player.enabled_to_play);
        assert_eq!(
            stored_player.ineligibility_reason,
            Some(IneligibilityReason::EnrollmentPending)
        );

        // Revoking twice is an invalid state, and nothing flips back.
        let err = revoke(&state, &admin, scholarship.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[tokio::test]
    async fn revoking_a_missing_scholarship_is_not_found() {
        let state = test_state();
        let admin = fed_admin_actor();
        let err = revoke(&state, &admin, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn history_lists_grants_newest_first() {
        let state = test_state();
        let admin = fed_admin_actor();
        let player = seeded_player(&state).await;

        let first = grant(&state, &admin, player.id).await.unwrap();
        revoke(&state, &admin, first.id).await.unwrap();
        let second = grant(&state, &admin, player.id).await.unwrap();

        let history = history(&state, &admin, player.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, first.id);
    }
}
