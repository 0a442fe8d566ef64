use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    dao::{
        audit,
        clubs::{self, CLUBS, ClubRepository},
        coaches,
        models::{ClubRecord, UserRecord},
        players,
        users::{self, UserRepository},
    },
    domain::{
        membership::{ClubMembership, MembershipPatch, membership_for, upsert_membership},
        roles::{Role, RoleSet},
        status::{Decision, MembershipStatus, StatusEvent, apply_status_event},
    },
    error::WorkflowError,
    services::{
        access::Actor,
        identity::generate_activation_token,
        mailer::dispatch_activation_email,
        rfc3339_string,
    },
    state::SharedState,
};

/// Input for [`create_club_with_admin`].
#[derive(Debug, Clone)]
pub struct CreateClubInput {
    /// Display name of the new club.
    pub club_name: String,
    /// City the club plays in.
    pub city: String,
    /// Email the club admin invitation is sent to.
    pub admin_email: String,
}

/// Result of provisioning a club together with its admin user.
#[derive(Debug)]
pub struct ClubProvisionOutcome {
    /// Id of the created club.
    pub club_id: Uuid,
    /// Id of the created admin user.
    pub admin_user_id: Uuid,
    /// Whether the activation email left the building; the records are
    /// committed either way.
    pub email_dispatched: bool,
}

/// Profile data supplied when the invited club admin completes the club.
#[derive(Debug, Clone)]
pub struct ClubProfileInput {
    /// Person responsible for the club.
    pub manager: String,
    /// Venue address.
    pub venue: String,
    /// Contact phone.
    pub phone: String,
    /// Number of regulation courts.
    pub courts: Option<u32>,
    /// Number of alternative courts.
    pub alternative_courts: Option<u32>,
}

/// Fields a federation admin may rewrite on a club.
#[derive(Debug, Clone)]
pub struct UpdateClubInput {
    /// Display name.
    pub name: String,
    /// City.
    pub city: String,
    /// Responsible person.
    pub manager: String,
    /// Venue address.
    pub venue: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
}

/// Fields a club admin may patch on their own club.
#[derive(Debug, Clone, Default)]
pub struct UpdateMyClubInput {
    /// City.
    pub city: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Venue address.
    pub venue: Option<String>,
    /// Responsible person.
    pub manager: Option<String>,
    /// Number of regulation courts.
    pub courts: Option<u32>,
    /// Number of alternative courts.
    pub alternative_courts: Option<u32>,
}

/// A pending club-admin awaiting federation validation.
pub struct PendingClubAdmin {
    /// The pending user.
    pub user: UserRecord,
    /// The club the user would administrate, when it still exists.
    pub club: Option<ClubRecord>,
}

/// Create a club and its admin user in one transaction, then dispatch the
/// activation email.
///
/// Both records start INCOMPLETO; the admin user carries the single-use
/// activation token.
pub async fn create_club_with_admin(
    state: &SharedState,
    actor: &Actor,
    input: CreateClubInput,
) -> Result<ClubProvisionOutcome, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;

    if input.club_name.trim().is_empty()
        || input.city.trim().is_empty()
        || input.admin_email.trim().is_empty()
    {
        return Err(WorkflowError::Validation(
            "club name, city and admin email are required".to_owned(),
        ));
    }

    let club_id = Uuid::new_v4();
    let admin_user_id = Uuid::new_v4();
    let activation_token = generate_activation_token();

    state
        .store()
        .run_transaction::<(), WorkflowError, _>(|tx| {
            let input = input.clone();
            let token = activation_token.clone();
            let created_by = actor.email.clone();
            Box::pin(async move {
                if users::find_by_email_in_tx(tx, &input.admin_email)
                    .await?
                    .is_some()
                {
                    return Err(WorkflowError::AlreadyMember(format!(
                        "a user with email `{}` already exists",
                        input.admin_email
                    )));
                }

                let now = OffsetDateTime::now_utc();
                let club = ClubRecord {
                    id: club_id,
                    name: input.club_name.clone(),
                    city: input.city,
                    email: input.admin_email.clone(),
                    status: MembershipStatus::Incomplete,
                    manager: None,
                    venue: None,
                    phone: None,
                    courts: None,
                    alternative_courts: None,
                    asambal_enabled: false,
                    hero_url: None,
                    hero_updated_at: None,
                    created_by: created_by.clone(),
                    created_at: now,
                    updated_at: now,
                };

                let user = UserRecord {
                    id: admin_user_id,
                    email: input.admin_email,
                    roles: RoleSet::single(Role::ClubAdmin),
                    status: MembershipStatus::Incomplete,
                    activation_token: Some(token),
                    created_by,
                    clubs: vec![ClubMembership {
                        club_id,
                        club_name: input.club_name,
                        categories: Vec::new(),
                        status: MembershipStatus::Incomplete,
                        updated_at: now,
                    }],
                    created_at: now,
                    updated_at: now,
                };

                clubs::save_in_tx(tx, &club)?;
                users::save_in_tx(tx, &user)?;
                Ok(())
            })
        })
        .await?;

    let email_dispatched =
        dispatch_activation_email(state, &input.admin_email, &activation_token).await;
    audit::record(
        state.store(),
        &actor.email,
        "create-club",
        "club",
        &club_id.to_string(),
    )
    .await;

    Ok(ClubProvisionOutcome {
        club_id,
        admin_user_id,
        email_dispatched,
    })
}

/// Complete the club profile using the admin's activation token.
///
/// Club and admin user move INCOMPLETO → PENDIENTE and the token is nulled,
/// all in one transaction.
pub async fn complete_club_profile(
    state: &SharedState,
    club_id: Uuid,
    token: &str,
    input: ClubProfileInput,
) -> Result<(), WorkflowError> {
    let repository = UserRepository::new(state.store().clone());
    let user = repository
        .find_by_activation_token(token)
        .await?
        .ok_or(WorkflowError::InvalidToken)?;
    if membership_for(&user.clubs, club_id).is_none() {
        return Err(WorkflowError::InvalidToken);
    }
    let user_id = user.id;

    state
        .store()
        .run_transaction::<(), WorkflowError, _>(|tx| {
            let token = token.to_owned();
            let input = input.clone();
            Box::pin(async move {
                let mut user = users::get_in_tx(tx, user_id)
                    .await?
                    .ok_or(WorkflowError::InvalidToken)?;
                if user.activation_token.as_deref() != Some(token.as_str()) {
                    return Err(WorkflowError::InvalidToken);
                }

                let mut club = clubs::get_in_tx(tx, club_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("club `{club_id}`")))?;

                let now = OffsetDateTime::now_utc();
                club.manager = Some(input.manager);
                club.venue = Some(input.venue);
                club.phone = Some(input.phone);
                club.courts = input.courts;
                club.alternative_courts = input.alternative_courts;
                club.status = apply_status_event(club.status, StatusEvent::CompleteProfile)?;
                club.updated_at = now;

                user.status = apply_status_event(user.status, StatusEvent::CompleteProfile)?;
                user.activation_token = None;
                upsert_membership(
                    &mut user.clubs,
                    club_id,
                    MembershipPatch {
                        status: Some(MembershipStatus::Pending),
                        ..Default::default()
                    },
                    now,
                );
                user.updated_at = now;

                clubs::save_in_tx(tx, &club)?;
                users::save_in_tx(tx, &user)?;
                Ok(())
            })
        })
        .await
}

/// List the club admins waiting for federation validation, with their club.
pub async fn pending_club_admins(
    state: &SharedState,
    actor: &Actor,
) -> Result<Vec<PendingClubAdmin>, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;

    let users = UserRepository::new(state.store().clone());
    let clubs = ClubRepository::new(state.store().clone());

    let mut pending = Vec::new();
    for user in users.list_by_status(MembershipStatus::Pending).await? {
        if !user.roles.contains(Role::ClubAdmin) {
            continue;
        }
        let club = match user.clubs.first() {
            Some(membership) => clubs.find_by_id(membership.club_id).await?,
            None => None,
        };
        pending.push(PendingClubAdmin { user, club });
    }

    Ok(pending)
}

/// Federation admin decision over a pending club admin.
///
/// Approval activates both the user and the club; rejection marks both
/// RECHAZADO. One transaction covers the three documents involved.
pub async fn validate_club_admin(
    state: &SharedState,
    actor: &Actor,
    user_id: Uuid,
    decision: Decision,
) -> Result<MembershipStatus, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;

    let status = state
        .store()
        .run_transaction::<MembershipStatus, WorkflowError, _>(|tx| {
            Box::pin(async move {
                let mut user = users::get_in_tx(tx, user_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("user `{user_id}`")))?;
                if !user.roles.contains(Role::ClubAdmin) {
                    return Err(WorkflowError::InvalidState(
                        "user is not a club admin".to_owned(),
                    ));
                }

                let club_id = user
                    .clubs
                    .first()
                    .map(|membership| membership.club_id)
                    .ok_or_else(|| {
                        WorkflowError::InvalidState("user has no club association".to_owned())
                    })?;
                let mut club = clubs::get_in_tx(tx, club_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("club `{club_id}`")))?;

                let now = OffsetDateTime::now_utc();
                user.status = apply_status_event(user.status, StatusEvent::Decide(decision))?;
                club.status = apply_status_event(club.status, StatusEvent::Decide(decision))?;
                upsert_membership(
                    &mut user.clubs,
                    club_id,
                    MembershipPatch {
                        status: Some(user.status),
                        ..Default::default()
                    },
                    now,
                );
                user.updated_at = now;
                club.updated_at = now;

                users::save_in_tx(tx, &user)?;
                clubs::save_in_tx(tx, &club)?;
                Ok(user.status)
            })
        })
        .await?;

    audit::record(
        state.store(),
        &actor.email,
        "validate-club-admin",
        "user",
        &user_id.to_string(),
    )
    .await;

    Ok(status)
}

/// Toggle a club ACTIVO ↔ INACTIVO, cascading to every membership entry
/// referencing it.
///
/// Entries currently matching the club's pre-toggle status flip with it;
/// entries in other states (pending, rejected, other clubs) are untouched,
/// so toggling twice restores the starting picture. Club, users, coaches
/// and players all commit in a single transaction.
pub async fn toggle_club_status(
    state: &SharedState,
    actor: &Actor,
    club_id: Uuid,
) -> Result<MembershipStatus, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;

    let status = state
        .store()
        .run_transaction::<MembershipStatus, WorkflowError, _>(|tx| {
            Box::pin(async move {
                let mut club = clubs::get_in_tx(tx, club_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("club `{club_id}`")))?;

                let previous = club.status;
                let next = apply_status_event(previous, StatusEvent::ToggleActivity)?;
                let now = OffsetDateTime::now_utc();
                club.status = next;
                club.updated_at = now;
                clubs::save_in_tx(tx, &club)?;

                for mut user in users::list_in_tx(tx).await? {
                    if !cascade_entry(&mut user.clubs, club_id, previous, next, now) {
                        continue;
                    }
                    user.status = cascaded_top_level(user.status, &user.clubs);
                    user.updated_at = now;
                    users::save_in_tx(tx, &user)?;
                }

                for mut coach in coaches::list_in_tx(tx).await? {
                    if !cascade_entry(&mut coach.clubs, club_id, previous, next, now) {
                        continue;
                    }
                    coach.updated_at = now;
                    coaches::save_in_tx(tx, &coach)?;
                }

                for mut player in players::list_in_tx(tx).await? {
                    if !cascade_entry(&mut player.clubs, club_id, previous, next, now) {
                        continue;
                    }
                    player.updated_at = now;
                    players::save_in_tx(tx, &player)?;
                }

                Ok(next)
            })
        })
        .await?;

    audit::record(
        state.store(),
        &actor.email,
        "toggle-club-status",
        "club",
        &club_id.to_string(),
    )
    .await;

    Ok(status)
}

/// Flip the entry for `club_id` when it matches the club's pre-toggle
/// status. Returns whether the list changed.
fn cascade_entry(
    entries: &mut Vec<ClubMembership>,
    club_id: Uuid,
    previous: MembershipStatus,
    next: MembershipStatus,
    now: OffsetDateTime,
) -> bool {
    let flips = entries
        .iter()
        .any(|entry| entry.club_id == club_id && entry.status == previous);
    if !flips {
        return false;
    }

    upsert_membership(
        entries,
        club_id,
        MembershipPatch {
            status: Some(next),
            ..Default::default()
        },
        now,
    );
    true
}

/// Re-derive a user's top-level status after a cascade touched their
/// membership list. Only users already in the ACTIVO/INACTIVO range move.
fn cascaded_top_level(current: MembershipStatus, clubs: &[ClubMembership]) -> MembershipStatus {
    if !matches!(
        current,
        MembershipStatus::Active | MembershipStatus::Inactive
    ) {
        return current;
    }

    if clubs
        .iter()
        .any(|entry| entry.status == MembershipStatus::Active)
    {
        MembershipStatus::Active
    } else if clubs
        .iter()
        .any(|entry| entry.status == MembershipStatus::Inactive)
    {
        MembershipStatus::Inactive
    } else {
        current
    }
}

/// List every club (federation admin view).
pub async fn list_clubs(state: &SharedState, actor: &Actor) -> Result<Vec<ClubRecord>, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;
    Ok(ClubRepository::new(state.store().clone()).list_all().await?)
}

/// Fetch one club by id.
pub async fn get_club(
    state: &SharedState,
    actor: &Actor,
    club_id: Uuid,
) -> Result<ClubRecord, WorkflowError> {
    actor.require_any_role(&[Role::FederationAdmin, Role::ClubAdmin])?;
    ClubRepository::new(state.store().clone())
        .find_by_id(club_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("club `{club_id}`")))
}

/// Federation admin rewrite of a club's profile fields.
pub async fn update_club(
    state: &SharedState,
    actor: &Actor,
    club_id: Uuid,
    input: UpdateClubInput,
) -> Result<ClubRecord, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;

    let repository = ClubRepository::new(state.store().clone());
    let mut club = repository
        .find_by_id(club_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("club `{club_id}`")))?;

    club.name = input.name;
    club.city = input.city;
    club.manager = Some(input.manager);
    club.venue = Some(input.venue);
    club.phone = Some(input.phone);
    club.email = input.email;
    club.updated_at = OffsetDateTime::now_utc();
    repository.save(&club).await?;

    Ok(club)
}

/// The club operated by the acting club admin.
pub async fn my_club_profile(
    state: &SharedState,
    actor: &Actor,
) -> Result<ClubRecord, WorkflowError> {
    actor.require_role(Role::ClubAdmin)?;
    let club_id = actor.active_club()?.club_id;
    ClubRepository::new(state.store().clone())
        .find_by_id(club_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("club `{club_id}`")))
}

/// Patch the acting club admin's own club.
pub async fn update_my_club(
    state: &SharedState,
    actor: &Actor,
    input: UpdateMyClubInput,
) -> Result<ClubRecord, WorkflowError> {
    actor.require_role(Role::ClubAdmin)?;
    let club_id = actor.active_club()?.club_id;

    let repository = ClubRepository::new(state.store().clone());
    let mut club = repository
        .find_by_id(club_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("club `{club_id}`")))?;

    let mut changed = false;
    if let Some(city) = input.city {
        club.city = city;
        changed = true;
    }
    if let Some(phone) = input.phone {
        club.phone = Some(phone);
        changed = true;
    }
    if let Some(venue) = input.venue {
        club.venue = Some(venue);
        changed = true;
    }
    if let Some(manager) = input.manager {
        club.manager = Some(manager);
        changed = true;
    }
    if let Some(courts) = input.courts {
        club.courts = Some(courts);
        changed = true;
    }
    if let Some(alternative) = input.alternative_courts {
        club.alternative_courts = Some(alternative);
        changed = true;
    }

    if !changed {
        return Err(WorkflowError::Validation(
            "no updatable fields were provided".to_owned(),
        ));
    }

    club.updated_at = OffsetDateTime::now_utc();
    repository.save(&club).await?;
    Ok(club)
}

/// Convert and publish a club hero image, storing its public URL.
pub async fn upload_club_hero(
    state: &SharedState,
    actor: &Actor,
    club_id: Uuid,
    image: &[u8],
) -> Result<String, WorkflowError> {
    actor.require_any_role(&[Role::FederationAdmin, Role::ClubAdmin])?;
    if !actor.roles.contains(Role::FederationAdmin) {
        actor.require_club(club_id)?;
    }

    let repository = ClubRepository::new(state.store().clone());
    if repository.find_by_id(club_id).await?.is_none() {
        return Err(WorkflowError::NotFound(format!("club `{club_id}`")));
    }

    let webp = state.images().convert_to_webp(image, 1920, 80).await?;
    let url = state
        .images()
        .upload_public_image(&format!("clubs/{club_id}/hero.webp"), webp)
        .await?;

    let now = rfc3339_string(OffsetDateTime::now_utc());
    let patch = crate::dao::store::Fields::from_iter([
        ("heroUrl".to_owned(), Value::String(url.clone())),
        ("heroUpdatedAt".to_owned(), Value::String(now.clone())),
        ("updatedAt".to_owned(), Value::String(now)),
    ]);
    state.store().update(CLUBS, &club_id.to_string(), patch).await?;

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        club_admin_actor, fed_admin_actor, seed_coach, seed_player, test_state,
    };

    #[tokio::test]
    async fn club_provisioning_creates_both_records_incomplete() {
        let state = test_state();
        let admin = fed_admin_actor();

        let outcome = create_club_with_admin(
            &state,
            &admin,
            CreateClubInput {
                club_name: "Municipalidad".to_owned(),
                city: "San Juan".to_owned(),
                admin_email: "muni@club.test".to_owned(),
            },
        )
        .await
        .unwrap();
        assert!(outcome.email_dispatched);

        let club = ClubRepository::new(state.store().clone())
            .find_by_id(outcome.club_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(club.status, MembershipStatus::Incomplete);

        let user = UserRepository::new(state.store().clone())
            .find_by_id(outcome.admin_user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.status, MembershipStatus::Incomplete);
        assert!(user.activation_token.is_some());
        assert_eq!(user.clubs.len(), 1);
        assert_eq!(user.clubs[0].club_id, outcome.club_id);

        // Same email again: rejected, nothing new written.
        let err = create_club_with_admin(
            &state,
            &admin,
            CreateClubInput {
                club_name: "Otro".to_owned(),
                city: "Rawson".to_owned(),
                admin_email: "muni@club.test".to_owned(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WorkflowError::AlreadyMember(_)));
        assert_eq!(
            ClubRepository::new(state.store().clone())
                .list_all()
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn profile_completion_moves_club_and_admin_to_pending() {
        let state = test_state();
        let admin = fed_admin_actor();
        let outcome = create_club_with_admin(
            &state,
            &admin,
            CreateClubInput {
                club_name: "Municipalidad".to_owned(),
                city: "San Juan".to_owned(),
                admin_email: "muni@club.test".to_owned(),
            },
        )
        .await
        .unwrap();

        let users = UserRepository::new(state.store().clone());
        let token = users
            .find_by_id(outcome.admin_user_id)
            .await
            .unwrap()
            .unwrap()
            .activation_token
            .unwrap();

        complete_club_profile(
            &state,
            outcome.club_id,
            &token,
            ClubProfileInput {
                manager: "R. Paredes".to_owned(),
                venue: "Av. Central 123".to_owned(),
                phone: "264-555-0000".to_owned(),
                courts: Some(2),
                alternative_courts: None,
            },
        )
        .await
        .unwrap();

        let club = ClubRepository::new(state.store().clone())
            .find_by_id(outcome.club_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(club.status, MembershipStatus::Pending);
        assert_eq!(club.manager.as_deref(), Some("R. Paredes"));

        let user = users
            .find_by_id(outcome.admin_user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.status, MembershipStatus::Pending);
        assert_eq!(user.activation_token, None);

        // The token was consumed.
        let err = complete_club_profile(
            &state,
            outcome.club_id,
            &token,
            ClubProfileInput {
                manager: "X".to_owned(),
                venue: "X".to_owned(),
                phone: "X".to_owned(),
                courts: None,
                alternative_courts: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidToken));
    }

    #[tokio::test]
    async fn validation_approves_user_and_club_together() {
        let state = test_state();
        let admin = fed_admin_actor();
        let outcome = create_club_with_admin(
            &state,
            &admin,
            CreateClubInput {
                club_name: "Municipalidad".to_owned(),
                city: "San Juan".to_owned(),
                admin_email: "muni@club.test".to_owned(),
            },
        )
        .await
        .unwrap();

        let users = UserRepository::new(state.store().clone());
        let token = users
            .find_by_id(outcome.admin_user_id)
            .await
            .unwrap()
            .unwrap()
            .activation_token
            .unwrap();
        complete_club_profile(
            &state,
            outcome.club_id,
            &token,
            ClubProfileInput {
                manager: "R. Paredes".to_owned(),
                venue: "Av. Central 123".to_owned(),
                phone: "264-555-0000".to_owned(),
                courts: Some(2),
                alternative_courts: None,
            },
        )
        .await
        .unwrap();

        let status = validate_club_admin(&state, &admin, outcome.admin_user_id, Decision::Approve)
            .await
            .unwrap();
        assert_eq!(status, MembershipStatus::Active);

        let club = ClubRepository::new(state.store().clone())
            .find_by_id(outcome.club_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(club.status, MembershipStatus::Active);

        // Deciding again: the user is no longer PENDIENTE.
        let err = validate_club_admin(&state, &admin, outcome.admin_user_id, Decision::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[tokio::test]
    async fn toggle_cascades_to_exactly_the_referencing_entries() {
        let state = test_state();
        let admin = fed_admin_actor();

        let club = crate::testing::seed_active_club(&state, "Municipalidad").await;
        let other_club = crate::testing::seed_active_club(&state, "Olimpia").await;

        // Coach active in both clubs, player active in the toggled club with
        // a pending entry elsewhere.
        let coach = seed_coach(
            &state,
            "coach@club.test",
            &[
                (club.id, "Municipalidad", MembershipStatus::Active),
                (other_club.id, "Olimpia", MembershipStatus::Active),
            ],
        )
        .await;
        let player = seed_player(
            &state,
            "player@club.test",
            &[
                (club.id, "Municipalidad", MembershipStatus::Active),
                (other_club.id, "Olimpia", MembershipStatus::Pending),
            ],
        )
        .await;

        let status = toggle_club_status(&state, &admin, club.id).await.unwrap();
        assert_eq!(status, MembershipStatus::Inactive);

        let coaches = crate::dao::coaches::CoachRepository::new(state.store().clone());
        let stored_coach = coaches.find_by_id(coach.id).await.unwrap().unwrap();
        assert_eq!(stored_coach.clubs[0].status, MembershipStatus::Inactive);
        // Sibling club untouched.
        assert_eq!(stored_coach.clubs[1].status, MembershipStatus::Active);

        let players = crate::dao::players::PlayerRepository::new(state.store().clone());
        let stored_player = players.find_by_id(player.id).await.unwrap().unwrap();
        assert_eq!(stored_player.clubs[0].status, MembershipStatus::Inactive);
        assert_eq!(stored_player.clubs[1].status, MembershipStatus::Pending);

        // Toggle back: everything returns to the starting picture.
        let status = toggle_club_status(&state, &admin, club.id).await.unwrap();
        assert_eq!(status, MembershipStatus::Active);

        let stored_coach = coaches.find_by_id(coach.id).await.unwrap().unwrap();
        assert_eq!(stored_coach.clubs[0].status, MembershipStatus::Active);
        assert_eq!(stored_coach.clubs[1].status, MembershipStatus::Active);
        let stored_player = players.find_by_id(player.id).await.unwrap().unwrap();
        assert_eq!(stored_player.clubs[0].status, MembershipStatus::Active);
        assert_eq!(stored_player.clubs[1].status, MembershipStatus::Pending);
    }

    #[tokio::test]
    async fn toggling_a_pending_club_is_rejected() {
        let state = test_state();
        let admin = fed_admin_actor();
        let outcome = create_club_with_admin(
            &state,
            &admin,
            CreateClubInput {
                club_name: "Municipalidad".to_owned(),
                city: "San Juan".to_owned(),
                admin_email: "muni@club.test".to_owned(),
            },
        )
        .await
        .unwrap();

        let err = toggle_club_status(&state, &admin, outcome.club_id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[tokio::test]
    async fn club_scoped_roles_cannot_provision_clubs() {
        let state = test_state();
        let actor = club_admin_actor(Uuid::new_v4(), "Muni");
        let err = create_club_with_admin(
            &state,
            &actor,
            CreateClubInput {
                club_name: "X".to_owned(),
                city: "Y".to_owned(),
                admin_email: "z@club.test".to_owned(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }
}
