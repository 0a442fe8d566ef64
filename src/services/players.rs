use time::{Date, OffsetDateTime, macros::format_description};
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::{
        audit,
        models::{PlayerRecord, Tutor, UserRecord},
        players::{self, PlayerRepository},
        users::{self, UserRepository},
    },
    domain::{
        membership::{
            ClubMembership, MembershipPatch, category_difference, membership_for,
            upsert_membership,
        },
        roles::{Role, RoleSet},
        scholarship::IneligibilityReason,
        status::{Decision, MembershipStatus, StatusEvent, apply_status_event},
    },
    error::WorkflowError,
    services::{
        access::Actor, identity::generate_activation_token, mailer::dispatch_activation_email,
        transfers,
    },
    state::SharedState,
};

/// Age below which a player must register a legal tutor.
const TUTOR_AGE_THRESHOLD: i32 = 18;

/// Input for [`create_player`].
#[derive(Debug, Clone)]
pub struct CreatePlayerInput {
    /// First name.
    pub name: String,
    /// Surname.
    pub surname: String,
    /// Invitation email.
    pub email: String,
    /// Categories the player will play at the inviting club.
    pub categories: Vec<String>,
}

/// What [`create_player`] decided after inspecting existing records.
#[derive(Debug)]
pub enum CreatePlayerOutcome {
    /// A fresh user and player profile were created.
    Created {
        /// Id shared by the user and the player profile.
        user_id: Uuid,
        /// Whether the activation email left the building.
        email_dispatched: bool,
    },
    /// The player belongs to another club; a transfer request was opened
    /// instead of silently adding a membership.
    TransferRequested {
        /// The opened request.
        request_id: Uuid,
    },
    /// The player is already at this club but with other categories; call
    /// [`confirm_player_categories`] to merge the difference.
    CategoryMergeRequired {
        /// The existing player.
        player_id: Uuid,
        /// Categories not yet present on the membership entry.
        new_categories: Vec<String>,
    },
}

/// Profile data supplied when the invited player completes their profile.
#[derive(Debug, Clone)]
pub struct PlayerProfileInput {
    /// Birth date in `YYYY-MM-DD` form.
    pub birth_date: String,
    /// Legal tutor; mandatory while underage, dropped otherwise.
    pub tutor: Option<Tutor>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Home address.
    pub address: Option<String>,
    /// Height in centimeters.
    pub height: Option<f64>,
    /// Weight in kilograms.
    pub weight: Option<f64>,
}

/// Fields a player may patch on their own profile.
#[derive(Debug, Clone, Default)]
pub struct UpdateMyPlayerInput {
    /// Contact phone.
    pub phone: Option<String>,
    /// Home address.
    pub address: Option<String>,
    /// Height in centimeters.
    pub height: Option<f64>,
    /// Weight in kilograms.
    pub weight: Option<f64>,
}

/// Result of [`validate_player`].
pub struct PlayerValidationOutcome {
    /// The membership entry's new status.
    pub status: MembershipStatus,
    /// Whether credential provisioning succeeded (approvals only).
    pub credential_provisioned: bool,
}

/// Create a player for the acting club, resolving conflicts with existing
/// accounts first.
///
/// Club admins and coaches may both invite; a player registered at another
/// club is never silently moved; a transfer request is opened instead.
pub async fn create_player(
    state: &SharedState,
    actor: &Actor,
    input: CreatePlayerInput,
) -> Result<CreatePlayerOutcome, WorkflowError> {
    actor.require_any_role(&[Role::ClubAdmin, Role::Coach])?;
    let club = actor.active_club()?.clone();

    if input.name.trim().is_empty() || input.surname.trim().is_empty() || input.email.trim().is_empty()
    {
        return Err(WorkflowError::Validation(
            "name, surname and email are required".to_owned(),
        ));
    }
    if input.categories.is_empty() {
        return Err(WorkflowError::Validation(
            "at least one category is required".to_owned(),
        ));
    }

    let user_repository = UserRepository::new(state.store().clone());
    if let Some(existing) = user_repository.find_by_email(&input.email).await? {
        if existing.roles.has_admin() {
            return Err(WorkflowError::AdminEmailConflict);
        }

        if existing.roles.contains(Role::Player) {
            let player = PlayerRepository::new(state.store().clone())
                .find_by_id(existing.id)
                .await?
                .ok_or_else(|| {
                    WorkflowError::NotFound(format!("player profile for user `{}`", existing.id))
                })?;

            return match membership_for(&player.clubs, club.club_id) {
                Some(entry) => {
                    let new_categories = category_difference(&entry.categories, &input.categories);
                    if new_categories.is_empty() {
                        Err(WorkflowError::AlreadyMember(
                            "the player already belongs to this club".to_owned(),
                        ))
                    } else {
                        Ok(CreatePlayerOutcome::CategoryMergeRequired {
                            player_id: player.id,
                            new_categories,
                        })
                    }
                }
                None => {
                    let request = transfers::open_request(
                        state,
                        &club,
                        actor.id,
                        &player,
                        input.categories.clone(),
                    )
                    .await?;
                    Ok(CreatePlayerOutcome::TransferRequested {
                        request_id: request.id,
                    })
                }
            };
        }

        return Err(WorkflowError::Validation(
            "email is already registered to a non-player account".to_owned(),
        ));
    }

    let user_id = Uuid::new_v4();
    let activation_token = generate_activation_token();
    let coach_id = actor.roles.contains(Role::Coach).then_some(actor.id);

    state
        .store()
        .run_transaction::<(), WorkflowError, _>(|tx| {
            let input = input.clone();
            let club = club.clone();
            let token = activation_token.clone();
            let created_by = actor.email.clone();
            Box::pin(async move {
                if users::find_by_email_in_tx(tx, &input.email).await?.is_some() {
                    return Err(WorkflowError::AlreadyMember(format!(
                        "a user with email `{}` already exists",
                        input.email
                    )));
                }

                let now = OffsetDateTime::now_utc();
                let membership = ClubMembership {
                    club_id: club.club_id,
                    club_name: club.name.clone(),
                    categories: input.categories.clone(),
                    status: MembershipStatus::Incomplete,
                    updated_at: now,
                };

                let user = UserRecord {
                    id: user_id,
                    email: input.email.clone(),
                    roles: RoleSet::single(Role::Player),
                    status: MembershipStatus::Incomplete,
                    activation_token: Some(token),
                    created_by,
                    clubs: vec![membership.clone()],
                    created_at: now,
                    updated_at: now,
                };

                let player = PlayerRecord {
                    id: user_id,
                    user_id,
                    coach_id,
                    name: input.name,
                    surname: input.surname,
                    email: input.email,
                    birth_date: None,
                    tutor: None,
                    phone: None,
                    address: None,
                    height: None,
                    weight: None,
                    scholarship_holder: false,
                    enabled_to_play: false,
                    ineligibility_reason: Some(IneligibilityReason::EnrollmentPending),
                    clubs: vec![membership],
                    created_at: now,
                    updated_at: now,
                };

                users::save_in_tx(tx, &user)?;
                players::save_in_tx(tx, &player)?;
                Ok(())
            })
        })
        .await?;

    let email_dispatched = dispatch_activation_email(state, &input.email, &activation_token).await;
    audit::record(
        state.store(),
        &actor.email,
        "create-player",
        "player",
        &user_id.to_string(),
    )
    .await;

    Ok(CreatePlayerOutcome::Created {
        user_id,
        email_dispatched,
    })
}

/// Apply a previously computed category merge to the player's entry at the
/// acting club (the confirmation step of the creation flow).
pub async fn confirm_player_categories(
    state: &SharedState,
    actor: &Actor,
    player_id: Uuid,
    new_categories: Vec<String>,
) -> Result<(), WorkflowError> {
    actor.require_any_role(&[Role::ClubAdmin, Role::Coach])?;
    let club_id = actor.active_club()?.club_id;
    if new_categories.is_empty() {
        return Err(WorkflowError::Validation(
            "category list must not be empty".to_owned(),
        ));
    }

    state
        .store()
        .run_transaction::<(), WorkflowError, _>(|tx| {
            let new_categories = new_categories.clone();
            Box::pin(async move {
                let mut player = players::get_in_tx(tx, player_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("player `{player_id}`")))?;
                let entry = membership_for(&player.clubs, club_id).ok_or_else(|| {
                    WorkflowError::Forbidden("player does not belong to this club".to_owned())
                })?;

                let mut merged = entry.categories.clone();
                merged.extend(category_difference(&entry.categories, &new_categories));

                let now = OffsetDateTime::now_utc();
                let patch = MembershipPatch {
                    categories: Some(merged),
                    ..Default::default()
                };
                upsert_membership(&mut player.clubs, club_id, patch.clone(), now);
                player.updated_at = now;
                players::save_in_tx(tx, &player)?;

                if let Some(mut user) = users::get_in_tx(tx, player.user_id).await? {
                    if membership_for(&user.clubs, club_id).is_some() {
                        upsert_membership(&mut user.clubs, club_id, patch, now);
                        user.updated_at = now;
                        users::save_in_tx(tx, &user)?;
                    }
                }
                Ok(())
            })
        })
        .await
}

/// Complete the invited player's profile using their activation token.
///
/// Enforces the tutor rule: an underage player must register a tutor, an
/// adult must not carry one. Profile fields land on the player record; the
/// user and every INCOMPLETO membership entry move to PENDIENTE and the
/// token is consumed, all in one transaction.
pub async fn complete_player_profile(
    state: &SharedState,
    token: &str,
    input: PlayerProfileInput,
) -> Result<(), WorkflowError> {
    let birth_date = parse_birth_date(&input.birth_date)?;
    let age = age_on(birth_date, OffsetDateTime::now_utc().date());
    if age < TUTOR_AGE_THRESHOLD && input.tutor.is_none() {
        return Err(WorkflowError::Validation(
            "a tutor is required for underage players".to_owned(),
        ));
    }
    let tutor = if age < TUTOR_AGE_THRESHOLD {
        input.tutor.clone()
    } else {
        None
    };

    let repository = UserRepository::new(state.store().clone());
    let user = repository
        .find_by_activation_token(token)
        .await?
        .ok_or(WorkflowError::InvalidToken)?;
    let user_id = user.id;

    state
        .store()
        .run_transaction::<(), WorkflowError, _>(|tx| {
            let token = token.to_owned();
            let input = input.clone();
            let tutor = tutor.clone();
            Box::pin(async move {
                let mut user = users::get_in_tx(tx, user_id)
                    .await?
                    .ok_or(WorkflowError::InvalidToken)?;
                if user.activation_token.as_deref() != Some(token.as_str()) {
                    return Err(WorkflowError::InvalidToken);
                }

                let mut player = players::get_in_tx(tx, user_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("player `{user_id}`")))?;

                let now = OffsetDateTime::now_utc();
                user.status = apply_status_event(user.status, StatusEvent::CompleteProfile)?;
                user.activation_token = None;
                promote_incomplete_entries(&mut user.clubs, now);
                user.updated_at = now;

                player.birth_date = Some(input.birth_date);
                player.tutor = tutor;
                player.phone = input.phone;
                player.address = input.address;
                player.height = input.height;
                player.weight = input.weight;
                promote_incomplete_entries(&mut player.clubs, now);
                player.updated_at = now;

                users::save_in_tx(tx, &user)?;
                players::save_in_tx(tx, &player)?;
                Ok(())
            })
        })
        .await
}

fn promote_incomplete_entries(entries: &mut [ClubMembership], now: OffsetDateTime) {
    for entry in entries.iter_mut() {
        if entry.status == MembershipStatus::Incomplete {
            entry.status = MembershipStatus::Pending;
            entry.updated_at = now;
        }
    }
}

/// Approve or reject a player at the acting club.
///
/// Club admins and coaches of the club may decide; only the membership
/// entry matching that club moves. First approval provisions the player's
/// auth credential.
pub async fn validate_player(
    state: &SharedState,
    actor: &Actor,
    player_id: Uuid,
    decision: Decision,
) -> Result<PlayerValidationOutcome, WorkflowError> {
    actor.require_any_role(&[Role::ClubAdmin, Role::Coach])?;
    let club_id = actor.active_club()?.club_id;

    let (status, player_email) = state
        .store()
        .run_transaction::<(MembershipStatus, String), WorkflowError, _>(|tx| {
            Box::pin(async move {
                let mut player = players::get_in_tx(tx, player_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("player `{player_id}`")))?;

                let entry = membership_for(&player.clubs, club_id).ok_or_else(|| {
                    WorkflowError::Forbidden("player does not belong to your club".to_owned())
                })?;
                let next = apply_status_event(entry.status, StatusEvent::Decide(decision))?;

                let now = OffsetDateTime::now_utc();
                let patch = MembershipPatch {
                    status: Some(next),
                    ..Default::default()
                };
                upsert_membership(&mut player.clubs, club_id, patch.clone(), now);
                player.updated_at = now;

                let mut user = users::get_in_tx(tx, player.user_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("user `{}`", player.user_id)))?;
                upsert_membership(&mut user.clubs, club_id, patch, now);
                if decision == Decision::Approve && user.status == MembershipStatus::Pending {
                    user.status = MembershipStatus::Active;
                }
                user.updated_at = now;

                players::save_in_tx(tx, &player)?;
                users::save_in_tx(tx, &user)?;
                Ok((next, player.email.clone()))
            })
        })
        .await?;

    let credential_provisioned = if status == MembershipStatus::Active {
        match state.credentials().create_if_absent(&player_email, None).await {
            Ok(_) => true,
            Err(err) => {
                warn!(email = %player_email, error = %err, "credential provisioning failed after approval");
                false
            }
        }
    } else {
        false
    };

    Ok(PlayerValidationOutcome {
        status,
        credential_provisioned,
    })
}

/// The acting player's own profile.
pub async fn my_player_profile(
    state: &SharedState,
    actor: &Actor,
) -> Result<PlayerRecord, WorkflowError> {
    actor.require_role(Role::Player)?;
    PlayerRepository::new(state.store().clone())
        .find_by_id(actor.id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("player `{}`", actor.id)))
}

/// Patch the acting player's own profile.
pub async fn update_my_player_profile(
    state: &SharedState,
    actor: &Actor,
    input: UpdateMyPlayerInput,
) -> Result<PlayerRecord, WorkflowError> {
    actor.require_role(Role::Player)?;

    let repository = PlayerRepository::new(state.store().clone());
    let mut player = repository
        .find_by_id(actor.id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("player `{}`", actor.id)))?;

    if input.phone.is_none() && input.address.is_none() && input.height.is_none() && input.weight.is_none()
    {
        return Err(WorkflowError::Validation(
            "no updatable fields were provided".to_owned(),
        ));
    }

    if let Some(phone) = input.phone {
        player.phone = Some(phone);
    }
    if let Some(address) = input.address {
        player.address = Some(address);
    }
    if let Some(height) = input.height {
        player.height = Some(height);
    }
    if let Some(weight) = input.weight {
        player.weight = Some(weight);
    }
    player.updated_at = OffsetDateTime::now_utc();
    repository.save(&player).await?;
    Ok(player)
}

/// Every player in the federation (federation admin view).
pub async fn list_all_players(
    state: &SharedState,
    actor: &Actor,
) -> Result<Vec<PlayerRecord>, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;
    Ok(PlayerRepository::new(state.store().clone()).list_all().await?)
}

/// One player's full record (federation admin view).
pub async fn get_player_detail(
    state: &SharedState,
    actor: &Actor,
    player_id: Uuid,
) -> Result<PlayerRecord, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;
    PlayerRepository::new(state.store().clone())
        .find_by_id(player_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("player `{player_id}`")))
}

/// Players associated with the acting admin's club.
pub async fn players_by_club(
    state: &SharedState,
    actor: &Actor,
) -> Result<Vec<PlayerRecord>, WorkflowError> {
    actor.require_role(Role::ClubAdmin)?;
    let club_id = actor.active_club()?.club_id;
    Ok(PlayerRepository::new(state.store().clone())
        .list_by_club(club_id)
        .await?)
}

/// Players registered by the acting coach.
pub async fn players_by_coach(
    state: &SharedState,
    actor: &Actor,
) -> Result<Vec<PlayerRecord>, WorkflowError> {
    actor.require_role(Role::Coach)?;
    Ok(PlayerRepository::new(state.store().clone())
        .list_by_coach(actor.id)
        .await?)
}

/// Players waiting for validation at the acting actor's club.
pub async fn pending_players(
    state: &SharedState,
    actor: &Actor,
) -> Result<Vec<PlayerRecord>, WorkflowError> {
    actor.require_any_role(&[Role::ClubAdmin, Role::Coach])?;
    let club_id = actor.active_club()?.club_id;

    let mut players = PlayerRepository::new(state.store().clone())
        .list_by_club(club_id)
        .await?;
    players.retain(|player| {
        membership_for(&player.clubs, club_id)
            .is_some_and(|entry| entry.status == MembershipStatus::Pending)
    });
    Ok(players)
}

fn parse_birth_date(value: &str) -> Result<Date, WorkflowError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value, &format)
        .map_err(|_| WorkflowError::Validation("birth date must be YYYY-MM-DD".to_owned()))
}

/// Whole years elapsed between `birth` and `on`.
fn age_on(birth: Date, on: Date) -> i32 {
    let mut age = on.year() - birth.year();
    if (on.month() as u8, on.day()) < (birth.month() as u8, birth.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::transfers::TransferRepository,
        domain::transfer::TransferStatus,
        testing::{club_admin_actor, seed_active_club, seed_player, test_state},
    };

    fn player_input(email: &str) -> CreatePlayerInput {
        CreatePlayerInput {
            name: "Lucia".to_owned(),
            surname: "Paz".to_owned(),
            email: email.to_owned(),
            categories: vec!["cadetes".to_owned()],
        }
    }

    fn birth_date_with_age(years: i32) -> String {
        let today = OffsetDateTime::now_utc().date();
        // A day after the birthday boundary keeps the age stable.
        format!("{:04}-01-01", today.year() - years)
    }

    #[tokio::test]
    async fn fresh_player_starts_ineligible_with_the_pending_code() {
        let state = test_state();
        let club = seed_active_club(&state, "Municipalidad").await;
        let actor = club_admin_actor(club.id, "Municipalidad");

        let outcome = create_player(&state, &actor, player_input("lucia@club.test"))
            .await
            .unwrap();
        let CreatePlayerOutcome::Created { user_id, email_dispatched } = outcome else {
            panic!("expected a fresh creation");
        };
        assert!(email_dispatched);

        let player = PlayerRepository::new(state.store().clone())
            .find_by_id(user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!player.enabled_to_play);
        assert!(!player.scholarship_holder);
        assert_eq!(
            player.ineligibility_reason,
            Some(IneligibilityReason::EnrollmentPending)
        );
        assert_eq!(player.clubs[0].status, MembershipStatus::Incomplete);
    }

    #[tokio::test]
    async fn player_at_another_club_opens_a_transfer_request() {
        let state = test_state();
        let muni = seed_active_club(&state, "Municipalidad").await;
        let olimpia = seed_active_club(&state, "Olimpia").await;
        let player = seed_player(
            &state,
            "lucia@club.test",
            &[(olimpia.id, "Olimpia", MembershipStatus::Active)],
        )
        .await;

        let actor = club_admin_actor(muni.id, "Municipalidad");
        let outcome = create_player(&state, &actor, player_input("lucia@club.test"))
            .await
            .unwrap();
        let CreatePlayerOutcome::TransferRequested { request_id } = outcome else {
            panic!("expected a transfer request");
        };

        let request = TransferRepository::new(state.store().clone())
            .find_by_id(request_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, TransferStatus::Pending);
        assert_eq!(request.player_id, player.id);
        assert_eq!(request.origin.club_id, olimpia.id);
        assert_eq!(request.destination.club_id, muni.id);

        // The player record itself was not touched.
        let stored = PlayerRepository::new(state.store().clone())
            .find_by_id(player.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.clubs.len(), 1);

        // A second attempt while the request is open is rejected.
        let err = create_player(&state, &actor, player_input("lucia@club.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[tokio::test]
    async fn same_club_with_new_categories_requires_merge_confirmation() {
        let state = test_state();
        let muni = seed_active_club(&state, "Municipalidad").await;
        let player = seed_player(
            &state,
            "lucia@club.test",
            &[(muni.id, "Municipalidad", MembershipStatus::Active)],
        )
        .await;
        let actor = club_admin_actor(muni.id, "Municipalidad");

        let mut input = player_input("lucia@club.test");
        input.categories = vec!["cadetes".to_owned(), "juveniles".to_owned()];
        let outcome = create_player(&state, &actor, input).await.unwrap();
        let CreatePlayerOutcome::CategoryMergeRequired { player_id, new_categories } = outcome
        else {
            panic!("expected a category merge request");
        };
        assert_eq!(player_id, player.id);
        assert_eq!(new_categories, vec!["juveniles".to_owned()]);

        confirm_player_categories(&state, &actor, player.id, new_categories)
            .await
            .unwrap();
        let stored = PlayerRepository::new(state.store().clone())
            .find_by_id(player.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.clubs[0].categories,
            vec!["cadetes".to_owned(), "juveniles".to_owned()]
        );
    }

    #[tokio::test]
    async fn underage_completion_requires_a_tutor() {
        let state = test_state();
        let club = seed_active_club(&state, "Municipalidad").await;
        let actor = club_admin_actor(club.id, "Municipalidad");
        let outcome = create_player(&state, &actor, player_input("lucia@club.test"))
            .await
            .unwrap();
        let CreatePlayerOutcome::Created { user_id, .. } = outcome else {
            panic!("expected creation");
        };
        let token = UserRepository::new(state.store().clone())
            .find_by_id(user_id)
            .await
            .unwrap()
            .unwrap()
            .activation_token
            .unwrap();

        let err = complete_player_profile(
            &state,
            &token,
            PlayerProfileInput {
                birth_date: birth_date_with_age(14),
                tutor: None,
                phone: None,
                address: None,
                height: None,
                weight: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        complete_player_profile(
            &state,
            &token,
            PlayerProfileInput {
                birth_date: birth_date_with_age(14),
                tutor: Some(Tutor {
                    name: "Carla".to_owned(),
                    surname: "Paz".to_owned(),
                    phone: Some("264-555-2222".to_owned()),
                    national_id: None,
                }),
                phone: None,
                address: None,
                height: None,
                weight: None,
            },
        )
        .await
        .unwrap();

        let player = PlayerRepository::new(state.store().clone())
            .find_by_id(user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(player.tutor.is_some());
        assert_eq!(player.clubs[0].status, MembershipStatus::Pending);
    }

    #[tokio::test]
    async fn adult_completion_drops_any_supplied_tutor() {
        let state = test_state();
        let club = seed_active_club(&state, "Municipalidad").await;
        let actor = club_admin_actor(club.id, "Municipalidad");
        let outcome = create_player(&state, &actor, player_input("lucia@club.test"))
            .await
            .unwrap();
        let CreatePlayerOutcome::Created { user_id, .. } = outcome else {
            panic!("expected creation");
        };
        let token = UserRepository::new(state.store().clone())
            .find_by_id(user_id)
            .await
            .unwrap()
            .unwrap()
            .activation_token
            .unwrap();

        complete_player_profile(
            &state,
            &token,
            PlayerProfileInput {
                birth_date: birth_date_with_age(25),
                tutor: Some(Tutor {
                    name: "Carla".to_owned(),
                    surname: "Paz".to_owned(),
                    phone: None,
                    national_id: None,
                }),
                phone: None,
                address: None,
                height: None,
                weight: None,
            },
        )
        .await
        .unwrap();

        let player = PlayerRepository::new(state.store().clone())
            .find_by_id(user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(player.tutor, None);
    }

    #[tokio::test]
    async fn player_validation_only_moves_the_acting_club_entry() {
        let state = test_state();
        let muni = seed_active_club(&state, "Municipalidad").await;
        let olimpia = seed_active_club(&state, "Olimpia").await;
        let player = seed_player(
            &state,
            "lucia@club.test",
            &[
                (muni.id, "Municipalidad", MembershipStatus::Pending),
                (olimpia.id, "Olimpia", MembershipStatus::Pending),
            ],
        )
        .await;

        let actor = club_admin_actor(muni.id, "Municipalidad");
        let outcome = validate_player(&state, &actor, player.id, Decision::Approve)
            .await
            .unwrap();
        assert_eq!(outcome.status, MembershipStatus::Active);

        let stored = PlayerRepository::new(state.store().clone())
            .find_by_id(player.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            membership_for(&stored.clubs, muni.id).unwrap().status,
            MembershipStatus::Active
        );
        assert_eq!(
            membership_for(&stored.clubs, olimpia.id).unwrap().status,
            MembershipStatus::Pending
        );
    }
}
