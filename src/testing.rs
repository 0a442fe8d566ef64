//! Shared fixtures for the service-level tests.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        clubs::ClubRepository,
        coaches::CoachRepository,
        models::{ClubRecord, CoachRecord, PlayerRecord, UserRecord},
        players::PlayerRepository,
        users::UserRepository,
    },
    domain::{
        membership::ClubMembership,
        roles::{Role, RoleSet},
        status::MembershipStatus,
    },
    services::{access::Actor, identity::ClubClaim},
    state::{AppState, SharedState},
};

pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        port: 0,
        access_secret: "test-access-secret".to_owned(),
        refresh_secret: "test-refresh-secret".to_owned(),
        front_url: "http://localhost:5173".to_owned(),
    }
}

pub(crate) fn test_state() -> SharedState {
    AppState::new(&test_config())
}

pub(crate) fn fed_admin_actor() -> Actor {
    Actor {
        id: Uuid::new_v4(),
        email: "admin@asambal.test".to_owned(),
        roles: RoleSet::single(Role::FederationAdmin),
        clubs: Vec::new(),
    }
}

pub(crate) fn club_admin_actor(club_id: Uuid, club_name: &str) -> Actor {
    Actor {
        id: Uuid::new_v4(),
        email: format!("admin@{}.test", club_name.to_lowercase()),
        roles: RoleSet::single(Role::ClubAdmin),
        clubs: vec![ClubClaim {
            club_id,
            name: club_name.to_owned(),
        }],
    }
}

pub(crate) fn coach_actor(id: Uuid, email: &str) -> Actor {
    Actor {
        id,
        email: email.to_owned(),
        roles: RoleSet::single(Role::Coach),
        clubs: Vec::new(),
    }
}

pub(crate) fn player_actor(id: Uuid, email: &str) -> Actor {
    Actor {
        id,
        email: email.to_owned(),
        roles: RoleSet::single(Role::Player),
        clubs: Vec::new(),
    }
}

fn memberships(entries: &[(Uuid, &str, MembershipStatus)]) -> Vec<ClubMembership> {
    let now = OffsetDateTime::now_utc();
    entries
        .iter()
        .map(|(club_id, club_name, status)| ClubMembership {
            club_id: *club_id,
            club_name: (*club_name).to_owned(),
            categories: vec!["cadetes".to_owned()],
            status: *status,
            updated_at: now,
        })
        .collect()
}

/// Top-level status matching a seeded membership picture: any pending entry
/// keeps the user PENDIENTE, otherwise they are ACTIVO.
fn top_level_status(entries: &[(Uuid, &str, MembershipStatus)]) -> MembershipStatus {
    if entries
        .iter()
        .any(|(_, _, status)| *status == MembershipStatus::Pending)
    {
        MembershipStatus::Pending
    } else {
        MembershipStatus::Active
    }
}

pub(crate) async fn seed_active_club(state: &SharedState, name: &str) -> ClubRecord {
    let now = OffsetDateTime::now_utc();
    let club = ClubRecord {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        city: "San Juan".to_owned(),
        email: format!("admin@{}.test", name.to_lowercase()),
        status: MembershipStatus::Active,
        manager: Some("R. Paredes".to_owned()),
        venue: Some("Av. Central 123".to_owned()),
        phone: Some("264-555-0000".to_owned()),
        courts: Some(2),
        alternative_courts: None,
        asambal_enabled: false,
        hero_url: None,
        hero_updated_at: None,
        created_by: "admin@asambal.test".to_owned(),
        created_at: now,
        updated_at: now,
    };
    ClubRepository::new(state.store().clone())
        .save(&club)
        .await
        .expect("seed club");
    club
}

pub(crate) async fn seed_incomplete_user(
    state: &SharedState,
    email: &str,
    role: Role,
    token: &str,
) -> UserRecord {
    let now = OffsetDateTime::now_utc();
    let user = UserRecord {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        roles: RoleSet::single(role),
        status: MembershipStatus::Incomplete,
        activation_token: Some(token.to_owned()),
        created_by: "admin@asambal.test".to_owned(),
        clubs: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    UserRepository::new(state.store().clone())
        .save(&user)
        .await
        .expect("seed user");
    user
}

pub(crate) async fn seed_coach(
    state: &SharedState,
    email: &str,
    entries: &[(Uuid, &str, MembershipStatus)],
) -> CoachRecord {
    let now = OffsetDateTime::now_utc();
    let id = Uuid::new_v4();
    let clubs = memberships(entries);

    let user = UserRecord {
        id,
        email: email.to_owned(),
        roles: RoleSet::single(Role::Coach),
        status: top_level_status(entries),
        activation_token: None,
        created_by: "admin@asambal.test".to_owned(),
        clubs: clubs.clone(),
        created_at: now,
        updated_at: now,
    };
    UserRepository::new(state.store().clone())
        .save(&user)
        .await
        .expect("seed coach user");

    let coach = CoachRecord {
        id,
        user_id: id,
        name: "Marta".to_owned(),
        surname: "Gomez".to_owned(),
        email: email.to_owned(),
        phone: None,
        address: None,
        national_id: None,
        badge_number: None,
        clubs,
        created_at: now,
        updated_at: now,
    };
    CoachRepository::new(state.store().clone())
        .save(&coach)
        .await
        .expect("seed coach");
    coach
}

pub(crate) async fn seed_player(
    state: &SharedState,
    email: &str,
    entries: &[(Uuid, &str, MembershipStatus)],
) -> PlayerRecord {
    seed_player_record(state, email, entries, false).await
}

pub(crate) async fn seed_scholarship_player(
    state: &SharedState,
    email: &str,
    entries: &[(Uuid, &str, MembershipStatus)],
) -> PlayerRecord {
    seed_player_record(state, email, entries, true).await
}

async fn seed_player_record(
    state: &SharedState,
    email: &str,
    entries: &[(Uuid, &str, MembershipStatus)],
    scholarship_holder: bool,
) -> PlayerRecord {
    let now = OffsetDateTime::now_utc();
    let id = Uuid::new_v4();
    let clubs = memberships(entries);

    let user = UserRecord {
        id,
        email: email.to_owned(),
        roles: RoleSet::single(Role::Player),
        status: top_level_status(entries),
        activation_token: None,
        created_by: "admin@asambal.test".to_owned(),
        clubs: clubs.clone(),
        created_at: now,
        updated_at: now,
    };
    UserRepository::new(state.store().clone())
        .save(&user)
        .await
        .expect("seed player user");

    let player = PlayerRecord {
        id,
        user_id: id,
        coach_id: None,
        name: "Lucia".to_owned(),
        surname: "Paz".to_owned(),
        email: email.to_owned(),
        birth_date: Some("2000-05-04".to_owned()),
        tutor: None,
        phone: None,
        address: None,
        height: None,
        weight: None,
        scholarship_holder,
        enabled_to_play: scholarship_holder,
        ineligibility_reason: if scholarship_holder {
            None
        } else {
            Some(crate::domain::scholarship::IneligibilityReason::EnrollmentPending)
        },
        clubs,
        created_at: now,
        updated_at: now,
    };
    PlayerRepository::new(state.store().clone())
        .save(&player)
        .await
        .expect("seed player");
    player
}
