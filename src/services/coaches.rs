use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::{
        audit,
        coaches::{self, CoachRepository},
        models::{CoachJoinRequestRecord, CoachRecord, JoinRequestStatus, UserRecord},
        users::{self, UserRepository},
    },
    domain::{
        membership::{
            ClubMembership, MembershipPatch, category_difference, membership_for,
            upsert_membership,
        },
        roles::{Role, RoleSet},
        status::{Decision, MembershipStatus, StatusEvent, apply_status_event},
    },
    error::WorkflowError,
    services::{
        access::Actor, identity::generate_activation_token, mailer::dispatch_activation_email,
    },
    state::SharedState,
};

/// Input for [`create_coach`].
#[derive(Debug, Clone)]
pub struct CreateCoachInput {
    /// First name.
    pub name: String,
    /// Surname.
    pub surname: String,
    /// Invitation email.
    pub email: String,
    /// Categories the coach will run at the inviting club.
    pub categories: Vec<String>,
}

/// What [`create_coach`] decided after inspecting existing records.
///
/// Conflicting cases never silently mutate memberships: joining an existing
/// coach requires their consent, merging categories requires an explicit
/// confirmation call.
#[derive(Debug)]
pub enum CreateCoachOutcome {
    /// A fresh user and coach profile were created.
    Created {
        /// Id shared by the user and the coach profile.
        user_id: Uuid,
        /// Whether the activation email left the building.
        email_dispatched: bool,
    },
    /// The coach exists at another club; a join request is the way forward.
    JoinRequestRequired {
        /// The existing coach.
        coach_id: Uuid,
    },
    /// The coach is already at this club but with other categories; call
    /// [`confirm_coach_categories`] to merge the difference.
    CategoryMergeRequired {
        /// The existing coach.
        coach_id: Uuid,
        /// Categories not yet present on the membership entry.
        new_categories: Vec<String>,
    },
}

/// Result of [`validate_coach`].
#[derive(Debug)]
pub struct CoachValidationOutcome {
    /// The membership entry's new status.
    pub status: MembershipStatus,
    /// Whether credential provisioning succeeded (approvals only); the
    /// approval itself is committed either way.
    pub credential_provisioned: bool,
}

/// Profile data supplied when the invited coach completes their profile.
#[derive(Debug, Clone)]
pub struct CoachProfileInput {
    /// Contact phone.
    pub phone: String,
    /// Home address.
    pub address: String,
    /// National identity document number.
    pub national_id: String,
    /// Federation badge number.
    pub badge_number: Option<String>,
}

/// Prefill data served to the coach onboarding form.
pub struct CoachPrefill {
    /// First name.
    pub name: String,
    /// Surname.
    pub surname: String,
    /// Invitation email.
    pub email: String,
    /// Categories across every membership entry.
    pub categories: Vec<String>,
}

/// A coach projected onto one club's membership entry.
pub struct ClubCoach {
    /// The full coach record.
    pub coach: CoachRecord,
    /// The membership entry for the requesting club.
    pub membership: ClubMembership,
}

/// Create a coach for the acting club admin's club, resolving conflicts
/// with existing accounts first.
pub async fn create_coach(
    state: &SharedState,
    actor: &Actor,
    input: CreateCoachInput,
) -> Result<CreateCoachOutcome, WorkflowError> {
    actor.require_role(Role::ClubAdmin)?;
    let club = actor.active_club()?.clone();
    validate_person_input(&input.name, &input.surname, &input.email, &input.categories)?;

    let user_repository = UserRepository::new(state.store().clone());
    if let Some(existing) = user_repository.find_by_email(&input.email).await? {
        if existing.roles.has_admin() {
            return Err(WorkflowError::AdminEmailConflict);
        }

        if existing.roles.contains(Role::Coach) {
            let coach = CoachRepository::new(state.store().clone())
                .find_by_id(existing.id)
                .await?
                .ok_or_else(|| {
                    WorkflowError::NotFound(format!("coach profile for user `{}`", existing.id))
                })?;

            return match membership_for(&coach.clubs, club.club_id) {
                Some(entry) => {
                    let new_categories = category_difference(&entry.categories, &input.categories);
                    if new_categories.is_empty() {
                        Err(WorkflowError::AlreadyMember(
                            "the coach already belongs to this club".to_owned(),
                        ))
                    } else {
                        Ok(CreateCoachOutcome::CategoryMergeRequired {
                            coach_id: coach.id,
                            new_categories,
                        })
                    }
                }
                None => Ok(CreateCoachOutcome::JoinRequestRequired { coach_id: coach.id }),
            };
        }

        return Err(WorkflowError::Validation(
            "email is already registered to a non-coach account".to_owned(),
        ));
    }

    let user_id = Uuid::new_v4();
    let activation_token = generate_activation_token();

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
                    roles: RoleSet::single(Role::Coach),
                    status: MembershipStatus::Incomplete,
                    activation_token: Some(token),
                    created_by,
                    clubs: vec![membership.clone()],
                    created_at: now,
                    updated_at: now,
                };

                let coach = CoachRecord {
                    id: user_id,
                    user_id,
                    name: input.name,
                    surname: input.surname,
                    email: input.email,
                    phone: None,
                    address: None,
                    national_id: None,
                    badge_number: None,
                    clubs: vec![membership],
                    created_at: now,
                    updated_at: now,
                };

                users::save_in_tx(tx, &user)?;
                coaches::save_in_tx(tx, &coach)?;
                Ok(())
            })
        })
        .await?;

    let email_dispatched = dispatch_activation_email(state, &input.email, &activation_token).await;
    audit::record(
        state.store(),
        &actor.email,
        "create-coach",
        "coach",
        &user_id.to_string(),
    )
    .await;

    Ok(CreateCoachOutcome::Created {
        user_id,
        email_dispatched,
    })
}

/// Send a join request to a coach registered at another club.
pub async fn send_join_request(
    state: &SharedState,
    actor: &Actor,
    input: CreateCoachInput,
) -> Result<CoachJoinRequestRecord, WorkflowError> {
    actor.require_role(Role::ClubAdmin)?;
    let club = actor.active_club()?.clone();
    validate_person_input(&input.name, &input.surname, &input.email, &input.categories)?;

    let repository = CoachRepository::new(state.store().clone());
    let coach = repository
        .find_by_email(&input.email)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("no coach for email `{}`", input.email)))?;

    if coach.name != input.name.trim() || coach.surname != input.surname.trim() {
        return Err(WorkflowError::Validation(
            "provided name does not match the registered coach".to_owned(),
        ));
    }
    if membership_for(&coach.clubs, club.club_id).is_some() {
        return Err(WorkflowError::AlreadyMember(
            "the coach already belongs to this club".to_owned(),
        ));
    }
    if repository
        .has_pending_join_request(coach.id, club.club_id)
        .await?
    {
        return Err(WorkflowError::InvalidState(
            "a join request for this coach is already pending".to_owned(),
        ));
    }

    let now = OffsetDateTime::now_utc();
    let request = CoachJoinRequestRecord {
        id: Uuid::new_v4(),
        coach_id: coach.id,
        coach_email: coach.email.clone(),
        club_id: club.club_id,
        club_name: club.name.clone(),
        categories: input.categories,
        status: JoinRequestStatus::Pending,
        responded_at: None,
        created_at: now,
        updated_at: now,
    };
    repository.save_join_request(&request).await?;

    Ok(request)
}

/// The pending join requests addressed to the acting coach.
pub async fn my_join_requests(
    state: &SharedState,
    actor: &Actor,
) -> Result<Vec<CoachJoinRequestRecord>, WorkflowError> {
    actor.require_role(Role::Coach)?;
    Ok(CoachRepository::new(state.store().clone())
        .pending_join_requests(actor.id)
        .await?)
}

/// The coach answers a club's join request.
///
/// Accepting appends an ACTIVO membership entry on the coach and their user
/// record; rejecting touches neither. Either way the request is closed in
/// the same transaction.
pub async fn respond_join_request(
    state: &SharedState,
    actor: &Actor,
    request_id: Uuid,
    decision: Decision,
) -> Result<JoinRequestStatus, WorkflowError> {
    actor.require_role(Role::Coach)?;
    let actor_id = actor.id;

    state
        .store()
        .run_transaction::<JoinRequestStatus, WorkflowError, _>(|tx| {
            Box::pin(async move {
                let mut request = coaches::get_join_request_in_tx(tx, request_id)
                    .await?
                    .ok_or_else(|| {
                        WorkflowError::NotFound(format!("join request `{request_id}`"))
                    })?;

                if request.coach_id != actor_id {
                    return Err(WorkflowError::Forbidden(
                        "join request is addressed to another coach".to_owned(),
                    ));
                }
                if request.status != JoinRequestStatus::Pending {
                    return Err(WorkflowError::InvalidState(
                        "join request was already answered".to_owned(),
                    ));
                }

                let now = OffsetDateTime::now_utc();
                if decision == Decision::Approve {
                    let mut coach = coaches::get_in_tx(tx, request.coach_id)
                        .await?
                        .ok_or_else(|| {
                            WorkflowError::NotFound(format!("coach `{}`", request.coach_id))
                        })?;
                    let mut user = users::get_in_tx(tx, coach.user_id).await?.ok_or_else(|| {
                        WorkflowError::NotFound(format!("user `{}`", coach.user_id))
                    })?;

                    let patch = MembershipPatch {
                        club_name: Some(request.club_name.clone()),
                        categories: Some(request.categories.clone()),
                        status: Some(MembershipStatus::Active),
                    };
                    upsert_membership(&mut coach.clubs, request.club_id, patch.clone(), now);
                    upsert_membership(&mut user.clubs, request.club_id, patch, now);
                    coach.updated_at = now;
                    user.updated_at = now;
                    coaches::save_in_tx(tx, &coach)?;
                    users::save_in_tx(tx, &user)?;
                }

                request.status = match decision {
                    Decision::Approve => JoinRequestStatus::Accepted,
                    Decision::Reject => JoinRequestStatus::Rejected,
                };
                request.responded_at = Some(now);
                request.updated_at = now;
                coaches::save_join_request_in_tx(tx, &request)?;

                Ok(request.status)
            })
        })
        .await
}

/// Club admin decision over a coach pending at their club.
///
/// Only the membership entry matching the approver's club moves; entries at
/// other clubs are untouched. First approval provisions the coach's auth
/// credential.
pub async fn validate_coach(
    state: &SharedState,
    actor: &Actor,
    coach_id: Uuid,
    decision: Decision,
) -> Result<CoachValidationOutcome, WorkflowError> {
    actor.require_role(Role::ClubAdmin)?;
    let club_id = actor.active_club()?.club_id;

    let (status, coach_email) = state
        .store()
        .run_transaction::<(MembershipStatus, String), WorkflowError, _>(|tx| {
            Box::pin(async move {
                let mut coach = coaches::get_in_tx(tx, coach_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("coach `{coach_id}`")))?;

                let entry = membership_for(&coach.clubs, club_id).ok_or_else(|| {
                    WorkflowError::Forbidden("coach does not belong to your club".to_owned())
                })?;
                let next = apply_status_event(entry.status, StatusEvent::Decide(decision))?;

                let now = OffsetDateTime::now_utc();
                upsert_membership(
                    &mut coach.clubs,
                    club_id,
                    MembershipPatch {
                        status: Some(next),
                        ..Default::default()
                    },
                    now,
                );
                coach.updated_at = now;

                let mut user = users::get_in_tx(tx, coach.user_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("user `{}`", coach.user_id)))?;
                upsert_membership(
                    &mut user.clubs,
                    club_id,
                    MembershipPatch {
                        status: Some(next),
                        ..Default::default()
                    },
                    now,
                );
                if decision == Decision::Approve && user.status == MembershipStatus::Pending {
                    user.status = MembershipStatus::Active;
                }
                user.updated_at = now;

                coaches::save_in_tx(tx, &coach)?;
                users::save_in_tx(tx, &user)?;
                Ok((next, coach.email.clone()))
            })
        })
        .await?;

    let credential_provisioned = if status == MembershipStatus::Active {
        match state.credentials().create_if_absent(&coach_email, None).await {
            Ok(_) => true,
            Err(err) => {
                warn!(email = %coach_email, error = %err, "credential provisioning failed after approval");
                false
            }
        }
    } else {
        false
    };

    audit::record(
        state.store(),
        &actor.email,
        "validate-coach",
        "coach",
        &coach_id.to_string(),
    )
    .await;

    Ok(CoachValidationOutcome {
        status,
        credential_provisioned,
    })
}

/// Toggle a coach ACTIVO ↔ INACTIVO within the acting admin's club only.
pub async fn toggle_coach_status(
    state: &SharedState,
    actor: &Actor,
    coach_id: Uuid,
) -> Result<MembershipStatus, WorkflowError> {
    actor.require_role(Role::ClubAdmin)?;
    let club_id = actor.active_club()?.club_id;

    state
        .store()
        .run_transaction::<MembershipStatus, WorkflowError, _>(|tx| {
            Box::pin(async move {
                let mut coach = coaches::get_in_tx(tx, coach_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("coach `{coach_id}`")))?;
                let entry = membership_for(&coach.clubs, club_id).ok_or_else(|| {
                    WorkflowError::Forbidden("coach does not belong to your club".to_owned())
                })?;
                let next = apply_status_event(entry.status, StatusEvent::ToggleActivity)?;

                let now = OffsetDateTime::now_utc();
                let patch = MembershipPatch {
                    status: Some(next),
                    ..Default::default()
                };
                upsert_membership(&mut coach.clubs, club_id, patch.clone(), now);
                coach.updated_at = now;
                coaches::save_in_tx(tx, &coach)?;

                if let Some(mut user) = users::get_in_tx(tx, coach.user_id).await? {
                    upsert_membership(&mut user.clubs, club_id, patch, now);
                    user.updated_at = now;
                    users::save_in_tx(tx, &user)?;
                }

                Ok(next)
            })
        })
        .await
}

/// Complete the invited coach's profile using their activation token.
///
/// Profile fields land on the coach record; the user and every INCOMPLETO
/// membership entry move to PENDIENTE and the token is consumed, all in one
/// transaction.
pub async fn complete_coach_profile(
    state: &SharedState,
    token: &str,
    input: CoachProfileInput,
) -> Result<(), WorkflowError> {
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
            Box::pin(async move {
                let mut user = users::get_in_tx(tx, user_id)
                    .await?
                    .ok_or(WorkflowError::InvalidToken)?;
                if user.activation_token.as_deref() != Some(token.as_str()) {
                    return Err(WorkflowError::InvalidToken);
                }

                let mut coach = coaches::get_in_tx(tx, user_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("coach `{user_id}`")))?;

                let now = OffsetDateTime::now_utc();
                user.status = apply_status_event(user.status, StatusEvent::CompleteProfile)?;
                user.activation_token = None;
                promote_incomplete_entries(&mut user.clubs, now);
                user.updated_at = now;

                coach.phone = Some(input.phone);
                coach.address = Some(input.address);
                coach.national_id = Some(input.national_id);
                coach.badge_number = input.badge_number;
                promote_incomplete_entries(&mut coach.clubs, now);
                coach.updated_at = now;

                users::save_in_tx(tx, &user)?;
                coaches::save_in_tx(tx, &coach)?;
                Ok(())
            })
        })
        .await
}

/// Move every INCOMPLETO entry to PENDIENTE; entries in other states keep
/// their status.
fn promote_incomplete_entries(entries: &mut [ClubMembership], now: OffsetDateTime) {
    for entry in entries.iter_mut() {
        if entry.status == MembershipStatus::Incomplete {
            entry.status = MembershipStatus::Pending;
            entry.updated_at = now;
        }
    }
}

/// Prefill data for the coach onboarding form, resolved by token.
pub async fn coach_prefill_by_token(
    state: &SharedState,
    token: &str,
) -> Result<CoachPrefill, WorkflowError> {
    let user = UserRepository::new(state.store().clone())
        .find_by_activation_token(token)
        .await?
        .ok_or(WorkflowError::InvalidToken)?;

    let coach = CoachRepository::new(state.store().clone())
        .find_by_id(user.id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("coach `{}`", user.id)))?;

    let categories = coach
        .clubs
        .iter()
        .flat_map(|entry| entry.categories.iter().cloned())
        .collect();

    Ok(CoachPrefill {
        name: coach.name,
        surname: coach.surname,
        email: coach.email,
        categories,
    })
}

/// The acting coach's own profile.
pub async fn my_coach_profile(
    state: &SharedState,
    actor: &Actor,
) -> Result<CoachRecord, WorkflowError> {
    actor.require_role(Role::Coach)?;
    CoachRepository::new(state.store().clone())
        .find_by_id(actor.id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("coach `{}`", actor.id)))
}

/// Patch the acting coach's own profile.
pub async fn update_my_coach_profile(
    state: &SharedState,
    actor: &Actor,
    badge_number: Option<String>,
    phone: Option<String>,
) -> Result<CoachRecord, WorkflowError> {
    actor.require_role(Role::Coach)?;

    let repository = CoachRepository::new(state.store().clone());
    let mut coach = repository
        .find_by_id(actor.id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("coach `{}`", actor.id)))?;

    if badge_number.is_none() && phone.is_none() {
        return Err(WorkflowError::Validation(
            "no updatable fields were provided".to_owned(),
        ));
    }
    if let Some(badge_number) = badge_number {
        coach.badge_number = Some(badge_number);
    }
    if let Some(phone) = phone {
        coach.phone = Some(phone);
    }
    coach.updated_at = OffsetDateTime::now_utc();
    repository.save(&coach).await?;
    Ok(coach)
}

/// Coaches associated with the acting admin's club.
pub async fn list_club_coaches(
    state: &SharedState,
    actor: &Actor,
) -> Result<Vec<ClubCoach>, WorkflowError> {
    actor.require_role(Role::ClubAdmin)?;
    let club_id = actor.active_club()?.club_id;
    club_scoped_coaches(state, club_id, None).await
}

/// Coaches waiting for validation at the acting admin's club.
pub async fn pending_club_coaches(
    state: &SharedState,
    actor: &Actor,
) -> Result<Vec<ClubCoach>, WorkflowError> {
    actor.require_role(Role::ClubAdmin)?;
    let club_id = actor.active_club()?.club_id;
    club_scoped_coaches(state, club_id, Some(MembershipStatus::Pending)).await
}

async fn club_scoped_coaches(
    state: &SharedState,
    club_id: Uuid,
    status: Option<MembershipStatus>,
) -> Result<Vec<ClubCoach>, WorkflowError> {
    let repository = CoachRepository::new(state.store().clone());
    let mut result = Vec::new();
    for coach in repository.list_all().await? {
        let Some(entry) = membership_for(&coach.clubs, club_id) else {
            continue;
        };
        if status.is_some_and(|wanted| entry.status != wanted) {
            continue;
        }
        let membership = entry.clone();
        result.push(ClubCoach {
            coach,
            membership,
        });
    }
    Ok(result)
}

/// One coach projected onto the acting admin's club.
pub async fn get_club_coach(
    state: &SharedState,
    actor: &Actor,
    coach_id: Uuid,
) -> Result<ClubCoach, WorkflowError> {
    actor.require_role(Role::ClubAdmin)?;
    let club_id = actor.active_club()?.club_id;

    let coach = CoachRepository::new(state.store().clone())
        .find_by_id(coach_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("coach `{coach_id}`")))?;
    let membership = membership_for(&coach.clubs, club_id)
        .cloned()
        .ok_or_else(|| {
            WorkflowError::Forbidden("coach does not belong to your club".to_owned())
        })?;

    Ok(ClubCoach { coach, membership })
}

/// Replace the category set of a coach's entry at the acting admin's club.
pub async fn update_coach_categories(
    state: &SharedState,
    actor: &Actor,
    coach_id: Uuid,
    categories: Vec<String>,
) -> Result<(), WorkflowError> {
    actor.require_role(Role::ClubAdmin)?;
    let club_id = actor.active_club()?.club_id;
    if categories.is_empty() {
        return Err(WorkflowError::Validation(
            "category list must not be empty".to_owned(),
        ));
    }

    apply_category_patch(state, coach_id, club_id, categories).await
}

/// Apply a previously computed category merge to the coach's entry at the
/// acting admin's club (the confirmation step of the creation flow).
pub async fn confirm_coach_categories(
    state: &SharedState,
    actor: &Actor,
    coach_id: Uuid,
    new_categories: Vec<String>,
) -> Result<(), WorkflowError> {
    actor.require_role(Role::ClubAdmin)?;
    let club_id = actor.active_club()?.club_id;
    if new_categories.is_empty() {
        return Err(WorkflowError::Validation(
            "category list must not be empty".to_owned(),
        ));
    }

    let coach = CoachRepository::new(state.store().clone())
        .find_by_id(coach_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("coach `{coach_id}`")))?;
    let entry = membership_for(&coach.clubs, club_id).ok_or_else(|| {
        WorkflowError::Forbidden("coach does not belong to your club".to_owned())
    })?;

    let mut merged = entry.categories.clone();
    merged.extend(category_difference(&entry.categories, &new_categories));
    apply_category_patch(state, coach_id, club_id, merged).await
}

async fn apply_category_patch(
    state: &SharedState,
    coach_id: Uuid,
    club_id: Uuid,
    categories: Vec<String>,
) -> Result<(), WorkflowError> {
    state
        .store()
        .run_transaction::<(), WorkflowError, _>(|tx| {
            let categories = categories.clone();
            Box::pin(async move {
                let mut coach = coaches::get_in_tx(tx, coach_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("coach `{coach_id}`")))?;
                if membership_for(&coach.clubs, club_id).is_none() {
                    return Err(WorkflowError::Forbidden(
                        "coach does not belong to this club".to_owned(),
                    ));
                }

                let now = OffsetDateTime::now_utc();
                let patch = MembershipPatch {
                    categories: Some(categories.clone()),
                    ..Default::default()
                };
                upsert_membership(&mut coach.clubs, club_id, patch.clone(), now);
                coach.updated_at = now;
                coaches::save_in_tx(tx, &coach)?;

                if let Some(mut user) = users::get_in_tx(tx, coach.user_id).await? {
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

/// One coach's full record (federation admin view).
pub async fn get_coach_detail(
    state: &SharedState,
    actor: &Actor,
    coach_id: Uuid,
) -> Result<CoachRecord, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;
    CoachRepository::new(state.store().clone())
        .find_by_id(coach_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("coach `{coach_id}`")))
}

/// Every coach in the federation (federation admin view).
pub async fn list_all_coaches(
    state: &SharedState,
    actor: &Actor,
) -> Result<Vec<CoachRecord>, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;
    Ok(CoachRepository::new(state.store().clone()).list_all().await?)
}

fn validate_person_input(
    name: &str,
    surname: &str,
    email: &str,
    categories: &[String],
) -> Result<(), WorkflowError> {
    if name.trim().is_empty() || surname.trim().is_empty() || email.trim().is_empty() {
        return Err(WorkflowError::Validation(
            "name, surname and email are required".to_owned(),
        ));
    }
    if categories.is_empty() {
        return Err(WorkflowError::Validation(
            "at least one category is required".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        club_admin_actor, coach_actor, fed_admin_actor, seed_active_club, seed_coach,
        seed_incomplete_user, test_state,
    };

    fn coach_input(email: &str) -> CreateCoachInput {
        CreateCoachInput {
            name: "Marta".to_owned(),
            surname: "Gomez".to_owned(),
            email: email.to_owned(),
            categories: vec!["cadetes".to_owned()],
        }
    }

    #[tokio::test]
    async fn fresh_coach_creation_writes_user_and_profile() {
        let state = test_state();
        let club = seed_active_club(&state, "Municipalidad").await;
        let actor = club_admin_actor(club.id, "Municipalidad");

        let outcome = create_coach(&state, &actor, coach_input("marta@club.test"))
            .await
            .unwrap();
        let CreateCoachOutcome::Created { user_id, email_dispatched } = outcome else {
            panic!("expected a fresh creation");
        };
        assert!(email_dispatched);

        let coach = CoachRepository::new(state.store().clone())
            .find_by_id(user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(coach.clubs.len(), 1);
        assert_eq!(coach.clubs[0].status, MembershipStatus::Incomplete);

        let user = UserRepository::new(state.store().clone())
            .find_by_id(user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(user.roles.contains(Role::Coach));
        assert!(user.activation_token.is_some());
    }

    #[tokio::test]
    async fn admin_emails_conflict_without_writing_anything() {
        let state = test_state();
        let club = seed_active_club(&state, "Municipalidad").await;
        let actor = club_admin_actor(club.id, "Municipalidad");
        seed_incomplete_user(&state, "admin@asambal.test", Role::FederationAdmin, "tok-1").await;

        let err = create_coach(&state, &actor, coach_input("admin@asambal.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::AdminEmailConflict));

        assert!(
            CoachRepository::new(state.store().clone())
                .find_by_email("admin@asambal.test")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn existing_coach_elsewhere_requires_a_join_request() {
        let state = test_state();
        let muni = seed_active_club(&state, "Municipalidad").await;
        let olimpia = seed_active_club(&state, "Olimpia").await;
        let coach = seed_coach(
            &state,
            "marta@club.test",
            &[(olimpia.id, "Olimpia", MembershipStatus::Active)],
        )
        .await;

        let actor = club_admin_actor(muni.id, "Municipalidad");
        let outcome = create_coach(&state, &actor, coach_input("marta@club.test"))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            CreateCoachOutcome::JoinRequestRequired { coach_id } if coach_id == coach.id
        ));

        // The membership list was not touched.
        let stored = CoachRepository::new(state.store().clone())
            .find_by_id(coach.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.clubs.len(), 1);
    }

    #[tokio::test]
    async fn same_club_with_new_categories_requires_merge_confirmation() {
        let state = test_state();
        let muni = seed_active_club(&state, "Municipalidad").await;
        let coach = seed_coach(
            &state,
            "marta@club.test",
            &[(muni.id, "Municipalidad", MembershipStatus::Active)],
        )
        .await;
        let actor = club_admin_actor(muni.id, "Municipalidad");

        // Same categories: plain conflict.
        let err = create_coach(&state, &actor, coach_input("marta@club.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::AlreadyMember(_)));

        // New category: explicit merge required, nothing merged yet.
        let mut input = coach_input("marta@club.test");
        input.categories = vec!["cadetes".to_owned(), "juveniles".to_owned()];
        let outcome = create_coach(&state, &actor, input).await.unwrap();
        let CreateCoachOutcome::CategoryMergeRequired { coach_id, new_categories } = outcome else {
            panic!("expected a category merge request");
        };
        assert_eq!(coach_id, coach.id);
        assert_eq!(new_categories, vec!["juveniles".to_owned()]);

        confirm_coach_categories(&state, &actor, coach.id, new_categories)
            .await
            .unwrap();
        let stored = CoachRepository::new(state.store().clone())
            .find_by_id(coach.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.clubs[0].categories,
            vec!["cadetes".to_owned(), "juveniles".to_owned()]
        );
    }

    #[tokio::test]
    async fn join_request_roundtrip_appends_membership_on_accept_only() {
        let state = test_state();
        let muni = seed_active_club(&state, "Municipalidad").await;
        let olimpia = seed_active_club(&state, "Olimpia").await;
        let coach = seed_coach(
            &state,
            "marta@club.test",
            &[(olimpia.id, "Olimpia", MembershipStatus::Active)],
        )
        .await;
        let admin = club_admin_actor(muni.id, "Municipalidad");

        let request = send_join_request(&state, &admin, coach_input("marta@club.test"))
            .await
            .unwrap();
        // Duplicate requests are blocked while one is pending.
        assert!(matches!(
            send_join_request(&state, &admin, coach_input("marta@club.test"))
                .await
                .unwrap_err(),
            WorkflowError::InvalidState(_)
        ));

        let coach_as_actor = coach_actor(coach.id, "marta@club.test");
        let status = respond_join_request(&state, &coach_as_actor, request.id, Decision::Approve)
            .await
            .unwrap();
        assert_eq!(status, JoinRequestStatus::Accepted);

        let stored = CoachRepository::new(state.store().clone())
            .find_by_id(coach.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.clubs.len(), 2);
        assert_eq!(stored.clubs[1].club_id, muni.id);
        assert_eq!(stored.clubs[1].status, MembershipStatus::Active);

        // Answering twice fails.
        assert!(matches!(
            respond_join_request(&state, &coach_as_actor, request.id, Decision::Reject)
                .await
                .unwrap_err(),
            WorkflowError::InvalidState(_)
        ));
    }

    #[tokio::test]
    async fn approving_in_one_club_never_touches_the_other() {
        let state = test_state();
        let muni = seed_active_club(&state, "Municipalidad").await;
        let olimpia = seed_active_club(&state, "Olimpia").await;
        let coach = seed_coach(
            &state,
            "marta@club.test",
            &[
                (muni.id, "Municipalidad", MembershipStatus::Pending),
                (olimpia.id, "Olimpia", MembershipStatus::Pending),
            ],
        )
        .await;

        let muni_admin = club_admin_actor(muni.id, "Municipalidad");
        let outcome = validate_coach(&state, &muni_admin, coach.id, Decision::Approve)
            .await
            .unwrap();
        assert_eq!(outcome.status, MembershipStatus::Active);
        assert!(outcome.credential_provisioned);

        let stored = CoachRepository::new(state.store().clone())
            .find_by_id(coach.id)
            .await
            .unwrap()
            .unwrap();
        let muni_entry = membership_for(&stored.clubs, muni.id).unwrap();
        let olimpia_entry = membership_for(&stored.clubs, olimpia.id).unwrap();
        assert_eq!(muni_entry.status, MembershipStatus::Active);
        // Regression guard: the sibling club's entry stays PENDIENTE.
        assert_eq!(olimpia_entry.status, MembershipStatus::Pending);
    }

    #[tokio::test]
    async fn validation_is_club_scoped() {
        let state = test_state();
        let muni = seed_active_club(&state, "Municipalidad").await;
        let olimpia = seed_active_club(&state, "Olimpia").await;
        let coach = seed_coach(
            &state,
            "marta@club.test",
            &[(olimpia.id, "Olimpia", MembershipStatus::Pending)],
        )
        .await;

        let muni_admin = club_admin_actor(muni.id, "Municipalidad");
        let err = validate_coach(&state, &muni_admin, coach.id, Decision::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn profile_completion_promotes_only_incomplete_entries() {
        let state = test_state();
        let muni = seed_active_club(&state, "Municipalidad").await;
        let actor = club_admin_actor(muni.id, "Municipalidad");
        let outcome = create_coach(&state, &actor, coach_input("marta@club.test"))
            .await
            .unwrap();
        let CreateCoachOutcome::Created { user_id, .. } = outcome else {
            panic!("expected creation");
        };

        let token = UserRepository::new(state.store().clone())
            .find_by_id(user_id)
            .await
            .unwrap()
            .unwrap()
            .activation_token
            .unwrap();

        complete_coach_profile(
            &state,
            &token,
            CoachProfileInput {
                phone: "264-555-1111".to_owned(),
                address: "Calle 9".to_owned(),
                national_id: "30111222".to_owned(),
                badge_number: Some("ENEA-77".to_owned()),
            },
        )
        .await
        .unwrap();

        let coach = CoachRepository::new(state.store().clone())
            .find_by_id(user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(coach.clubs[0].status, MembershipStatus::Pending);
        assert_eq!(coach.national_id.as_deref(), Some("30111222"));

        let user = UserRepository::new(state.store().clone())
            .find_by_id(user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.status, MembershipStatus::Pending);
        assert_eq!(user.activation_token, None);
    }

    #[tokio::test]
    async fn federation_admin_listing_is_gated() {
        let state = test_state();
        let admin = fed_admin_actor();
        assert!(list_all_coaches(&state, &admin).await.unwrap().is_empty());

        let club_actor = club_admin_actor(Uuid::new_v4(), "Muni");
        assert!(matches!(
            list_all_coaches(&state, &club_actor).await.unwrap_err(),
            WorkflowError::Forbidden(_)
        ));
    }
}
