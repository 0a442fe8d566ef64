use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::{
        models::UserRecord,
        users::{self, UserRepository},
    },
    domain::{
        roles::RoleSet,
        status::{MembershipStatus, StatusEvent, apply_status_event},
    },
    error::WorkflowError,
    services::identity::CredentialError,
    state::SharedState,
};

/// Result of a successful login.
#[derive(Debug)]
pub struct LoginOutcome {
    /// Short-lived access token.
    pub token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// The authenticated user record.
    pub user: UserRecord,
}

/// Result of a successful account activation.
#[derive(Debug)]
pub struct ActivationOutcome {
    /// The activated user.
    pub user_id: Uuid,
    /// Roles held by the user, for the frontend to route on.
    pub roles: RoleSet,
    /// Whether the credential provider accepted the provisioning call; the
    /// activation itself is committed either way.
    pub credential_provisioned: bool,
}

/// Authenticate a user against the credential provider and issue tokens.
pub async fn login(
    state: &SharedState,
    email: &str,
    password: &str,
) -> Result<LoginOutcome, WorkflowError> {
    let repository = UserRepository::new(state.store().clone());
    let Some(user) = repository.find_by_email(email).await? else {
        return Err(WorkflowError::InvalidCredentials);
    };

    match state.credentials().verify_credentials(email, password).await {
        Ok(()) => {}
        Err(CredentialError::InvalidCredentials | CredentialError::UnknownUser) => {
            return Err(WorkflowError::InvalidCredentials);
        }
        Err(err) => return Err(WorkflowError::Credential(err)),
    }

    let token = state.tokens().issue_access(&user)?;
    let refresh_token = state.tokens().issue_refresh(&user.email)?;

    Ok(LoginOutcome {
        token,
        refresh_token,
        user,
    })
}

/// Exchange a refresh token for a fresh access token.
///
/// Claims are re-derived from the current user record, so a deactivated
/// user cannot keep refreshing into a stale authorization.
pub async fn refresh_session(state: &SharedState, refresh_token: &str) -> Result<String, WorkflowError> {
    let claims = state
        .tokens()
        .verify_refresh(refresh_token)
        .map_err(|_| WorkflowError::InvalidCredentials)?;

    let repository = UserRepository::new(state.store().clone());
    let user = repository
        .find_by_email(&claims.email)
        .await?
        .ok_or(WorkflowError::InvalidCredentials)?;

    if user.status != MembershipStatus::Active {
        return Err(WorkflowError::Forbidden("user is not active".to_owned()));
    }

    Ok(state.tokens().issue_access(&user)?)
}

/// Consume an activation token: the user moves INCOMPLETO → PENDIENTE and
/// the token is nulled in the same transaction, so a second attempt with the
/// same token fails.
pub async fn activate_account(
    state: &SharedState,
    email: &str,
    password: &str,
    token: &str,
) -> Result<ActivationOutcome, WorkflowError> {
    let repository = UserRepository::new(state.store().clone());
    let user = repository
        .find_by_email(email)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("no user for email `{email}`")))?;
    let user_id = user.id;

    let updated = state
        .store()
        .run_transaction::<UserRecord, WorkflowError, _>(|tx| {
            let token = token.to_owned();
            Box::pin(async move {
                let mut user = users::get_in_tx(tx, user_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("user `{user_id}`")))?;

                if user.activation_token.as_deref() != Some(token.as_str()) {
                    return Err(WorkflowError::InvalidToken);
                }

                user.status = apply_status_event(user.status, StatusEvent::CompleteProfile)?;
                user.activation_token = None;
                user.updated_at = time::OffsetDateTime::now_utc();
                users::save_in_tx(tx, &user)?;
                Ok(user)
            })
        })
        .await?;

    // The state transition is committed; provisioning is best effort.
    let credential_provisioned = match state
        .credentials()
        .create_if_absent(&updated.email, Some(password))
        .await
    {
        Ok(_) => true,
        Err(err) => {
            warn!(email = %updated.email, error = %err, "credential provisioning failed after activation");
            false
        }
    };

    Ok(ActivationOutcome {
        user_id: updated.id,
        roles: updated.roles,
        credential_provisioned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::roles::Role,
        testing::{seed_incomplete_user, test_state},
    };

    #[tokio::test]
    async fn activation_consumes_the_token_exactly_once() {
        let state = test_state();
        let user = seed_incomplete_user(&state, "coach@club.test", Role::Coach, "tok-123").await;

        let outcome = activate_account(&state, &user.email, "hunter2secret", "tok-123")
            .await
            .unwrap();
        assert!(outcome.credential_provisioned);

        let repository = UserRepository::new(state.store().clone());
        let stored = repository.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MembershipStatus::Pending);
        assert_eq!(stored.activation_token, None);

        // The token was consumed; replaying it must fail.
        let err = activate_account(&state, &user.email, "hunter2secret", "tok-123")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidToken));
    }

    #[tokio::test]
    async fn activation_rejects_a_mismatched_token() {
        let state = test_state();
        let user = seed_incomplete_user(&state, "coach@club.test", Role::Coach, "tok-123").await;

        let err = activate_account(&state, &user.email, "hunter2secret", "tok-999")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidToken));

        let repository = UserRepository::new(state.store().clone());
        let stored = repository.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MembershipStatus::Incomplete);
        assert_eq!(stored.activation_token.as_deref(), Some("tok-123"));
    }

    #[tokio::test]
    async fn login_roundtrips_after_activation() {
        let state = test_state();
        let user = seed_incomplete_user(&state, "coach@club.test", Role::Coach, "tok-123").await;
        activate_account(&state, &user.email, "hunter2secret", "tok-123")
            .await
            .unwrap();

        let outcome = login(&state, "coach@club.test", "hunter2secret")
            .await
            .unwrap();
        let claims = state.tokens().verify_access(&outcome.token).unwrap();
        assert_eq!(claims.sub, user.id);

        let err = login(&state, "coach@club.test", "wrong-password")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidCredentials));
    }

    #[tokio::test]
    async fn refresh_requires_an_active_user() {
        let state = test_state();
        let user = seed_incomplete_user(&state, "coach@club.test", Role::Coach, "tok-123").await;
        activate_account(&state, &user.email, "hunter2secret", "tok-123")
            .await
            .unwrap();

        let refresh = state.tokens().issue_refresh(&user.email).unwrap();
        // Still PENDIENTE: no new access token.
        let err = refresh_session(&state, &refresh).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }
}
