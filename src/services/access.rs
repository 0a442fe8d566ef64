use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use uuid::Uuid;

use crate::{
    domain::roles::{Role, RoleSet},
    error::{AppError, WorkflowError},
    services::identity::{AccessClaims, ClubClaim},
    state::SharedState,
};

/// The authenticated caller of a workflow operation.
///
/// Resolved from the bearer token; role and club scope checks run against
/// the claims so most authorization needs no database round trip.
#[derive(Debug, Clone)]
pub struct Actor {
    /// User id.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Normalized role set.
    pub roles: RoleSet,
    /// Active club memberships at token issue time.
    pub clubs: Vec<ClubClaim>,
}

impl From<AccessClaims> for Actor {
    fn from(claims: AccessClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            roles: claims.roles,
            clubs: claims.clubs,
        }
    }
}

impl Actor {
    /// Require one specific role.
    pub fn require_role(&self, role: Role) -> Result<(), WorkflowError> {
        if self.roles.contains(role) {
            Ok(())
        } else {
            Err(WorkflowError::Forbidden(format!(
                "operation requires the {role} role"
            )))
        }
    }

    /// Require at least one of the given roles.
    pub fn require_any_role(&self, roles: &[Role]) -> Result<(), WorkflowError> {
        if roles.iter().any(|role| self.roles.contains(*role)) {
            Ok(())
        } else {
            Err(WorkflowError::Forbidden(
                "operation requires a role the actor does not hold".to_owned(),
            ))
        }
    }

    /// The club this actor operates, for club-scoped operations.
    pub fn active_club(&self) -> Result<&ClubClaim, WorkflowError> {
        self.clubs
            .first()
            .ok_or_else(|| WorkflowError::Forbidden("actor has no active club".to_owned()))
    }

    /// Require the actor to belong to the given club.
    pub fn require_club(&self, club_id: Uuid) -> Result<(), WorkflowError> {
        if self.clubs.iter().any(|club| club.club_id == club_id) {
            Ok(())
        } else {
            Err(WorkflowError::Forbidden(
                "actor does not belong to this club".to_owned(),
            ))
        }
    }
}

impl FromRequestParts<SharedState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("missing bearer token"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("malformed authorization header"))?;

        let claims = state
            .tokens()
            .verify_access(token)
            .map_err(|_| AppError::unauthorized("invalid or expired token"))?;

        Ok(Actor::from(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor_with(roles: RoleSet, clubs: Vec<ClubClaim>) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            email: "someone@asambal.test".to_owned(),
            roles,
            clubs,
        }
    }

    #[test]
    fn role_checks_gate_on_the_role_set() {
        let actor = actor_with(RoleSet::single(Role::Coach), vec![]);
        assert!(actor.require_role(Role::Coach).is_ok());
        assert!(actor.require_role(Role::FederationAdmin).is_err());
        assert!(
            actor
                .require_any_role(&[Role::ClubAdmin, Role::Coach])
                .is_ok()
        );
        assert!(
            actor
                .require_any_role(&[Role::ClubAdmin, Role::FederationAdmin])
                .is_err()
        );
    }

    #[test]
    fn club_scope_checks_use_the_claims() {
        let club_id = Uuid::new_v4();
        let actor = actor_with(
            RoleSet::single(Role::ClubAdmin),
            vec![ClubClaim {
                club_id,
                name: "Muni".to_owned(),
            }],
        );

        assert_eq!(actor.active_club().unwrap().club_id, club_id);
        assert!(actor.require_club(club_id).is_ok());
        assert!(actor.require_club(Uuid::new_v4()).is_err());

        let clubless = actor_with(RoleSet::single(Role::ClubAdmin), vec![]);
        assert!(clubless.active_club().is_err());
    }
}
