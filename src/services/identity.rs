use dashmap::DashMap;
use futures::future::BoxFuture;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    dao::models::UserRecord,
    domain::{membership::ClubMembership, roles::RoleSet, status::MembershipStatus},
};

/// Lifetime of an access token.
pub const ACCESS_TOKEN_TTL: Duration = Duration::minutes(15);
/// Lifetime of a refresh token.
pub const REFRESH_TOKEN_TTL: Duration = Duration::days(7);

/// Produce a fresh single-use activation token.
pub fn generate_activation_token() -> String {
    random_hex(20)
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Club reference embedded in access-token claims so club-scoped
/// authorization needs no database round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubClaim {
    /// Club the actor operates.
    pub club_id: Uuid,
    /// Display name of the club.
    pub name: String,
}

impl From<&ClubMembership> for ClubClaim {
    fn from(membership: &ClubMembership) -> Self {
        Self {
            club_id: membership.club_id,
            name: membership.club_name.clone(),
        }
    }
}

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id.
    pub sub: Uuid,
    /// Login email.
    pub email: String,
    /// Normalized role set.
    pub roles: RoleSet,
    /// Active club memberships at issue time.
    pub clubs: Vec<ClubClaim>,
    /// Issued-at, seconds since epoch.
    pub iat: usize,
    /// Expiry, seconds since epoch.
    pub exp: usize,
}

/// Claims carried by a refresh token.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Login email, re-resolved against the user record on refresh.
    pub email: String,
    /// Issued-at, seconds since epoch.
    pub iat: usize,
    /// Expiry, seconds since epoch.
    pub exp: usize,
}

/// Issues and verifies the signed access and refresh tokens.
#[derive(Clone)]
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenService {
    /// Build the service from the two signing secrets.
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
        }
    }

    /// Issue a short-lived access token for a user.
    ///
    /// Claims carry the role set plus the user's currently ACTIVE club
    /// memberships.
    pub fn issue_access(&self, user: &UserRecord) -> Result<String, jsonwebtoken::errors::Error> {
        let now = OffsetDateTime::now_utc();
        let claims = AccessClaims {
            sub: user.id,
            email: user.email.clone(),
            roles: user.roles.clone(),
            clubs: user
                .clubs
                .iter()
                .filter(|membership| membership.status == MembershipStatus::Active)
                .map(ClubClaim::from)
                .collect(),
            iat: now.unix_timestamp() as usize,
            exp: (now + ACCESS_TOKEN_TTL).unix_timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.access_encoding)
    }

    /// Issue a long-lived refresh token.
    pub fn issue_refresh(&self, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = OffsetDateTime::now_utc();
        let claims = RefreshClaims {
            email: email.to_owned(),
            iat: now.unix_timestamp() as usize,
            exp: (now + REFRESH_TOKEN_TTL).unix_timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.refresh_encoding)
    }

    /// Verify an access token and return its claims.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        decode::<AccessClaims>(token, &self.access_decoding, &Validation::default())
            .map(|data| data.claims)
    }

    /// Verify a refresh token and return its claims.
    pub fn verify_refresh(
        &self,
        token: &str,
    ) -> Result<RefreshClaims, jsonwebtoken::errors::Error> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &Validation::default())
            .map(|data| data.claims)
    }
}

/// Failures raised by the credential provider.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Password check failed.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// No credential record exists for the email.
    #[error("no credential record for this email")]
    UnknownUser,
    /// Hashing failed.
    #[error("hashing failure: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    /// The blocking hashing task was cancelled.
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Outcome of an idempotent credential provisioning call.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionOutcome {
    /// Whether a new credential record was created.
    pub created: bool,
}

/// External authentication provider consumed by the workflow engine.
///
/// Provisioning is idempotent: when a record already exists for the email
/// the call is a no-op, otherwise one is created with the supplied password
/// or a generated random one.
pub trait CredentialProvider: Send + Sync {
    /// Create a credential record for `email` unless one already exists.
    fn create_if_absent<'a>(
        &'a self,
        email: &'a str,
        password: Option<&'a str>,
    ) -> BoxFuture<'a, Result<ProvisionOutcome, CredentialError>>;

    /// Check a password against the stored credential record.
    fn verify_credentials<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<(), CredentialError>>;
}

/// In-process credential provider hashing passwords with bcrypt.
///
/// Stands in for the managed authentication provider in development and
/// tests; hashing runs on the blocking pool to keep request tasks free.
#[derive(Default)]
pub struct BcryptCredentialProvider {
    records: DashMap<String, String>,
}

impl BcryptCredentialProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialProvider for BcryptCredentialProvider {
    fn create_if_absent<'a>(
        &'a self,
        email: &'a str,
        password: Option<&'a str>,
    ) -> BoxFuture<'a, Result<ProvisionOutcome, CredentialError>> {
        let password = password.map(str::to_owned).unwrap_or_else(|| random_hex(16));
        Box::pin(async move {
            if self.records.contains_key(email) {
                return Ok(ProvisionOutcome { created: false });
            }

            let hash =
                tokio::task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
                    .await??;
            self.records.insert(email.to_owned(), hash);
            Ok(ProvisionOutcome { created: true })
        })
    }

    fn verify_credentials<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<(), CredentialError>> {
        Box::pin(async move {
            let Some(hash) = self.records.get(email).map(|entry| entry.value().clone()) else {
                return Err(CredentialError::UnknownUser);
            };

            let password = password.to_owned();
            let valid =
                tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash)).await??;
            if valid {
                Ok(())
            } else {
                Err(CredentialError::InvalidCredentials)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::roles::Role;

    fn user_with_memberships() -> UserRecord {
        let now = OffsetDateTime::now_utc();
        UserRecord {
            id: Uuid::new_v4(),
            email: "admin@club.test".to_owned(),
            roles: RoleSet::single(Role::ClubAdmin),
            status: MembershipStatus::Active,
            activation_token: None,
            created_by: "root@asambal.test".to_owned(),
            clubs: vec![
                ClubMembership {
                    club_id: Uuid::new_v4(),
                    club_name: "Muni".to_owned(),
                    categories: vec![],
                    status: MembershipStatus::Active,
                    updated_at: now,
                },
                ClubMembership {
                    club_id: Uuid::new_v4(),
                    club_name: "Olimpia".to_owned(),
                    categories: vec![],
                    status: MembershipStatus::Pending,
                    updated_at: now,
                },
            ],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn access_token_roundtrips_and_only_carries_active_clubs() {
        let tokens = TokenService::new("access-secret", "refresh-secret");
        let user = user_with_memberships();

        let token = tokens.issue_access(&user).unwrap();
        let claims = tokens.verify_access(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert!(claims.roles.contains(Role::ClubAdmin));
        assert_eq!(claims.clubs.len(), 1);
        assert_eq!(claims.clubs[0].name, "Muni");
    }

    #[test]
    fn refresh_token_is_not_accepted_as_access_token() {
        let tokens = TokenService::new("access-secret", "refresh-secret");
        let refresh = tokens.issue_refresh("someone@asambal.test").unwrap();
        assert!(tokens.verify_access(&refresh).is_err());
    }

    #[tokio::test]
    async fn provisioning_is_idempotent() {
        let provider = BcryptCredentialProvider::new();

        let first = provider
            .create_if_absent("coach@club.test", Some("secret-password"))
            .await
            .unwrap();
        assert!(first.created);

        let second = provider
            .create_if_absent("coach@club.test", Some("other-password"))
            .await
            .unwrap();
        assert!(!second.created);

        // The original password still verifies.
        provider
            .verify_credentials("coach@club.test", "secret-password")
            .await
            .unwrap();
        assert!(matches!(
            provider
                .verify_credentials("coach@club.test", "other-password")
                .await,
            Err(CredentialError::InvalidCredentials)
        ));
    }
}
