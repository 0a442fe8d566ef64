use uuid::Uuid;

use crate::dao::{
    models::UserRecord,
    storage::StorageResult,
    store::{Document, DocumentStore, Query, Transaction, encode},
};
use crate::domain::status::MembershipStatus;

/// Collection holding identity records.
pub const USERS: &str = "usuarios";

/// Typed accessor over the `usuarios` collection.
#[derive(Clone)]
pub struct UserRepository {
    store: DocumentStore,
}

impl UserRepository {
    /// Build a repository over the given store.
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Fetch a user by id.
    pub async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<UserRecord>> {
        let document = self.store.get(USERS, &id.to_string()).await?;
        document.map(|doc| doc.decode(USERS)).transpose()
    }

    /// Fetch a user by login email.
    pub async fn find_by_email(&self, email: &str) -> StorageResult<Option<UserRecord>> {
        let documents = self
            .store
            .query(USERS, Query::new().filter_eq("email", email).limit(1))
            .await?;
        documents.first().map(|doc| doc.decode(USERS)).transpose()
    }

    /// Fetch a user by its unconsumed activation token.
    pub async fn find_by_activation_token(
        &self,
        token: &str,
    ) -> StorageResult<Option<UserRecord>> {
        let documents = self
            .store
            .query(USERS, Query::new().filter_eq("activationToken", token).limit(1))
            .await?;
        documents.first().map(|doc| doc.decode(USERS)).transpose()
    }

    /// List users in a given top-level status.
    pub async fn list_by_status(
        &self,
        status: MembershipStatus,
    ) -> StorageResult<Vec<UserRecord>> {
        let documents = self
            .store
            .query(USERS, Query::new().filter_eq("status", status.wire_name()))
            .await?;
        decode_all(&documents)
    }

    /// Create or replace a user document.
    pub async fn save(&self, user: &UserRecord) -> StorageResult<()> {
        let fields = encode(USERS, user)?;
        self.store.set(USERS, &user.id.to_string(), fields).await
    }
}

fn decode_all(documents: &[Document]) -> StorageResult<Vec<UserRecord>> {
    documents.iter().map(|doc| doc.decode(USERS)).collect()
}

/// Read a user inside a transaction.
pub async fn get_in_tx(tx: &mut Transaction, id: Uuid) -> StorageResult<Option<UserRecord>> {
    let document = tx.get(USERS, &id.to_string()).await?;
    document.map(|doc| doc.decode(USERS)).transpose()
}

/// Look up a user by email inside a transaction, pinning the result so a
/// concurrent creation of the same email conflicts at commit.
pub async fn find_by_email_in_tx(
    tx: &mut Transaction,
    email: &str,
) -> StorageResult<Option<UserRecord>> {
    let documents = tx
        .query(USERS, Query::new().filter_eq("email", email).limit(1))
        .await?;
    documents.first().map(|doc| doc.decode(USERS)).transpose()
}

/// List every user inside a transaction (used by club-wide cascades).
pub async fn list_in_tx(tx: &mut Transaction) -> StorageResult<Vec<UserRecord>> {
    let documents = tx.query(USERS, Query::new()).await?;
    documents.iter().map(|doc| doc.decode(USERS)).collect()
}

/// Stage a full write of the user inside a transaction.
pub fn save_in_tx(tx: &mut Transaction, user: &UserRecord) -> StorageResult<()> {
    let fields = encode(USERS, user)?;
    tx.set(USERS, &user.id.to_string(), fields);
    Ok(())
}
