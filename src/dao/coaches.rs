use uuid::Uuid;

use crate::dao::{
    models::{CoachJoinRequestRecord, CoachRecord},
    storage::StorageResult,
    store::{DocumentStore, Query, Transaction, encode},
};

/// Collection holding coach profiles, keyed by owning user id.
pub const COACHES: &str = "profesores";
/// Collection holding join requests sent to already-registered coaches.
pub const COACH_JOIN_REQUESTS: &str = "coachRequests";

/// Typed accessor over coach profiles and their join requests.
#[derive(Clone)]
pub struct CoachRepository {
    store: DocumentStore,
}

impl CoachRepository {
    /// Build a repository over the given store.
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Fetch a coach by id (identical to the owning user id).
    pub async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<CoachRecord>> {
        let document = self.store.get(COACHES, &id.to_string()).await?;
        document.map(|doc| doc.decode(COACHES)).transpose()
    }

    /// Fetch a coach by contact email.
    pub async fn find_by_email(&self, email: &str) -> StorageResult<Option<CoachRecord>> {
        let documents = self
            .store
            .query(COACHES, Query::new().filter_eq("email", email).limit(1))
            .await?;
        documents.first().map(|doc| doc.decode(COACHES)).transpose()
    }

    /// List every coach.
    pub async fn list_all(&self) -> StorageResult<Vec<CoachRecord>> {
        let documents = self.store.query(COACHES, Query::new()).await?;
        documents.iter().map(|doc| doc.decode(COACHES)).collect()
    }

    /// Create or replace a coach document.
    pub async fn save(&self, coach: &CoachRecord) -> StorageResult<()> {
        let fields = encode(COACHES, coach)?;
        self.store.set(COACHES, &coach.id.to_string(), fields).await
    }

    /// List the pending join requests addressed to a coach.
    pub async fn pending_join_requests(
        &self,
        coach_id: Uuid,
    ) -> StorageResult<Vec<CoachJoinRequestRecord>> {
        let documents = self
            .store
            .query(
                COACH_JOIN_REQUESTS,
                Query::new()
                    .filter_eq("coachId", coach_id.to_string())
                    .filter_eq("status", "PENDIENTE"),
            )
            .await?;
        documents
            .iter()
            .map(|doc| doc.decode(COACH_JOIN_REQUESTS))
            .collect()
    }

    /// Whether a pending join request from this club to this coach exists.
    pub async fn has_pending_join_request(
        &self,
        coach_id: Uuid,
        club_id: Uuid,
    ) -> StorageResult<bool> {
        let documents = self
            .store
            .query(
                COACH_JOIN_REQUESTS,
                Query::new()
                    .filter_eq("coachId", coach_id.to_string())
                    .filter_eq("clubId", club_id.to_string())
                    .filter_eq("status", "PENDIENTE")
                    .limit(1),
            )
            .await?;
        Ok(!documents.is_empty())
    }

    /// Create or replace a join request document.
    pub async fn save_join_request(
        &self,
        request: &CoachJoinRequestRecord,
    ) -> StorageResult<()> {
        let fields = encode(COACH_JOIN_REQUESTS, request)?;
        self.store
            .set(COACH_JOIN_REQUESTS, &request.id.to_string(), fields)
            .await
    }
}

/// Read a coach inside a transaction.
pub async fn get_in_tx(tx: &mut Transaction, id: Uuid) -> StorageResult<Option<CoachRecord>> {
    let document = tx.get(COACHES, &id.to_string()).await?;
    document.map(|doc| doc.decode(COACHES)).transpose()
}

/// List every coach inside a transaction (used by club-wide cascades).
pub async fn list_in_tx(tx: &mut Transaction) -> StorageResult<Vec<CoachRecord>> {
    let documents = tx.query(COACHES, Query::new()).await?;
    documents.iter().map(|doc| doc.decode(COACHES)).collect()
}

/// Stage a full write of the coach inside a transaction.
pub fn save_in_tx(tx: &mut Transaction, coach: &CoachRecord) -> StorageResult<()> {
    let fields = encode(COACHES, coach)?;
    tx.set(COACHES, &coach.id.to_string(), fields);
    Ok(())
}

/// Read a join request inside a transaction.
pub async fn get_join_request_in_tx(
    tx: &mut Transaction,
    id: Uuid,
) -> StorageResult<Option<CoachJoinRequestRecord>> {
    let document = tx.get(COACH_JOIN_REQUESTS, &id.to_string()).await?;
    document
        .map(|doc| doc.decode(COACH_JOIN_REQUESTS))
        .transpose()
}

/// Stage a full write of the join request inside a transaction.
pub fn save_join_request_in_tx(
    tx: &mut Transaction,
    request: &CoachJoinRequestRecord,
) -> StorageResult<()> {
    let fields = encode(COACH_JOIN_REQUESTS, request)?;
    tx.set(COACH_JOIN_REQUESTS, &request.id.to_string(), fields);
    Ok(())
}
