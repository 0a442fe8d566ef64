use uuid::Uuid;

use crate::dao::{
    models::ScholarshipRecord,
    storage::StorageResult,
    store::{DocumentStore, Query, SortOrder, Transaction, encode},
};

/// Collection holding scholarship records.
pub const SCHOLARSHIPS: &str = "becas";

/// Typed accessor over the `becas` collection.
#[derive(Clone)]
pub struct ScholarshipRepository {
    store: DocumentStore,
}

impl ScholarshipRepository {
    /// Build a repository over the given store.
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Fetch a scholarship by id.
    pub async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<ScholarshipRecord>> {
        let document = self.store.get(SCHOLARSHIPS, &id.to_string()).await?;
        document.map(|doc| doc.decode(SCHOLARSHIPS)).transpose()
    }

    /// Fetch the ACTIVA scholarship of a player, when one exists.
    pub async fn find_active_for_player(
        &self,
        player_id: Uuid,
    ) -> StorageResult<Option<ScholarshipRecord>> {
        let documents = self
            .store
            .query(SCHOLARSHIPS, active_for_player_query(player_id))
            .await?;
        documents
            .first()
            .map(|doc| doc.decode(SCHOLARSHIPS))
            .transpose()
    }

    /// Full scholarship history of a player, newest grant first.
    pub async fn history_for_player(
        &self,
        player_id: Uuid,
    ) -> StorageResult<Vec<ScholarshipRecord>> {
        let documents = self
            .store
            .query(
                SCHOLARSHIPS,
                Query::new()
                    .filter_eq("playerId", player_id.to_string())
                    .order_by("grantedAt", SortOrder::Descending),
            )
            .await?;
        documents.iter().map(|doc| doc.decode(SCHOLARSHIPS)).collect()
    }

    /// List every ACTIVA scholarship.
    pub async fn list_active(&self) -> StorageResult<Vec<ScholarshipRecord>> {
        let documents = self
            .store
            .query(SCHOLARSHIPS, Query::new().filter_eq("status", "ACTIVA"))
            .await?;
        documents.iter().map(|doc| doc.decode(SCHOLARSHIPS)).collect()
    }
}

fn active_for_player_query(player_id: Uuid) -> Query {
    Query::new()
        .filter_eq("playerId", player_id.to_string())
        .filter_eq("status", "ACTIVA")
        .limit(1)
}

/// Read a scholarship inside a transaction.
pub async fn get_in_tx(
    tx: &mut Transaction,
    id: Uuid,
) -> StorageResult<Option<ScholarshipRecord>> {
    let document = tx.get(SCHOLARSHIPS, &id.to_string()).await?;
    document.map(|doc| doc.decode(SCHOLARSHIPS)).transpose()
}

/// Look for an ACTIVA scholarship inside a transaction.
///
/// The query result is pinned, so two grants racing for the same player
/// conflict at commit instead of both succeeding.
pub async fn find_active_for_player_in_tx(
    tx: &mut Transaction,
    player_id: Uuid,
) -> StorageResult<Option<ScholarshipRecord>> {
    let documents = tx
        .query(SCHOLARSHIPS, active_for_player_query(player_id))
        .await?;
    documents
        .first()
        .map(|doc| doc.decode(SCHOLARSHIPS))
        .transpose()
}

/// Stage a full write of the scholarship inside a transaction.
pub fn save_in_tx(tx: &mut Transaction, scholarship: &ScholarshipRecord) -> StorageResult<()> {
    let fields = encode(SCHOLARSHIPS, scholarship)?;
    tx.set(SCHOLARSHIPS, &scholarship.id.to_string(), fields);
    Ok(())
}
