use uuid::Uuid;

use crate::dao::{
    models::ClubRecord,
    storage::StorageResult,
    store::{DocumentStore, Query, Transaction, encode},
};

/// Collection holding club records.
pub const CLUBS: &str = "clubes";

/// Typed accessor over the `clubes` collection.
#[derive(Clone)]
pub struct ClubRepository {
    store: DocumentStore,
}

impl ClubRepository {
    /// Build a repository over the given store.
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Fetch a club by id.
    pub async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<ClubRecord>> {
        let document = self.store.get(CLUBS, &id.to_string()).await?;
        document.map(|doc| doc.decode(CLUBS)).transpose()
    }

    /// List every club.
    pub async fn list_all(&self) -> StorageResult<Vec<ClubRecord>> {
        let documents = self.store.query(CLUBS, Query::new()).await?;
        documents.iter().map(|doc| doc.decode(CLUBS)).collect()
    }

    /// Create or replace a club document.
    pub async fn save(&self, club: &ClubRecord) -> StorageResult<()> {
        let fields = encode(CLUBS, club)?;
        self.store.set(CLUBS, &club.id.to_string(), fields).await
    }
}

/// Read a club inside a transaction.
pub async fn get_in_tx(tx: &mut Transaction, id: Uuid) -> StorageResult<Option<ClubRecord>> {
    let document = tx.get(CLUBS, &id.to_string()).await?;
    document.map(|doc| doc.decode(CLUBS)).transpose()
}

/// Stage a full write of the club inside a transaction.
pub fn save_in_tx(tx: &mut Transaction, club: &ClubRecord) -> StorageResult<()> {
    let fields = encode(CLUBS, club)?;
    tx.set(CLUBS, &club.id.to_string(), fields);
    Ok(())
}
