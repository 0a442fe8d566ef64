use uuid::Uuid;

use crate::dao::{
    models::PlayerRecord,
    storage::StorageResult,
    store::{DocumentStore, Query, Transaction, encode},
};
use crate::domain::membership::membership_for;

/// Collection holding player profiles, keyed by owning user id.
pub const PLAYERS: &str = "jugadores";

/// Typed accessor over the `jugadores` collection.
#[derive(Clone)]
pub struct PlayerRepository {
    store: DocumentStore,
}

impl PlayerRepository {
    /// Build a repository over the given store.
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Fetch a player by id (identical to the owning user id).
    pub async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<PlayerRecord>> {
        let document = self.store.get(PLAYERS, &id.to_string()).await?;
        document.map(|doc| doc.decode(PLAYERS)).transpose()
    }

    /// Fetch a player by contact email.
    pub async fn find_by_email(&self, email: &str) -> StorageResult<Option<PlayerRecord>> {
        let documents = self
            .store
            .query(PLAYERS, Query::new().filter_eq("email", email).limit(1))
            .await?;
        documents.first().map(|doc| doc.decode(PLAYERS)).transpose()
    }

    /// List every player.
    pub async fn list_all(&self) -> StorageResult<Vec<PlayerRecord>> {
        let documents = self.store.query(PLAYERS, Query::new()).await?;
        documents.iter().map(|doc| doc.decode(PLAYERS)).collect()
    }

    /// List the players registered by a coach.
    pub async fn list_by_coach(&self, coach_id: Uuid) -> StorageResult<Vec<PlayerRecord>> {
        let documents = self
            .store
            .query(
                PLAYERS,
                Query::new().filter_eq("coachId", coach_id.to_string()),
            )
            .await?;
        documents.iter().map(|doc| doc.decode(PLAYERS)).collect()
    }

    /// List players holding a membership entry for the given club.
    ///
    /// Membership lives inside an array field, so the club filter is applied
    /// on the decoded records.
    pub async fn list_by_club(&self, club_id: Uuid) -> StorageResult<Vec<PlayerRecord>> {
        let mut players = self.list_all().await?;
        players.retain(|player| membership_for(&player.clubs, club_id).is_some());
        Ok(players)
    }

    /// Create or replace a player document.
    pub async fn save(&self, player: &PlayerRecord) -> StorageResult<()> {
        let fields = encode(PLAYERS, player)?;
        self.store.set(PLAYERS, &player.id.to_string(), fields).await
    }
}

/// Read a player inside a transaction.
pub async fn get_in_tx(tx: &mut Transaction, id: Uuid) -> StorageResult<Option<PlayerRecord>> {
    let document = tx.get(PLAYERS, &id.to_string()).await?;
    document.map(|doc| doc.decode(PLAYERS)).transpose()
}

/// List every player inside a transaction (used by club-wide cascades).
pub async fn list_in_tx(tx: &mut Transaction) -> StorageResult<Vec<PlayerRecord>> {
    let documents = tx.query(PLAYERS, Query::new()).await?;
    documents.iter().map(|doc| doc.decode(PLAYERS)).collect()
}

/// Stage a full write of the player inside a transaction.
pub fn save_in_tx(tx: &mut Transaction, player: &PlayerRecord) -> StorageResult<()> {
    let fields = encode(PLAYERS, player)?;
    tx.set(PLAYERS, &player.id.to_string(), fields);
    Ok(())
}
