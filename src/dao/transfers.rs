use uuid::Uuid;

use crate::dao::{
    models::TransferRequestRecord,
    storage::StorageResult,
    store::{DocumentStore, Query, SortOrder, Transaction, encode},
};
use crate::domain::transfer::TransferStatus;

/// Collection holding transfer requests.
pub const TRANSFER_REQUESTS: &str = "transferRequests";

/// Typed accessor over the `transferRequests` collection.
#[derive(Clone)]
pub struct TransferRepository {
    store: DocumentStore,
}

impl TransferRepository {
    /// Build a repository over the given store.
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Fetch a transfer request by id.
    pub async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<TransferRequestRecord>> {
        let document = self.store.get(TRANSFER_REQUESTS, &id.to_string()).await?;
        document.map(|doc| doc.decode(TRANSFER_REQUESTS)).transpose()
    }

    /// Fetch the open (non-terminal) request of a player, when one exists.
    pub async fn find_open_for_player(
        &self,
        player_id: Uuid,
    ) -> StorageResult<Option<TransferRequestRecord>> {
        let documents = self
            .store
            .query(TRANSFER_REQUESTS, open_for_player_query(player_id))
            .await?;
        documents
            .first()
            .map(|doc| doc.decode(TRANSFER_REQUESTS))
            .transpose()
    }

    /// List requests currently sitting at a given stage, newest first.
    pub async fn list_by_status(
        &self,
        status: TransferStatus,
    ) -> StorageResult<Vec<TransferRequestRecord>> {
        let status_value = serde_json::to_value(status)
            .map_err(|source| crate::dao::storage::StorageError::codec(TRANSFER_REQUESTS, source))?;
        let documents = self
            .store
            .query(
                TRANSFER_REQUESTS,
                Query::new()
                    .filter_eq("status", status_value)
                    .order_by("createdAt", SortOrder::Descending),
            )
            .await?;
        documents
            .iter()
            .map(|doc| doc.decode(TRANSFER_REQUESTS))
            .collect()
    }

    /// List every request that involves a player, newest first.
    pub async fn list_for_player(
        &self,
        player_id: Uuid,
    ) -> StorageResult<Vec<TransferRequestRecord>> {
        let documents = self
            .store
            .query(
                TRANSFER_REQUESTS,
                Query::new()
                    .filter_eq("playerId", player_id.to_string())
                    .order_by("createdAt", SortOrder::Descending),
            )
            .await?;
        documents
            .iter()
            .map(|doc| doc.decode(TRANSFER_REQUESTS))
            .collect()
    }

    /// Create or replace a transfer request document.
    pub async fn save(&self, request: &TransferRequestRecord) -> StorageResult<()> {
        let fields = encode(TRANSFER_REQUESTS, request)?;
        self.store
            .set(TRANSFER_REQUESTS, &request.id.to_string(), fields)
            .await
    }
}

fn open_for_player_query(player_id: Uuid) -> Query {
    Query::new()
        .filter_eq("playerId", player_id.to_string())
        .filter_in("status", TransferStatus::open_wire_names())
        .limit(1)
}

/// Read a transfer request inside a transaction.
pub async fn get_in_tx(
    tx: &mut Transaction,
    id: Uuid,
) -> StorageResult<Option<TransferRequestRecord>> {
    let document = tx.get(TRANSFER_REQUESTS, &id.to_string()).await?;
    document.map(|doc| doc.decode(TRANSFER_REQUESTS)).transpose()
}

/// Look for an open request inside a transaction, pinning the result so two
/// racing requests for the same player conflict at commit.
pub async fn find_open_for_player_in_tx(
    tx: &mut Transaction,
    player_id: Uuid,
) -> StorageResult<Option<TransferRequestRecord>> {
    let documents = tx
        .query(TRANSFER_REQUESTS, open_for_player_query(player_id))
        .await?;
    documents
        .first()
        .map(|doc| doc.decode(TRANSFER_REQUESTS))
        .transpose()
}

/// Stage a full write of the transfer request inside a transaction.
pub fn save_in_tx(tx: &mut Transaction, request: &TransferRequestRecord) -> StorageResult<()> {
    let fields = encode(TRANSFER_REQUESTS, request)?;
    tx.set(TRANSFER_REQUESTS, &request.id.to_string(), fields);
    Ok(())
}
