use uuid::Uuid;

use crate::dao::{
    models::{CampaignKind, CampaignRecord, TicketRecord},
    storage::StorageResult,
    store::{DocumentStore, Query, SortOrder, Transaction, encode},
};

/// Typed accessor over campaign records and their fanned-out tickets.
///
/// Each [`CampaignKind`] maps to its own pair of collections; the repository
/// resolves them so callers only ever name the kind.
#[derive(Clone)]
pub struct CampaignRepository {
    store: DocumentStore,
}

impl CampaignRepository {
    /// Build a repository over the given store.
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Fetch the campaign of a given kind and year, when one exists.
    pub async fn find_campaign(
        &self,
        kind: CampaignKind,
        year: i32,
    ) -> StorageResult<Option<CampaignRecord>> {
        let collection = kind.campaign_collection();
        let documents = self
            .store
            .query(collection, Query::new().filter_eq("year", year).limit(1))
            .await?;
        documents.first().map(|doc| doc.decode(collection)).transpose()
    }

    /// Create or replace a campaign document.
    pub async fn save_campaign(&self, campaign: &CampaignRecord) -> StorageResult<()> {
        let collection = campaign.kind.campaign_collection();
        let fields = encode(collection, campaign)?;
        self.store
            .set(collection, &campaign.id.to_string(), fields)
            .await
    }

    /// Fetch a ticket by id.
    pub async fn find_ticket(
        &self,
        kind: CampaignKind,
        id: Uuid,
    ) -> StorageResult<Option<TicketRecord>> {
        let collection = kind.ticket_collection();
        let document = self.store.get(collection, &id.to_string()).await?;
        document.map(|doc| doc.decode(collection)).transpose()
    }

    /// Fetch the ticket a campaign already fanned out to an entity, if any.
    ///
    /// This is the idempotency probe: re-running a campaign skips entities
    /// that already have their ticket.
    pub async fn find_ticket_for_owner(
        &self,
        kind: CampaignKind,
        campaign_id: Uuid,
        owner_id: Uuid,
    ) -> StorageResult<Option<TicketRecord>> {
        let collection = kind.ticket_collection();
        let documents = self
            .store
            .query(
                collection,
                Query::new()
                    .filter_eq("campaignId", campaign_id.to_string())
                    .filter_eq("ownerId", owner_id.to_string())
                    .limit(1),
            )
            .await?;
        documents.first().map(|doc| doc.decode(collection)).transpose()
    }

    /// List every ticket of a kind, newest first.
    pub async fn list_tickets(&self, kind: CampaignKind) -> StorageResult<Vec<TicketRecord>> {
        let collection = kind.ticket_collection();
        let documents = self
            .store
            .query(
                collection,
                Query::new().order_by("createdAt", SortOrder::Descending),
            )
            .await?;
        documents.iter().map(|doc| doc.decode(collection)).collect()
    }

    /// List the tickets of a kind scoped to one club.
    pub async fn list_tickets_by_club(
        &self,
        kind: CampaignKind,
        club_id: Uuid,
    ) -> StorageResult<Vec<TicketRecord>> {
        let collection = kind.ticket_collection();
        let documents = self
            .store
            .query(
                collection,
                Query::new().filter_eq("clubId", club_id.to_string()),
            )
            .await?;
        documents.iter().map(|doc| doc.decode(collection)).collect()
    }

    /// List the tickets owed by one entity (player or coach), newest first.
    pub async fn list_tickets_by_owner(
        &self,
        kind: CampaignKind,
        owner_id: Uuid,
    ) -> StorageResult<Vec<TicketRecord>> {
        let collection = kind.ticket_collection();
        let documents = self
            .store
            .query(
                collection,
                Query::new()
                    .filter_eq("ownerId", owner_id.to_string())
                    .order_by("year", SortOrder::Descending),
            )
            .await?;
        documents.iter().map(|doc| doc.decode(collection)).collect()
    }
}

/// Look up a campaign inside a transaction, pinning the (kind, year) slot so
/// two concurrent creations conflict at commit.
pub async fn find_campaign_in_tx(
    tx: &mut Transaction,
    kind: CampaignKind,
    year: i32,
) -> StorageResult<Option<CampaignRecord>> {
    let collection = kind.campaign_collection();
    let documents = tx
        .query(collection, Query::new().filter_eq("year", year).limit(1))
        .await?;
    documents.first().map(|doc| doc.decode(collection)).transpose()
}

/// Stage a full write of the campaign inside a transaction.
pub fn save_campaign_in_tx(tx: &mut Transaction, campaign: &CampaignRecord) -> StorageResult<()> {
    let collection = campaign.kind.campaign_collection();
    let fields = encode(collection, campaign)?;
    tx.set(collection, &campaign.id.to_string(), fields);
    Ok(())
}

/// Read a ticket inside a transaction.
pub async fn get_ticket_in_tx(
    tx: &mut Transaction,
    kind: CampaignKind,
    id: Uuid,
) -> StorageResult<Option<TicketRecord>> {
    let collection = kind.ticket_collection();
    let document = tx.get(collection, &id.to_string()).await?;
    document.map(|doc| doc.decode(collection)).transpose()
}

/// Stage a full write of the ticket inside a transaction.
pub fn save_ticket_in_tx(tx: &mut Transaction, ticket: &TicketRecord) -> StorageResult<()> {
    let collection = ticket.kind.ticket_collection();
    let fields = encode(collection, ticket)?;
    tx.set(collection, &ticket.id.to_string(), fields);
    Ok(())
}
