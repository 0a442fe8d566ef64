use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use futures::future::BoxFuture;
use serde::{Serialize, de::DeserializeOwned, ser::Error as _};
use serde_json::Value;

use crate::dao::storage::{MAX_BATCH_OPERATIONS, StorageError, StorageResult};

/// Field map of a stored document.
pub type Fields = serde_json::Map<String, Value>;

/// How many times a conflicting transaction closure is re-run before giving up.
const MAX_TRANSACTION_ATTEMPTS: u32 = 5;

/// A document as returned by reads: its identifier plus the raw field map.
#[derive(Debug, Clone)]
pub struct Document {
    /// Identifier of the document within its collection.
    pub id: String,
    /// Raw stored fields.
    pub fields: Fields,
}

impl Document {
    /// Decode the field map into a typed record.
    pub fn decode<T: DeserializeOwned>(&self, collection: &str) -> StorageResult<T> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|source| StorageError::codec(collection, source))
    }
}

/// Encode a typed record into the field map persisted by the store.
pub fn encode<T: Serialize>(collection: &str, value: &T) -> StorageResult<Fields> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StorageError::codec(
            collection,
            serde_json::Error::custom("record did not serialize to an object"),
        )),
        Err(source) => Err(StorageError::codec(collection, source)),
    }
}

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest value first.
    Ascending,
    /// Largest value first.
    Descending,
}

/// Predicate applied to a top-level document field.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Field equals the given value.
    Eq(&'static str, Value),
    /// Field equals one of the given values.
    In(&'static str, Vec<Value>),
}

/// Declarative query over one collection: conjunction of field predicates,
/// optional ordering and an optional result cap.
#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<Filter>,
    order_by: Option<(&'static str, SortOrder)>,
    limit: Option<usize>,
}

impl Query {
    /// Start an empty query matching every document of a collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`.
    pub fn filter_eq(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(field, value.into()));
        self
    }

    /// Require `field` to equal one of `values`.
    pub fn filter_in<V: Into<Value>>(
        mut self,
        field: &'static str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.filters
            .push(Filter::In(field, values.into_iter().map(Into::into).collect()));
        self
    }

    /// Sort results by `field`.
    pub fn order_by(mut self, field: &'static str, order: SortOrder) -> Self {
        self.order_by = Some((field, order));
        self
    }

    /// Return at most `limit` documents.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A single buffered write, shared by batches and transactions.
#[derive(Debug, Clone)]
enum Write {
    Set {
        collection: &'static str,
        id: String,
        fields: Fields,
    },
    Update {
        collection: &'static str,
        id: String,
        patch: Fields,
    },
    Delete {
        collection: &'static str,
        id: String,
    },
}

#[derive(Debug, Clone)]
struct Versioned {
    version: u64,
    fields: Fields,
}

#[derive(Debug, Default)]
struct StoreState {
    collections: HashMap<String, HashMap<String, Versioned>>,
}

impl StoreState {
    fn lookup(&self, collection: &str, id: &str) -> Option<&Versioned> {
        self.collections.get(collection)?.get(id)
    }

    /// Evaluate a query, returning matches ordered deterministically (the
    /// requested order, or ascending id when none was given) so result
    /// fingerprints are stable across evaluations.
    fn evaluate<'a>(&'a self, collection: &str, query: &Query) -> Vec<(&'a String, &'a Versioned)> {
        let Some(documents) = self.collections.get(collection) else {
            return Vec::new();
        };

        let mut matches: Vec<(&String, &Versioned)> = documents
            .iter()
            .filter(|(_, doc)| query.filters.iter().all(|f| filter_matches(&doc.fields, f)))
            .collect();

        match query.order_by {
            Some((field, order)) => matches.sort_by(|(a_id, a), (b_id, b)| {
                let av = a.fields.get(field).unwrap_or(&Value::Null);
                let bv = b.fields.get(field).unwrap_or(&Value::Null);
                let ordering = compare_values(av, bv).then_with(|| a_id.cmp(b_id));
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            }),
            None => matches.sort_by(|(a_id, _), (b_id, _)| a_id.cmp(b_id)),
        }

        if let Some(limit) = query.limit {
            matches.truncate(limit);
        }

        matches
    }

    /// Reject the write set if any `update` targets a missing document, so a
    /// failed batch or transaction leaves no partial effect behind.
    fn check_updates(&self, writes: &[Write]) -> StorageResult<()> {
        for write in writes {
            if let Write::Update { collection, id, .. } = write {
                if self.lookup(collection, id).is_none() {
                    return Err(StorageError::not_found(collection, id));
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, writes: Vec<Write>) {
        for write in writes {
            match write {
                Write::Set {
                    collection,
                    id,
                    fields,
                } => {
                    let documents = self.collections.entry(collection.to_owned()).or_default();
                    let version = documents.get(&id).map_or(1, |doc| doc.version + 1);
                    documents.insert(id, Versioned { version, fields });
                }
                Write::Update {
                    collection,
                    id,
                    patch,
                } => {
                    // Existence was validated by `check_updates`.
                    if let Some(doc) = self
                        .collections
                        .get_mut(collection)
                        .and_then(|documents| documents.get_mut(&id))
                    {
                        for (key, value) in patch {
                            doc.fields.insert(key, value);
                        }
                        doc.version += 1;
                    }
                }
                Write::Delete { collection, id } => {
                    if let Some(documents) = self.collections.get_mut(collection) {
                        documents.remove(&id);
                    }
                }
            }
        }
    }
}

fn filter_matches(fields: &Fields, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(field, expected) => fields.get(*field) == Some(expected),
        Filter::In(field, options) => fields
            .get(*field)
            .is_some_and(|value| options.contains(value)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or(f64::MAX)
            .partial_cmp(&y.as_f64().unwrap_or(f64::MAX))
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

struct DocRead {
    collection: &'static str,
    id: String,
    version: Option<u64>,
}

struct QueryRead {
    collection: &'static str,
    query: Query,
    fingerprint: Vec<(String, u64)>,
}

/// Handle passed to a transaction closure.
///
/// Reads (`get`/`query`) observe the committed state and are recorded in a
/// read set; writes are staged and only become visible when the whole
/// transaction commits. Commit validates every recorded read, including
/// query result sets (so a concurrently inserted match conflicts too), and
/// the closure is re-run when validation fails. Reads should happen before
/// staged writes; staged writes are not visible to reads of the same
/// transaction.
pub struct Transaction {
    state: Arc<Mutex<StoreState>>,
    doc_reads: Vec<DocRead>,
    query_reads: Vec<QueryRead>,
    writes: Vec<Write>,
}

impl Transaction {
    fn new(state: Arc<Mutex<StoreState>>) -> Self {
        Self {
            state,
            doc_reads: Vec::new(),
            query_reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    fn locked(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("document store mutex poisoned")
    }

    /// Read a single document inside the transaction.
    pub async fn get(
        &mut self,
        collection: &'static str,
        id: &str,
    ) -> StorageResult<Option<Document>> {
        let document = {
            let state = self.locked();
            state.lookup(collection, id).cloned()
        };

        self.doc_reads.push(DocRead {
            collection,
            id: id.to_owned(),
            version: document.as_ref().map(|doc| doc.version),
        });

        Ok(document.map(|doc| Document {
            id: id.to_owned(),
            fields: doc.fields,
        }))
    }

    /// Run a query inside the transaction, pinning its result set.
    pub async fn query(
        &mut self,
        collection: &'static str,
        query: Query,
    ) -> StorageResult<Vec<Document>> {
        let (fingerprint, documents) = {
            let state = self.locked();
            let matches = state.evaluate(collection, &query);
            let fingerprint = matches
                .iter()
                .map(|(id, doc)| ((*id).clone(), doc.version))
                .collect();
            let documents = matches
                .into_iter()
                .map(|(id, doc)| Document {
                    id: id.clone(),
                    fields: doc.fields.clone(),
                })
                .collect();
            (fingerprint, documents)
        };

        self.query_reads.push(QueryRead {
            collection,
            query,
            fingerprint,
        });

        Ok(documents)
    }

    /// Stage a create-or-replace write.
    pub fn set(&mut self, collection: &'static str, id: &str, fields: Fields) {
        self.writes.push(Write::Set {
            collection,
            id: id.to_owned(),
            fields,
        });
    }

    /// Stage a shallow field merge; commit fails if the document is absent.
    pub fn update(&mut self, collection: &'static str, id: &str, patch: Fields) {
        self.writes.push(Write::Update {
            collection,
            id: id.to_owned(),
            patch,
        });
    }

    /// Stage a delete (a no-op when the document is already absent).
    pub fn delete(&mut self, collection: &'static str, id: &str) {
        self.writes.push(Write::Delete {
            collection,
            id: id.to_owned(),
        });
    }
}

/// Buffered writes committed atomically, outside any transaction.
///
/// Unlike transactions a batch carries no read set, so it never conflicts;
/// it exists for fan-out writes and is capped at [`MAX_BATCH_OPERATIONS`].
pub struct WriteBatch {
    state: Arc<Mutex<StoreState>>,
    writes: Vec<Write>,
}

impl WriteBatch {
    /// Buffer a create-or-replace write.
    pub fn set(&mut self, collection: &'static str, id: &str, fields: Fields) {
        self.writes.push(Write::Set {
            collection,
            id: id.to_owned(),
            fields,
        });
    }

    /// Buffer a shallow field merge; commit fails if the document is absent.
    pub fn update(&mut self, collection: &'static str, id: &str, patch: Fields) {
        self.writes.push(Write::Update {
            collection,
            id: id.to_owned(),
            patch,
        });
    }

    /// Buffer a delete.
    pub fn delete(&mut self, collection: &'static str, id: &str) {
        self.writes.push(Write::Delete {
            collection,
            id: id.to_owned(),
        });
    }

    /// Number of buffered operations.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Whether the batch carries no operations.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Commit every buffered write atomically.
    pub async fn commit(self) -> StorageResult<()> {
        if self.writes.len() > MAX_BATCH_OPERATIONS {
            return Err(StorageError::BatchTooLarge {
                size: self.writes.len(),
                limit: MAX_BATCH_OPERATIONS,
            });
        }

        let mut state = self.state.lock().expect("document store mutex poisoned");
        state.check_updates(&self.writes)?;
        state.apply(self.writes);
        Ok(())
    }
}

/// Adapter over the transactional key-document store backing the application.
///
/// Collections are flat maps from string ids to field maps; every mutation
/// path offered by the managed database is mirrored here: point reads,
/// predicate queries, direct writes, atomic batches and optimistic
/// transactions with automatic retry on conflicting commits.
#[derive(Clone, Default)]
pub struct DocumentStore {
    state: Arc<Mutex<StoreState>>,
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("document store mutex poisoned")
    }

    /// Fetch a document by id.
    pub async fn get(
        &self,
        collection: &'static str,
        id: &str,
    ) -> StorageResult<Option<Document>> {
        let state = self.locked();
        Ok(state.lookup(collection, id).map(|doc| Document {
            id: id.to_owned(),
            fields: doc.fields.clone(),
        }))
    }

    /// Run a query against a collection.
    pub async fn query(
        &self,
        collection: &'static str,
        query: Query,
    ) -> StorageResult<Vec<Document>> {
        let state = self.locked();
        Ok(state
            .evaluate(collection, &query)
            .into_iter()
            .map(|(id, doc)| Document {
                id: id.clone(),
                fields: doc.fields.clone(),
            })
            .collect())
    }

    /// Create or replace a document.
    pub async fn set(
        &self,
        collection: &'static str,
        id: &str,
        fields: Fields,
    ) -> StorageResult<()> {
        let mut state = self.locked();
        state.apply(vec![Write::Set {
            collection,
            id: id.to_owned(),
            fields,
        }]);
        Ok(())
    }

    /// Shallow-merge fields into an existing document.
    pub async fn update(
        &self,
        collection: &'static str,
        id: &str,
        patch: Fields,
    ) -> StorageResult<()> {
        let mut state = self.locked();
        let write = Write::Update {
            collection,
            id: id.to_owned(),
            patch,
        };
        state.check_updates(std::slice::from_ref(&write))?;
        state.apply(vec![write]);
        Ok(())
    }

    /// Remove a document; removing an absent document is a no-op.
    pub async fn delete(&self, collection: &'static str, id: &str) -> StorageResult<()> {
        let mut state = self.locked();
        state.apply(vec![Write::Delete {
            collection,
            id: id.to_owned(),
        }]);
        Ok(())
    }

    /// Start an atomic write batch.
    pub fn batch(&self) -> WriteBatch {
        WriteBatch {
            state: self.state.clone(),
            writes: Vec::new(),
        }
    }

    /// Run `op` inside an optimistic transaction.
    ///
    /// The closure may be invoked several times: whenever the commit detects
    /// that a document or query result it read has changed underneath it, the
    /// staged writes are discarded and the closure re-runs against fresh
    /// state. An `Err` from the closure aborts the transaction without
    /// writing anything.
    pub async fn run_transaction<T, E, F>(&self, mut op: F) -> Result<T, E>
    where
        E: From<StorageError>,
        F: for<'t> FnMut(&'t mut Transaction) -> BoxFuture<'t, Result<T, E>>,
    {
        for _ in 0..MAX_TRANSACTION_ATTEMPTS {
            let mut tx = Transaction::new(self.state.clone());
            let value = op(&mut tx).await?;
            if self.try_commit(tx)? {
                return Ok(value);
            }
        }

        Err(StorageError::TransactionContention {
            attempts: MAX_TRANSACTION_ATTEMPTS,
        }
        .into())
    }

    /// Validate the transaction read set and apply its writes.
    ///
    /// Returns `Ok(false)` on a conflict that warrants a retry.
    fn try_commit(&self, tx: Transaction) -> StorageResult<bool> {
        let mut state = self.locked();

        for read in &tx.doc_reads {
            let current = state
                .lookup(read.collection, &read.id)
                .map(|doc| doc.version);
            if current != read.version {
                return Ok(false);
            }
        }

        for read in &tx.query_reads {
            let current: Vec<(String, u64)> = state
                .evaluate(read.collection, &read.query)
                .into_iter()
                .map(|(id, doc)| (id.clone(), doc.version))
                .collect();
            if current != read.fingerprint {
                return Ok(false);
            }
        }

        state.check_updates(&tx.writes)?;
        state.apply(tx.writes);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let store = DocumentStore::new();
        store
            .set("clubes", "c1", fields(json!({"name": "Muni", "city": "San Juan"})))
            .await
            .unwrap();

        let doc = store.get("clubes", "c1").await.unwrap().unwrap();
        assert_eq!(doc.fields.get("name"), Some(&json!("Muni")));
        assert!(store.get("clubes", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_missing_document_fails() {
        let store = DocumentStore::new();
        let err = store
            .update("clubes", "ghost", fields(json!({"city": "Rawson"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DocumentNotFound { .. }));
    }

    #[tokio::test]
    async fn query_applies_filters_order_and_limit() {
        let store = DocumentStore::new();
        for (id, year, status) in [("t1", 2024, "pendiente"), ("t2", 2025, "pendiente"), ("t3", 2025, "pagado")] {
            store
                .set("tickets", id, fields(json!({"year": year, "status": status})))
                .await
                .unwrap();
        }

        let pending = store
            .query(
                "tickets",
                Query::new()
                    .filter_eq("status", "pendiente")
                    .order_by("year", SortOrder::Descending),
            )
            .await
            .unwrap();
        assert_eq!(
            pending.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            ["t2", "t1"]
        );

        let by_membership = store
            .query(
                "tickets",
                Query::new().filter_in("status", ["pagado", "anulado"]).limit(5),
            )
            .await
            .unwrap();
        assert_eq!(by_membership.len(), 1);
        assert_eq!(by_membership[0].id, "t3");
    }

    #[tokio::test]
    async fn batch_commits_atomically_and_enforces_the_cap() {
        let store = DocumentStore::new();

        let mut batch = store.batch();
        for index in 0..=MAX_BATCH_OPERATIONS {
            batch.set("tickets", &format!("t{index}"), fields(json!({"i": index})));
        }
        let err = batch.commit().await.unwrap_err();
        assert!(matches!(err, StorageError::BatchTooLarge { .. }));
        assert!(store.get("tickets", "t0").await.unwrap().is_none());

        // An update against a missing document aborts the whole batch.
        let mut batch = store.batch();
        batch.set("tickets", "t0", fields(json!({"i": 0})));
        batch.update("tickets", "ghost", fields(json!({"i": 1})));
        assert!(batch.commit().await.is_err());
        assert!(store.get("tickets", "t0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transaction_retries_after_conflicting_write() {
        let store = DocumentStore::new();
        store
            .set("counters", "c", fields(json!({"value": 0})))
            .await
            .unwrap();

        let mut attempts = 0u32;
        store
            .run_transaction::<_, StorageError, _>(|tx| {
                attempts += 1;
                let store = store.clone();
                let first_attempt = attempts == 1;
                Box::pin(async move {
                    let doc = tx.get("counters", "c").await?.expect("counter exists");
                    let value = doc.fields.get("value").and_then(Value::as_i64).unwrap_or(0);

                    if first_attempt {
                        // Concurrent writer slips in after our read.
                        store
                            .set("counters", "c", fields(json!({"value": 100})))
                            .await?;
                    }

                    tx.set("counters", "c", fields(json!({"value": value + 1})));
                    Ok(())
                })
            })
            .await
            .unwrap();

        assert_eq!(attempts, 2);
        let doc = store.get("counters", "c").await.unwrap().unwrap();
        // The retry observed the concurrent write instead of clobbering it.
        assert_eq!(doc.fields.get("value"), Some(&json!(101)));
    }

    #[tokio::test]
    async fn transaction_detects_phantom_query_results() {
        let store = DocumentStore::new();

        let mut attempts = 0u32;
        let matches_seen = store
            .run_transaction::<_, StorageError, _>(|tx| {
                attempts += 1;
                let store = store.clone();
                let first_attempt = attempts == 1;
                Box::pin(async move {
                    let active = tx
                        .query("becas", Query::new().filter_eq("status", "ACTIVA"))
                        .await?;

                    if first_attempt {
                        store
                            .set("becas", "b1", fields(json!({"status": "ACTIVA"})))
                            .await?;
                    }

                    tx.set("becas", "b2", fields(json!({"status": "ACTIVA"})));
                    Ok(active.len())
                })
            })
            .await
            .unwrap();

        // First attempt saw none, conflicted on the phantom insert, and the
        // retry observed the concurrently created document.
        assert_eq!(attempts, 2);
        assert_eq!(matches_seen, 1);
    }

    #[tokio::test]
    async fn failed_closure_leaves_no_writes_behind() {
        let store = DocumentStore::new();
        let result: Result<(), StorageError> = store
            .run_transaction(|tx| {
                Box::pin(async move {
                    tx.set("clubes", "c1", Fields::new());
                    Err(StorageError::not_found("clubes", "elsewhere"))
                })
            })
            .await;

        assert!(result.is_err());
        assert!(store.get("clubes", "c1").await.unwrap().is_none());
    }
}
