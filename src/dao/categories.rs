use crate::dao::{
    models::CategoryRecord,
    storage::StorageResult,
    store::{DocumentStore, Query, SortOrder},
};

/// Collection holding the playing categories.
pub const CATEGORIES: &str = "categorias";

/// Typed accessor over the `categorias` collection.
#[derive(Clone)]
pub struct CategoryRepository {
    store: DocumentStore,
}

impl CategoryRepository {
    /// Build a repository over the given store.
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// List categories ordered by name, optionally filtered by gender.
    pub async fn list(&self, gender: Option<&str>) -> StorageResult<Vec<CategoryRecord>> {
        let mut query = Query::new().order_by("name", SortOrder::Ascending);
        if let Some(gender) = gender {
            query = query.filter_eq("gender", gender);
        }

        let documents = self.store.query(CATEGORIES, query).await?;
        documents.iter().map(|doc| doc.decode(CATEGORIES)).collect()
    }
}
