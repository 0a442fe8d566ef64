use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::CategoryRecord;

/// A playing category as listed to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategorySummary {
    /// Category id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Gender bracket.
    pub gender: String,
}

impl From<CategoryRecord> for CategorySummary {
    fn from(category: CategoryRecord) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name,
            gender: category.gender,
        }
    }
}
