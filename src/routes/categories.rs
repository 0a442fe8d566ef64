use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::{
    dao::categories::CategoryRepository,
    dto::categories::CategorySummary,
    error::AppError,
    state::SharedState,
};

/// Gender filter for category listings.
#[derive(Debug, Deserialize)]
pub struct CategoryListQuery {
    /// Gender bracket to filter on.
    pub genero: Option<String>,
}

/// Routes serving the playing categories.
pub fn router() -> Router<SharedState> {
    Router::new().route("/categorias", get(list_categories))
}

/// List the playing categories, ordered by name.
#[utoipa::path(
    get,
    path = "/categorias",
    tag = "categories",
    params(("genero" = Option<String>, Query, description = "Gender bracket filter")),
    responses((status = 200, description = "Categories", body = [CategorySummary]))
)]
pub async fn list_categories(
    State(state): State<SharedState>,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<Vec<CategorySummary>>, AppError> {
    let categories = CategoryRepository::new(state.store().clone())
        .list(query.genero.as_deref())
        .await
        .map_err(|err| AppError::from(crate::error::WorkflowError::from(err)))?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}
