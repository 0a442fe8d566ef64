use axum::Router;

use crate::state::SharedState;

/// Federation-admin routes.
pub mod asambal;
/// Authentication routes.
pub mod auth;
/// Playing category routes.
pub mod categories;
/// Club routes.
pub mod clubs;
/// Coach routes.
pub mod coaches;
/// OpenAPI documentation routes.
pub mod docs;
/// Health routes.
pub mod health;
/// Player routes.
pub mod players;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(auth::router())
        .merge(clubs::router())
        .merge(coaches::router())
        .merge(players::router())
        .merge(asambal::router())
        .merge(categories::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
