pub mod health;
pub mod inventory;
pub mod items;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

/// Binds the HTTP surface: catalog reads/writes, search + facets, the
/// add/remove-initiate/remove-confirm mutation endpoints, and liveness.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/items", post(items::upsert_item))
        .route("/items/search", get(items::search_items))
        .route("/items/distinct", get(items::distinct_values))
        .route("/items/:code", get(items::get_item))
        .route("/inventory/add", post(inventory::add_one))
        .route("/inventory/remove/initiate", post(inventory::initiate_remove))
        .route("/inventory/remove/confirm", post(inventory::confirm_remove))
}
