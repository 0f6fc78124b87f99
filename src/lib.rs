//! Scanstock API Library
//!
//! Barcode-driven inventory tracking: an item catalog, per-item on-hand
//! counts, an append-only stock event log, and the scan session that drives
//! them from a handheld scanner.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod scan;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::services::{catalog::CatalogService, search::SearchService, stock::StockService};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub catalog: CatalogService,
    pub stock: StockService,
    pub search: SearchService,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let catalog = CatalogService::new(db.clone(), event_sender.clone());
        let stock = StockService::new(db.clone(), event_sender.clone());
        let search = SearchService::new(db.clone());
        Self {
            db,
            config,
            event_sender,
            catalog,
            stock,
            search,
        }
    }
}

/// Build the full application router: API routes, swagger UI, tracing and
/// request timeout layers.
pub fn app_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    Router::new()
        .merge(handlers::routes())
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}
