use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::ErrorResponse;
use crate::handlers::health::{ComponentHealth, ComponentStatus, HealthResponse};
use crate::handlers::inventory::{
    AddResponse, BarcodeRequest, ConfirmRemoveRequest, ConfirmRemoveResponse,
    InitiateRemoveResponse, RemovalStatus, StockEventResponse,
};
use crate::handlers::items::{ItemResponse, UpsertItemRequest};
use crate::services::search::{FacetValue, SearchHit};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ScanStock API",
        version = "0.1.0",
        description = "Barcode-driven inventory tracker: catalog upsert, filtered search with facets, and a two-step remove workflow over an on-hand ledger."
    ),
    paths(
        crate::handlers::items::get_item,
        crate::handlers::items::upsert_item,
        crate::handlers::items::search_items,
        crate::handlers::items::distinct_values,
        crate::handlers::inventory::add_one,
        crate::handlers::inventory::initiate_remove,
        crate::handlers::inventory::confirm_remove,
        crate::handlers::health::health_check,
    ),
    components(schemas(
        ErrorResponse,
        ItemResponse,
        UpsertItemRequest,
        SearchHit,
        FacetValue,
        BarcodeRequest,
        ConfirmRemoveRequest,
        StockEventResponse,
        RemovalStatus,
        AddResponse,
        InitiateRemoveResponse,
        ConfirmRemoveResponse,
        HealthResponse,
        ComponentHealth,
        ComponentStatus,
    )),
    tags(
        (name = "items", description = "Catalog reads, writes, search, and facets"),
        (name = "inventory", description = "On-hand ledger mutations"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
