use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::item,
    errors::ServiceError,
    services::{
        catalog::UpsertItem,
        search::{FilterField, SearchQuery},
    },
    AppState,
};

/// Catalog record as returned to HTTP callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: Uuid,
    pub scanned_code: String,
    pub model: String,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub purchased_from: Option<String>,
    pub sold_order_reference: Option<String>,
    pub paint_thickness: Option<Decimal>,
    pub price: Option<Decimal>,
    pub quantity_note: Option<i32>,
    pub inventoried_at: DateTime<Utc>,
}

impl From<item::Model> for ItemResponse {
    fn from(model: item::Model) -> Self {
        Self {
            id: model.id,
            scanned_code: model.scanned_code,
            model: model.model,
            brand: model.brand,
            size: model.size,
            color: model.color,
            notes: model.notes,
            purchased_from: model.purchased_from,
            sold_order_reference: model.sold_order_reference,
            paint_thickness: model.paint_thickness,
            price: model.price,
            quantity_note: model.quantity_note,
            inventoried_at: model.inventoried_at,
        }
    }
}

/// Create/upsert payload. Aliases accept the PascalCase field names emitted
/// by older scanner clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertItemRequest {
    #[serde(alias = "ScannedCode")]
    pub scanned_code: Option<String>,
    #[serde(alias = "Model")]
    pub model: Option<String>,
    #[serde(alias = "Brand")]
    pub brand: Option<String>,
    #[serde(alias = "Size")]
    pub size: Option<String>,
    #[serde(alias = "Color")]
    pub color: Option<String>,
    #[serde(alias = "Notes")]
    pub notes: Option<String>,
    #[serde(alias = "PurchasedFrom")]
    pub purchased_from: Option<String>,
    #[serde(alias = "SoldOrderReference")]
    pub sold_order_reference: Option<String>,
    #[serde(alias = "PaintThickness")]
    pub paint_thickness: Option<Decimal>,
    #[serde(alias = "Price")]
    pub price: Option<Decimal>,
    #[serde(alias = "QuantityNote")]
    pub quantity_note: Option<i32>,
    #[serde(alias = "InventoriedAt")]
    pub inventoried_at: Option<DateTime<Utc>>,
}

/// Fetch a single item by its scan code.
#[utoipa::path(
    get,
    path = "/items/{code}",
    params(("code" = String, Path, description = "Scan code")),
    responses(
        (status = 200, description = "Item returned", body = ItemResponse),
        (status = 404, description = "Unknown scan code", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.catalog.get_by_code(&code).await?;
    Ok(Json(ItemResponse::from(item)))
}

/// Create or merge an item by scan code.
#[utoipa::path(
    post,
    path = "/items",
    request_body = UpsertItemRequest,
    responses(
        (status = 201, description = "Item created or merged", body = ItemResponse),
        (status = 400, description = "Missing required fields", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn upsert_item(
    State(state): State<AppState>,
    Json(payload): Json<UpsertItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut missing = Vec::new();
    if payload.scanned_code.as_deref().map_or(true, |s| s.trim().is_empty()) {
        missing.push("scanned_code");
    }
    if payload.model.as_deref().map_or(true, |s| s.trim().is_empty()) {
        missing.push("model");
    }
    if !missing.is_empty() {
        return Err(ServiceError::MissingFields(missing.join(", ")));
    }

    let input = UpsertItem {
        scanned_code: payload.scanned_code.unwrap_or_default(),
        model: payload.model.unwrap_or_default(),
        brand: payload.brand,
        size: payload.size,
        color: payload.color,
        notes: payload.notes,
        purchased_from: payload.purchased_from,
        sold_order_reference: payload.sold_order_reference,
        paint_thickness: payload.paint_thickness,
        price: payload.price,
        quantity_note: payload.quantity_note,
        inventoried_at: payload.inventoried_at,
    };

    let (item, _created) = state.catalog.upsert(input).await?;
    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

/// Filtered search. `q` is free text; any other query parameter is treated
/// as a filter field whose value is a comma-joined set of allowed values.
#[utoipa::path(
    get,
    path = "/items/search",
    responses(
        (status = 200, description = "Matching items with on-hand quantities", body = [crate::services::search::SearchHit]),
        (status = 400, description = "Unknown filter field", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn search_items(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut query = SearchQuery::default();

    for (key, raw) in params {
        if key == "q" {
            query.free_text = Some(raw);
            continue;
        }
        let field = FilterField::parse(&key)?;
        let values: BTreeSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect();
        if !values.is_empty() {
            query.filters.insert(field, values);
        }
    }

    let hits = state.search.search(query).await?;
    Ok(Json(hits))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DistinctParams {
    pub field: Option<String>,
}

/// Distinct values of one filterable field, with occurrence counts.
#[utoipa::path(
    get,
    path = "/items/distinct",
    params(("field" = String, Query, description = "Filterable field name")),
    responses(
        (status = 200, description = "Facet values", body = [crate::services::search::FacetValue]),
        (status = 400, description = "Unfilterable field", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn distinct_values(
    State(state): State<AppState>,
    Query(params): Query<DistinctParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let field = params
        .field
        .ok_or_else(|| ServiceError::InvalidField("field parameter is required".to_string()))?;
    let values = state.search.distinct_values(&field).await?;
    Ok(Json(values))
}
