use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::stock_event,
    errors::ServiceError,
    handlers::items::ItemResponse,
    services::stock::{RemoveInitiation, RemoveMetadata},
    AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BarcodeRequest {
    pub barcode: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRemoveRequest {
    pub barcode: String,
    pub order_id: Option<String>,
    pub source: Option<String>,
    pub date_subtracted: Option<DateTime<Utc>>,
}

/// Stock event as returned to HTTP callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockEventResponse {
    pub id: Uuid,
    pub item_id: Uuid,
    pub action: String,
    pub delta: i32,
    pub order_reference: Option<String>,
    pub source: Option<String>,
    pub date_subtracted: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<stock_event::Model> for StockEventResponse {
    fn from(model: stock_event::Model) -> Self {
        Self {
            id: model.id,
            item_id: model.item_id,
            action: model.action,
            delta: model.delta,
            order_reference: model.order_reference,
            source: model.source,
            date_subtracted: model.date_subtracted,
            created_at: model.created_at,
        }
    }
}

/// Remove-workflow states reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RemovalStatus {
    ConfirmationRequired,
    RegisteredZeroStock,
    Removed,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddResponse {
    pub item: ItemResponse,
    pub event: StockEventResponse,
    pub on_hand: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiateRemoveResponse {
    pub status: RemovalStatus,
    pub item: ItemResponse,
    pub on_hand: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRemoveResponse {
    pub status: RemovalStatus,
    pub on_hand: i32,
    pub event: StockEventResponse,
}

/// Add one unit of the scanned item.
#[utoipa::path(
    post,
    path = "/inventory/add",
    request_body = BarcodeRequest,
    responses(
        (status = 201, description = "Unit added", body = AddResponse),
        (status = 404, description = "Unknown scan code", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn add_one(
    State(state): State<AppState>,
    Json(payload): Json<BarcodeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let change = state.stock.add_one(&payload.barcode).await?;
    Ok((
        StatusCode::CREATED,
        Json(AddResponse {
            item: change.item.into(),
            event: change.event.into(),
            on_hand: change.on_hand,
        }),
    ))
}

/// Start a removal: reads the current quantity without mutating it.
#[utoipa::path(
    post,
    path = "/inventory/remove/initiate",
    request_body = BarcodeRequest,
    responses(
        (status = 200, description = "Removal state", body = InitiateRemoveResponse),
        (status = 404, description = "Unknown scan code", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn initiate_remove(
    State(state): State<AppState>,
    Json(payload): Json<BarcodeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = match state.stock.initiate_remove(&payload.barcode).await? {
        RemoveInitiation::ConfirmationRequired { item, on_hand } => InitiateRemoveResponse {
            status: RemovalStatus::ConfirmationRequired,
            item: item.into(),
            on_hand,
        },
        RemoveInitiation::RegisteredZeroStock { item } => InitiateRemoveResponse {
            status: RemovalStatus::RegisteredZeroStock,
            item: item.into(),
            on_hand: 0,
        },
    };
    Ok(Json(response))
}

/// Finish a removal: decrements under a row lock after re-checking stock.
#[utoipa::path(
    post,
    path = "/inventory/remove/confirm",
    request_body = ConfirmRemoveRequest,
    responses(
        (status = 200, description = "Unit removed", body = ConfirmRemoveResponse),
        (status = 404, description = "Unknown scan code", body = crate::errors::ErrorResponse),
        (status = 409, description = "Out of stock at confirm time", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn confirm_remove(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmRemoveRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let meta = RemoveMetadata {
        order_reference: payload.order_id,
        source: payload.source,
        date_subtracted: payload.date_subtracted,
    };
    let change = state.stock.confirm_remove(&payload.barcode, meta).await?;
    Ok(Json(ConfirmRemoveResponse {
        status: RemovalStatus::Removed,
        on_hand: change.on_hand,
        event: change.event.into(),
    }))
}
