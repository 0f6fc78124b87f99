use async_trait::async_trait;
use http::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    errors::ErrorResponse,
    handlers::{
        inventory::{
            AddResponse, BarcodeRequest, ConfirmRemoveRequest, ConfirmRemoveResponse,
            InitiateRemoveResponse,
        },
        items::{ItemResponse, UpsertItemRequest},
    },
    services::{
        search::{FacetValue, FilterField, SearchHit, SearchQuery},
        stock::RemoveMetadata,
    },
};

/// Client-side view of a failed server call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("item not found")]
    NotFound,
    #[error("out of stock")]
    OutOfStock,
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

/// Server operations a scan session relies on. Abstracted so the session
/// state machine can be tested without a running server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    async fn find_item(&self, code: &str) -> Result<Option<ItemResponse>, GatewayError>;

    async fn create_item(&self, draft: UpsertItemRequest) -> Result<ItemResponse, GatewayError>;

    async fn add_one(&self, code: &str) -> Result<AddResponse, GatewayError>;

    async fn initiate_remove(&self, code: &str) -> Result<InitiateRemoveResponse, GatewayError>;

    async fn confirm_remove(
        &self,
        code: &str,
        metadata: RemoveMetadata,
    ) -> Result<ConfirmRemoveResponse, GatewayError>;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, GatewayError>;

    async fn distinct_values(&self, field: FilterField) -> Result<Vec<FacetValue>, GatewayError>;
}

/// [`InventoryGateway`] backed by the HTTP API.
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| status.to_string());
        Err(match status {
            StatusCode::NOT_FOUND => GatewayError::NotFound,
            StatusCode::CONFLICT => GatewayError::OutOfStock,
            StatusCode::BAD_REQUEST => GatewayError::Rejected(message),
            _ => GatewayError::Server(message),
        })
    }
}

#[async_trait]
impl InventoryGateway for HttpGateway {
    async fn find_item(&self, code: &str) -> Result<Option<ItemResponse>, GatewayError> {
        let response = self
            .client
            .get(self.url(&format!("/items/{code}")))
            .send()
            .await?;
        match Self::decode::<ItemResponse>(response).await {
            Ok(item) => Ok(Some(item)),
            Err(GatewayError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn create_item(&self, draft: UpsertItemRequest) -> Result<ItemResponse, GatewayError> {
        let response = self
            .client
            .post(self.url("/items"))
            .json(&draft)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn add_one(&self, code: &str) -> Result<AddResponse, GatewayError> {
        let response = self
            .client
            .post(self.url("/inventory/add"))
            .json(&BarcodeRequest {
                barcode: code.to_string(),
            })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn initiate_remove(&self, code: &str) -> Result<InitiateRemoveResponse, GatewayError> {
        let response = self
            .client
            .post(self.url("/inventory/remove/initiate"))
            .json(&BarcodeRequest {
                barcode: code.to_string(),
            })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn confirm_remove(
        &self,
        code: &str,
        metadata: RemoveMetadata,
    ) -> Result<ConfirmRemoveResponse, GatewayError> {
        let response = self
            .client
            .post(self.url("/inventory/remove/confirm"))
            .json(&ConfirmRemoveRequest {
                barcode: code.to_string(),
                order_id: metadata.order_reference,
                source: metadata.source,
                date_subtracted: metadata.date_subtracted,
            })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, GatewayError> {
        let mut params: Vec<(String, String)> = Vec::new();
        if let Some(text) = &query.free_text {
            params.push(("q".to_string(), text.clone()));
        }
        for (field, values) in &query.filters {
            let joined = values.iter().cloned().collect::<Vec<_>>().join(",");
            params.push((field.to_string(), joined));
        }
        let response = self
            .client
            .get(self.url("/items/search"))
            .query(&params)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn distinct_values(&self, field: FilterField) -> Result<Vec<FacetValue>, GatewayError> {
        let response = self
            .client
            .get(self.url("/items/distinct"))
            .query(&[("field", field.to_string())])
            .send()
            .await?;
        Self::decode(response).await
    }
}
