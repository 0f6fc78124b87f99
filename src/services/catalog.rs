use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::item,
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Incoming catalog write. Absent optional fields clear the stored value;
/// an absent inventory date preserves the stored one.
#[derive(Debug, Clone, Default)]
pub struct UpsertItem {
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
    pub inventoried_at: Option<DateTime<Utc>>,
}

/// Service owning catalog reads and the insert-or-merge-by-scan-code write.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Looks up an item by scan code, failing with `ItemNotFound` if absent.
    #[instrument(skip(self))]
    pub async fn get_by_code(&self, code: &str) -> Result<item::Model, ServiceError> {
        self.find_by_code(code)
            .await?
            .ok_or_else(|| ServiceError::ItemNotFound(code.to_string()))
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<item::Model>, ServiceError> {
        item::Entity::find()
            .filter(item::Column::ScannedCode.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Creates or merges an item by its unique scan code and guarantees an
    /// on-hand ledger row exists. On merge, every mutable field is
    /// overwritten; the inventory date falls back to the stored value when
    /// the incoming one is absent.
    #[instrument(skip(self, input), fields(code = %input.scanned_code))]
    pub async fn upsert(&self, input: UpsertItem) -> Result<(item::Model, bool), ServiceError> {
        if input.scanned_code.trim().is_empty() || input.model.trim().is_empty() {
            return Err(ServiceError::MissingFields(
                "scanned_code and model are required".to_string(),
            ));
        }

        let db = self.db.as_ref();
        let (saved, created) = db
            .transaction::<_, (item::Model, bool), ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = item::Entity::find()
                        .filter(item::Column::ScannedCode.eq(input.scanned_code.clone()))
                        .one(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;

                    let (saved, created) = match existing {
                        Some(current) => {
                            let inventoried_at =
                                input.inventoried_at.unwrap_or(current.inventoried_at);
                            let mut active: item::ActiveModel = current.into();
                            active.model = Set(input.model.clone());
                            active.brand = Set(input.brand.clone());
                            active.size = Set(input.size.clone());
                            active.color = Set(input.color.clone());
                            active.notes = Set(input.notes.clone());
                            active.purchased_from = Set(input.purchased_from.clone());
                            active.sold_order_reference =
                                Set(input.sold_order_reference.clone());
                            active.paint_thickness = Set(input.paint_thickness);
                            active.price = Set(input.price);
                            active.quantity_note = Set(input.quantity_note);
                            active.inventoried_at = Set(inventoried_at);

                            let updated = active
                                .update(txn)
                                .await
                                .map_err(ServiceError::DatabaseError)?;
                            (updated, false)
                        }
                        None => {
                            let inserted = item::ActiveModel {
                                id: Set(Uuid::new_v4()),
                                scanned_code: Set(input.scanned_code.clone()),
                                model: Set(input.model.clone()),
                                brand: Set(input.brand.clone()),
                                size: Set(input.size.clone()),
                                color: Set(input.color.clone()),
                                notes: Set(input.notes.clone()),
                                purchased_from: Set(input.purchased_from.clone()),
                                sold_order_reference: Set(input.sold_order_reference.clone()),
                                paint_thickness: Set(input.paint_thickness),
                                price: Set(input.price),
                                quantity_note: Set(input.quantity_note),
                                inventoried_at: Set(input
                                    .inventoried_at
                                    .unwrap_or_else(Utc::now)),
                            }
                            .insert(txn)
                            .await
                            .map_err(ServiceError::DatabaseError)?;
                            (inserted, true)
                        }
                    };

                    super::ensure_on_hand(txn, saved.id)
                        .await
                        .map_err(ServiceError::DatabaseError)?;

                    Ok((saved, created))
                })
            })
            .await
            .map_err(super::unwrap_txn_err)?;

        self.event_sender
            .send(Event::ItemUpserted {
                item_id: saved.id,
                scanned_code: saved.scanned_code.clone(),
                created,
            })
            .await
            .map_err(ServiceError::EventError)?;

        info!(item_id = %saved.id, created, "catalog write completed");

        Ok((saved, created))
    }
}
