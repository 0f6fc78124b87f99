use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        item, on_hand,
        stock_event::{self, StockAction},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Optional metadata recorded on the remove event at confirm time.
#[derive(Debug, Clone, Default)]
pub struct RemoveMetadata {
    pub order_reference: Option<String>,
    pub source: Option<String>,
    pub date_subtracted: Option<DateTime<Utc>>,
}

/// Outcome of a committed add or confirmed remove.
#[derive(Debug, Clone)]
pub struct StockChange {
    pub item: item::Model,
    pub event: stock_event::Model,
    pub on_hand: i32,
}

/// First-step outcome of a remove attempt. `ConfirmationRequired` suspends
/// the workflow awaiting an explicit confirm; `RegisteredZeroStock` is
/// terminal for this attempt.
#[derive(Debug, Clone)]
pub enum RemoveInitiation {
    ConfirmationRequired { item: item::Model, on_hand: i32 },
    RegisteredZeroStock { item: item::Model },
}

/// Service owning all writes to the on-hand ledger and the event log.
#[derive(Clone)]
pub struct StockService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl StockService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    async fn lookup(&self, scan_code: &str) -> Result<item::Model, ServiceError> {
        item::Entity::find()
            .filter(item::Column::ScannedCode.eq(scan_code))
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::ItemNotFound(scan_code.to_string()))
    }

    /// Increments the item's on-hand quantity by one and appends an `add`
    /// event, atomically. No upper bound on quantity.
    #[instrument(skip(self))]
    pub async fn add_one(&self, scan_code: &str) -> Result<StockChange, ServiceError> {
        let item = self.lookup(scan_code).await?;
        let item_id = item.id;

        let (quantity, event) = self
            .db
            .transaction::<_, (i32, stock_event::Model), ServiceError>(move |txn| {
                Box::pin(async move {
                    let record = super::ensure_on_hand(txn, item_id)
                        .await
                        .map_err(ServiceError::DatabaseError)?;

                    // Plain read-modify-write: only the decrement path needs
                    // the row lock, additions have no floor to defend.
                    let new_quantity = record.quantity + 1;
                    let mut active: on_hand::ActiveModel = record.into();
                    active.quantity = Set(new_quantity);
                    active.updated_at = Set(Utc::now());
                    active
                        .update(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;

                    let event = stock_event::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        item_id: Set(item_id),
                        action: Set(StockAction::Add.as_str().to_string()),
                        delta: Set(1),
                        order_reference: Set(None),
                        source: Set(None),
                        date_subtracted: Set(None),
                        created_at: Set(Utc::now()),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                    Ok((new_quantity, event))
                })
            })
            .await
            .map_err(super::unwrap_txn_err)?;

        self.event_sender
            .send(Event::StockAdded {
                item_id,
                scanned_code: item.scanned_code.clone(),
                event_id: event.id,
                on_hand: quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;

        info!(code = %item.scanned_code, on_hand = quantity, "added one unit");

        Ok(StockChange {
            item,
            event,
            on_hand: quantity,
        })
    }

    /// Reads the current quantity without mutating it, creating the ledger
    /// row at zero if missing so the read never hits an absent record. The
    /// returned quantity is advisory only; Confirm re-checks under a lock.
    #[instrument(skip(self))]
    pub async fn initiate_remove(&self, scan_code: &str) -> Result<RemoveInitiation, ServiceError> {
        let item = self.lookup(scan_code).await?;
        let item_id = item.id;

        let quantity = self
            .db
            .transaction::<_, i32, ServiceError>(move |txn| {
                Box::pin(async move {
                    let record = super::ensure_on_hand(txn, item_id)
                        .await
                        .map_err(ServiceError::DatabaseError)?;
                    Ok(record.quantity)
                })
            })
            .await
            .map_err(super::unwrap_txn_err)?;

        if quantity > 0 {
            info!(code = %item.scanned_code, on_hand = quantity, "removal awaiting confirmation");
            Ok(RemoveInitiation::ConfirmationRequired {
                item,
                on_hand: quantity,
            })
        } else {
            self.event_sender
                .send(Event::ZeroStockScan {
                    item_id,
                    scanned_code: item.scanned_code.clone(),
                })
                .await
                .map_err(ServiceError::EventError)?;
            Ok(RemoveInitiation::RegisteredZeroStock { item })
        }
    }

    /// Decrements the item's quantity by one under an exclusive row lock and
    /// appends a `remove` event carrying the supplied metadata.
    ///
    /// The quantity re-check after the lock is acquired is mandatory: time
    /// has passed since InitiateRemove and a concurrent removal may have
    /// zeroed the stock. At zero the call fails with `OutOfStock` and the
    /// transaction rolls back without mutation.
    #[instrument(skip(self, meta))]
    pub async fn confirm_remove(
        &self,
        scan_code: &str,
        meta: RemoveMetadata,
    ) -> Result<StockChange, ServiceError> {
        let item = self.lookup(scan_code).await?;
        let item_id = item.id;
        let code = item.scanned_code.clone();

        let (quantity, event) = self
            .db
            .transaction::<_, (i32, stock_event::Model), ServiceError>(move |txn| {
                Box::pin(async move {
                    // Exclusive read-for-update; serializes concurrent
                    // removals of the same item until commit.
                    let record = on_hand::Entity::find_by_id(item_id)
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;

                    let record = match record {
                        Some(record) if record.quantity > 0 => record,
                        _ => return Err(ServiceError::OutOfStock(code)),
                    };

                    let new_quantity = record.quantity - 1;
                    let mut active: on_hand::ActiveModel = record.into();
                    active.quantity = Set(new_quantity);
                    active.updated_at = Set(Utc::now());
                    active
                        .update(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;

                    let event = stock_event::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        item_id: Set(item_id),
                        action: Set(StockAction::Remove.as_str().to_string()),
                        // Always one unit per event; direction lives in the
                        // action kind, not the sign.
                        delta: Set(1),
                        order_reference: Set(meta.order_reference.clone()),
                        source: Set(meta.source.clone()),
                        date_subtracted: Set(Some(
                            meta.date_subtracted.unwrap_or_else(Utc::now),
                        )),
                        created_at: Set(Utc::now()),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                    Ok((new_quantity, event))
                })
            })
            .await
            .map_err(super::unwrap_txn_err)?;

        self.event_sender
            .send(Event::StockRemoved {
                item_id,
                scanned_code: item.scanned_code.clone(),
                event_id: event.id,
                on_hand: quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;

        info!(code = %item.scanned_code, on_hand = quantity, "removed one unit");

        Ok(StockChange {
            item,
            event,
            on_hand: quantity,
        })
    }
}
