pub mod catalog;
pub mod search;
pub mod stock;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, Set, TransactionError};
use uuid::Uuid;

use crate::{entities::on_hand, errors::ServiceError};

/// Fetches the ledger row for an item, creating it at zero if it does not
/// exist yet. Every add/remove/catalog-write path goes through this, so the
/// row is guaranteed to exist before any quantity read.
pub(crate) async fn ensure_on_hand<C: ConnectionTrait>(
    conn: &C,
    item_id: Uuid,
) -> Result<on_hand::Model, DbErr> {
    if let Some(record) = on_hand::Entity::find_by_id(item_id).one(conn).await? {
        return Ok(record);
    }

    on_hand::ActiveModel {
        item_id: Set(item_id),
        quantity: Set(0),
        updated_at: Set(Utc::now()),
    }
    .insert(conn)
    .await
}

pub(crate) fn unwrap_txn_err(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}
