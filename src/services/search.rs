use sea_orm::sea_query::{Alias, Expr, Func, LikeExpr, NullOrdering};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult, Order, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::{item, on_hand},
    errors::ServiceError,
};

/// Hard cap on search results; the browse-all view is just an empty query
/// hitting this cap.
pub const SEARCH_RESULT_CAP: u64 = 200;

/// Columns searched by the free-text match.
const TEXT_COLUMNS: [item::Column; 8] = [
    item::Column::ScannedCode,
    item::Column::Model,
    item::Column::Brand,
    item::Column::Size,
    item::Column::Color,
    item::Column::Notes,
    item::Column::PurchasedFrom,
    item::Column::SoldOrderReference,
];

/// Numeric columns included in the free-text match via a string cast.
const CAST_COLUMNS: [item::Column; 3] = [
    item::Column::PaintThickness,
    item::Column::Price,
    item::Column::QuantityNote,
];

/// Allow-listed catalog fields usable for filtering and faceting.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum FilterField {
    Brand,
    Model,
    Size,
    Color,
    PurchasedFrom,
}

impl FilterField {
    pub fn column(&self) -> item::Column {
        match self {
            Self::Brand => item::Column::Brand,
            Self::Model => item::Column::Model,
            Self::Size => item::Column::Size,
            Self::Color => item::Column::Color,
            Self::PurchasedFrom => item::Column::PurchasedFrom,
        }
    }

    /// Parses a caller-supplied field name against the allow-list.
    pub fn parse(name: &str) -> Result<Self, ServiceError> {
        Self::from_str(name).map_err(|_| {
            let allowed = Self::iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            ServiceError::InvalidField(format!("{} (expected one of: {})", name, allowed))
        })
    }
}

/// One search invocation: optional free text plus the full filter snapshot.
/// Values within a field are OR'ed; fields are AND'ed with each other and
/// with the free-text condition.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub free_text: Option<String>,
    pub filters: BTreeMap<FilterField, BTreeSet<String>>,
}

/// Search result row: the catalog record plus its current on-hand quantity
/// (zero when no ledger row exists yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: Uuid,
    pub scanned_code: String,
    pub model: String,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub purchased_from: Option<String>,
    pub sold_order_reference: Option<String>,
    pub paint_thickness: Option<rust_decimal::Decimal>,
    pub price: Option<rust_decimal::Decimal>,
    pub quantity_note: Option<i32>,
    pub inventoried_at: chrono::DateTime<chrono::Utc>,
    pub on_hand: i32,
}

/// Facet entry: one distinct value of a filterable field and how many items
/// carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FacetValue {
    pub value: String,
    pub count: i64,
}

#[derive(Debug, FromQueryResult)]
struct SearchRow {
    id: Uuid,
    scanned_code: String,
    model: String,
    brand: Option<String>,
    size: Option<String>,
    color: Option<String>,
    notes: Option<String>,
    purchased_from: Option<String>,
    sold_order_reference: Option<String>,
    paint_thickness: Option<rust_decimal::Decimal>,
    price: Option<rust_decimal::Decimal>,
    quantity_note: Option<i32>,
    inventoried_at: chrono::DateTime<chrono::Utc>,
    on_hand: Option<i32>,
}

#[derive(Debug, FromQueryResult)]
struct FacetRow {
    value: String,
    count: i64,
}

/// Escapes LIKE metacharacters so literal `%`/`_` in user input match
/// literally. The escape character itself must be escaped first.
fn like_escape(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Read-only filtered search and distinct-value faceting over the catalog
/// joined with the ledger.
#[derive(Clone)]
pub struct SearchService {
    db: Arc<DatabaseConnection>,
}

impl SearchService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Runs a filtered search capped at [`SEARCH_RESULT_CAP`] rows in
    /// (brand, model, scan code) order with nulls last.
    #[instrument(skip(self, query))]
    pub async fn search(&self, query: SearchQuery) -> Result<Vec<SearchHit>, ServiceError> {
        let mut condition = Condition::all();

        if let Some(text) = query
            .free_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            let pattern = format!("%{}%", like_escape(&text.to_lowercase()));
            let mut any = Condition::any();
            for col in TEXT_COLUMNS {
                any = any.add(
                    Expr::expr(Func::lower(Expr::col((item::Entity, col))))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                );
            }
            for col in CAST_COLUMNS {
                any = any.add(
                    Expr::expr(Func::lower(Func::cast_as(
                        Expr::col((item::Entity, col)),
                        Alias::new("TEXT"),
                    )))
                    .like(LikeExpr::new(pattern.clone()).escape('\\')),
                );
            }
            condition = condition.add(any);
        }

        for (field, values) in &query.filters {
            if values.is_empty() {
                continue;
            }
            let col = field.column();
            let mut any = Condition::any();
            for value in values {
                any = any.add(
                    Expr::expr(Func::lower(Expr::col((item::Entity, col))))
                        .eq(value.trim().to_lowercase()),
                );
            }
            condition = condition.add(any);
        }

        let rows = item::Entity::find()
            .left_join(on_hand::Entity)
            .column_as(on_hand::Column::Quantity, "on_hand")
            .filter(condition)
            .order_by_with_nulls(item::Column::Brand, Order::Asc, NullOrdering::Last)
            .order_by_with_nulls(item::Column::Model, Order::Asc, NullOrdering::Last)
            .order_by(item::Column::ScannedCode, Order::Asc)
            .limit(SEARCH_RESULT_CAP)
            .into_model::<SearchRow>()
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(rows
            .into_iter()
            .map(|row| SearchHit {
                id: row.id,
                scanned_code: row.scanned_code,
                model: row.model,
                brand: row.brand,
                size: row.size,
                color: row.color,
                notes: row.notes,
                purchased_from: row.purchased_from,
                sold_order_reference: row.sold_order_reference,
                paint_thickness: row.paint_thickness,
                price: row.price,
                quantity_note: row.quantity_note,
                inventoried_at: row.inventoried_at,
                on_hand: row.on_hand.unwrap_or(0),
            })
            .collect())
    }

    /// Returns every non-empty distinct value of one filterable field with
    /// its occurrence count, sorted case-insensitively. Facet data is for
    /// populating filter menus, never for validation.
    #[instrument(skip(self))]
    pub async fn distinct_values(&self, field: &str) -> Result<Vec<FacetValue>, ServiceError> {
        let field = FilterField::parse(field)?;
        let col = field.column();

        let mut rows = item::Entity::find()
            .select_only()
            .column_as(col, "value")
            .column_as(item::Column::Id.count(), "count")
            .filter(col.is_not_null())
            .filter(
                Expr::expr(Func::cust(Alias::new("TRIM")).arg(Expr::col((item::Entity, col))))
                    .ne(""),
            )
            .group_by(col)
            .into_model::<FacetRow>()
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)?;

        rows.sort_by(|a, b| a.value.to_lowercase().cmp(&b.value.to_lowercase()));

        Ok(rows
            .into_iter()
            .map(|row| FacetValue {
                value: row.value,
                count: row.count,
            })
            .collect())
    }
}
