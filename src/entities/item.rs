use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog record for a trackable SKU, keyed by the unique scan code.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub scanned_code: String,
    pub model: String,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub purchased_from: Option<String>,
    pub sold_order_reference: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub paint_thickness: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub price: Option<Decimal>,
    pub quantity_note: Option<i32>,
    pub inventoried_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::on_hand::Entity")]
    OnHand,
    #[sea_orm(has_many = "super::stock_event::Entity")]
    StockEvent,
}

impl Related<super::on_hand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OnHand.def()
    }
}

impl Related<super::stock_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockEvent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
