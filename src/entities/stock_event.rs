use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Append-only history entry for a single add or remove action.
///
/// Rows are write-once: never updated, never deleted. Removal metadata
/// (order reference, source, date subtracted) is only present on `remove`
/// events.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_id: Uuid,
    pub action: String,
    pub delta: i32,
    pub order_reference: Option<String>,
    pub source: Option<String>,
    pub date_subtracted: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Action kind stored in the `action` column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StockAction {
    Add,
    Remove,
}

impl StockAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::StockAction;

    #[test]
    fn action_round_trips_through_column_text() {
        assert_eq!(StockAction::Add.as_str(), "add");
        assert_eq!(StockAction::Remove.as_str(), "remove");
        assert_eq!(StockAction::from_str("add").unwrap(), StockAction::Add);
        assert_eq!(StockAction::from_str("remove").unwrap(), StockAction::Remove);
        assert!(StockAction::from_str("transfer").is_err());
    }
}
