pub mod item;
pub mod on_hand;
pub mod stock_event;
