//! Operator-facing scan session: interprets a stream of scanned strings as
//! mode switches or payloads for the active mode, talking to the server
//! through [`gateway::InventoryGateway`].

pub mod gateway;
pub mod session;

pub use gateway::{GatewayError, HttpGateway, InventoryGateway};
pub use session::{ScanMode, ScanSession, SessionEvent, MODE_ADD, MODE_REMOVE, MODE_SEARCH};
