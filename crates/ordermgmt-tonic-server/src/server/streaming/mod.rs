//! Stream-shaped RPC logic, kept independent of the tonic transport.
//!
//! Everything here is written against plain `Stream`s and `mpsc` channels so
//! it can be driven from tests without a network.
//!
//! - [`session`] - `ProcessOrders`: the bidirectional consolidation state
//!   machine.
//! - [`search`] - `SearchOrders`: lazy forwarding of store matches.
//! - [`updates`] - `UpdateOrders`: applying a client stream of upserts.

pub mod search;
pub mod session;
pub mod state;
pub mod updates;


use ordermgmt_tonic_core::proto::{CombinedShipment, Order};
use tokio::sync::mpsc;
use tonic::Status;

/// Outbound half of a `ProcessOrders` stream.
pub type ShipmentSender = mpsc::Sender<Result<CombinedShipment, Status>>;

/// Outbound half of a `SearchOrders` stream.
pub type OrderSender = mpsc::Sender<Result<Order, Status>>;
