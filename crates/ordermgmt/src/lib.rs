//! # `ordermgmt`: order records and shipment consolidation
//!
//! This crate holds the transport-free core of the order-management service:
//!
//! - [`Order`] - an immutable-once-written purchase record.
//! - [`OrderStore`] - the process-scoped, lock-synchronized mapping from order
//!   id to [`Order`] that every handler consults.
//! - [`ShipmentConsolidator`] - the per-session accumulator that groups order
//!   ids by destination into [`ShipmentBatch`]es and decides when they flush.
//!
//! Nothing here knows about gRPC. The consolidator only needs an
//! [`OrderLookup`], which [`OrderStore`] implements, so tests can drive it with
//! a plain map.
//!
//! ## Example
//!
//! ```
//! use ordermgmt::{AccumulateStatus, Order, OrderStore, ShipmentConsolidator};
//!
//! let store = OrderStore::new();
//! store.put(Order::new("1", ["Pixel"], "Mountain View, CA", 10.0));
//! store.put(Order::new("2", ["Watch"], "San Jose, CA", 20.0));
//!
//! let mut consolidator = ShipmentConsolidator::new(2);
//! assert!(matches!(
//!     consolidator.accumulate(&store, "1"),
//!     AccumulateStatus::Buffered { pending: 1 }
//! ));
//!
//! let batches = consolidator.accumulate(&store, "2").into_batches();
//! assert_eq!(batches.len(), 2);
//! assert!(consolidator.flush_all().is_empty());
//! ```

mod batch;
mod consolidator;
mod order;
mod store;

pub use crate::batch::*;
pub use crate::consolidator::*;
pub use crate::order::*;
pub use crate::store::*;
