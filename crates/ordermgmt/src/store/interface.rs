use crate::Order;
use std::sync::Arc;

/// Read access to orders by id.
///
/// This is the only capability the [`ShipmentConsolidator`] needs from the
/// store, which keeps consolidation testable against any lookup table.
///
/// [`ShipmentConsolidator`]: crate::ShipmentConsolidator
pub trait OrderLookup {
    /// Returns the order currently stored under `id`, if any.
    fn lookup(&self, id: &str) -> Option<Arc<Order>>;
}
