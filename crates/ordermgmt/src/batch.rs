use crate::Order;
use std::sync::Arc;

/// Prefix prepended to a destination to form a shipment id.
pub const SHIPMENT_ID_PREFIX: &str = "cmb-";

/// Status carried by every consolidated shipment.
pub const SHIPMENT_STATUS_PROCESSED: &str = "Processed!";

/// A group of orders that share a destination and ship together.
///
/// Orders are kept in the order they were accumulated. A batch only ever
/// holds orders for its own destination; [`ShipmentConsolidator`] is the only
/// place that appends to one.
///
/// [`ShipmentConsolidator`]: crate::ShipmentConsolidator
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentBatch {
    id: String,
    destination: String,
    orders: Vec<Arc<Order>>,
}

impl ShipmentBatch {
    pub(crate) fn new(destination: &str) -> Self {
        Self {
            id: format!("{SHIPMENT_ID_PREFIX}{destination}"),
            destination: destination.to_owned(),
            orders: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, order: Arc<Order>) {
        debug_assert_eq!(order.destination, self.destination);
        self.orders.push(order);
    }

    /// Shipment id, `"cmb-"` followed by the destination.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Always [`SHIPMENT_STATUS_PROCESSED`].
    pub fn status(&self) -> &'static str {
        SHIPMENT_STATUS_PROCESSED
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Orders in arrival order.
    pub fn orders(&self) -> &[Arc<Order>] {
        &self.orders
    }

    /// Ids of the contained orders, in arrival order.
    pub fn order_ids(&self) -> impl Iterator<Item = &str> {
        self.orders.iter().map(|order| order.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
