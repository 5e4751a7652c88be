use crate::{AccumulateStatus, OrderLookup, ShipmentBatch};
use core::mem;
use std::collections::HashMap;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Number of accumulated orders that triggers a flush when not configured.
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Groups a session's order ids into per-destination shipment batches.
///
/// A consolidator belongs to exactly one stream and is never shared, so it
/// needs no synchronization of its own; the only shared state it touches is
/// the [`OrderLookup`] it reads through.
///
/// Every `batch_size` accepted orders (counted across all destinations) the
/// accumulated batches are flushed together. Whatever remains when input ends
/// is handed out by [`flush_all`](Self::flush_all).
///
/// Flushed batches come out in the order their destination was first seen
/// since the previous flush, and orders inside a batch keep arrival order.
#[derive(Debug, Clone)]
pub struct ShipmentConsolidator {
    batch_size: usize,
    batches: Vec<ShipmentBatch>,
    // destination -> position in `batches`
    index: HashMap<String, usize>,
    since_flush: usize,
}

impl ShipmentConsolidator {
    /// Creates an empty consolidator that flushes every `batch_size` orders.
    ///
    /// A `batch_size` of zero is treated as one.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            batches: Vec::new(),
            index: HashMap::new(),
            since_flush: 0,
        }
    }

    /// Resolves `order_id` through `lookup` and adds the order to the batch
    /// for its destination.
    ///
    /// Unknown ids are logged and dropped; they neither count towards the
    /// flush threshold nor appear in any batch.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self, lookup)))]
    pub fn accumulate<L>(&mut self, lookup: &L, order_id: &str) -> AccumulateStatus
    where
        L: OrderLookup + ?Sized,
    {
        let Some(order) = lookup.lookup(order_id) else {
            #[cfg(feature = "tracing")]
            tracing::warn!(order_id, "Skipping unknown order id");
            return AccumulateStatus::Skipped;
        };

        let slot = match self.index.get(order.destination.as_str()) {
            Some(&slot) => slot,
            None => {
                let slot = self.batches.len();
                self.batches.push(ShipmentBatch::new(&order.destination));
                self.index.insert(order.destination.clone(), slot);
                slot
            }
        };
        self.batches[slot].push(order);
        self.since_flush += 1;

        if self.since_flush >= self.batch_size {
            let batches = self.take_batches();
            #[cfg(feature = "tracing")]
            tracing::debug!(shipments = batches.len(), "Batch window full, flushing");
            AccumulateStatus::Flushed { batches }
        } else {
            AccumulateStatus::Buffered {
                pending: self.since_flush,
            }
        }
    }

    /// Hands out every batch still held, regardless of size, and resets.
    ///
    /// Called once input ends. A second call in a row returns nothing.
    pub fn flush_all(&mut self) -> Vec<ShipmentBatch> {
        let batches = self.take_batches();
        #[cfg(feature = "tracing")]
        if !batches.is_empty() {
            tracing::debug!(shipments = batches.len(), "Flushing remaining shipments");
        }
        batches
    }

    /// Drops every batch still held without handing it out, returning how
    /// many orders were thrown away.
    ///
    /// Used when a session fails and its batches must not be sent.
    pub fn discard(&mut self) -> usize {
        self.take_batches().iter().map(ShipmentBatch::len).sum()
    }

    /// Orders accepted since the last flush.
    pub fn pending(&self) -> usize {
        self.since_flush
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns `true` when no batch is being accumulated.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    fn take_batches(&mut self) -> Vec<ShipmentBatch> {
        self.index.clear();
        self.since_flush = 0;
        mem::take(&mut self.batches)
    }
}

impl Default for ShipmentConsolidator {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}
