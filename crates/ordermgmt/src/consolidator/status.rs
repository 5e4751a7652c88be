use crate::ShipmentBatch;

/// Outcome of [`ShipmentConsolidator::accumulate`].
///
/// - [`AccumulateStatus::Buffered`] - the order joined its destination's batch
///   and nothing is due yet.
/// - [`AccumulateStatus::Flushed`] - the order filled the batch window; every
///   batch accumulated since the previous flush is handed back and the
///   consolidator is empty again.
/// - [`AccumulateStatus::Skipped`] - the id did not resolve to a stored order
///   and was dropped. This is never fatal to the session.
///
/// [`ShipmentConsolidator::accumulate`]: crate::ShipmentConsolidator::accumulate
#[derive(Debug, Clone, PartialEq)]
pub enum AccumulateStatus {
    /// Accepted and held until the next flush.
    Buffered {
        /// Orders accumulated since the last flush, this one included.
        pending: usize,
    },
    /// Accepted and triggered a count-based flush.
    Flushed {
        /// Batches to send, in the order their destinations were first seen.
        batches: Vec<ShipmentBatch>,
    },
    /// Unknown id, dropped.
    Skipped,
}

impl AccumulateStatus {
    /// Batches that are due for sending. Empty unless this is a flush.
    pub fn into_batches(self) -> Vec<ShipmentBatch> {
        match self {
            Self::Flushed { batches } => batches,
            Self::Buffered { .. } | Self::Skipped => Vec::new(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}
