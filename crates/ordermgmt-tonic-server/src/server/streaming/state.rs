/// Lifecycle of one `ProcessOrders` stream.
///
/// ```text
/// Open -> Receiving -+-> (id) ------------> Receiving
///                    +-> (end of input) --> PeerHalfClosed -> Closed
///                    +-> (error/cancel) --> Failed ---------> Closed
/// ```
///
/// Only `PeerHalfClosed` flushes the remaining shipments. `Failed` discards
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Stream accepted, consolidator created, nothing read yet.
    Open,
    /// Waiting for, or processing, the next inbound order id.
    Receiving,
    /// The caller signalled end-of-input.
    PeerHalfClosed,
    /// A receive or send failed, or the stream was cancelled.
    Failed,
    /// Terminal. The outbound half is closed and session state is gone.
    Closed,
}

impl SessionState {
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Counters describing what a session did, returned when it closes normally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Order ids read from the caller.
    pub orders_received: u64,
    /// Ids that resolved and joined a shipment.
    pub orders_consolidated: u64,
    /// Ids that did not resolve and were skipped.
    pub unknown_orders: u64,
    /// Shipments written to the caller.
    pub shipments_sent: u64,
}
