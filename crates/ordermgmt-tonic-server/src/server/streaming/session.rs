//! The `ProcessOrders` consolidation session.
//!
//! A [`ConsolidationSession`] owns everything one bidirectional stream needs:
//! the inbound id stream, the outbound shipment channel, a private
//! [`ShipmentConsolidator`] and a handle to the shared [`OrderStore`]. It is
//! driven one transition at a time by [`advance`](ConsolidationSession::advance)
//! or to completion by [`run`](ConsolidationSession::run).
//!
//! ## Ordering
//!
//! Shipments are written one at a time, in the order the consolidator
//! produces them, and the next inbound id is not read until every shipment
//! due from the previous one has been accepted by the outbound channel. A
//! full channel suspends the session; it never drops a shipment.
//!
//! ## Failure
//!
//! Any receive error, send error, caller disconnect or service shutdown moves
//! the session to [`SessionState::Failed`]: pending shipments are discarded
//! without a flush, an error status is offered to the caller when it is still
//! listening (for at most `STATUS_DELIVERY_TIMEOUT` if its buffer is full), and
//! the next transition closes the session.

use super::{
    ShipmentSender,
    state::{SessionReport, SessionState},
};
use crate::server::telemetry::{
    increment_orders_consolidated, increment_shipments_emitted, increment_unknown_orders,
};
use ordermgmt_tonic_core::{
    Error,
    ordermgmt::{OrderStore, ShipmentBatch, ShipmentConsolidator},
    proto::{CombinedShipment, OrderId},
};
use core::time::Duration;
use tokio::time::timeout;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tonic::Status;

/// How long a failing session waits for room in the outbound channel to
/// report its error before closing without it.
const STATUS_DELIVERY_TIMEOUT: Duration = Duration::from_millis(250);

/// State machine driving one `ProcessOrders` stream.
pub struct ConsolidationSession<S> {
    inbound: S,
    // `None` once the outbound half has been closed.
    outbound: Option<ShipmentSender>,
    store: OrderStore,
    consolidator: ShipmentConsolidator,
    cancel: CancellationToken,
    state: SessionState,
    report: SessionReport,
}

impl<S> ConsolidationSession<S>
where
    S: Stream<Item = Result<OrderId, Status>> + Unpin,
{
    /// Opens a session over `inbound` / `outbound`.
    ///
    /// `cancel` aborts the session from outside (service shutdown); it is
    /// observed while waiting for input and while waiting to send.
    pub fn new(
        inbound: S,
        outbound: ShipmentSender,
        store: OrderStore,
        batch_size: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            inbound,
            outbound: Some(outbound),
            store,
            consolidator: ShipmentConsolidator::new(batch_size),
            cancel,
            state: SessionState::Open,
            report: SessionReport::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn report(&self) -> SessionReport {
        self.report
    }

    /// Orders consolidated but not yet sent.
    pub fn pending(&self) -> usize {
        self.consolidator.pending()
    }

    /// Drives the session until it closes.
    ///
    /// # Errors
    ///
    /// Returns the error that moved the session to [`SessionState::Failed`].
    /// The session is closed either way.
    pub async fn run(mut self) -> ordermgmt_tonic_core::Result<SessionReport> {
        loop {
            match self.advance().await {
                Ok(state) if state.is_closed() => return Ok(self.report),
                Ok(_) => {}
                Err(err) => {
                    self.close();
                    return Err(err);
                }
            }
        }
    }

    /// Performs exactly one state transition and returns the new state.
    ///
    /// In [`SessionState::Receiving`] one transition handles one inbound
    /// message, including every shipment it causes to be sent.
    ///
    /// # Errors
    ///
    /// On failure the session is left in [`SessionState::Failed`] and the
    /// error is returned; the following call closes it.
    pub async fn advance(&mut self) -> ordermgmt_tonic_core::Result<SessionState> {
        let next = match self.state {
            SessionState::Open => Ok(SessionState::Receiving),
            SessionState::Receiving => self.receive().await,
            SessionState::PeerHalfClosed => self.finish().await,
            SessionState::Failed | SessionState::Closed => Ok(SessionState::Closed),
        };

        match next {
            Ok(SessionState::Closed) => {
                self.close();
                Ok(SessionState::Closed)
            }
            Ok(state) => {
                self.state = state;
                Ok(state)
            }
            Err(err) => {
                self.fail(&err).await;
                Err(err)
            }
        }
    }

    async fn receive(&mut self) -> ordermgmt_tonic_core::Result<SessionState> {
        let Some(outbound) = self.outbound.as_ref() else {
            return Ok(SessionState::Closed);
        };

        let next = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(Error::ServiceShutdown),
            () = outbound.closed() => return Err(Error::RequestCancelled),
            next = self.inbound.next() => next,
        };

        match next {
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(pending = self.pending(), "Caller half-closed");
                Ok(SessionState::PeerHalfClosed)
            }
            Some(Err(status)) => Err(Error::from_inbound(&status)),
            Some(Ok(OrderId { value })) => {
                self.report.orders_received += 1;

                let status = self.consolidator.accumulate(&self.store, &value);
                if status.is_skipped() {
                    self.report.unknown_orders += 1;
                    increment_unknown_orders();
                } else {
                    self.report.orders_consolidated += 1;
                    increment_orders_consolidated();
                }

                for batch in status.into_batches() {
                    self.send(batch).await?;
                }
                Ok(SessionState::Receiving)
            }
        }
    }

    async fn finish(&mut self) -> ordermgmt_tonic_core::Result<SessionState> {
        for batch in self.consolidator.flush_all() {
            self.send(batch).await?;
        }
        Ok(SessionState::Closed)
    }

    async fn send(&mut self, batch: ShipmentBatch) -> ordermgmt_tonic_core::Result<()> {
        let Some(outbound) = self.outbound.as_ref() else {
            return Err(Error::ChannelError {
                context: "Outbound half already closed".to_string(),
            });
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(shipment = batch.id(), orders = batch.len(), "Shipping");

        let shipment = CombinedShipment::from(&batch);
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(Error::ServiceShutdown),
            sent = outbound.send(Ok(shipment)) => sent.map_err(|e| Error::ChannelError {
                context: format!("Failed to forward shipment {}: {e}", batch.id()),
            })?,
        }

        self.report.shipments_sent += 1;
        increment_shipments_emitted();
        Ok(())
    }

    /// Moves to `Failed`: drops pending shipments and tells the caller why,
    /// if it is still there to hear it.
    async fn fail(&mut self, err: &Error) {
        self.state = SessionState::Failed;
        let _discarded = self.consolidator.discard();

        #[cfg(feature = "tracing")]
        tracing::warn!(discarded = _discarded, "Consolidation session failed: {err}");

        // Nobody is reading any more.
        if matches!(err, Error::RequestCancelled | Error::ChannelError { .. }) {
            return;
        }

        if let Some(outbound) = self.outbound.as_ref() {
            let status: Status = err.clone().into();
            let delivery = async {
                tokio::select! {
                    sent = outbound.send(Err(status)) => {
                        if let Err(_e) = sent {
                            #[cfg(feature = "tracing")]
                            tracing::debug!("Failed to forward err: {_e}");
                        }
                    }
                    () = outbound.closed() => {}
                }
            };
            // A caller that stopped reading must not keep the session alive.
            if timeout(STATUS_DELIVERY_TIMEOUT, delivery).await.is_err() {
                #[cfg(feature = "tracing")]
                tracing::debug!("Caller not reading, dropping error status");
            }
        }
    }

    /// Terminal transition. Dropping the sender closes the outbound half, which
    /// ends the response stream.
    fn close(&mut self) {
        self.state = SessionState::Closed;
        self.consolidator.discard();
        self.outbound = None;
    }
}
