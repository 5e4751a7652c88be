//! gRPC service implementation for order management.
//!
//! [`OrderService`] implements the generated [`OrderManagement`] trait. The
//! unary and one-directional streaming calls are thin adapters over the shared
//! [`OrderStore`]; `ProcessOrders` hands each call to its own
//! [`ConsolidationSession`] running on a dedicated task.
//!
//! ## Responsibilities
//!
//! - Validate requests and map failures onto gRPC status codes.
//! - Spawn one task per server-streamed / bidirectional call, connected to the
//!   response through a bounded channel for backpressure.
//! - Track open consolidation streams and refuse new ones during shutdown.

use crate::server::{
    config::ServerConfig,
    service::lifecycle::StreamTracker,
    streaming::{
        search::stream_matches,
        session::ConsolidationSession,
        updates::{apply_updates, update_summary},
    },
    telemetry::{increment_requests, increment_stream_errors, record_stream_duration},
};
use core::pin::Pin;
use ordermgmt_tonic_core::{
    Error,
    ordermgmt::{Order, OrderStore},
    proto::{
        self, Acknowledgement, CombinedShipment, OrderId, SearchQuery,
        order_management_server::OrderManagement,
    },
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tonic::{Request, Response, Status, Streaming};

#[cfg(feature = "tracing")]
use tracing::Instrument;

/// The order-management gRPC service.
///
/// Cloning is cheap: clones share the store, the configuration and the stream
/// tracker.
#[derive(Clone)]
pub struct OrderService {
    config: ServerConfig,
    store: OrderStore,
    streams: Arc<StreamTracker>,
}

impl OrderService {
    /// Creates a service over `store`.
    pub fn new(config: ServerConfig, store: OrderStore) -> Self {
        let streams = Arc::new(StreamTracker::new(config.shutdown_timeout));
        Self {
            config,
            store,
            streams,
        }
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    /// Number of `ProcessOrders` streams currently open.
    pub fn streams_inflight(&self) -> usize {
        self.streams.inflight()
    }

    /// Refuses new consolidation streams, drains the open ones and cancels
    /// those still running after the shutdown timeout.
    pub async fn shutdown(&self) {
        self.streams.shutdown().await;
    }
}

#[tonic::async_trait]
impl OrderManagement for OrderService {
    type SearchOrdersStream =
        Pin<Box<dyn Stream<Item = Result<proto::Order, Status>> + Send>>;
    type ProcessOrdersStream =
        Pin<Box<dyn Stream<Item = Result<CombinedShipment, Status>> + Send>>;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(id = %req.get_ref().id)))]
    async fn add_order(
        &self,
        req: Request<proto::Order>,
    ) -> Result<Response<Acknowledgement>, Status> {
        increment_requests();
        let order = Order::try_from(req.into_inner()).inspect_err(|_| increment_stream_errors())?;
        let id = order.id.clone();
        self.store.put(order);

        #[cfg(feature = "tracing")]
        tracing::info!("Order added");

        Ok(Response::new(Acknowledgement {
            message: format!("Order Added: {id}"),
        }))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(id = %req.get_ref().value)))]
    async fn get_order(
        &self,
        req: Request<OrderId>,
    ) -> Result<Response<proto::Order>, Status> {
        increment_requests();
        let OrderId { value: id } = req.into_inner();

        if id.is_empty() {
            increment_stream_errors();
            return Err(Error::InvalidRequest {
                reason: "Order id must not be empty".to_string(),
            }
            .into());
        }

        match self.store.get(&id) {
            Some(order) => Ok(Response::new(order.as_ref().into())),
            None => {
                increment_stream_errors();
                Err(Error::OrderNotFound { id }.into())
            }
        }
    }

    /// Streams every order whose item list contains the query substring.
    ///
    /// Results are produced on a spawned task and pushed through a channel of
    /// `stream_buffer_size`, so a slow reader suspends the producer.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(query = %req.get_ref().query)))]
    async fn search_orders(
        &self,
        req: Request<SearchQuery>,
    ) -> Result<Response<Self::SearchOrdersStream>, Status> {
        increment_requests();
        let SearchQuery { query } = req.into_inner();
        let (resp_tx, resp_rx) = mpsc::channel(self.config.stream_buffer_size);
        let store = self.store.clone();

        let fut = async move {
            match stream_matches(&store, query, resp_tx).await {
                Ok(_sent) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(sent = _sent, "Search complete");
                }
                Err(_e) => {
                    increment_stream_errors();
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Search aborted: {_e}");
                }
            }
        };
        #[cfg(feature = "tracing")]
        let fut = fut.instrument(tracing::info_span!("search"));

        tokio::spawn(fut);

        Ok(Response::new(Box::pin(ReceiverStream::new(resp_rx))))
    }

    /// Upserts each streamed order, replying once the caller half-closes.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    async fn update_orders(
        &self,
        req: Request<Streaming<proto::Order>>,
    ) -> Result<Response<Acknowledgement>, Status> {
        increment_requests();
        let updated = apply_updates(&self.store, req.into_inner())
            .await
            .inspect_err(|_| increment_stream_errors())?;

        Ok(Response::new(Acknowledgement {
            message: update_summary(&updated),
        }))
    }

    /// Opens a bidirectional consolidation stream.
    ///
    /// The session runs on its own task and owns all of its state. The
    /// returned stream ends when the session closes: normally after the final
    /// flush, or with an error status when the session fails.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    async fn process_orders(
        &self,
        req: Request<Streaming<OrderId>>,
    ) -> Result<Response<Self::ProcessOrdersStream>, Status> {
        let start = std::time::Instant::now();
        let guard = self
            .streams
            .try_acquire()
            .inspect_err(|_| increment_stream_errors())?;
        increment_requests();

        let (resp_tx, resp_rx) = mpsc::channel(self.config.stream_buffer_size);
        let session = ConsolidationSession::new(
            req.into_inner(),
            resp_tx,
            self.store.clone(),
            self.config.batch_size,
            self.streams.cancellation_token(),
        );

        let fut = async move {
            // Held until the session has closed and released its state.
            let _guard = guard;
            let result = session.run().await;
            record_stream_duration(start.elapsed().as_millis() as f64);
            match result {
                Ok(_report) => {
                    #[cfg(feature = "tracing")]
                    tracing::info!(
                        received = _report.orders_received,
                        consolidated = _report.orders_consolidated,
                        unknown = _report.unknown_orders,
                        shipments = _report.shipments_sent,
                        "Consolidation stream closed"
                    );
                }
                Err(_e) => {
                    increment_stream_errors();
                    #[cfg(feature = "tracing")]
                    {
                        if _e.is_cancellation() {
                            tracing::info!("Consolidation stream cancelled: {_e}");
                        } else {
                            tracing::warn!("Consolidation stream aborted: {_e}");
                        }
                    }
                }
            }
        };
        #[cfg(feature = "tracing")]
        let fut = fut.instrument(tracing::info_span!("consolidation"));

        tokio::spawn(fut);

        Ok(Response::new(Box::pin(ReceiverStream::new(resp_rx))))
    }
}
