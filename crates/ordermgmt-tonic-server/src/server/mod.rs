//! Server-side components of the order-management service.
//!
//! ## Submodules
//!
//! - [`config`] - CLI / environment configuration.
//! - [`service`] - The `OrderManagement` gRPC service and stream lifecycle
//!   tracking for graceful shutdown.
//! - [`streaming`] - Per-stream logic: the consolidation session state
//!   machine, lazy search streaming and bulk updates.
//! - [`telemetry`] - Logging, tracing and metrics initialization.

pub mod config;
pub mod service;
pub mod streaming;
pub mod telemetry;
