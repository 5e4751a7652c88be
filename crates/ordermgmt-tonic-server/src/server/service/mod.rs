//! gRPC service implementation and stream lifecycle.
//!
//! ## Structure
//!
//! - [`handler`] - `OrderService`, the `OrderManagement` entry point.
//! - [`lifecycle`] - in-flight stream tracking used for graceful shutdown.

pub mod handler;
pub mod lifecycle;
