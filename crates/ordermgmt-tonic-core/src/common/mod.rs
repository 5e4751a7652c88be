//! Shared protocol types, conversions, and error definitions.
//!
//! ## Submodules
//!
//! - [`proto`] - Generated Protobuf messages, client, and server traits.
//! - [`error`] - Service error type and its mapping onto [`tonic::Status`].
//! - [`convert`] - Conversions between wire messages and [`ordermgmt`] types.

pub mod convert;
pub mod error;

pub use error::*;

/// gRPC service and message definitions generated from
/// `proto/order_management.proto`.
///
/// ## Service
///
/// - `AddOrder` / `GetOrder` - unary CRUD.
/// - `SearchOrders` - server-streamed search results.
/// - `UpdateOrders` - client-streamed bulk upsert.
/// - `ProcessOrders` - bidirectional order-id to shipment consolidation.
pub mod proto {
    tonic::include_proto!("order_management");

    /// Encoded descriptor set, registered with the reflection service.
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("order_management_descriptor");
}
