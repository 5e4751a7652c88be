//! Error types for the order-management service.
//!
//! [`Error`] captures every reportable failure of a single RPC invocation.
//! None of them outlive the call that raised them, and none of them leave the
//! shared order store in a partial state. `From<Error>` for [`tonic::Status`]
//! gives each case its gRPC status code.
//!
//! ## Error Cases
//! - `OrderNotFound`: a unary lookup named an id that is not stored.
//! - `InvalidRequest`: the request was structurally invalid.
//! - `StreamTransport`: receiving from an open stream failed for a reason
//!   other than the caller's end-of-input.
//! - `ChannelError`: an outbound message could not be handed to the transport.
//! - `RequestCancelled`: the caller went away mid-stream.
//! - `ServiceShutdown`: the service is draining and refuses the work.

use tonic::{Code, Status};

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the order-management service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The requested order id is not in the store.
    #[error("Order does not exist: {id}")]
    OrderNotFound { id: String },

    /// The client request was malformed.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Receiving from the inbound half of a stream failed.
    #[error("Stream transport failure ({code:?}): {message}")]
    StreamTransport { code: Code, message: String },

    /// Handing a message to the outbound half of a stream failed.
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// The client aborted the request.
    #[error("Request cancelled by client")]
    RequestCancelled,

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl Error {
    /// Classifies a status received from the inbound half of a stream.
    ///
    /// A `Cancelled` status means the caller aborted; anything else is a
    /// transport failure.
    pub fn from_inbound(status: &Status) -> Self {
        match status.code() {
            Code::Cancelled => Self::RequestCancelled,
            code => Self::StreamTransport {
                code,
                message: status.message().to_owned(),
            },
        }
    }

    /// Returns `true` when the failure was caused by the caller going away or
    /// by service shutdown rather than by a fault.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::RequestCancelled | Self::ServiceShutdown)
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::OrderNotFound { id } => {
                Status::not_found(format!("Order does not exist: {id}"))
            }
            Error::InvalidRequest { reason } => Status::invalid_argument(reason),
            Error::StreamTransport { code, message } => match code {
                Code::Ok | Code::Unknown => Status::internal(message),
                code => Status::new(code, message),
            },
            Error::ChannelError { context } => {
                Status::internal(format!("Channel error: {context}"))
            }
            Error::RequestCancelled => Status::cancelled("Request was cancelled"),
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_onto_grpc_codes() {
        let cases = [
            (Error::OrderNotFound { id: "9".into() }, Code::NotFound),
            (
                Error::InvalidRequest {
                    reason: "empty id".into(),
                },
                Code::InvalidArgument,
            ),
            (
                Error::ChannelError {
                    context: "closed".into(),
                },
                Code::Internal,
            ),
            (Error::RequestCancelled, Code::Cancelled),
            (Error::ServiceShutdown, Code::Unavailable),
            (
                Error::StreamTransport {
                    code: Code::DataLoss,
                    message: "reset".into(),
                },
                Code::DataLoss,
            ),
            (
                Error::StreamTransport {
                    code: Code::Unknown,
                    message: "h2".into(),
                },
                Code::Internal,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(Status::from(err).code(), code);
        }
    }

    #[test]
    fn not_found_names_the_id() {
        let status = Status::from(Error::OrderNotFound { id: "404".into() });
        assert_eq!(status.message(), "Order does not exist: 404");
    }

    #[test]
    fn inbound_cancel_is_a_cancellation() {
        let err = Error::from_inbound(&Status::cancelled("gone"));
        assert_eq!(err, Error::RequestCancelled);
        assert!(err.is_cancellation());

        let err = Error::from_inbound(&Status::aborted("broken pipe"));
        assert!(!err.is_cancellation());
        assert!(matches!(
            err,
            Error::StreamTransport {
                code: Code::Aborted,
                ..
            }
        ));
    }
}
