use ordermgmt_tonic_core::{
    Error,
    ordermgmt::{Order, OrderStore},
    proto,
};
use tokio_stream::{Stream, StreamExt};
use tonic::Status;

/// Upserts every order read from `inbound` until the caller half-closes.
///
/// Each order is written as soon as it arrives, so an error part-way through
/// leaves the earlier upserts in place. Returns the updated ids in arrival
/// order.
///
/// # Errors
///
/// - [`Error::InvalidRequest`] if an order has an empty id.
/// - [`Error::StreamTransport`] / [`Error::RequestCancelled`] if receiving
///   fails.
pub async fn apply_updates<S>(
    store: &OrderStore,
    mut inbound: S,
) -> ordermgmt_tonic_core::Result<Vec<String>>
where
    S: Stream<Item = Result<proto::Order, Status>> + Unpin,
{
    let mut updated = Vec::new();

    while let Some(message) = inbound.next().await {
        let order = Order::try_from(message.map_err(|status| Error::from_inbound(&status))?)?;

        #[cfg(feature = "tracing")]
        tracing::info!(id = %order.id, "Order updated");

        updated.push(order.id.clone());
        store.put(order);
    }

    Ok(updated)
}

/// Summary line sent back once an update stream completes.
pub fn update_summary(updated: &[String]) -> String {
    format!("Updated Order IDs: {}", updated.join(", "))
}
