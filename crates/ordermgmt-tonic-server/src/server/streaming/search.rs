use super::OrderSender;
use ordermgmt_tonic_core::{Error, ordermgmt::OrderStore, proto};

/// Forwards every order with an item containing `query` to `resp_tx`.
///
/// Matches are pulled lazily from the store, one lookup per candidate, so the
/// store lock is never held while waiting on the client. Each order is sent at
/// most once, however many of its items match.
///
/// Returns the number of orders sent.
///
/// # Errors
///
/// Returns [`Error::ChannelError`] if the client stops listening mid-stream.
pub async fn stream_matches(
    store: &OrderStore,
    query: String,
    resp_tx: OrderSender,
) -> ordermgmt_tonic_core::Result<usize> {
    let mut sent = 0;

    for order in store.search(move |order| order.has_item_matching(&query)) {
        #[cfg(feature = "tracing")]
        tracing::debug!(id = %order.id, "Matching order found");

        if let Err(e) = resp_tx.send(Ok(proto::Order::from(order.as_ref()))).await {
            return Err(Error::ChannelError {
                context: format!("Failed to forward search result: {e}"),
            });
        }
        sent += 1;
    }

    Ok(sent)
}
