use crate::{Order, OrderStore};

/// The five demo orders the server seeds when `SEED_SAMPLE_DATA` is set.
///
/// Ids `102`, `104` and `106` ship to Mountain View, `103` and `105` to San
/// Jose.
pub fn sample_orders() -> Vec<Order> {
    vec![
        Order::new(
            "102",
            ["Google Pixel 3A", "Mac Book Pro"],
            "Mountain View, CA",
            1800.00,
        ),
        Order::new("103", ["Apple Watch S4"], "San Jose, CA", 400.00),
        Order::new(
            "104",
            ["Google Home Mini", "Google Nest Hub"],
            "Mountain View, CA",
            400.00,
        ),
        Order::new("105", ["Amazon Echo"], "San Jose, CA", 30.00),
        Order::new(
            "106",
            ["Amazon Echo", "Apple iPhone XS"],
            "Mountain View, CA",
            300.00,
        ),
    ]
}

impl OrderStore {
    /// Creates a store seeded with [`sample_orders`].
    pub fn with_sample_data() -> Self {
        Self::with_orders(sample_orders())
    }
}
