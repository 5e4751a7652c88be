/// A purchase record.
///
/// Orders are immutable once written: an update replaces the whole record in
/// the [`OrderStore`], it never edits one in place. Readers that captured the
/// previous version (for example a shipment batch still being accumulated)
/// keep seeing the version they read.
///
/// [`OrderStore`]: crate::OrderStore
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Order {
    /// Unique key within the store.
    pub id: String,
    /// Line items, in the order they were placed.
    pub items: Vec<String>,
    /// Free-form text. Stored and echoed back, never interpreted.
    pub description: String,
    pub price: f32,
    /// Shipping destination. Orders with equal destinations are consolidated
    /// into the same shipment.
    pub destination: String,
}

impl Order {
    /// Creates an order with an empty description.
    pub fn new<I, S>(
        id: impl Into<String>,
        items: I,
        destination: impl Into<String>,
        price: f32,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            items: items.into_iter().map(Into::into).collect(),
            description: String::new(),
            price,
            destination: destination.into(),
        }
    }

    /// Returns `true` if any line item contains `query` as a substring.
    ///
    /// An empty query matches every order that has at least one item.
    pub fn has_item_matching(&self, query: &str) -> bool {
        self.items.iter().any(|item| item.contains(query))
    }
}
