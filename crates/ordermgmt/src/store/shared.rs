use crate::{Order, OrderLookup, Search};
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// The shared mapping from order id to [`Order`].
///
/// `OrderStore` is a cheap, cloneable handle: every clone points at the same
/// map, so the server constructs one at startup and hands a clone to each
/// handler. All access goes through a single reader-writer lock, and every
/// critical section is a plain map operation, so a writer is never observed
/// half-applied and the lock is never held across an `.await`.
///
/// Records are stored behind [`Arc`]. An upsert swaps the pointer, which lets
/// readers keep the exact version they looked up without copying it.
///
/// There is no delete operation.
#[derive(Clone, Debug, Default)]
pub struct OrderStore {
    orders: Arc<RwLock<HashMap<String, Arc<Order>>>>,
}

impl OrderStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `orders`. Later duplicates win.
    pub fn with_orders<I>(orders: I) -> Self
    where
        I: IntoIterator<Item = Order>,
    {
        let orders = orders
            .into_iter()
            .map(|order| (order.id.clone(), Arc::new(order)))
            .collect();
        Self {
            orders: Arc::new(RwLock::new(orders)),
        }
    }

    /// Inserts or replaces the order keyed by `order.id`, returning the
    /// previous version if there was one.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all, fields(id = %order.id)))]
    pub fn put(&self, order: Order) -> Option<Arc<Order>> {
        let key = order.id.clone();
        let order = Arc::new(order);
        self.orders.write().insert(key, order)
    }

    /// Returns the order stored under `id`.
    pub fn get(&self, id: &str) -> Option<Arc<Order>> {
        self.orders.read().get(id).cloned()
    }

    /// Returns a lazy iterator over every order accepted by `predicate`.
    ///
    /// The set of candidate ids is captured when this is called; each order
    /// is then read from the store only when the iterator reaches it. Orders
    /// upserted afterwards are seen in their latest version, orders added
    /// afterwards are not visited. Iteration order is unspecified.
    pub fn search<P>(&self, predicate: P) -> Search<P>
    where
        P: FnMut(&Order) -> bool,
    {
        let keys: Vec<String> = self.orders.read().keys().cloned().collect();
        Search::new(self.clone(), keys, predicate)
    }

    /// Number of stored orders.
    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}

impl OrderLookup for OrderStore {
    fn lookup(&self, id: &str) -> Option<Arc<Order>> {
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_upserts_and_returns_previous() {
        let store = OrderStore::new();
        assert!(store.put(Order::new("1", ["a"], "MV", 1.0)).is_none());

        let previous = store.put(Order::new("1", ["b"], "SJ", 2.0)).unwrap();
        assert_eq!(previous.destination, "MV");
        assert_eq!(store.get("1").unwrap().destination, "SJ");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_missing_is_none() {
        let store = OrderStore::new();
        assert!(store.get("404").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn clones_share_the_same_map() {
        let store = OrderStore::new();
        let other = store.clone();
        other.put(Order::new("7", ["a"], "MV", 1.0));
        assert!(store.get("7").is_some());
    }

    #[test]
    fn readers_keep_the_version_they_read() {
        let store = OrderStore::with_orders([Order::new("1", ["a"], "MV", 1.0)]);
        let before = store.get("1").unwrap();
        store.put(Order::new("1", ["b"], "SJ", 2.0));
        assert_eq!(before.destination, "MV");
        assert_eq!(store.get("1").unwrap().destination, "SJ");
    }

    #[test]
    fn search_filters_and_sees_latest_versions() {
        let store = OrderStore::with_orders(sample_orders_for_search());
        let mut found: Vec<String> = store
            .search(|order| order.has_item_matching("Google"))
            .map(|order| order.id.clone())
            .collect();
        found.sort();
        assert_eq!(found, vec!["1", "3"]);

        let mut search = store.search(|order| order.has_item_matching("Google"));
        store.put(Order::new("1", ["Apple"], "MV", 1.0));
        store.put(Order::new("9", ["Google TV"], "MV", 1.0));
        let first = search.next().unwrap();
        assert_eq!(first.id, "3");
        assert!(search.next().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_are_all_visible() {
        let store = OrderStore::new();
        let mut handles = Vec::new();
        for task in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for n in 0..100 {
                    let id = format!("{task}-{n}");
                    store.put(Order::new(id.clone(), ["x"], "MV", n as f32));
                    assert_eq!(store.get(&id).unwrap().id, id);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.len(), 800);
    }

    fn sample_orders_for_search() -> Vec<Order> {
        vec![
            Order::new("1", ["Google Pixel"], "MV", 1.0),
            Order::new("2", ["Apple Watch"], "SJ", 1.0),
            Order::new("3", ["Google Home", "Google Nest"], "MV", 1.0),
        ]
    }
}
