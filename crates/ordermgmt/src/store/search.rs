use crate::{Order, OrderStore};
use std::{sync::Arc, vec};

/// Lazy iterator returned by [`OrderStore::search`].
///
/// Holds a snapshot of candidate ids and takes the store's read lock only for
/// the duration of each single lookup, so it can be drained across `.await`
/// points without blocking writers.
pub struct Search<P> {
    store: OrderStore,
    keys: vec::IntoIter<String>,
    predicate: P,
}

impl<P> Search<P> {
    pub(crate) fn new(store: OrderStore, keys: Vec<String>, predicate: P) -> Self {
        Self {
            store,
            keys: keys.into_iter(),
            predicate,
        }
    }
}

impl<P> Iterator for Search<P>
where
    P: FnMut(&Order) -> bool,
{
    type Item = Arc<Order>;

    fn next(&mut self) -> Option<Self::Item> {
        for key in self.keys.by_ref() {
            let Some(order) = self.store.get(&key) else {
                continue;
            };
            if (self.predicate)(&order) {
                return Some(order);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.keys.len()))
    }
}
