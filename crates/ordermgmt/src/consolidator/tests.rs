use crate::{
    AccumulateStatus, DEFAULT_BATCH_SIZE, Order, OrderLookup, OrderStore, ShipmentBatch,
    ShipmentConsolidator,
};
use std::{collections::HashMap, sync::Arc};

const MV: &str = "Mountain View, CA";
const SJ: &str = "San Jose, CA";

/// Fixed lookup table, no locking involved.
struct MockLookup {
    orders: HashMap<String, Arc<Order>>,
}

impl MockLookup {
    fn new(orders: impl IntoIterator<Item = Order>) -> Self {
        Self {
            orders: orders
                .into_iter()
                .map(|order| (order.id.clone(), Arc::new(order)))
                .collect(),
        }
    }
}

impl OrderLookup for MockLookup {
    fn lookup(&self, id: &str) -> Option<Arc<Order>> {
        self.orders.get(id).cloned()
    }
}

fn ids(batch: &ShipmentBatch) -> Vec<&str> {
    batch.order_ids().collect()
}

fn find<'a>(batches: &'a [ShipmentBatch], destination: &str) -> &'a ShipmentBatch {
    batches
        .iter()
        .find(|batch| batch.destination() == destination)
        .unwrap_or_else(|| panic!("no batch for {destination}"))
}

fn scenario_store() -> OrderStore {
    let store = OrderStore::with_sample_data();
    store.put(Order::new("101", ["IPhone XS", "Mac Book Pro"], SJ, 2300.00));
    store
}

#[test]
fn concrete_scenario_flushes_on_third_order_then_on_end_of_input() {
    let store = scenario_store();
    let mut consolidator = ShipmentConsolidator::new(3);

    assert_eq!(
        consolidator.accumulate(&store, "102"),
        AccumulateStatus::Buffered { pending: 1 }
    );
    assert_eq!(
        consolidator.accumulate(&store, "103"),
        AccumulateStatus::Buffered { pending: 2 }
    );

    let batches = consolidator.accumulate(&store, "104").into_batches();
    assert_eq!(batches.len(), 2);

    let mv = find(&batches, MV);
    assert_eq!(mv.id(), "cmb-Mountain View, CA");
    assert_eq!(mv.status(), "Processed!");
    assert_eq!(ids(mv), vec!["102", "104"]);

    let sj = find(&batches, SJ);
    assert_eq!(sj.id(), "cmb-San Jose, CA");
    assert_eq!(ids(sj), vec!["103"]);

    assert!(consolidator.is_empty());
    assert_eq!(consolidator.pending(), 0);

    assert_eq!(
        consolidator.accumulate(&store, "101"),
        AccumulateStatus::Buffered { pending: 1 }
    );
    let tail = consolidator.flush_all();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].destination(), SJ);
    assert_eq!(ids(&tail[0]), vec!["101"]);
}

#[test]
fn trigger_counts_orders_across_destinations() {
    let lookup = MockLookup::new([
        Order::new("a1", ["x"], "A", 1.0),
        Order::new("a2", ["x"], "A", 1.0),
        Order::new("b1", ["x"], "B", 1.0),
    ]);
    let mut consolidator = ShipmentConsolidator::new(3);

    assert!(consolidator.accumulate(&lookup, "a1").into_batches().is_empty());
    assert!(consolidator.accumulate(&lookup, "a2").into_batches().is_empty());

    let batches = consolidator.accumulate(&lookup, "b1").into_batches();
    assert_eq!(batches.len(), 2);
    assert_eq!(find(&batches, "A").len(), 2);
    assert_eq!(find(&batches, "B").len(), 1);
}

#[test]
fn flush_order_follows_first_sighting_of_destination() {
    let lookup = MockLookup::new([
        Order::new("1", ["x"], "C", 1.0),
        Order::new("2", ["x"], "A", 1.0),
        Order::new("3", ["x"], "B", 1.0),
        Order::new("4", ["x"], "A", 1.0),
    ]);
    let mut consolidator = ShipmentConsolidator::new(4);
    for id in ["1", "2", "3"] {
        consolidator.accumulate(&lookup, id);
    }
    let batches = consolidator.accumulate(&lookup, "4").into_batches();
    let destinations: Vec<&str> = batches.iter().map(ShipmentBatch::destination).collect();
    assert_eq!(destinations, vec!["C", "A", "B"]);
}

#[test]
fn flush_all_is_complete_and_idempotent() {
    let store = scenario_store();
    let mut consolidator = ShipmentConsolidator::new(10);
    for id in ["102", "103", "104", "105"] {
        consolidator.accumulate(&store, id);
    }

    let batches = consolidator.flush_all();
    assert_eq!(batches.iter().map(ShipmentBatch::len).sum::<usize>(), 4);
    assert!(consolidator.is_empty());
    assert_eq!(consolidator.pending(), 0);

    assert!(consolidator.flush_all().is_empty());
}

#[test]
fn flush_all_on_fresh_consolidator_is_empty() {
    let mut consolidator = ShipmentConsolidator::default();
    assert_eq!(consolidator.batch_size(), DEFAULT_BATCH_SIZE);
    assert!(consolidator.flush_all().is_empty());
}

#[test]
fn unknown_ids_are_skipped_and_not_counted() {
    let store = scenario_store();
    let mut consolidator = ShipmentConsolidator::new(2);

    assert!(consolidator.accumulate(&store, "102").into_batches().is_empty());
    assert!(consolidator.accumulate(&store, "nope").is_skipped());
    assert!(consolidator.accumulate(&store, "").is_skipped());
    assert_eq!(consolidator.pending(), 1);

    let batches = consolidator.accumulate(&store, "103").into_batches();
    let all: Vec<&str> = batches.iter().flat_map(|batch| batch.order_ids()).collect();
    assert_eq!(all.len(), 2);
    assert!(!all.contains(&"nope"));
}

#[test]
fn orders_within_a_destination_keep_arrival_order() {
    let lookup = MockLookup::new((0..6).map(|n| Order::new(n.to_string(), ["x"], "A", 1.0)));
    let mut consolidator = ShipmentConsolidator::new(100);
    for id in ["5", "1", "3", "0", "4", "2"] {
        consolidator.accumulate(&lookup, id);
    }
    let batches = consolidator.flush_all();
    assert_eq!(batches.len(), 1);
    assert_eq!(ids(&batches[0]), vec!["5", "1", "3", "0", "4", "2"]);
}

#[test]
fn every_resolvable_id_is_emitted_exactly_once_in_its_destination() {
    let destinations = ["A", "B", "C", "D"];
    let lookup = MockLookup::new(
        (0..40).map(|n| Order::new(n.to_string(), ["x"], destinations[(n * 7) % 4], 1.0)),
    );

    for batch_size in 1..=7 {
        let mut consolidator = ShipmentConsolidator::new(batch_size);
        let mut emitted = Vec::new();
        let mut fed = Vec::new();

        // Feed known and unknown ids interleaved.
        for n in 0..50 {
            let id = ((n * 13) % 50).to_string();
            if n % 5 == 0 {
                consolidator.accumulate(&lookup, &format!("missing-{n}"));
            }
            if (id.parse::<usize>().unwrap()) < 40 {
                fed.push(id.clone());
            }
            emitted.extend(consolidator.accumulate(&lookup, &id).into_batches());
        }
        emitted.extend(consolidator.flush_all());

        let mut seen = Vec::new();
        for batch in &emitted {
            assert!(!batch.is_empty());
            for order in batch.orders() {
                assert_eq!(order.destination, batch.destination());
                seen.push(order.id.clone());
            }
        }
        seen.sort();
        fed.sort();
        assert_eq!(seen, fed, "batch_size {batch_size}");
    }
}

#[test]
fn batches_hold_the_version_read_at_accumulate_time() {
    let store = scenario_store();
    let mut consolidator = ShipmentConsolidator::new(5);
    consolidator.accumulate(&store, "105");
    store.put(Order::new("105", ["Amazon Echo Dot"], SJ, 25.0));

    let batches = consolidator.flush_all();
    assert_eq!(batches[0].orders()[0].items, vec!["Amazon Echo".to_string()]);
}

#[test]
fn zero_batch_size_is_treated_as_one() {
    let store = scenario_store();
    let mut consolidator = ShipmentConsolidator::new(0);
    assert_eq!(consolidator.batch_size(), 1);
    assert_eq!(consolidator.accumulate(&store, "102").into_batches().len(), 1);
}

#[test]
fn discard_drops_everything_without_emitting() {
    let store = scenario_store();
    let mut consolidator = ShipmentConsolidator::new(10);
    for id in ["102", "103", "104"] {
        consolidator.accumulate(&store, id);
    }
    assert_eq!(consolidator.discard(), 3);
    assert!(consolidator.is_empty());
    assert!(consolidator.flush_all().is_empty());
}
