use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

///
/// EventReport
/// Point-in-time copy of the process-wide counters.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    // Registration
    pub entities_registered: u64,
    pub composite_entities: u64,

    // Rewriting
    pub predicates_rewritten: u64,
    pub leaves_rewritten: u64,
    pub orderings_rewritten: u64,
    pub lookups_rejected: u64,

    // Execution
    pub delete_calls: u64,
    pub bulk_update_calls: u64,
    pub bulk_update_batches: u64,
    pub rows_deleted: u64,
    pub rows_updated: u64,
}

///
/// Counters
/// Lock-free process-wide counters; readers only ever see totals.
///

pub(crate) struct Counters {
    pub(crate) entities_registered: AtomicU64,
    pub(crate) composite_entities: AtomicU64,
    pub(crate) predicates_rewritten: AtomicU64,
    pub(crate) leaves_rewritten: AtomicU64,
    pub(crate) orderings_rewritten: AtomicU64,
    pub(crate) lookups_rejected: AtomicU64,
    pub(crate) delete_calls: AtomicU64,
    pub(crate) bulk_update_calls: AtomicU64,
    pub(crate) bulk_update_batches: AtomicU64,
    pub(crate) rows_deleted: AtomicU64,
    pub(crate) rows_updated: AtomicU64,
}

pub(crate) static COUNTERS: Counters = Counters {
    entities_registered: AtomicU64::new(0),
    composite_entities: AtomicU64::new(0),
    predicates_rewritten: AtomicU64::new(0),
    leaves_rewritten: AtomicU64::new(0),
    orderings_rewritten: AtomicU64::new(0),
    lookups_rejected: AtomicU64::new(0),
    delete_calls: AtomicU64::new(0),
    bulk_update_calls: AtomicU64::new(0),
    bulk_update_batches: AtomicU64::new(0),
    rows_deleted: AtomicU64::new(0),
    rows_updated: AtomicU64::new(0),
};

pub(crate) fn add(counter: &AtomicU64, n: u64) {
    counter.fetch_add(n, Ordering::Relaxed);
}

impl Counters {
    fn all(&self) -> [&AtomicU64; 11] {
        [
            &self.entities_registered,
            &self.composite_entities,
            &self.predicates_rewritten,
            &self.leaves_rewritten,
            &self.orderings_rewritten,
            &self.lookups_rejected,
            &self.delete_calls,
            &self.bulk_update_calls,
            &self.bulk_update_batches,
            &self.rows_deleted,
            &self.rows_updated,
        ]
    }
}

pub(crate) fn report() -> EventReport {
    let c = &COUNTERS;
    let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

    EventReport {
        entities_registered: load(&c.entities_registered),
        composite_entities: load(&c.composite_entities),
        predicates_rewritten: load(&c.predicates_rewritten),
        leaves_rewritten: load(&c.leaves_rewritten),
        orderings_rewritten: load(&c.orderings_rewritten),
        lookups_rejected: load(&c.lookups_rejected),
        delete_calls: load(&c.delete_calls),
        bulk_update_calls: load(&c.bulk_update_calls),
        bulk_update_batches: load(&c.bulk_update_batches),
        rows_deleted: load(&c.rows_deleted),
        rows_updated: load(&c.rows_updated),
    }
}

pub(crate) fn reset_all() {
    for counter in COUNTERS.all() {
        counter.store(0, Ordering::Relaxed);
    }
}
