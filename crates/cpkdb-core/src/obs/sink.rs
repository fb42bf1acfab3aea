//! Metrics sink boundary.
//!
//! Core logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics::{self, COUNTERS, add};
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = const { RefCell::new(None) };
}

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Delete,
    BulkUpdate,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    EntityRegistered {
        entity_path: &'static str,
        composite: bool,
    },
    PredicateRewritten {
        entity_path: &'static str,
        leaves_rewritten: u64,
    },
    OrderingRewritten {
        entity_path: &'static str,
        items_expanded: u64,
    },
    LookupRejected {
        entity_path: &'static str,
    },
    ExecStart {
        kind: ExecKind,
        entity_path: &'static str,
    },
    ExecFinish {
        kind: ExecKind,
        entity_path: &'static str,
        rows_touched: u64,
    },
    BatchExecuted {
        entity_path: &'static str,
        rows: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default process-wide sink that writes into the global counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        let c = &COUNTERS;

        match event {
            MetricsEvent::EntityRegistered { composite, .. } => {
                add(&c.entities_registered, 1);
                if composite {
                    add(&c.composite_entities, 1);
                }
            }
            MetricsEvent::PredicateRewritten {
                leaves_rewritten, ..
            } => {
                add(&c.predicates_rewritten, 1);
                add(&c.leaves_rewritten, leaves_rewritten);
            }
            MetricsEvent::OrderingRewritten { .. } => add(&c.orderings_rewritten, 1),
            MetricsEvent::LookupRejected { .. } => add(&c.lookups_rejected, 1),
            MetricsEvent::ExecStart { kind, .. } => match kind {
                ExecKind::Delete => add(&c.delete_calls, 1),
                ExecKind::BulkUpdate => add(&c.bulk_update_calls, 1),
            },
            MetricsEvent::ExecFinish {
                kind, rows_touched, ..
            } => match kind {
                ExecKind::Delete => add(&c.rows_deleted, rows_touched),
                ExecKind::BulkUpdate => add(&c.rows_updated, rows_touched),
            },
            MetricsEvent::BatchExecuted { .. } => add(&c.bulk_update_batches, 1),
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // - `ptr` was produced from a valid `&dyn MetricsSink` in `with_metrics_sink`.
        // - `with_metrics_sink` restores the previous pointer before returning,
        //   including unwind paths via `Guard::drop`.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the process-wide counters.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all process-wide counters.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - `sink_ptr` is installed only for this dynamic scope.
    // - `Guard` restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists `sink_ptr`.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}

///
/// Span
/// RAII guard that emits start/finish events for one executor call.
/// Finish accounting happens even on early return.
///

pub(crate) struct Span {
    kind: ExecKind,
    entity_path: &'static str,
    rows: u64,
}

impl Span {
    #[must_use]
    pub(crate) fn new(kind: ExecKind, entity_path: &'static str) -> Self {
        record(MetricsEvent::ExecStart { kind, entity_path });

        Self {
            kind,
            entity_path,
            rows: 0,
        }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        record(MetricsEvent::ExecFinish {
            kind: self.kind,
            entity_path: self.entity_path,
            rows_touched: self.rows,
        });
    }
}
