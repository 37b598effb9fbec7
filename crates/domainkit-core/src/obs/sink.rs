//! Metrics sink boundary.
//!
//! Factory and repository logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between execution logic
//! and the thread-local metrics state.
use crate::{obs::metrics, traits::Path};
use std::{
    cell::{Cell, RefCell},
    marker::PhantomData,
    rc::Rc,
};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
    static SPAN_DEPTH: Cell<u32> = const { Cell::new(0) };
}

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Load,
    Exists,
    Save,
    Delete,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    FactoryCreate {
        path: &'static str,
    },
    FactoryReference {
        path: &'static str,
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
    RowsScanned {
        entity_path: &'static str,
        rows_scanned: u64,
    },
    DuplicateRejected {
        entity_path: &'static str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::FactoryCreate { path } => {
                metrics::with_state_mut(|m| {
                    m.ops.objects_created = m.ops.objects_created.saturating_add(1);
                    let entry = m.entities.entry(path.to_string()).or_default();
                    entry.objects_created = entry.objects_created.saturating_add(1);
                });
            }

            MetricsEvent::FactoryReference { path } => {
                metrics::with_state_mut(|m| {
                    m.ops.references_created = m.ops.references_created.saturating_add(1);
                    let entry = m.entities.entry(path.to_string()).or_default();
                    entry.references_created = entry.references_created.saturating_add(1);
                });
            }

            MetricsEvent::ExecStart { kind, entity_path } => {
                metrics::with_state_mut(|m| {
                    let entry = m.entities.entry(entity_path.to_string()).or_default();
                    match kind {
                        ExecKind::Load => {
                            m.ops.load_calls = m.ops.load_calls.saturating_add(1);
                            entry.load_calls = entry.load_calls.saturating_add(1);
                        }
                        ExecKind::Exists => {
                            m.ops.exists_calls = m.ops.exists_calls.saturating_add(1);
                            entry.exists_calls = entry.exists_calls.saturating_add(1);
                        }
                        ExecKind::Save => {
                            m.ops.save_calls = m.ops.save_calls.saturating_add(1);
                            entry.save_calls = entry.save_calls.saturating_add(1);
                        }
                        ExecKind::Delete => {
                            m.ops.delete_calls = m.ops.delete_calls.saturating_add(1);
                            entry.delete_calls = entry.delete_calls.saturating_add(1);
                        }
                    }
                });
            }

            MetricsEvent::ExecFinish {
                kind,
                entity_path,
                rows_touched,
            } => {
                metrics::with_state_mut(|m| {
                    let entry = m.entities.entry(entity_path.to_string()).or_default();
                    match kind {
                        ExecKind::Load => {
                            m.ops.rows_loaded = m.ops.rows_loaded.saturating_add(rows_touched);
                            entry.rows_loaded = entry.rows_loaded.saturating_add(rows_touched);
                        }
                        ExecKind::Save => {
                            m.ops.rows_saved = m.ops.rows_saved.saturating_add(rows_touched);
                            entry.rows_saved = entry.rows_saved.saturating_add(rows_touched);
                        }
                        ExecKind::Delete => {
                            m.ops.rows_deleted = m.ops.rows_deleted.saturating_add(rows_touched);
                            entry.rows_deleted = entry.rows_deleted.saturating_add(rows_touched);
                        }
                        ExecKind::Exists => {}
                    }
                });
            }

            MetricsEvent::RowsScanned {
                entity_path,
                rows_scanned,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.rows_scanned = m.ops.rows_scanned.saturating_add(rows_scanned);
                    let entry = m.entities.entry(entity_path.to_string()).or_default();
                    entry.rows_scanned = entry.rows_scanned.saturating_add(rows_scanned);
                });
            }

            MetricsEvent::DuplicateRejected { entity_path } => {
                metrics::with_state_mut(|m| {
                    m.ops.duplicates_rejected = m.ops.duplicates_rejected.saturating_add(1);
                    let entry = m.entities.entry(entity_path.to_string()).or_default();
                    entry.duplicates_rejected = entry.duplicates_rejected.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    // Clone out of the slot so a sink may itself record without a double borrow.
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
///
/// The previous sink (if any) is restored when the closure returns or
/// unwinds; overrides nest.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

/// Span
/// RAII guard that emits start/finish metrics events for one repository call.
/// Ensures finish accounting happens even on early return.
/// Only the outermost span on a thread is recorded, so a call made on behalf
/// of another (the `find` behind `exists`) is not counted twice.

pub(crate) struct Span<E: Path> {
    kind: ExecKind,
    rows: u64,
    outermost: bool,
    _marker: PhantomData<E>,
}

impl<E: Path> Span<E> {
    #[must_use]
    /// Start a metrics span for a specific entity and operation kind.
    pub(crate) fn new(kind: ExecKind) -> Self {
        let outermost = SPAN_DEPTH.with(|depth| {
            let current = depth.get();
            depth.set(current.saturating_add(1));
            current == 0
        });

        if outermost {
            record(MetricsEvent::ExecStart {
                kind,
                entity_path: E::PATH,
            });
        }

        Self {
            kind,
            rows: 0,
            outermost,
            _marker: PhantomData,
        }
    }

    pub(crate) fn set_rows(&mut self, rows: usize) {
        self.rows = u64::try_from(rows).unwrap_or(u64::MAX);
    }
}

impl<E: Path> Drop for Span<E> {
    fn drop(&mut self) {
        SPAN_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));

        if self.outermost {
            record(MetricsEvent::ExecFinish {
                kind: self.kind,
                entity_path: E::PATH,
                rows_touched: self.rows,
            });
        }
    }
}

/// Record rows examined while answering one call.
pub(crate) fn record_rows_scanned<E: Path>(rows_scanned: usize) {
    record(MetricsEvent::RowsScanned {
        entity_path: E::PATH,
        rows_scanned: u64::try_from(rows_scanned).unwrap_or(u64::MAX),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::Cell,
        panic::{AssertUnwindSafe, catch_unwind},
    };

    #[derive(Default)]
    struct CountingSink {
        calls: Cell<usize>,
    }

    impl MetricsSink for CountingSink {
        fn record(&self, _: MetricsEvent) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    fn clear_override() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });
    }

    const EVENT: MetricsEvent = MetricsEvent::FactoryCreate {
        path: "obs::tests::Object",
    };

    #[test]
    fn with_metrics_sink_routes_and_restores_nested_overrides() {
        clear_override();

        let outer = Rc::new(CountingSink::default());
        let inner = Rc::new(CountingSink::default());

        // No override installed yet.
        record(EVENT);
        assert_eq!(outer.calls.get(), 0);

        with_metrics_sink(outer.clone(), || {
            record(EVENT);
            assert_eq!(outer.calls.get(), 1);

            with_metrics_sink(inner.clone(), || record(EVENT));

            // Inner override was restored to outer override.
            record(EVENT);
        });

        assert_eq!(outer.calls.get(), 2);
        assert_eq!(inner.calls.get(), 1);

        // Outer override was restored to previous (none).
        SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));

        record(EVENT);
        assert_eq!(outer.calls.get(), 2);
    }

    #[test]
    fn with_metrics_sink_restores_override_on_panic() {
        clear_override();

        let sink = Rc::new(CountingSink::default());
        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_metrics_sink(sink.clone(), || {
                record(EVENT);
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();

        assert!(panicked);
        assert_eq!(sink.calls.get(), 1);
        SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));
    }

    #[test]
    fn span_records_start_and_finish_with_rows() {
        struct Probe;
        impl Path for Probe {
            const PATH: &'static str = "obs::tests::Probe";
        }

        clear_override();
        metrics_reset_all();

        {
            let mut span = Span::<Probe>::new(ExecKind::Load);
            span.set_rows(3);
        }
        record_rows_scanned::<Probe>(7);

        let report = metrics_report();
        assert_eq!(report.ops.load_calls, 1);
        assert_eq!(report.ops.rows_loaded, 3);
        assert_eq!(report.ops.rows_scanned, 7);

        let entity = report
            .entity("obs::tests::Probe")
            .expect("entity summary should be present");
        assert_eq!(entity.counters.load_calls, 1);
        assert!((entity.avg_rows_per_load - 3.0).abs() < f64::EPSILON);
        assert!((entity.avg_rows_scanned_per_load - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nested_spans_are_not_counted() {
        struct Nested;
        impl Path for Nested {
            const PATH: &'static str = "obs::tests::Nested";
        }

        clear_override();
        metrics_reset_all();

        {
            let _outer = Span::<Nested>::new(ExecKind::Exists);
            let mut inner = Span::<Nested>::new(ExecKind::Load);
            inner.set_rows(1);
        }
        {
            let mut after = Span::<Nested>::new(ExecKind::Load);
            after.set_rows(2);
        }

        let report = metrics_report();
        assert_eq!(report.ops.exists_calls, 1);
        assert_eq!(report.ops.load_calls, 1);
        assert_eq!(report.ops.rows_loaded, 2);
    }

    #[test]
    fn factory_and_duplicate_events_accumulate() {
        clear_override();
        metrics_reset_all();

        record(EVENT);
        record(MetricsEvent::FactoryReference {
            path: "obs::tests::Object",
        });
        record(MetricsEvent::DuplicateRejected {
            entity_path: "obs::tests::Object",
        });

        let report = metrics_report();
        assert_eq!(report.ops.objects_created, 1);
        assert_eq!(report.ops.references_created, 1);
        assert_eq!(report.ops.duplicates_rejected, 1);

        let json = serde_json::to_string(&report).expect("report should serialize");
        assert!(json.contains("\"duplicates_rejected\":1"));
    }
}
