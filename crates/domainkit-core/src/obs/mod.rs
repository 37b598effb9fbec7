//! Observability: runtime counters and the sink they flow through.
//!
//! Factory and repository code never touch `obs::metrics` directly; every
//! instrumentation point emits a `MetricsEvent` through `sink::record`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EntityCounters, EntitySummary, EventOps, EventReport};
pub use sink::{
    ExecKind, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink,
};
