use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for factory and repository operations.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Factory
    pub objects_created: u64,
    pub references_created: u64,

    // Repository entrypoints
    pub load_calls: u64,
    pub exists_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,

    // Rows touched
    pub rows_loaded: u64,
    pub rows_scanned: u64,
    pub rows_saved: u64,
    pub rows_deleted: u64,

    // Conflicts
    pub duplicates_rejected: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntityCounters {
    pub objects_created: u64,
    pub references_created: u64,
    pub load_calls: u64,
    pub exists_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,
    pub rows_loaded: u64,
    pub rows_scanned: u64,
    pub rows_saved: u64,
    pub rows_deleted: u64,
    pub duplicates_rejected: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
/// Point-in-time copy of the counters plus per-entity averages.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub entity_counters: Vec<EntitySummary>,
}

impl EventReport {
    /// Summary row for one entity path.
    #[must_use]
    pub fn entity(&self, path: &str) -> Option<&EntitySummary> {
        self.entity_counters.iter().find(|summary| summary.path == path)
    }
}

///
/// EntitySummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntitySummary {
    pub path: String,
    pub counters: EntityCounters,
    pub avg_rows_per_load: f64,
    pub avg_rows_scanned_per_load: f64,
}

/// Build a report from the in-memory counters.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let snap = with_state(Clone::clone);

    let entity_counters = snap
        .entities
        .into_iter()
        .map(|(path, counters)| {
            let per_load = |rows: u64| {
                if counters.load_calls > 0 {
                    rows as f64 / counters.load_calls as f64
                } else {
                    0.0
                }
            };

            EntitySummary {
                avg_rows_per_load: per_load(counters.rows_loaded),
                avg_rows_scanned_per_load: per_load(counters.rows_scanned),
                path,
                counters,
            }
        })
        .collect();

    EventReport {
        ops: snap.ops,
        entity_counters,
    }
}
