use crate::value::{Context, Value};
use thiserror::Error as ThisError;

/// One stored row, keyed by column name.
pub type Row = Context;

///
/// BackendError
///
/// Failures reported by a query-builder backend.
///

#[derive(Debug, ThisError)]
pub enum BackendError {
    #[error("unique constraint violated on table '{table}'")]
    UniqueViolation { table: String },

    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    #[error("table '{0}' does not exist")]
    UnknownTable(String),

    #[error("{0}")]
    Other(String),
}

///
/// Criterion
///
/// One column constraint.
/// A list value means "any of" (`IN`); `Null` means `IS NULL`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Criterion {
    pub column: String,
    pub value: Value,
}

impl Criterion {
    #[must_use]
    pub fn new(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

///
/// Window
///
/// Offset/limit pair; `limit == 0` is unbounded.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Window {
    pub offset: usize,
    pub limit: usize,
}

impl Window {
    #[must_use]
    pub const fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(0, 0)
    }
}

///
/// QueryBuilder
///
/// Narrow capability a relational engine exposes to repositories.
///
/// Criteria are conjunctive equality constraints. `select` returns rows in
/// a deterministic order (typically primary key). `insert` must enforce
/// the table's unique key atomically and report collisions as
/// [`BackendError::UniqueViolation`].
///

pub trait QueryBuilder {
    fn select(
        &self,
        table: &str,
        criteria: &[Criterion],
        window: Window,
    ) -> Result<Vec<Row>, BackendError>;

    fn insert(&self, table: &str, row: Row) -> Result<(), BackendError>;

    /// Replace every row matching `key`; returns the number replaced.
    fn update(&self, table: &str, key: &[Criterion], row: Row) -> Result<u64, BackendError>;

    /// Remove every row matching `key`; returns the number removed.
    fn delete(&self, table: &str, key: &[Criterion]) -> Result<u64, BackendError>;
}
