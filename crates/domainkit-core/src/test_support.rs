use crate::{
    db::{BackendError, Criterion, QueryBuilder, Row, Window},
    identity::values_match,
    traits::Entity,
    value::canonical_eq,
};
use std::{cell::RefCell, collections::BTreeMap};

///
/// MemoryTables
///
/// In-process relational backend double.
/// Rows keep insertion order; a table's key columns are unique unless any
/// of them is null.
///

#[derive(Debug, Default)]
pub struct MemoryTables {
    tables: RefCell<BTreeMap<String, Table>>,
}

#[derive(Debug)]
struct Table {
    columns: Vec<&'static str>,
    key: Vec<&'static str>,
    rows: Vec<Row>,
}

impl Table {
    fn check_columns<'a>(
        &self,
        table: &str,
        columns: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), BackendError> {
        for column in columns {
            if !self.columns.contains(&column) {
                return Err(BackendError::UnknownColumn {
                    table: table.to_string(),
                    column: column.to_string(),
                });
            }
        }

        Ok(())
    }

    fn key_collides(&self, row: &Row) -> bool {
        let key: Vec<_> = self.key.iter().map(|column| row.get(*column)).collect();
        if key.iter().any(|part| part.is_none_or(|value| value.is_null())) {
            return false;
        }

        self.rows.iter().any(|stored| {
            self.key
                .iter()
                .zip(&key)
                .all(|(column, wanted)| match (stored.get(*column), wanted) {
                    (Some(a), Some(b)) => canonical_eq(a, b),
                    _ => false,
                })
        })
    }
}

fn matches(row: &Row, criteria: &[Criterion]) -> bool {
    criteria.iter().all(|criterion| {
        row.get(&criterion.column)
            .is_some_and(|stored| values_match(stored, &criterion.value))
    })
}

impl MemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_table(&self, name: &str, columns: &[&'static str], key: &[&'static str]) {
        self.tables.borrow_mut().insert(
            name.to_string(),
            Table {
                columns: columns.to_vec(),
                key: key.to_vec(),
                rows: Vec::new(),
            },
        );
    }

    /// Table named after `E`, one column per constructor parameter.
    pub fn with_entity<E: Entity>(self) -> Self {
        let columns: Vec<_> = E::parameters().iter().map(|param| param.name).collect();
        let key: Vec<_> = E::IDENTITY.names().collect();
        self.create_table(E::PATH, &columns, &key);

        self
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .borrow()
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    fn with_table<T>(
        &self,
        table: &str,
        f: impl FnOnce(&mut Table) -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        let mut tables = self.tables.borrow_mut();
        let found = tables
            .get_mut(table)
            .ok_or_else(|| BackendError::UnknownTable(table.to_string()))?;

        f(found)
    }
}

fn criteria_columns(criteria: &[Criterion]) -> impl Iterator<Item = &str> {
    criteria.iter().map(|criterion| criterion.column.as_str())
}

impl QueryBuilder for MemoryTables {
    fn select(
        &self,
        table: &str,
        criteria: &[Criterion],
        window: Window,
    ) -> Result<Vec<Row>, BackendError> {
        self.with_table(table, |t| {
            t.check_columns(table, criteria_columns(criteria))?;
            let take = if window.limit == 0 {
                usize::MAX
            } else {
                window.limit
            };

            Ok(t.rows
                .iter()
                .filter(|row| matches(row, criteria))
                .skip(window.offset)
                .take(take)
                .cloned()
                .collect())
        })
    }

    fn insert(&self, table: &str, row: Row) -> Result<(), BackendError> {
        self.with_table(table, |t| {
            t.check_columns(table, row.keys().map(String::as_str))?;
            if t.key_collides(&row) {
                return Err(BackendError::UniqueViolation {
                    table: table.to_string(),
                });
            }

            t.rows.push(row);
            Ok(())
        })
    }

    fn update(&self, table: &str, key: &[Criterion], row: Row) -> Result<u64, BackendError> {
        self.with_table(table, |t| {
            t.check_columns(table, criteria_columns(key))?;
            t.check_columns(table, row.keys().map(String::as_str))?;

            let mut updated = 0;
            for stored in &mut t.rows {
                if matches(stored, key) {
                    *stored = row.clone();
                    updated += 1;
                }
            }

            Ok(updated)
        })
    }

    fn delete(&self, table: &str, key: &[Criterion]) -> Result<u64, BackendError> {
        self.with_table(table, |t| {
            t.check_columns(table, criteria_columns(key))?;

            let before = t.rows.len();
            t.rows.retain(|row| !matches(row, key));

            Ok(u64::try_from(before - t.rows.len()).unwrap_or(u64::MAX))
        })
    }
}
