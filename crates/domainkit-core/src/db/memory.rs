use crate::{
    collection::Collection,
    db::{
        Lookup, RepositoryEngine, RepositoryError, check_filter_fields, duplicate,
        missing_criteria, not_found, window,
    },
    error::DomainError,
    identity::{Identity, IdentityNormalizer, values_match},
    obs::sink::{self, ExecKind, MetricsEvent, Span, record_rows_scanned},
    traits::Entity,
    types::Instance,
    value::Context,
};
use std::{cell::RefCell, collections::HashMap, fmt, marker::PhantomData, rc::Rc};

///
/// InMemoryStore
///
/// Process-local entity tables keyed by entity path, each an insertion-
/// ordered list of shared references. Entities are stored by reference,
/// never copied.
///
/// The store is `!Sync` and makes no atomicity promises: a repository's
/// `save` checks for a duplicate and then inserts as two separate steps.
/// Hosting it behind a lock is the caller's job.
///

#[derive(Default)]
pub struct InMemoryStore {
    tables: RefCell<HashMap<&'static str, Vec<Instance>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities stored for `path`.
    #[must_use]
    pub fn len(&self, path: &str) -> usize {
        self.tables.borrow().get(path).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.borrow().values().all(Vec::is_empty)
    }

    /// Paths that currently hold at least one entity.
    #[must_use]
    pub fn paths(&self) -> Vec<&'static str> {
        let mut paths: Vec<_> = self
            .tables
            .borrow()
            .iter()
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(path, _)| *path)
            .collect();
        paths.sort_unstable();

        paths
    }

    /// Drop every table.
    pub fn clear(&self) {
        self.tables.borrow_mut().clear();
    }

    /// Drop one table.
    pub fn clear_table(&self, path: &str) {
        self.tables.borrow_mut().remove(path);
    }

    fn snapshot(&self, path: &str) -> Vec<Instance> {
        self.tables.borrow().get(path).cloned().unwrap_or_default()
    }

    fn push(&self, path: &'static str, instance: Instance) {
        self.tables
            .borrow_mut()
            .entry(path)
            .or_default()
            .push(instance);
    }

    fn remove(&self, path: &str, instance: &Instance) -> bool {
        let mut tables = self.tables.borrow_mut();
        let Some(rows) = tables.get_mut(path) else {
            return false;
        };

        let before = rows.len();
        rows.retain(|row| !row.ptr_eq(instance));

        rows.len() != before
    }
}

impl fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.borrow();
        let mut map = f.debug_map();
        for (path, rows) in tables.iter() {
            map.entry(path, &rows.len());
        }
        map.finish()
    }
}

///
/// InMemoryRepository
///
/// Linear-scan repository over one table of an [`InMemoryStore`].
///

pub struct InMemoryRepository<E: Entity> {
    store: Rc<InMemoryStore>,
    _marker: PhantomData<E>,
}

impl<E: Entity> InMemoryRepository<E> {
    #[must_use]
    pub const fn new(store: Rc<InMemoryStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Rc<InMemoryStore> {
        &self.store
    }

    fn rows(&self) -> Vec<Rc<E>> {
        let rows: Vec<_> = self
            .store
            .snapshot(E::PATH)
            .into_iter()
            .filter_map(|instance| instance.downcast::<E>().ok())
            .collect();
        record_rows_scanned::<E>(rows.len());

        rows
    }

    fn contains(&self, entity: &Rc<E>) -> bool {
        self.store
            .snapshot(E::PATH)
            .iter()
            .any(|instance| instance.is(entity))
    }
}

impl<E: Entity> RepositoryEngine<E> for InMemoryRepository<E> {
    fn find_all(&self, offset: usize, limit: usize) -> Result<Collection<Rc<E>>, DomainError> {
        let mut span = Span::<E>::new(ExecKind::Load);
        let found = window(self.rows(), offset, limit);
        span.set_rows(found.len());

        Ok(Collection::new(found))
    }

    fn find_all_by_fields(
        &self,
        fields: &Context,
        offset: usize,
        limit: usize,
    ) -> Result<Collection<Rc<E>>, DomainError> {
        if fields.is_empty() {
            return Err(missing_criteria::<E>());
        }
        check_filter_fields::<E>(fields)?;

        let mut span = Span::<E>::new(ExecKind::Load);
        let mut matched = Vec::new();

        for entity in self.rows() {
            if matches_fields(&*entity, fields)? {
                matched.push(entity);
            }
        }

        let found = window(matched, offset, limit);
        span.set_rows(found.len());

        Ok(Collection::new(found))
    }

    fn find_by_identity(&self, identity: &Identity) -> Result<Rc<E>, DomainError> {
        let normalizer = IdentityNormalizer::of::<E>();

        self.rows()
            .into_iter()
            .find(|entity| normalizer.matches(&**entity, identity))
            .ok_or_else(|| not_found::<E>(Lookup::Identity(identity.clone())))
    }

    fn save(&self, entity: &Rc<E>) -> Result<(), DomainError> {
        let mut span = Span::<E>::new(ExecKind::Save);
        if self.contains(entity) {
            return Ok(());
        }

        // Incomplete identities are never duplicates; empty identifiers equal nothing.
        let identity = IdentityNormalizer::of::<E>().identity_of(&**entity)?;
        if identity.is_complete() && self.find_by_identity(&identity).is_ok() {
            sink::record(MetricsEvent::DuplicateRejected {
                entity_path: E::PATH,
            });
            return Err(duplicate::<E>(identity));
        }

        self.store.push(E::PATH, Instance::from_rc(Rc::clone(entity)));
        span.set_rows(1);

        Ok(())
    }

    fn delete(&self, entity: &Rc<E>) -> Result<(), DomainError> {
        let mut span = Span::<E>::new(ExecKind::Delete);
        let instance = Instance::from_rc(Rc::clone(entity));

        if self.store.remove(E::PATH, &instance) {
            span.set_rows(1);
        }

        Ok(())
    }
}

impl<E: Entity> fmt::Debug for InMemoryRepository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("path", &E::PATH)
            .field("rows", &self.store.len(E::PATH))
            .finish()
    }
}

/// Conjunctive field match; an unknown field is an error, not a mismatch.
fn matches_fields<E: Entity>(entity: &E, fields: &Context) -> Result<bool, DomainError> {
    for (name, wanted) in fields {
        let stored = entity.field(name).ok_or_else(|| RepositoryError::UnknownField {
            path: E::PATH,
            field: name.clone(),
        })?;

        if !values_match(&stored, wanted) {
            return Ok(false);
        }
    }

    Ok(true)
}
