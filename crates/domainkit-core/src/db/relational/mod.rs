//! Relational backend: query building is delegated to a [`QueryBuilder`];
//! rows are materialized through the entity-aware factory.

mod backend;

pub use backend::{BackendError, Criterion, QueryBuilder, Row, Window};

use crate::{
    collection::Collection,
    db::{
        Lookup, RepositoryEngine, RepositoryError, check_filter_fields, duplicate,
        missing_criteria, not_found,
    },
    error::DomainError,
    factory::{EntityAwareFactory, FactoryError},
    identity::{Identity, IdentityNormalizer, normalize_identifier},
    obs::sink::{self, ExecKind, MetricsEvent, Span, record_rows_scanned},
    registry::CONSTRUCTOR,
    traits::Entity,
    types::Instance,
    value::{Context, Value, ValueError},
};
use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

///
/// RelationalRepository
///
/// Repository over one table of a relational engine.
///
/// Columns are the entity's constructor parameters. Typed identifiers are
/// stored as their underlying value, referenced entities as their identity
/// (a list for composite keys), and other nested objects as maps of their
/// own constructor parameters.
///
/// Entities loaded or saved here are tracked weakly: loading a row whose
/// entity is still alive returns that same entity, saving a tracked
/// entity updates its row instead of inserting, and deleting an untracked
/// entity is a no-op. Tracking is per repository.
///

pub struct RelationalRepository<E: Entity> {
    backend: Rc<dyn QueryBuilder>,
    factory: Rc<EntityAwareFactory>,
    table: String,
    identity_map: RefCell<Vec<Weak<E>>>,
}

impl<E: Entity> RelationalRepository<E> {
    /// Repository over the table named after the entity path.
    #[must_use]
    pub fn new(backend: Rc<dyn QueryBuilder>, factory: Rc<EntityAwareFactory>) -> Self {
        Self::with_table(backend, factory, E::PATH)
    }

    #[must_use]
    pub fn with_table(
        backend: Rc<dyn QueryBuilder>,
        factory: Rc<EntityAwareFactory>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            factory,
            table: table.into(),
            identity_map: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// True when `entity` was loaded or saved through this repository and
    /// is still alive.
    #[must_use]
    pub fn is_tracked(&self, entity: &Rc<E>) -> bool {
        self.identity_map
            .borrow()
            .iter()
            .any(|tracked| Weak::as_ptr(tracked) == Rc::as_ptr(entity))
    }

    /// Stop tracking every entity.
    pub fn clear(&self) {
        self.identity_map.borrow_mut().clear();
    }

    fn track(&self, entity: &Rc<E>) {
        let mut map = self.identity_map.borrow_mut();
        map.retain(|tracked| tracked.strong_count() > 0);

        if !map.iter().any(|tracked| Weak::as_ptr(tracked) == Rc::as_ptr(entity)) {
            map.push(Rc::downgrade(entity));
        }
    }

    fn untrack(&self, entity: &Rc<E>) {
        self.identity_map
            .borrow_mut()
            .retain(|tracked| {
                tracked.strong_count() > 0 && Weak::as_ptr(tracked) != Rc::as_ptr(entity)
            });
    }

    fn tracked_with(&self, identity: &Identity) -> Option<Rc<E>> {
        let normalizer = IdentityNormalizer::of::<E>();

        self.identity_map
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .find(|entity| normalizer.matches(&**entity, identity))
    }

    ///
    /// ROWS
    ///

    fn to_row(&self, entity: &E) -> Result<Row, DomainError> {
        let mut row = Row::new();
        for param in E::parameters() {
            let value = entity.field(param.name).unwrap_or_default();
            row.insert(param.name.to_string(), self.column_value(value)?);
        }

        Ok(row)
    }

    /// Storage form of one field value.
    fn column_value(&self, value: Value) -> Result<Value, DomainError> {
        match value {
            Value::Identifier(id) => Ok(id.to_value()),
            Value::Object(instance) => self.object_column(&instance),
            Value::List(items) => items
                .into_iter()
                .map(|item| self.column_value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Value::Map(ctx) => ctx
                .into_iter()
                .map(|(name, item)| Ok((name, self.column_value(item)?)))
                .collect::<Result<Context, DomainError>>()
                .map(Value::Map),
            scalar => Ok(scalar),
        }
    }

    fn object_column(&self, instance: &Instance) -> Result<Value, DomainError> {
        if let Some(id) = instance.as_identifier() {
            return Ok(id.to_value());
        }

        if let Some(normalizer) = IdentityNormalizer::for_object(instance.as_object()) {
            return Ok(normalizer.identity_of(instance.as_object())?.into_key());
        }

        let registry = self.factory.inner().registry();
        let entry = registry
            .try_get(instance.path())
            .ok_or_else(|| ValueError::unsupported(&Value::Object(instance.clone())))?;
        let params = entry
            .method(CONSTRUCTOR)
            .map(|method| (method.params)())
            .unwrap_or_default();
        let mut embedded = Context::new();
        for param in params {
            let value = instance.field(param.name).unwrap_or_default();
            embedded.insert(param.name.to_string(), self.column_value(value)?);
        }

        Ok(Value::Map(embedded))
    }

    fn materialize(&self, row: Row) -> Result<Rc<E>, DomainError> {
        let identity = Identity::new(
            E::IDENTITY
                .names()
                .map(|name| row.get(name).map(normalize_identifier).unwrap_or_default())
                .collect(),
        );
        if identity.is_complete()
            && let Some(entity) = self.tracked_with(&identity)
        {
            return Ok(entity);
        }

        let instance = self.factory.create(E::PATH, row)?;
        let found = instance.path();
        let entity = instance.downcast::<E>().map_err(|_| {
            DomainError::from(FactoryError::UnexpectedType {
                expected: E::PATH.to_string(),
                found: found.to_string(),
            })
        })?;
        self.track(&entity);

        Ok(entity)
    }

    fn select(&self, criteria: &[Criterion], window: Window) -> Result<Vec<Rc<E>>, DomainError> {
        let rows = self
            .backend
            .select(&self.table, criteria, window)
            .map_err(|err| self.backend_error(err))?;
        record_rows_scanned::<E>(rows.len());

        rows.into_iter().map(|row| self.materialize(row)).collect()
    }

    /// Identifier kind declared for `field`, when it holds a typed identifier.
    fn identifier_kind(&self, field: &str) -> Option<&'static str> {
        let param = E::parameters().into_iter().find(|param| param.name == field)?;
        let class = param.declared.class_path()?;

        let factory = self.factory.inner();
        let entry = factory.registry().try_get(factory.resolve_class(class))?;

        entry.identifier().map(|_| entry.path)
    }

    /// Drop wanted identifiers of another kind than the column's.
    ///
    /// Columns hold bare values, so the kind check has to happen before
    /// the criteria reach the backend. `None` means nothing can match.
    fn retain_kind(kind: Option<&str>, wanted: Value) -> Option<Value> {
        let Some(kind) = kind else {
            return Some(wanted);
        };
        let fits = |value: &Value| {
            value
                .as_identifier()
                .is_none_or(|id| id.is_empty() || id.kind() == kind)
        };

        match wanted {
            Value::List(options) if !options.is_empty() => {
                let kept: Vec<_> = options.into_iter().filter(fits).collect();
                (!kept.is_empty()).then_some(Value::List(kept))
            }
            wanted => fits(&wanted).then_some(wanted),
        }
    }

    fn identity_criteria(identity: &Identity) -> Vec<Criterion> {
        E::IDENTITY
            .names()
            .zip(identity.iter())
            .map(|(name, value)| Criterion::new(name, value.clone()))
            .collect()
    }

    fn backend_error(&self, err: BackendError) -> DomainError {
        match err {
            BackendError::UnknownColumn { column, .. } => RepositoryError::UnknownField {
                path: E::PATH,
                field: column,
            }
            .into(),
            source => RepositoryError::Backend {
                path: E::PATH,
                source,
            }
            .into(),
        }
    }
}

impl<E: Entity> RepositoryEngine<E> for RelationalRepository<E> {
    fn find_all(&self, offset: usize, limit: usize) -> Result<Collection<Rc<E>>, DomainError> {
        let mut span = Span::<E>::new(ExecKind::Load);
        let found = self.select(&[], Window::new(offset, limit))?;
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
        let mut criteria = Vec::with_capacity(fields.len());
        for (name, value) in fields.iter() {
            let Some(wanted) = Self::retain_kind(self.identifier_kind(name), value.clone())
            else {
                return Ok(Collection::empty());
            };
            criteria.push(Criterion::new(name.as_str(), self.column_value(wanted)?));
        }

        let found = self.select(&criteria, Window::new(offset, limit))?;
        span.set_rows(found.len());

        Ok(Collection::new(found))
    }

    fn find_by_identity(&self, identity: &Identity) -> Result<Rc<E>, DomainError> {
        if !identity.is_complete() {
            return Err(not_found::<E>(Lookup::Identity(identity.clone())));
        }

        self.select(&Self::identity_criteria(identity), Window::new(0, 1))?
            .into_iter()
            .next()
            .ok_or_else(|| not_found::<E>(Lookup::Identity(identity.clone())))
    }

    fn save(&self, entity: &Rc<E>) -> Result<(), DomainError> {
        let mut span = Span::<E>::new(ExecKind::Save);
        let identity = IdentityNormalizer::of::<E>().identity_of(&**entity)?;
        let row = self.to_row(entity)?;

        if self.is_tracked(entity) {
            // Already stored under a key that cannot be addressed.
            if !identity.is_complete() {
                return Ok(());
            }

            let updated = self
                .backend
                .update(&self.table, &Self::identity_criteria(&identity), row.clone())
                .map_err(|err| self.backend_error(err))?;
            if updated > 0 {
                span.set_rows(1);
                return Ok(());
            }
        }

        match self.backend.insert(&self.table, row) {
            Ok(()) => {}
            Err(BackendError::UniqueViolation { .. }) => {
                sink::record(MetricsEvent::DuplicateRejected {
                    entity_path: E::PATH,
                });
                return Err(duplicate::<E>(identity));
            }
            Err(err) => return Err(self.backend_error(err)),
        }

        self.track(entity);
        span.set_rows(1);

        Ok(())
    }

    fn delete(&self, entity: &Rc<E>) -> Result<(), DomainError> {
        let mut span = Span::<E>::new(ExecKind::Delete);

        // Only an entity saved or loaded here owns a row; an untracked
        // object with the same key is a different entity.
        if !self.is_tracked(entity) {
            return Ok(());
        }

        let identity = IdentityNormalizer::of::<E>().identity_of(&**entity)?;
        self.untrack(entity);

        // A row with an unassigned key cannot be addressed.
        if !identity.is_complete() {
            return Ok(());
        }

        let removed = self
            .backend
            .delete(&self.table, &Self::identity_criteria(&identity))
            .map_err(|err| self.backend_error(err))?;
        span.set_rows(usize::try_from(removed).unwrap_or(usize::MAX));

        Ok(())
    }
}

impl<E: Entity> fmt::Debug for RelationalRepository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationalRepository")
            .field("path", &E::PATH)
            .field("table", &self.table)
            .field("tracked", &self.identity_map.borrow().len())
            .finish_non_exhaustive()
    }
}
