use crate::{
    error::DomainError,
    factory::{FactoryError, TargetIssue},
    model::ObjectBlueprint,
    registry::TypeRegistry,
};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

///
/// ArgumentResolver
///
/// Produces the ordered argument schema of a (type, method) pair from the
/// registry. Blueprints are built once and cached for the resolver's
/// lifetime; registered schemas never change, so the cache is never
/// invalidated.
///

#[derive(Debug)]
pub struct ArgumentResolver {
    registry: Rc<TypeRegistry>,
    cache: RefCell<HashMap<(String, String), Rc<ObjectBlueprint>>>,
}

impl ArgumentResolver {
    #[must_use]
    pub fn new(registry: Rc<TypeRegistry>) -> Self {
        Self {
            registry,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve the blueprint of `method` on the type registered at `path`.
    ///
    /// A method without parameters yields an empty blueprint. Abstract
    /// types carry no methods, so resolving on them fails like any
    /// unknown method.
    pub fn resolve(&self, path: &str, method: &str) -> Result<Rc<ObjectBlueprint>, DomainError> {
        let key = (path.to_string(), method.to_string());
        if let Some(blueprint) = self.cache.borrow().get(&key) {
            return Ok(Rc::clone(blueprint));
        }

        let entry = self.registry.try_get(path).ok_or_else(|| FactoryError::InvalidTarget {
            path: path.to_string(),
            issue: TargetIssue::UnknownType,
        })?;
        let method_entry = entry
            .method(method)
            .ok_or_else(|| FactoryError::InvalidTarget {
                path: path.to_string(),
                issue: TargetIssue::UnknownMethod(method.to_string()),
            })?;

        let blueprint = Rc::new(ObjectBlueprint::new(
            entry.path,
            method_entry.name,
            (method_entry.params)(),
        ));
        self.cache.borrow_mut().insert(key, Rc::clone(&blueprint));

        Ok(blueprint)
    }

    /// Number of cached blueprints.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}
