//! Statically declared type table.
//!
//! Every type the factory can build, resolve, or reference is registered
//! here once at startup. Lookups are by path; the table is immutable once
//! shared with a factory.

use crate::{
    error::{DomainError, ErrorClass},
    factory::Arguments,
    identity::Identity,
    model::{IdentityDescriptor, Param},
    traits::{Construct, DomainId, Entity},
    types::{IdBacking, Identifier, Instance},
};
use std::{collections::HashMap, fmt, rc::Rc};
use thiserror::Error as ThisError;

/// Method name under which every concrete type registers its constructor.
pub const CONSTRUCTOR: &str = "new";

///
/// RegistryError
///

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("type '{0}' not found")]
    TypeNotFound(String),

    #[error("type '{0}' already registered")]
    TypeAlreadyRegistered(String),

    #[error("method '{path}::{method}' already registered")]
    MethodAlreadyRegistered { path: String, method: String },
}

impl RegistryError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::TypeNotFound(_) => ErrorClass::NotFound,
            Self::TypeAlreadyRegistered(_) | Self::MethodAlreadyRegistered { .. } => {
                ErrorClass::InvariantViolation
            }
        }
    }
}

/// Type-erased method body; returns the built object.
pub type Invoke = Rc<dyn Fn(&mut Arguments) -> Result<Instance, DomainError>>;

/// Builds an identity-only placeholder.
pub type ReferenceFn = fn(&Identity) -> Result<Instance, DomainError>;

///
/// MethodEntry
///
/// One construction method: its declared parameters and its body.
///

#[derive(Clone)]
pub struct MethodEntry {
    pub name: &'static str,
    pub params: fn() -> Vec<Param>,
    invoke: Invoke,
}

impl MethodEntry {
    pub fn invoke(&self, args: &mut Arguments) -> Result<Instance, DomainError> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

///
/// TypeKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeKind {
    /// Buildable type; `public` is false when the constructor is private.
    Concrete { public: bool },
    /// Interface-like path that only concrete types can stand in for.
    Abstract,
}

///
/// IdentifierEntry
///
/// Extra metadata for typed identifier types.
///

#[derive(Clone, Copy, Debug)]
pub struct IdentifierEntry {
    pub backing: IdBacking,
    pub wrap: fn(Identifier) -> Instance,
}

///
/// TypeEntry
///

#[derive(Clone, Debug)]
pub struct TypeEntry {
    pub path: &'static str,
    pub kind: TypeKind,
    pub implements: &'static [&'static str],
    methods: HashMap<&'static str, MethodEntry>,
    identity: Option<(IdentityDescriptor, ReferenceFn)>,
    identifier: Option<IdentifierEntry>,
}

impl TypeEntry {
    fn concrete<T: Construct>() -> Self {
        let constructor = MethodEntry {
            name: CONSTRUCTOR,
            params: T::parameters,
            invoke: Rc::new(construct_instance::<T>),
        };

        Self {
            path: T::PATH,
            kind: TypeKind::Concrete {
                public: T::PUBLIC_CONSTRUCTOR,
            },
            implements: T::IMPLEMENTS,
            methods: HashMap::from([(CONSTRUCTOR, constructor)]),
            identity: None,
            identifier: None,
        }
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        matches!(self.kind, TypeKind::Abstract)
    }

    /// True for concrete types with a public constructor.
    #[must_use]
    pub const fn is_constructible(&self) -> bool {
        matches!(self.kind, TypeKind::Concrete { public: true })
    }

    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodEntry> {
        self.methods.get(name)
    }

    #[must_use]
    pub fn descriptor(&self) -> Option<IdentityDescriptor> {
        self.identity.map(|(descriptor, _)| descriptor)
    }

    #[must_use]
    pub fn reference_fn(&self) -> Option<ReferenceFn> {
        self.identity.map(|(_, reference)| reference)
    }

    #[must_use]
    pub const fn identifier(&self) -> Option<&IdentifierEntry> {
        self.identifier.as_ref()
    }
}

fn construct_instance<T: Construct>(args: &mut Arguments) -> Result<Instance, DomainError> {
    T::construct(args).map(Instance::new)
}

fn reference_instance<E: Entity>(identity: &Identity) -> Result<Instance, DomainError> {
    E::reference(identity).map(Instance::new)
}

fn wrap_identifier<T: DomainId>(identifier: Identifier) -> Instance {
    Instance::new(T::from_identifier(identifier))
}

///
/// TypeRegistry
///
/// Table of registered types keyed by path.
///

#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<&'static str, TypeEntry>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plain constructible type.
    pub fn register<T: Construct>(&mut self) -> Result<(), DomainError> {
        self.insert(TypeEntry::concrete::<T>())
    }

    /// Register an entity: constructor, identity descriptor, and reference builder.
    pub fn register_entity<E: Entity>(&mut self) -> Result<(), DomainError> {
        let mut entry = TypeEntry::concrete::<E>();
        entry.identity = Some((E::IDENTITY, reference_instance::<E>));

        self.insert(entry)
    }

    /// Register a typed identifier type.
    pub fn register_identifier<T: DomainId>(&mut self) -> Result<(), DomainError> {
        let mut entry = TypeEntry::concrete::<T>();
        entry.identifier = Some(IdentifierEntry {
            backing: T::BACKING,
            wrap: wrap_identifier::<T>,
        });

        self.insert(entry)
    }

    /// Register an abstract path; `implements` lists the abstract paths it extends.
    pub fn register_abstract(
        &mut self,
        path: &'static str,
        implements: &'static [&'static str],
    ) -> Result<(), DomainError> {
        self.insert(TypeEntry {
            path,
            kind: TypeKind::Abstract,
            implements,
            methods: HashMap::new(),
            identity: None,
            identifier: None,
        })
    }

    /// Register an additional named construction method on an already
    /// registered type.
    pub fn register_method<T, F>(
        &mut self,
        name: &'static str,
        params: fn() -> Vec<Param>,
        body: F,
    ) -> Result<(), DomainError>
    where
        T: Construct,
        F: Fn(&mut Arguments) -> Result<T, DomainError> + 'static,
    {
        let entry = self
            .types
            .get_mut(T::PATH)
            .ok_or_else(|| RegistryError::TypeNotFound(T::PATH.to_string()))?;

        if entry.methods.contains_key(name) {
            return Err(RegistryError::MethodAlreadyRegistered {
                path: T::PATH.to_string(),
                method: name.to_string(),
            }
            .into());
        }

        let invoke: Invoke = Rc::new(move |args| body(args).map(Instance::new));
        entry.methods.insert(
            name,
            MethodEntry {
                name,
                params,
                invoke,
            },
        );

        Ok(())
    }

    fn insert(&mut self, entry: TypeEntry) -> Result<(), DomainError> {
        if self.types.contains_key(entry.path) {
            return Err(RegistryError::TypeAlreadyRegistered(entry.path.to_string()).into());
        }

        self.types.insert(entry.path, entry);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.types.contains_key(path)
    }

    #[must_use]
    pub fn try_get(&self, path: &str) -> Option<&TypeEntry> {
        self.types.get(path)
    }

    pub fn get(&self, path: &str) -> Result<&TypeEntry, DomainError> {
        self.types
            .get(path)
            .ok_or_else(|| RegistryError::TypeNotFound(path.to_string()).into())
    }

    /// Identity descriptor for an entity path, if registered as an entity.
    #[must_use]
    pub fn descriptor(&self, path: &str) -> Option<IdentityDescriptor> {
        self.try_get(path).and_then(TypeEntry::descriptor)
    }

    /// True when `path` is `target` or (transitively) implements it.
    #[must_use]
    pub fn is_assignable(&self, path: &str, target: &str) -> bool {
        let mut pending = vec![path];
        let mut seen = Vec::new();

        while let Some(current) = pending.pop() {
            if current == target {
                return true;
            }
            if seen.contains(&current) {
                continue;
            }
            seen.push(current);

            if let Some(entry) = self.types.get(current) {
                pending.extend(entry.implements.iter().copied());
            }
        }

        false
    }

    /// Iterate registered entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.types.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
