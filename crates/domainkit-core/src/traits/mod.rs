mod field_value;

pub use field_value::FieldValue;

use crate::{
    error::DomainError,
    factory::Arguments,
    identity::Identity,
    model::{IdentityDescriptor, Param},
    types::{IdBacking, Identifier},
    value::Value,
};
use std::{any::Any, fmt::Debug, rc::Rc};

// ============================================================================
// FOUNDATIONAL KINDS
// ============================================================================
//
// These traits define *what* a registered type is called and how it is
// inspected at runtime, not how it is built.
//

///
/// Path
/// Fully-qualified, stable type path used as the registry key.
///

pub trait Path {
    const PATH: &'static str;
}

///
/// AsAny
///
/// Upcast helper so trait objects can be downcast to their concrete type.
///

pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

///
/// DomainObject
///
/// Any object the factory can hand out.
///
/// `field` is the uniform accessor used by stores and the identity layer;
/// it returns `None` for names the object does not know.
///

pub trait DomainObject: AsAny + Debug {
    fn type_path(&self) -> &'static str;

    fn field(&self, name: &str) -> Option<Value>;

    /// Typed identifier carried by this object, if it is one.
    fn as_identifier(&self) -> Option<&Identifier> {
        None
    }

    /// Identity declaration of this object's type; entities return
    /// `Some(Self::IDENTITY)`.
    fn identity_descriptor(&self) -> Option<IdentityDescriptor> {
        None
    }
}

// ============================================================================
// CONSTRUCTION CONTRACTS
// ============================================================================

///
/// Construct
///
/// Statically declared constructor schema plus the constructor itself.
/// `construct` receives arguments positionally, in `parameters()` order.
///

pub trait Construct: DomainObject + Path + Sized {
    /// Abstract paths this type can stand in for.
    const IMPLEMENTS: &'static [&'static str] = &[];

    /// A non-public constructor keeps the type registered (and resolvable)
    /// but refuses factory construction.
    const PUBLIC_CONSTRUCTOR: bool = true;

    fn parameters() -> Vec<Param> {
        Vec::new()
    }

    fn construct(args: &mut Arguments) -> Result<Self, DomainError>;
}

///
/// Entity
///
/// A constructible type with an identity.
///

pub trait Entity: Construct {
    const IDENTITY: IdentityDescriptor;

    /// Build an identity-only placeholder.
    ///
    /// `identity` holds one canonical value per descriptor field, in
    /// descriptor order. Every other field is left at its default.
    fn reference(identity: &Identity) -> Result<Self, DomainError>;
}

///
/// DomainId
///
/// A typed identifier object; usually declared through `domain_id!`.
///

pub trait DomainId: Construct + Clone {
    const BACKING: IdBacking;

    fn from_identifier(identifier: Identifier) -> Self;

    fn identifier(&self) -> &Identifier;
}
