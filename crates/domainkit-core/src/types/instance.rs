use crate::{
    traits::{AsAny, DomainObject},
    types::Identifier,
    value::Value,
};
use std::{fmt, ptr, rc::Rc};

///
/// Instance
///
/// Shared handle to a constructed domain object of any registered type.
/// Equality is reference identity: two handles are equal only when they
/// point at the same object.
///

#[derive(Clone)]
pub struct Instance(Rc<dyn DomainObject>);

impl Instance {
    pub fn new<T: DomainObject>(object: T) -> Self {
        Self(Rc::new(object))
    }

    pub fn from_rc<T: DomainObject>(object: Rc<T>) -> Self {
        Self(object)
    }

    /// Registered type path of the underlying object.
    #[must_use]
    pub fn path(&self) -> &'static str {
        self.0.type_path()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<Value> {
        self.0.field(name)
    }

    #[must_use]
    pub fn as_identifier(&self) -> Option<&Identifier> {
        self.0.as_identifier()
    }

    #[must_use]
    pub fn as_object(&self) -> &dyn DomainObject {
        &*self.0
    }

    #[must_use]
    pub fn downcast_ref<T: DomainObject>(&self) -> Option<&T> {
        AsAny::as_any(&*self.0).downcast_ref::<T>()
    }

    /// Recover the concrete shared handle, or give the instance back.
    pub fn downcast<T: DomainObject>(self) -> Result<Rc<T>, Self> {
        match AsAny::into_any_rc(Rc::clone(&self.0)).downcast::<T>() {
            Ok(object) => Ok(object),
            Err(_) => Err(self),
        }
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// True when this instance is exactly the object behind `object`.
    #[must_use]
    pub fn is<T: DomainObject>(&self, object: &Rc<T>) -> bool {
        ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(object))
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
