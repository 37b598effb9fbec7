use crate::{traits::DomainId, types::IdBacking, value::Context};

///
/// IdentityKind
///
/// How one identity field is represented on the entity.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IdentityKind {
    /// Raw scalar field; compared without conversion.
    Scalar,
    /// Typed identifier field of the given identifier type.
    Identifier {
        kind: &'static str,
        backing: IdBacking,
    },
}

///
/// IdentityField
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IdentityField {
    pub name: &'static str,
    pub kind: IdentityKind,
}

impl IdentityField {
    #[must_use]
    pub const fn scalar(name: &'static str) -> Self {
        Self {
            name,
            kind: IdentityKind::Scalar,
        }
    }

    /// Identity field holding a typed identifier of type `T`.
    #[must_use]
    pub const fn identifier<T: DomainId>(name: &'static str) -> Self {
        Self {
            name,
            kind: IdentityKind::Identifier {
                kind: T::PATH,
                backing: T::BACKING,
            },
        }
    }
}

///
/// IdentityDescriptor
///
/// Ordered list of fields that jointly form an entity's identity.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IdentityDescriptor {
    fields: &'static [IdentityField],
}

impl IdentityDescriptor {
    #[must_use]
    pub const fn new(fields: &'static [IdentityField]) -> Self {
        Self { fields }
    }

    #[must_use]
    pub const fn fields(&self) -> &'static [IdentityField] {
        self.fields
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub const fn is_composite(&self) -> bool {
        self.fields.len() > 1
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|field| field.name)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static IdentityField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// True when `ctx` names exactly the descriptor fields, no more, no less.
    #[must_use]
    pub fn matches_keys(&self, ctx: &Context) -> bool {
        ctx.len() == self.fields.len() && self.names().all(|name| ctx.contains_key(name))
    }
}
