use crate::{
    error::DomainError,
    identity::IdentityError,
    types::{IdBacking, Identifier},
};
use std::{cell::RefCell, collections::HashMap};
use ulid::Ulid;

///
/// IdentifierGenerator
///
/// Source of fresh identifiers for `EntityAwareFactory::next_identifier`.
///

pub trait IdentifierGenerator {
    fn generate(&self, kind: &'static str, backing: IdBacking) -> Result<Identifier, DomainError>;
}

///
/// UlidGenerator
///
/// Text-backed identifiers from newly minted ULIDs.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct UlidGenerator;

impl IdentifierGenerator for UlidGenerator {
    fn generate(&self, kind: &'static str, backing: IdBacking) -> Result<Identifier, DomainError> {
        match backing {
            IdBacking::Text => Identifier::text(kind, Ulid::new().to_string()),
            IdBacking::Int => Err(IdentityError::UnsupportedGeneration { kind, backing }.into()),
        }
    }
}

///
/// SequenceGenerator
///
/// Monotonic per-kind counter starting at 1.
/// Text-backed kinds receive the decimal rendering.
///

#[derive(Debug, Default)]
pub struct SequenceGenerator {
    next: RefCell<HashMap<&'static str, i64>>,
}

impl SequenceGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn advance(&self, kind: &'static str) -> i64 {
        let mut next = self.next.borrow_mut();
        let slot = next.entry(kind).or_insert(0);
        *slot = slot.saturating_add(1);

        *slot
    }
}

impl IdentifierGenerator for SequenceGenerator {
    fn generate(&self, kind: &'static str, backing: IdBacking) -> Result<Identifier, DomainError> {
        let n = self.advance(kind);

        match backing {
            IdBacking::Int => Ok(Identifier::int(kind, n)),
            IdBacking::Text => Identifier::text(kind, n.to_string()),
        }
    }
}

///
/// DefaultGenerator
///
/// ULIDs for text-backed kinds, a sequence for integer-backed ones.
///

#[derive(Debug, Default)]
pub struct DefaultGenerator {
    ulid: UlidGenerator,
    sequence: SequenceGenerator,
}

impl IdentifierGenerator for DefaultGenerator {
    fn generate(&self, kind: &'static str, backing: IdBacking) -> Result<Identifier, DomainError> {
        match backing {
            IdBacking::Text => self.ulid.generate(kind, backing),
            IdBacking::Int => self.sequence.generate(kind, backing),
        }
    }
}
