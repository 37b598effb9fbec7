//! Core runtime for domainkit: the object factory, identity normalization,
//! keyed collections, and the repository engine with its two backends,
//! plus the domain vocabulary exported via the `prelude`.

#[macro_use]
mod macros;

// public exports are one module level down
pub mod attribute;
pub mod collection;
pub mod db;
pub mod error;
pub mod factory;
pub mod identity;
pub mod model;
pub mod obs;
pub mod registry;
pub mod traits;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, factories, repositories, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        collection::Collection,
        domain_id,
        identity::Identity,
        model::{DeclaredType, IdentityDescriptor, IdentityField, Param},
        traits::{Construct, DomainId, DomainObject, Entity, FieldValue, Path},
        types::{Identifier, Instance},
        value::{Context, Value},
    };
}
