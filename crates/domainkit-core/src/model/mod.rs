//! Runtime construction and identity metadata.
//!
//! Types declare these statically (see `Construct::parameters` and
//! `Entity::IDENTITY`); the registry and factory read them at runtime.
//!
//! In general:
//! - types declare *what they accept*
//! - `model` describes *how they are fed*
pub mod argument;
pub mod identity;

// re-exports
pub use argument::{ArgumentSpec, DeclaredType, ObjectBlueprint, Param};
pub use identity::{IdentityDescriptor, IdentityField, IdentityKind};
