mod identifier;
mod instance;

pub use identifier::{IdBacking, IdValue, Identifier};
pub use instance::Instance;
