use crate::value::Value;
use std::fmt;

///
/// DeclaredType
///
/// Declared type of a constructor parameter.
/// Primitive kinds are passed through as given; `Class` names a registered
/// type path the factory may build recursively.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DeclaredType {
    /// Untyped; any value is passed through.
    Mixed,
    Bool,
    Int,
    Uint,
    Float,
    Text,
    List,
    Map,
    Class(&'static str),
}

impl DeclaredType {
    /// Registered path named by this declaration, if it is a class reference.
    #[must_use]
    pub const fn class_path(self) -> Option<&'static str> {
        match self {
            Self::Class(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Mixed => "mixed",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Text => "text",
            Self::List => "list",
            Self::Map => "map",
            Self::Class(path) => path,
        };
        write!(f, "{label}")
    }
}

///
/// Param
///
/// One parameter as a type declares it, before positions are assigned.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: &'static str,
    pub declared: DeclaredType,
    pub default: Option<Value>,
}

impl Param {
    #[must_use]
    pub const fn required(name: &'static str, declared: DeclaredType) -> Self {
        Self {
            name,
            declared,
            default: None,
        }
    }

    #[must_use]
    pub fn optional(name: &'static str, declared: DeclaredType, default: impl Into<Value>) -> Self {
        Self {
            name,
            declared,
            default: Some(default.into()),
        }
    }

    /// Optional parameter defaulting to `Null`.
    #[must_use]
    pub const fn nullable(name: &'static str, declared: DeclaredType) -> Self {
        Self {
            name,
            declared,
            default: Some(Value::Null),
        }
    }
}

///
/// ArgumentSpec
///
/// Resolved description of one positional argument.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ArgumentSpec {
    pub name: &'static str,
    pub position: usize,
    pub required: bool,
    pub default: Option<Value>,
    pub declared: DeclaredType,
}

impl ArgumentSpec {
    #[must_use]
    pub fn from_param(position: usize, param: Param) -> Self {
        Self {
            name: param.name,
            position,
            required: param.default.is_none(),
            default: param.default,
            declared: param.declared,
        }
    }
}

///
/// ObjectBlueprint
///
/// Ordered argument schema for one (type, method) pair.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectBlueprint {
    pub path: &'static str,
    pub method: String,
    pub arguments: Vec<ArgumentSpec>,
}

impl ObjectBlueprint {
    #[must_use]
    pub fn new(path: &'static str, method: impl Into<String>, params: Vec<Param>) -> Self {
        let arguments = params
            .into_iter()
            .enumerate()
            .map(|(position, param)| ArgumentSpec::from_param(position, param))
            .collect();

        Self {
            path,
            method: method.into(),
            arguments,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.arguments.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|arg| arg.name == name)
    }

    /// Names of the arguments that must be supplied.
    pub fn required(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.arguments
            .iter()
            .filter(|arg| arg.required)
            .map(|arg| arg.name)
    }
}
