use serde::{Deserialize, Serialize};
use std::fmt;

/// Which member kinds the registry may use when resolving a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStrategy {
    /// Only `get_*` / `is_*` / `set_*` methods.
    Methods,
    /// Only public struct members.
    Fields,
    /// Both, methods preferred.
    #[default]
    MethodsAndFields,
}

impl MappingStrategy {
    pub fn allows_methods(self) -> bool {
        matches!(self, Self::Methods | Self::MethodsAndFields)
    }

    pub fn allows_fields(self) -> bool {
        matches!(self, Self::Fields | Self::MethodsAndFields)
    }
}

impl fmt::Display for MappingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Methods => write!(f, "methods"),
            Self::Fields => write!(f, "fields"),
            Self::MethodsAndFields => write!(f, "methods_and_fields"),
        }
    }
}

/// Where a binding came from. Explicit and declared bindings are authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingOrigin {
    Explicit,
    Declared,
    Convention,
}

impl BindingOrigin {
    pub fn is_convention(self) -> bool {
        matches!(self, Self::Convention)
    }
}
