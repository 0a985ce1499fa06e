use thiserror::Error;

use super::types::MappingStrategy;

/// Boxed cause carried by [`PatchError::MappingExecution`] and [`AccessError::Setter`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Path resolution error: {0}")]
    PathResolution(#[from] MatchingPathError),

    #[error("Mapping execution error: {message}")]
    MappingExecution {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Could not find transformer '{key}' for field '{field}'")]
    TransformerNotFound { key: String, field: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PatchError {
    pub fn mapping(message: impl Into<String>) -> Self {
        Self::MappingExecution {
            message: message.into(),
            cause: None,
        }
    }

    pub fn mapping_caused(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::MappingExecution {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn is_mapping_execution(&self) -> bool {
        matches!(self, Self::MappingExecution { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, PatchError>;

impl From<serde_json::Error> for PatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Which end of a binding could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSide {
    Source,
    Destination,
}

impl std::fmt::Display for PathSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "getter"),
            Self::Destination => write!(f, "setter"),
        }
    }
}

/// An explicit or declarative field could not be found on its type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot find {side} or field '{field}' in {type_name} (strategy: {strategy})")]
pub struct MatchingPathError {
    pub side: PathSide,
    pub field: String,
    pub type_name: &'static str,
    pub strategy: MappingStrategy,
}

/// Failure raised by a user validator after all fields were written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

/// Low-level failure while reading or writing a member.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Cannot assign null to non-optional member of type {expected}")]
    NullValue { expected: &'static str },

    #[error("Setter failed: {0}")]
    Setter(#[source] BoxError),
}
