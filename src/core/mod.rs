pub mod error;
pub mod types;
pub mod value;

pub use error::{
    AccessError, BoxError, MatchingPathError, PatchError, PathSide, Result, ValidationError,
};
pub use types::{BindingOrigin, MappingStrategy};
pub use value::{AnyValue, PatchValue, Value, ValueType, describe, take};
