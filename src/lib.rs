// ============================================================================
// RustPatcher Library
// ============================================================================

//! Copies field values from one struct into another.
//!
//! Bindings between members are found by convention (same name, through
//! `get_*`/`is_*`/`set_*` accessors or public fields), by explicit
//! registration, or by `#[patch(map_to = "...")]` directives. Values can be
//! converted on the way, skipped when null, filtered by predicates, and the
//! result checked by a validator.
//!
//! ```
//! use rustpatcher::prelude::*;
//!
//! #[derive(Patchable, Default)]
//! struct ProfileForm {
//!     pub full_name: String,
//!     pub age: i32,
//! }
//!
//! #[derive(Patchable, Default)]
//! struct Profile {
//!     pub name: String,
//!     pub age: i32,
//! }
//!
//! # fn main() -> rustpatcher::Result<()> {
//! let patcher = Patcher::<ProfileForm, Profile>::new().with_field_mapping("full_name", "name");
//! let profile = patcher.map(&ProfileForm { full_name: "Ada".into(), age: 36 })?;
//!
//! assert_eq!(profile.name, "Ada");
//! assert_eq!(profile.age, 36);
//! # Ok(())
//! # }
//! ```

extern crate self as rustpatcher;

pub mod config;
pub mod core;
pub mod engine;
pub mod logging;
pub mod mapping;
mod patcher;
pub mod prelude;
pub mod reflect;
pub mod transform;
pub mod validation;

// Re-export main types for convenience
pub use config::{FieldMappingConfig, PatcherConfig};
pub use core::{
    AccessError, AnyValue, MatchingPathError, MappingStrategy, PatchError, PatchValue, Result,
    ValidationError, Value, ValueType,
};
pub use engine::{CacheState, PatcherEngine};
pub use logging::{PatchLogger, PatchSubject, TracingPatchLogger};
pub use mapping::{DefaultMappingRegistry, DefaultNamingResolver, MappingRegistry, NamingResolver};
pub use patcher::{Patcher, SelectivePatch};
pub use reflect::{Patchable, TypeDescriptor};
pub use transform::{Transformer, TransformerCatalog};
pub use validation::PatchValidator;

// Derive macros
pub use rustpatcher_derive::{Patchable, accessors};
