//! Everything an application needs to declare patchable types and patch them.
//!
//! ```
//! use rustpatcher::prelude::*;
//! ```

pub use crate::{
    AnyValue, MappingStrategy, PatchError, PatchLogger, PatchSubject, PatchValidator, PatchValue,
    Patchable, Patcher, PatcherConfig, PatcherEngine, Transformer, TransformerCatalog,
    TracingPatchLogger, ValidationError, accessors,
};
