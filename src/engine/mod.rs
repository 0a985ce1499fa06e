//! Discovery, compilation and execution of patch steps.

pub mod annotations;
pub mod cache;
pub mod context;
mod patcher_engine;
pub mod step;

pub use annotations::AnnotationMetadata;
pub use cache::CacheState;
pub use context::{Condition, PatchContext, PostMapping};
pub use patcher_engine::PatcherEngine;
pub use step::{Conversion, PatchStep};
