//! Binding discovery between a source and a destination type.

pub mod binding;
pub mod naming;
pub mod registry;

pub use binding::{Binding, ReadHandle, WriteHandle};
pub use naming::{DefaultNamingResolver, NamingResolver};
pub use registry::{DefaultMappingRegistry, MappingRegistry};
