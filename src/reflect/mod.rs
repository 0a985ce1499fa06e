//! Runtime type descriptors.
//!
//! `#[derive(Patchable)]` and `#[accessors]` generate a [`TypeDescriptor`] per
//! type: its named members, the methods of its accessor impl block, and the
//! `#[patch(...)]` directives attached to both.

mod field;
mod method;

use std::sync::Arc;

use crate::core::{AccessError, Value};

pub use field::{FieldAccess, FieldDirectives, FieldInfo};
pub use method::{MethodInfo, MethodReceiver};

pub type ReadResult = std::result::Result<Option<Value>, AccessError>;
pub type WriteResult = std::result::Result<(), AccessError>;

/// Reads a member of `T`. `Ok(None)` is a null value.
pub type ReadFn<T> = Arc<dyn Fn(&T) -> ReadResult + Send + Sync>;
/// Writes a member of `T`. Non-optional members reject null.
pub type WriteFn<T> = Arc<dyn Fn(&mut T, Option<Value>) -> WriteResult + Send + Sync>;

/// Types the patcher can read from and write into.
pub trait Patchable: Sized + 'static {
    fn descriptor() -> TypeDescriptor<Self>;
}

/// Type-wide `#[patch(...)]` directives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeDirectives {
    pub ignore_if_null: bool,
    pub log_change: bool,
}

pub struct TypeDescriptor<T> {
    type_name: &'static str,
    fields: Vec<FieldInfo<T>>,
    methods: Vec<MethodInfo<T>>,
    directives: TypeDirectives,
}

impl<T> TypeDescriptor<T> {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: Vec::new(),
            methods: Vec::new(),
            directives: TypeDirectives::default(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldInfo<T>>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_methods(mut self, methods: Vec<MethodInfo<T>>) -> Self {
        self.methods = methods;
        self
    }

    pub fn with_directives(mut self, directives: TypeDirectives) -> Self {
        self.directives = directives;
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Members in declaration order.
    pub fn fields(&self) -> &[FieldInfo<T>] {
        &self.fields
    }

    /// Accessor methods in declaration order.
    pub fn methods(&self) -> &[MethodInfo<T>] {
        &self.methods
    }

    pub fn directives(&self) -> &TypeDirectives {
        &self.directives
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo<T>> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodInfo<T>> {
        self.methods.iter().find(|method| method.name() == name)
    }
}

impl<T> Clone for TypeDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            fields: self.fields.clone(),
            methods: self.methods.clone(),
            directives: self.directives,
        }
    }
}

impl<T> std::fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .field("directives", &self.directives)
            .finish()
    }
}
