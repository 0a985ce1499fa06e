use std::fmt;
use std::sync::Arc;

use crate::core::{BindingOrigin, Value, ValueType};
use crate::reflect::{FieldInfo, MethodInfo, ReadFn, ReadResult, WriteFn, WriteResult};

/// Resolved read access to one member of `T`.
pub struct ReadHandle<T> {
    /// Method or member name the handle reads through.
    pub member: &'static str,
    pub value_type: ValueType,
    pub nullable: bool,
    pub read: ReadFn<T>,
}

impl<T> ReadHandle<T> {
    pub fn from_method(method: &MethodInfo<T>) -> Option<Self> {
        Some(Self {
            member: method.name(),
            value_type: method.value_type()?,
            nullable: method.is_nullable(),
            read: Arc::clone(method.reader()?),
        })
    }

    pub fn from_field(field: &FieldInfo<T>) -> Option<Self> {
        let access = field.access()?;
        Some(Self {
            member: field.name(),
            value_type: access.value_type,
            nullable: access.nullable,
            read: Arc::clone(&access.read),
        })
    }
}

impl<T> Clone for ReadHandle<T> {
    fn clone(&self) -> Self {
        Self {
            member: self.member,
            value_type: self.value_type,
            nullable: self.nullable,
            read: Arc::clone(&self.read),
        }
    }
}

/// Resolved write access to one member of `T`.
pub struct WriteHandle<T> {
    pub member: &'static str,
    pub value_type: ValueType,
    pub nullable: bool,
    pub write: WriteFn<T>,
}

impl<T> WriteHandle<T> {
    pub fn from_method(method: &MethodInfo<T>) -> Option<Self> {
        Some(Self {
            member: method.name(),
            value_type: method.value_type()?,
            nullable: method.is_nullable(),
            write: Arc::clone(method.writer()?),
        })
    }

    pub fn from_field(field: &FieldInfo<T>) -> Option<Self> {
        let access = field.access()?;
        Some(Self {
            member: field.name(),
            value_type: access.value_type,
            nullable: access.nullable,
            write: Arc::clone(&access.write),
        })
    }
}

impl<T> Clone for WriteHandle<T> {
    fn clone(&self) -> Self {
        Self {
            member: self.member,
            value_type: self.value_type,
            nullable: self.nullable,
            write: Arc::clone(&self.write),
        }
    }
}

/// A resolved source-field to destination-field pairing.
pub struct Binding<S, D> {
    source_field: String,
    destination_field: String,
    reader: ReadHandle<S>,
    writer: WriteHandle<D>,
    origin: BindingOrigin,
}

impl<S, D> Binding<S, D> {
    pub fn new(
        source_field: impl Into<String>,
        destination_field: impl Into<String>,
        reader: ReadHandle<S>,
        writer: WriteHandle<D>,
        origin: BindingOrigin,
    ) -> Self {
        Self {
            source_field: source_field.into(),
            destination_field: destination_field.into(),
            reader,
            writer,
            origin,
        }
    }

    pub fn source_field(&self) -> &str {
        &self.source_field
    }

    pub fn destination_field(&self) -> &str {
        &self.destination_field
    }

    /// Getter or member the value is read through.
    pub fn source_member(&self) -> &'static str {
        self.reader.member
    }

    /// Setter or member the value is written through.
    pub fn destination_member(&self) -> &'static str {
        self.writer.member
    }

    pub fn source_type(&self) -> ValueType {
        self.reader.value_type
    }

    pub fn destination_type(&self) -> ValueType {
        self.writer.value_type
    }

    pub fn source_nullable(&self) -> bool {
        self.reader.nullable
    }

    pub fn destination_nullable(&self) -> bool {
        self.writer.nullable
    }

    pub fn origin(&self) -> BindingOrigin {
        self.origin
    }

    pub fn is_convention(&self) -> bool {
        self.origin.is_convention()
    }

    pub fn reader(&self) -> &ReadHandle<S> {
        &self.reader
    }

    pub fn writer(&self) -> &WriteHandle<D> {
        &self.writer
    }

    pub fn read(&self, source: &S) -> ReadResult {
        (self.reader.read)(source)
    }

    pub fn write(&self, destination: &mut D, value: Option<Value>) -> WriteResult {
        (self.writer.write)(destination, value)
    }
}

impl<S, D> Clone for Binding<S, D> {
    fn clone(&self) -> Self {
        Self {
            source_field: self.source_field.clone(),
            destination_field: self.destination_field.clone(),
            reader: self.reader.clone(),
            writer: self.writer.clone(),
            origin: self.origin,
        }
    }
}

impl<S, D> fmt::Debug for Binding<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("source_field", &self.source_field)
            .field("destination_field", &self.destination_field)
            .field("source_member", &self.reader.member)
            .field("destination_member", &self.writer.member)
            .field("source_type", &self.reader.value_type)
            .field("destination_type", &self.writer.value_type)
            .field("origin", &self.origin)
            .finish()
    }
}
