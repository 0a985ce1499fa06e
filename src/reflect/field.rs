use std::fmt;
use std::sync::Arc;

use crate::core::{AccessError, PatchValue, Value, ValueType, take};

use super::{ReadFn, ReadResult, WriteFn, WriteResult};

/// Per-field `#[patch(...)]` directives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldDirectives {
    pub ignore: bool,
    pub ignore_if_null: bool,
    pub log_change: bool,
    pub map_to: Option<&'static str>,
    pub transforms: &'static [&'static str],
}

impl FieldDirectives {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Read/write access to a public member.
pub struct FieldAccess<T> {
    pub value_type: ValueType,
    pub nullable: bool,
    pub read: ReadFn<T>,
    pub write: WriteFn<T>,
}

impl<T> Clone for FieldAccess<T> {
    fn clone(&self) -> Self {
        Self {
            value_type: self.value_type,
            nullable: self.nullable,
            read: Arc::clone(&self.read),
            write: Arc::clone(&self.write),
        }
    }
}

/// A named struct member as seen by the patcher.
///
/// Non-public members are still described so their directives can be read,
/// but they carry no access functions.
pub struct FieldInfo<T> {
    name: &'static str,
    access: Option<FieldAccess<T>>,
    directives: FieldDirectives,
}

impl<T: 'static> FieldInfo<T> {
    pub fn field<V: PatchValue>(name: &'static str, read: fn(&T) -> V, write: fn(&mut T, V)) -> Self {
        let read: ReadFn<T> = Arc::new(move |owner: &T| -> ReadResult {
            Ok(Some(Box::new(read(owner)) as Value))
        });
        let write: WriteFn<T> = Arc::new(move |owner: &mut T, value: Option<Value>| -> WriteResult {
            let value = value.ok_or(AccessError::NullValue {
                expected: std::any::type_name::<V>(),
            })?;
            write(owner, take::<V>(value)?);
            Ok(())
        });

        Self {
            name,
            access: Some(FieldAccess {
                value_type: ValueType::of::<V>(),
                nullable: false,
                read,
                write,
            }),
            directives: FieldDirectives::default(),
        }
    }

    /// An `Option<V>` member. `None` reads as null and null writes `None`.
    pub fn optional_field<V: PatchValue>(
        name: &'static str,
        read: fn(&T) -> Option<V>,
        write: fn(&mut T, Option<V>),
    ) -> Self {
        let read: ReadFn<T> = Arc::new(move |owner: &T| -> ReadResult {
            Ok(read(owner).map(|value| Box::new(value) as Value))
        });
        let write: WriteFn<T> = Arc::new(move |owner: &mut T, value: Option<Value>| -> WriteResult {
            let value = value.map(take::<V>).transpose()?;
            write(owner, value);
            Ok(())
        });

        Self {
            name,
            access: Some(FieldAccess {
                value_type: ValueType::of::<V>(),
                nullable: true,
                read,
                write,
            }),
            directives: FieldDirectives::default(),
        }
    }
}

impl<T> FieldInfo<T> {
    pub fn hidden(name: &'static str) -> Self {
        Self {
            name,
            access: None,
            directives: FieldDirectives::default(),
        }
    }

    pub fn with_directives(mut self, directives: FieldDirectives) -> Self {
        self.directives = directives;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_public(&self) -> bool {
        self.access.is_some()
    }

    pub fn access(&self) -> Option<&FieldAccess<T>> {
        self.access.as_ref()
    }

    pub fn directives(&self) -> &FieldDirectives {
        &self.directives
    }
}

impl<T> Clone for FieldInfo<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            access: self.access.clone(),
            directives: self.directives,
        }
    }
}

impl<T> fmt::Debug for FieldInfo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("FieldInfo");
        out.field("name", &self.name);
        match &self.access {
            Some(access) => out
                .field("value_type", &access.value_type)
                .field("nullable", &access.nullable),
            None => out.field("public", &false),
        };
        out.field("directives", &self.directives).finish()
    }
}
