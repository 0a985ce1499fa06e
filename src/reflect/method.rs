use std::fmt;
use std::sync::Arc;

use crate::core::{AccessError, BoxError, PatchValue, Value, ValueType, take};

use super::{ReadFn, ReadResult, WriteFn, WriteResult};

/// How a method takes its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodReceiver {
    /// Associated function, no `self`.
    Static,
    Ref,
    RefMut,
    Owned,
}

enum MethodKind<T> {
    Getter {
        value_type: ValueType,
        nullable: bool,
        read: ReadFn<T>,
    },
    Setter {
        value_type: ValueType,
        nullable: bool,
        write: WriteFn<T>,
    },
    Opaque,
}

impl<T> Clone for MethodKind<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Getter {
                value_type,
                nullable,
                read,
            } => Self::Getter {
                value_type: *value_type,
                nullable: *nullable,
                read: Arc::clone(read),
            },
            Self::Setter {
                value_type,
                nullable,
                write,
            } => Self::Setter {
                value_type: *value_type,
                nullable: *nullable,
                write: Arc::clone(write),
            },
            Self::Opaque => Self::Opaque,
        }
    }
}

/// A method of an `#[accessors]` impl block.
///
/// Getter- and setter-shaped public methods carry an invoker; everything else
/// is recorded with its shape only.
pub struct MethodInfo<T> {
    name: &'static str,
    public: bool,
    receiver: MethodReceiver,
    arity: usize,
    kind: MethodKind<T>,
}

impl<T: 'static> MethodInfo<T> {
    pub fn getter<V: PatchValue>(name: &'static str, get: fn(&T) -> V) -> Self {
        let read: ReadFn<T> = Arc::new(move |owner: &T| -> ReadResult {
            Ok(Some(Box::new(get(owner)) as Value))
        });
        Self::invokable(
            name,
            MethodReceiver::Ref,
            0,
            MethodKind::Getter {
                value_type: ValueType::of::<V>(),
                nullable: false,
                read,
            },
        )
    }

    pub fn optional_getter<V: PatchValue>(name: &'static str, get: fn(&T) -> Option<V>) -> Self {
        let read: ReadFn<T> = Arc::new(move |owner: &T| -> ReadResult {
            Ok(get(owner).map(|value| Box::new(value) as Value))
        });
        Self::invokable(
            name,
            MethodReceiver::Ref,
            0,
            MethodKind::Getter {
                value_type: ValueType::of::<V>(),
                nullable: true,
                read,
            },
        )
    }

    pub fn setter<V: PatchValue>(
        name: &'static str,
        set: fn(&mut T, V) -> Result<(), BoxError>,
    ) -> Self {
        let write: WriteFn<T> = Arc::new(move |owner: &mut T, value: Option<Value>| -> WriteResult {
            let value = value.ok_or(AccessError::NullValue {
                expected: std::any::type_name::<V>(),
            })?;
            set(owner, take::<V>(value)?).map_err(AccessError::Setter)
        });
        Self::invokable(
            name,
            MethodReceiver::RefMut,
            1,
            MethodKind::Setter {
                value_type: ValueType::of::<V>(),
                nullable: false,
                write,
            },
        )
    }

    pub fn optional_setter<V: PatchValue>(
        name: &'static str,
        set: fn(&mut T, Option<V>) -> Result<(), BoxError>,
    ) -> Self {
        let write: WriteFn<T> = Arc::new(move |owner: &mut T, value: Option<Value>| -> WriteResult {
            let value = value.map(take::<V>).transpose()?;
            set(owner, value).map_err(AccessError::Setter)
        });
        Self::invokable(
            name,
            MethodReceiver::RefMut,
            1,
            MethodKind::Setter {
                value_type: ValueType::of::<V>(),
                nullable: true,
                write,
            },
        )
    }

    fn invokable(
        name: &'static str,
        receiver: MethodReceiver,
        arity: usize,
        kind: MethodKind<T>,
    ) -> Self {
        Self {
            name,
            public: true,
            receiver,
            arity,
            kind,
        }
    }
}

impl<T> MethodInfo<T> {
    pub fn opaque(name: &'static str, public: bool, receiver: MethodReceiver, arity: usize) -> Self {
        Self {
            name,
            public,
            receiver,
            arity,
            kind: MethodKind::Opaque,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn receiver(&self) -> MethodReceiver {
        self.receiver
    }

    /// Number of arguments, not counting the receiver.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Returned type for getters, parameter type for setters.
    pub fn value_type(&self) -> Option<ValueType> {
        match &self.kind {
            MethodKind::Getter { value_type, .. } | MethodKind::Setter { value_type, .. } => {
                Some(*value_type)
            }
            MethodKind::Opaque => None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match &self.kind {
            MethodKind::Getter { nullable, .. } | MethodKind::Setter { nullable, .. } => *nullable,
            MethodKind::Opaque => false,
        }
    }

    pub fn reader(&self) -> Option<&ReadFn<T>> {
        match &self.kind {
            MethodKind::Getter { read, .. } => Some(read),
            _ => None,
        }
    }

    pub fn writer(&self) -> Option<&WriteFn<T>> {
        match &self.kind {
            MethodKind::Setter { write, .. } => Some(write),
            _ => None,
        }
    }
}

impl<T> Clone for MethodInfo<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            public: self.public,
            receiver: self.receiver,
            arity: self.arity,
            kind: self.kind.clone(),
        }
    }
}

impl<T> fmt::Debug for MethodInfo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("public", &self.public)
            .field("receiver", &self.receiver)
            .field("arity", &self.arity)
            .field("value_type", &self.value_type())
            .finish()
    }
}
