use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::core::AccessError;

// ============================================================================
// Value types
// ============================================================================

/// Declared type of a member or transformer end.
///
/// `Option<T>` members are described by `T` plus a nullable flag on the
/// accessor, so `Option<i32>` and `i32` share one `ValueType`.
#[derive(Clone, Copy)]
pub struct ValueType {
    id: TypeId,
    name: &'static str,
}

impl ValueType {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The general "any" type: accepts every value.
    pub fn any() -> Self {
        Self::of::<AnyValue>()
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_any(&self) -> bool {
        self.id == TypeId::of::<AnyValue>()
    }

    /// Can a value of `other` be assigned to a member of this type without conversion?
    pub fn accepts(&self, other: &ValueType) -> bool {
        self == other || self.is_any()
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ValueType {}

impl Hash for ValueType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueType({})", short_type_name(self.name))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&short_type_name(self.name))
    }
}

/// `alloc::vec::Vec<alloc::string::String>` -> `Vec<String>`
pub(crate) fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
            continue;
        }
        out.push_str(segment.rsplit("::").next().unwrap_or(""));
        segment.clear();
        out.push(ch);
    }
    out.push_str(segment.rsplit("::").next().unwrap_or(""));
    out
}

// ============================================================================
// Type-erased values
// ============================================================================

/// Any value that can flow through a binding.
///
/// Implemented for every `'static + Send + Sync + Debug + Clone + PartialEq` type.
pub trait PatchValue: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
    fn clone_value(&self) -> Value;
    fn eq_value(&self, other: &dyn PatchValue) -> bool;
    fn value_type(&self) -> ValueType;
}

/// Owned type-erased value. Null is modelled as `Option<Value>::None`.
pub type Value = Box<dyn PatchValue>;

impl<T> PatchValue for T
where
    T: Any + Send + Sync + fmt::Debug + Clone + PartialEq,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }

    fn clone_value(&self) -> Value {
        Box::new(self.clone())
    }

    fn eq_value(&self, other: &dyn PatchValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn value_type(&self) -> ValueType {
        ValueType::of::<T>()
    }
}

/// A value of any [`PatchValue`] type.
///
/// Used as the declared type of "accept anything" members and as the input
/// type of transformers that take any source value.
pub struct AnyValue(Value);

impl AnyValue {
    pub fn new<T: PatchValue>(value: T) -> Self {
        Self::from_value(Box::new(value))
    }

    /// Wraps an erased value, flattening nested `AnyValue`s.
    pub fn from_value(value: Value) -> Self {
        if let Some(wrapped) = value.as_any().downcast_ref::<AnyValue>() {
            return wrapped.clone();
        }
        Self(value)
    }

    pub fn inner(&self) -> &dyn PatchValue {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Type of the wrapped value.
    pub fn value_type(&self) -> ValueType {
        self.0.value_type()
    }

    pub fn is<T: PatchValue>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    pub fn downcast_ref<T: PatchValue>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn downcast<T: PatchValue>(self) -> Result<T, AnyValue> {
        if !self.is::<T>() {
            return Err(self);
        }
        match self.0.into_any().downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => unreachable!("type checked by `is`"),
        }
    }
}

impl Clone for AnyValue {
    fn clone(&self) -> Self {
        Self(self.0.clone_value())
    }
}

impl PartialEq for AnyValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_value(other.0.as_ref())
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyValue").field(&self.0).finish()
    }
}

/// Type name of an erased value, looking through `AnyValue`.
pub fn describe(value: &dyn PatchValue) -> &'static str {
    match value.as_any().downcast_ref::<AnyValue>() {
        Some(wrapped) => wrapped.value_type().name(),
        None => value.value_type().name(),
    }
}

/// Moves an erased value into a concrete type.
///
/// `AnyValue` targets wrap the value; `AnyValue` sources are unwrapped first.
pub fn take<T: PatchValue>(value: Value) -> Result<T, AccessError> {
    let actual = describe(value.as_ref());

    if TypeId::of::<T>() == TypeId::of::<AnyValue>() {
        let wrapped: Box<dyn Any> = Box::new(AnyValue::from_value(value));
        return wrapped
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| AccessError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                actual,
            });
    }

    let unwrapped = value
        .as_any()
        .downcast_ref::<AnyValue>()
        .map(|wrapped| wrapped.inner().clone_value());
    let value = unwrapped.unwrap_or(value);

    value
        .into_any()
        .downcast::<T>()
        .map(|v| *v)
        .map_err(|_| AccessError::TypeMismatch {
            expected: std::any::type_name::<T>(),
            actual,
        })
}
