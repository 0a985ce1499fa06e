use crate::core::ValueType;
use crate::reflect::{FieldInfo, MethodInfo, MethodReceiver, TypeDescriptor};

use super::binding::{ReadHandle, WriteHandle};

const GETTER_PREFIX: &str = "get_";
const BOOL_GETTER_PREFIX: &str = "is_";
const SETTER_PREFIX: &str = "set_";

/// Turns a field name into accessor handles on a type.
///
/// Single-segment names only. A miss is `None`, never an error.
pub trait NamingResolver: Send + Sync {
    fn resolve_getter<T>(&self, descriptor: &TypeDescriptor<T>, name: &str) -> Option<ReadHandle<T>>;

    fn resolve_setter<T>(&self, descriptor: &TypeDescriptor<T>, name: &str)
    -> Option<WriteHandle<T>>;

    fn resolve_field<'d, T>(
        &self,
        descriptor: &'d TypeDescriptor<T>,
        name: &str,
    ) -> Option<&'d FieldInfo<T>>;

    /// Field name a setter-shaped method stands for, used by convention discovery.
    fn setter_property<T>(&self, method: &MethodInfo<T>) -> Option<&'static str>;
}

/// `get_<name>` / `is_<name>` / `set_<name>` and same-named public members.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNamingResolver;

impl DefaultNamingResolver {
    pub fn new() -> Self {
        Self
    }

    fn is_public_instance<T>(method: &MethodInfo<T>, receiver: MethodReceiver, arity: usize) -> bool {
        method.is_public() && method.receiver() == receiver && method.arity() == arity
    }
}

impl NamingResolver for DefaultNamingResolver {
    fn resolve_getter<T>(&self, descriptor: &TypeDescriptor<T>, name: &str) -> Option<ReadHandle<T>> {
        let getter = descriptor
            .method(&format!("{GETTER_PREFIX}{name}"))
            .filter(|method| Self::is_public_instance(method, MethodReceiver::Ref, 0))
            .and_then(ReadHandle::from_method);
        if getter.is_some() {
            return getter;
        }

        descriptor
            .method(&format!("{BOOL_GETTER_PREFIX}{name}"))
            .filter(|method| Self::is_public_instance(method, MethodReceiver::Ref, 0))
            .filter(|method| {
                method.value_type() == Some(ValueType::of::<bool>()) && !method.is_nullable()
            })
            .and_then(ReadHandle::from_method)
    }

    fn resolve_setter<T>(
        &self,
        descriptor: &TypeDescriptor<T>,
        name: &str,
    ) -> Option<WriteHandle<T>> {
        descriptor
            .method(&format!("{SETTER_PREFIX}{name}"))
            .filter(|method| Self::is_public_instance(method, MethodReceiver::RefMut, 1))
            .and_then(WriteHandle::from_method)
    }

    fn resolve_field<'d, T>(
        &self,
        descriptor: &'d TypeDescriptor<T>,
        name: &str,
    ) -> Option<&'d FieldInfo<T>> {
        descriptor.field(name).filter(|field| field.is_public())
    }

    /// `set_age` -> `age`
    fn setter_property<T>(&self, method: &MethodInfo<T>) -> Option<&'static str> {
        if !Self::is_public_instance(method, MethodReceiver::RefMut, 1) {
            return None;
        }
        method
            .name()
            .strip_prefix(SETTER_PREFIX)
            .filter(|property| !property.is_empty())
    }
}
