//! Value conversions applied between reading a source member and writing a
//! destination member.

pub mod catalog;

use std::fmt;
use std::sync::Arc;

use crate::core::{PatchValue, Value, ValueType, take};

pub use catalog::TransformerCatalog;

pub type ConvertFn = Arc<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync>;

/// A typed conversion `I -> O`, stored type-erased.
///
/// An `AnyValue` input accepts every source type; an `AnyValue` output is
/// accepted only by `AnyValue` destinations.
#[derive(Clone)]
pub struct Transformer {
    input: ValueType,
    output: ValueType,
    function: ConvertFn,
}

impl Transformer {
    pub fn new<I, O, F>(function: F) -> Self
    where
        I: PatchValue,
        O: PatchValue,
        F: Fn(I) -> anyhow::Result<O> + Send + Sync + 'static,
    {
        let function: ConvertFn = Arc::new(move |value: Value| -> anyhow::Result<Value> {
            let input = take::<I>(value)?;
            Ok(Box::new(function(input)?) as Value)
        });
        Self {
            input: ValueType::of::<I>(),
            output: ValueType::of::<O>(),
            function,
        }
    }

    /// Infallible conversion.
    pub fn from_fn<I, O, F>(function: F) -> Self
    where
        I: PatchValue,
        O: PatchValue,
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        Self::new(move |input: I| -> anyhow::Result<O> { Ok(function(input)) })
    }

    pub fn input_type(&self) -> ValueType {
        self.input
    }

    pub fn output_type(&self) -> ValueType {
        self.output
    }

    /// Can this transformer sit between a `source` member and a `destination` member?
    pub fn accepts(&self, source: ValueType, destination: ValueType) -> bool {
        self.input.accepts(&source) && destination.accepts(&self.output)
    }

    /// Null passes through untouched.
    pub fn apply(&self, value: Option<Value>) -> anyhow::Result<Option<Value>> {
        match value {
            Some(value) => (self.function)(value).map(Some),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformer")
            .field("input", &self.input)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}
