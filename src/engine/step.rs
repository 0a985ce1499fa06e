use std::fmt;

use crate::core::Value;
use crate::mapping::Binding;
use crate::transform::Transformer;

/// Conversion chosen for a binding at compile time.
#[derive(Debug, Clone)]
pub enum Conversion {
    Identity,
    Transform(Transformer),
    /// No transformer fits an explicit or declared binding. The step fails
    /// only on calls where it is not skipped by null checks or conditions.
    Missing,
}

impl Conversion {
    pub fn apply(&self, value: Option<Value>) -> anyhow::Result<Option<Value>> {
        match self {
            Self::Identity => Ok(value),
            Self::Transform(transformer) => transformer.apply(value),
            Self::Missing => Err(anyhow::anyhow!("no suitable transformation")),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// A compiled read, convert, write unit.
pub struct PatchStep<S, D> {
    binding: Binding<S, D>,
    conversion: Conversion,
    declared_skip_if_null: bool,
    declared_log_change: bool,
}

impl<S, D> PatchStep<S, D> {
    pub fn new(
        binding: Binding<S, D>,
        conversion: Conversion,
        declared_skip_if_null: bool,
        declared_log_change: bool,
    ) -> Self {
        Self {
            binding,
            conversion,
            declared_skip_if_null,
            declared_log_change,
        }
    }

    pub fn binding(&self) -> &Binding<S, D> {
        &self.binding
    }

    pub fn conversion(&self) -> &Conversion {
        &self.conversion
    }

    pub fn source_field(&self) -> &str {
        self.binding.source_field()
    }

    pub fn destination_field(&self) -> &str {
        self.binding.destination_field()
    }

    pub fn declared_skip_if_null(&self) -> bool {
        self.declared_skip_if_null
    }

    pub fn declared_log_change(&self) -> bool {
        self.declared_log_change
    }
}

impl<S, D> Clone for PatchStep<S, D> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
            conversion: self.conversion.clone(),
            declared_skip_if_null: self.declared_skip_if_null,
            declared_log_change: self.declared_log_change,
        }
    }
}

impl<S, D> fmt::Debug for PatchStep<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchStep")
            .field("binding", &self.binding)
            .field("conversion", &self.conversion)
            .field("declared_skip_if_null", &self.declared_skip_if_null)
            .field("declared_log_change", &self.declared_log_change)
            .finish()
    }
}
