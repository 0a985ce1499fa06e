use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{MappingStrategy, Result};
use crate::engine::PatcherEngine;
use crate::logging::TracingPatchLogger;
use crate::reflect::Patchable;

/// One explicit `from -> to` rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMappingConfig {
    pub from: String,
    pub to: String,
}

/// Serializable engine configuration
///
/// Covers everything that can be expressed without code: strategy, renames,
/// ignore rules and log flags. Transformers, conditions and callbacks stay on
/// the engine API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatcherConfig {
    /// Member kinds considered during discovery
    pub strategy: MappingStrategy,

    /// Skip every null source value
    pub ignore_null: bool,

    /// Log every written field
    pub log_change: bool,

    /// Install a [`TracingPatchLogger`]
    pub tracing_logger: bool,

    /// Explicit renames, applied in order
    pub field_mappings: Vec<FieldMappingConfig>,

    /// Source fields never read
    pub ignore_from: Vec<String>,

    /// Destination fields never written
    pub ignore_to: Vec<String>,

    /// Source fields skipped when null
    pub ignore_null_fields: Vec<String>,

    /// Destination fields whose writes are logged
    pub log_change_fields: Vec<String>,
}

impl PatcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn strategy(mut self, strategy: MappingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn ignore_null(mut self, enabled: bool) -> Self {
        self.ignore_null = enabled;
        self
    }

    pub fn log_change(mut self, enabled: bool) -> Self {
        self.log_change = enabled;
        self
    }

    pub fn tracing_logger(mut self, enabled: bool) -> Self {
        self.tracing_logger = enabled;
        self
    }

    pub fn field_mapping(mut self, from: &str, to: &str) -> Self {
        self.field_mappings.push(FieldMappingConfig {
            from: from.to_string(),
            to: to.to_string(),
        });
        self
    }

    pub fn ignore_from(mut self, field: &str) -> Self {
        self.ignore_from.push(field.to_string());
        self
    }

    pub fn ignore_to(mut self, field: &str) -> Self {
        self.ignore_to.push(field.to_string());
        self
    }

    pub fn ignore_null_field(mut self, field: &str) -> Self {
        self.ignore_null_fields.push(field.to_string());
        self
    }

    pub fn log_change_field(mut self, field: &str) -> Self {
        self.log_change_fields.push(field.to_string());
        self
    }

    /// Applies every setting on top of the engine's current configuration.
    pub fn apply<S: Patchable, D: Patchable>(&self, engine: &mut PatcherEngine<S, D>) {
        engine.set_strategy(self.strategy);
        engine.set_global_ignore_null(self.ignore_null);
        engine.set_global_log_change(self.log_change);
        if self.tracing_logger {
            engine.set_logger(Some(Arc::new(TracingPatchLogger)));
        }
        for mapping in &self.field_mappings {
            engine.add_field_mapping(&mapping.from, &mapping.to);
        }
        for field in &self.ignore_from {
            engine.ignore_from_field(field, true);
        }
        for field in &self.ignore_to {
            engine.ignore_to_field(field, true);
        }
        for field in &self.ignore_null_fields {
            engine.ignore_null_field(field, true);
        }
        for field in &self.log_change_fields {
            engine.set_field_log_change(field, true);
        }
    }
}

impl<S: Patchable, D: Patchable> PatcherEngine<S, D> {
    pub fn from_config(config: &PatcherConfig) -> Self {
        let mut engine = Self::new(config.strategy);
        config.apply(&mut engine);
        engine
    }
}
