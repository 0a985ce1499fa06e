use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::core::ValueType;
use crate::logging::PatchLogger;
use crate::transform::Transformer;
use crate::validation::PatchValidator;

/// Per-destination-field predicate, evaluated against both live instances.
pub type Condition<S, D> = Arc<dyn Fn(&S, &D) -> bool + Send + Sync>;
/// Callback run after every step, in registration order.
pub type PostMapping<S, D> = Arc<dyn Fn(&S, &mut D) -> anyhow::Result<()> + Send + Sync>;

/// Engine-level configuration.
///
/// Mutators report whether anything changed so the engine only drops its
/// compiled steps when it has to.
pub struct PatchContext<S, D> {
    global_transformers: HashMap<(ValueType, ValueType), Transformer>,
    field_transformers: HashMap<String, Vec<Transformer>>,
    conditions: HashMap<String, Vec<Condition<S, D>>>,
    global_ignore_null: bool,
    ignored_null_fields: HashSet<String>,
    ignored_from: HashSet<String>,
    ignored_to: HashSet<String>,
    global_log_change: bool,
    log_change_fields: HashMap<String, bool>,
    post_mappings: Vec<PostMapping<S, D>>,
    logger: Option<Arc<dyn PatchLogger>>,
    validator: Option<Arc<dyn PatchValidator<D>>>,
}

impl<S, D> Default for PatchContext<S, D> {
    fn default() -> Self {
        Self {
            global_transformers: HashMap::new(),
            field_transformers: HashMap::new(),
            conditions: HashMap::new(),
            global_ignore_null: false,
            ignored_null_fields: HashSet::new(),
            ignored_from: HashSet::new(),
            ignored_to: HashSet::new(),
            global_log_change: false,
            log_change_fields: HashMap::new(),
            post_mappings: Vec::new(),
            logger: None,
            validator: None,
        }
    }
}

fn toggle(set: &mut HashSet<String>, field: &str, enabled: bool) -> bool {
    if enabled {
        set.insert(field.to_string())
    } else {
        set.remove(field)
    }
}

impl<S, D> PatchContext<S, D> {
    pub fn new() -> Self {
        Self::default()
    }

    // --- transformers ---

    /// Replaces any transformer registered for the same (input, output) pair.
    pub fn add_global_transformer(&mut self, transformer: Transformer) {
        self.global_transformers.insert(
            (transformer.input_type(), transformer.output_type()),
            transformer,
        );
    }

    pub fn add_field_transformer(&mut self, field: &str, transformer: Transformer) {
        self.field_transformers
            .entry(field.to_string())
            .or_default()
            .push(transformer);
    }

    pub fn global_transformer(&self, input: ValueType, output: ValueType) -> Option<&Transformer> {
        self.global_transformers.get(&(input, output))
    }

    pub fn field_transformers(&self, field: &str) -> &[Transformer] {
        self.field_transformers
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    // --- conditions ---

    pub fn add_condition(&mut self, field: &str, condition: Condition<S, D>) {
        self.conditions
            .entry(field.to_string())
            .or_default()
            .push(condition);
    }

    /// Every predicate registered for `destination_field` holds.
    pub fn conditions_hold(&self, destination_field: &str, source: &S, destination: &D) -> bool {
        self.conditions
            .get(destination_field)
            .is_none_or(|conditions| conditions.iter().all(|condition| condition(source, destination)))
    }

    // --- ignore rules ---

    pub fn set_global_ignore_null(&mut self, enabled: bool) -> bool {
        let changed = self.global_ignore_null != enabled;
        self.global_ignore_null = enabled;
        changed
    }

    pub fn global_ignore_null(&self) -> bool {
        self.global_ignore_null
    }

    pub fn set_ignore_null_field(&mut self, source_field: &str, enabled: bool) -> bool {
        toggle(&mut self.ignored_null_fields, source_field, enabled)
    }

    pub fn ignores_null(&self, source_field: &str) -> bool {
        self.global_ignore_null || self.ignored_null_fields.contains(source_field)
    }

    pub fn set_ignore_from(&mut self, source_field: &str, enabled: bool) -> bool {
        toggle(&mut self.ignored_from, source_field, enabled)
    }

    pub fn is_source_ignored(&self, source_field: &str) -> bool {
        self.ignored_from.contains(source_field)
    }

    pub fn set_ignore_to(&mut self, destination_field: &str, enabled: bool) -> bool {
        toggle(&mut self.ignored_to, destination_field, enabled)
    }

    pub fn is_destination_ignored(&self, destination_field: &str) -> bool {
        self.ignored_to.contains(destination_field)
    }

    // --- logging ---

    pub fn set_global_log_change(&mut self, enabled: bool) {
        self.global_log_change = enabled;
    }

    pub fn set_field_log_change(&mut self, destination_field: &str, enabled: bool) {
        self.log_change_fields
            .insert(destination_field.to_string(), enabled);
    }

    pub fn logs_change(&self, destination_field: &str) -> bool {
        self.global_log_change
            || self
                .log_change_fields
                .get(destination_field)
                .copied()
                .unwrap_or(false)
    }

    pub fn set_logger(&mut self, logger: Option<Arc<dyn PatchLogger>>) {
        self.logger = logger;
    }

    pub fn logger(&self) -> Option<&Arc<dyn PatchLogger>> {
        self.logger.as_ref()
    }

    // --- post-processing ---

    pub fn add_post_mapping(&mut self, mapping: PostMapping<S, D>) {
        self.post_mappings.push(mapping);
    }

    pub fn post_mappings(&self) -> &[PostMapping<S, D>] {
        &self.post_mappings
    }

    pub fn set_validator(&mut self, validator: Option<Arc<dyn PatchValidator<D>>>) {
        self.validator = validator;
    }

    pub fn validator(&self) -> Option<&Arc<dyn PatchValidator<D>>> {
        self.validator.as_ref()
    }
}

impl<S, D> fmt::Debug for PatchContext<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchContext")
            .field("global_transformers", &self.global_transformers.len())
            .field("field_transformers", &self.field_transformers.keys().collect::<Vec<_>>())
            .field("conditions", &self.conditions.keys().collect::<Vec<_>>())
            .field("global_ignore_null", &self.global_ignore_null)
            .field("ignored_null_fields", &self.ignored_null_fields)
            .field("ignored_from", &self.ignored_from)
            .field("ignored_to", &self.ignored_to)
            .field("global_log_change", &self.global_log_change)
            .field("log_change_fields", &self.log_change_fields)
            .field("post_mappings", &self.post_mappings.len())
            .field("logger", &self.logger.is_some())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}
