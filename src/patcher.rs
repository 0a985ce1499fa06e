use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::PatcherConfig;
use crate::core::{MappingStrategy, Result};
use crate::engine::PatcherEngine;
use crate::logging::{PatchLogger, TracingPatchLogger};
use crate::mapping::MappingRegistry;
use crate::reflect::Patchable;
use crate::transform::{Transformer, TransformerCatalog};
use crate::validation::PatchValidator;

/// Chaining builder over [`PatcherEngine`].
///
/// # Examples
///
/// ```
/// use rustpatcher::{Patchable, Patcher};
///
/// #[derive(Patchable, Default)]
/// struct UserDto {
///     pub name: Option<String>,
///     pub age: i32,
/// }
///
/// #[derive(Patchable, Default)]
/// struct User {
///     pub name: Option<String>,
///     pub age: i32,
/// }
///
/// # fn main() -> rustpatcher::Result<()> {
/// let patcher = Patcher::<UserDto, User>::new().ignore_null(true);
///
/// let mut user = User { name: Some("Alice".into()), age: 30 };
/// patcher.patch(&UserDto { name: None, age: 31 }, &mut user)?;
///
/// assert_eq!(user.name.as_deref(), Some("Alice"));
/// assert_eq!(user.age, 31);
/// # Ok(())
/// # }
/// ```
pub struct Patcher<S, D> {
    engine: PatcherEngine<S, D>,
}

impl<S: Patchable, D: Patchable> Default for Patcher<S, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Patchable, D: Patchable> Patcher<S, D> {
    /// Empty patcher using [`MappingStrategy::MethodsAndFields`].
    pub fn new() -> Self {
        Self::from_engine(PatcherEngine::default())
    }

    /// Patcher preloaded with [`with_standard_conversions`](Self::with_standard_conversions).
    pub fn for_types() -> Self {
        Self::new().with_standard_conversions()
    }

    pub fn from_engine(engine: PatcherEngine<S, D>) -> Self {
        Self { engine }
    }

    pub fn with_registry<R>(registry: R) -> Self
    where
        R: MappingRegistry<S, D> + 'static,
    {
        Self::from_engine(PatcherEngine::with_registry(registry))
    }

    pub fn from_config(config: &PatcherConfig) -> Self {
        Self::from_engine(PatcherEngine::from_config(config))
    }

    pub fn engine(&self) -> &PatcherEngine<S, D> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PatcherEngine<S, D> {
        &mut self.engine
    }

    pub fn into_engine(self) -> PatcherEngine<S, D> {
        self.engine
    }

    /// Lossless numeric widenings, plus ISO-8601 text into `NaiveDate`
    /// (`2000-01-31`) and `NaiveDateTime` (`2000-01-31T10:15:00`).
    pub fn with_standard_conversions(self) -> Self {
        self.with_transformer(Transformer::new(parse_iso::<NaiveDate>))
            .with_transformer(Transformer::new(parse_iso::<NaiveDateTime>))
            .with_transformer(Transformer::from_fn(|v: i8| i64::from(v)))
            .with_transformer(Transformer::from_fn(|v: i16| i64::from(v)))
            .with_transformer(Transformer::from_fn(|v: i32| i64::from(v)))
            .with_transformer(Transformer::from_fn(|v: u8| u64::from(v)))
            .with_transformer(Transformer::from_fn(|v: u16| u64::from(v)))
            .with_transformer(Transformer::from_fn(|v: u32| u64::from(v)))
            .with_transformer(Transformer::from_fn(|v: i32| f64::from(v)))
            .with_transformer(Transformer::from_fn(|v: f32| f64::from(v)))
    }

    pub fn with_catalog(mut self, catalog: Arc<TransformerCatalog>) -> Self {
        self.engine = self.engine.with_catalog(catalog);
        self
    }

    pub fn with_config(mut self, config: &PatcherConfig) -> Self {
        config.apply(&mut self.engine);
        self
    }

    pub fn with_field_mapping(mut self, source_field: &str, destination_field: &str) -> Self {
        self.engine.add_field_mapping(source_field, destination_field);
        self
    }

    pub fn with_mapping_strategy(mut self, strategy: MappingStrategy) -> Self {
        self.engine.set_strategy(strategy);
        self
    }

    /// Global conversion for its exact (input, output) type pair.
    pub fn with_transformer(mut self, transformer: Transformer) -> Self {
        self.engine.add_global_transformer(transformer);
        self
    }

    /// Conversion tried first for bindings reading `source_field`.
    pub fn with_field_transformer(mut self, source_field: &str, transformer: Transformer) -> Self {
        self.engine.add_field_transformer(source_field, transformer);
        self
    }

    pub fn with_condition<F>(mut self, destination_field: &str, condition: F) -> Self
    where
        F: Fn(&S, &D) -> bool + Send + Sync + 'static,
    {
        self.engine.add_field_condition(destination_field, condition);
        self
    }

    pub fn ignore_null(mut self, enabled: bool) -> Self {
        self.engine.set_global_ignore_null(enabled);
        self
    }

    pub fn ignore_null_field(mut self, source_field: &str) -> Self {
        self.engine.ignore_null_field(source_field, true);
        self
    }

    pub fn ignore_from(mut self, source_field: &str) -> Self {
        self.engine.ignore_from_field(source_field, true);
        self
    }

    pub fn ignore_to(mut self, destination_field: &str) -> Self {
        self.engine.ignore_to_field(destination_field, true);
        self
    }

    /// Callback run after all fields were written.
    pub fn with_map<F>(mut self, mapping: F) -> Self
    where
        F: Fn(&S, &mut D) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.engine.add_post_mapping(mapping);
        self
    }

    pub fn with_logger<L>(mut self, logger: L) -> Self
    where
        L: PatchLogger + 'static,
    {
        self.engine.set_logger(Some(Arc::new(logger)));
        self
    }

    pub fn with_tracing_logger(self) -> Self {
        self.with_logger(TracingPatchLogger)
    }

    pub fn without_logger(mut self) -> Self {
        self.engine.set_logger(None);
        self
    }

    pub fn log_change(mut self, enabled: bool) -> Self {
        self.engine.set_global_log_change(enabled);
        self
    }

    pub fn log_change_field(mut self, destination_field: &str) -> Self {
        self.engine.set_field_log_change(destination_field, true);
        self
    }

    pub fn with_validator<V>(mut self, validator: V) -> Self
    where
        V: PatchValidator<D> + 'static,
    {
        self.engine.set_validator(validator);
        self
    }

    pub fn patch(&self, source: &S, destination: &mut D) -> Result<()> {
        self.engine.patch(source, destination)
    }

    /// Starts a selective patch limited to the named destination fields.
    pub fn patch_only(&self, destination_field: &str) -> SelectivePatch<'_, S, D> {
        SelectivePatch {
            patcher: self,
            fields: vec![destination_field.to_string()],
        }
    }

    pub fn map(&self, source: &S) -> Result<D>
    where
        D: Default,
    {
        self.engine.map(source)
    }

    pub fn map_with<F>(&self, source: &S, supplier: F) -> Result<D>
    where
        F: FnOnce() -> D,
    {
        self.engine.map_with(source, supplier)
    }
}

fn parse_iso<T>(text: String) -> anyhow::Result<T>
where
    T: FromStr<Err = chrono::ParseError>,
{
    Ok(text.trim().parse::<T>()?)
}

/// Destination fields collected by [`Patcher::patch_only`].
pub struct SelectivePatch<'a, S, D> {
    patcher: &'a Patcher<S, D>,
    fields: Vec<String>,
}

impl<S: Patchable, D: Patchable> SelectivePatch<'_, S, D> {
    pub fn patch_only(mut self, destination_field: &str) -> Self {
        self.fields.push(destination_field.to_string());
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn apply(&self, source: &S, destination: &mut D) -> Result<()> {
        self.patcher
            .engine
            .patch_selective(&self.fields, source, destination)
    }
}
