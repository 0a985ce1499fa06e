use std::any::type_name;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{Level, debug_span, event};

use crate::core::{BoxError, MappingStrategy, PatchError, Result, Value};
use crate::logging::{PatchLogger, PatchSubject};
use crate::mapping::{Binding, DefaultMappingRegistry, MappingRegistry};
use crate::reflect::Patchable;
use crate::transform::{Transformer, TransformerCatalog};
use crate::validation::PatchValidator;

use super::annotations::AnnotationMetadata;
use super::cache::CacheState;
use super::context::PatchContext;
use super::step::{Conversion, PatchStep};

/// Everything the lazy discovery and compilation path touches.
struct EngineState<S, D> {
    registry: Box<dyn MappingRegistry<S, D>>,
    metadata: Option<Arc<AnnotationMetadata>>,
    bindings: Arc<[Binding<S, D>]>,
    steps: Arc<[PatchStep<S, D>]>,
    cache: CacheState,
}

impl<S, D> EngineState<S, D> {
    fn new(registry: Box<dyn MappingRegistry<S, D>>) -> Self {
        Self {
            registry,
            metadata: None,
            bindings: Arc::from(Vec::new()),
            steps: Arc::from(Vec::new()),
            cache: CacheState::Stale,
        }
    }
}

type Discovery<S, D> = (Arc<[Binding<S, D>]>, Arc<AnnotationMetadata>);

/// Copies field values from `S` into `D`.
///
/// Configure through the `&mut self` mutators, then share the engine (for
/// example behind an `Arc`) and call [`patch`](Self::patch) from any number of
/// threads. Bindings are discovered on first use and compiled into a step list
/// that is reused until the configuration changes.
pub struct PatcherEngine<S, D> {
    context: PatchContext<S, D>,
    catalog: Arc<TransformerCatalog>,
    state: RwLock<EngineState<S, D>>,
}

impl<S: Patchable, D: Patchable> Default for PatcherEngine<S, D> {
    fn default() -> Self {
        Self::new(MappingStrategy::default())
    }
}

impl<S: Patchable, D: Patchable> PatcherEngine<S, D> {
    pub fn new(strategy: MappingStrategy) -> Self {
        Self::with_registry(DefaultMappingRegistry::new(strategy))
    }

    pub fn with_registry<R>(registry: R) -> Self
    where
        R: MappingRegistry<S, D> + 'static,
    {
        Self {
            context: PatchContext::new(),
            catalog: Arc::clone(TransformerCatalog::global()),
            state: RwLock::new(EngineState::new(Box::new(registry))),
        }
    }

    /// Resolves `transform` directives against `catalog` instead of the global one.
    pub fn with_catalog(mut self, catalog: Arc<TransformerCatalog>) -> Self {
        self.catalog = catalog;
        let state = self.state_mut();
        state.metadata = None;
        state.cache.invalidate_discovery();
        self
    }

    pub fn context(&self) -> &PatchContext<S, D> {
        &self.context
    }

    pub fn catalog(&self) -> &Arc<TransformerCatalog> {
        &self.catalog
    }

    pub fn cache_state(&self) -> CacheState {
        self.read_state().cache
    }

    pub fn strategy(&self) -> MappingStrategy {
        self.read_state().registry.strategy()
    }

    // A panic inside discovery leaves the cache marked stale, so the state is
    // still consistent and the next call redoes the interrupted work.
    fn read_state(&self) -> RwLockReadGuard<'_, EngineState<S, D>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, EngineState<S, D>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut EngineState<S, D> {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    fn invalidate_steps(&mut self) {
        self.state_mut().cache.invalidate_steps();
    }

    // ------------------------------------------------------------------------
    // Registry configuration (forces rediscovery)
    // ------------------------------------------------------------------------

    /// Direct access to the registry. Bindings are rediscovered on the next call.
    pub fn mapping_registry_mut(&mut self) -> &mut (dyn MappingRegistry<S, D> + 'static) {
        let state = self.state_mut();
        state.cache.invalidate_discovery();
        state.registry.as_mut()
    }

    pub fn set_strategy(&mut self, strategy: MappingStrategy) {
        let state = self.state_mut();
        state.registry.set_strategy(strategy);
        state.cache.invalidate_discovery();
    }

    pub fn add_field_mapping(&mut self, source_field: &str, destination_field: &str) {
        let state = self.state_mut();
        state
            .registry
            .register_field_mapping(source_field, destination_field);
        state.cache.invalidate_discovery();
    }

    // ------------------------------------------------------------------------
    // Context configuration (forces recompilation)
    // ------------------------------------------------------------------------

    pub fn add_global_transformer(&mut self, transformer: Transformer) {
        self.context.add_global_transformer(transformer);
        self.invalidate_steps();
    }

    pub fn add_field_transformer(&mut self, source_field: &str, transformer: Transformer) {
        self.context.add_field_transformer(source_field, transformer);
        self.invalidate_steps();
    }

    pub fn add_field_condition<F>(&mut self, destination_field: &str, condition: F)
    where
        F: Fn(&S, &D) -> bool + Send + Sync + 'static,
    {
        self.context.add_condition(destination_field, Arc::new(condition));
        self.invalidate_steps();
    }

    pub fn set_global_ignore_null(&mut self, enabled: bool) {
        if self.context.set_global_ignore_null(enabled) {
            self.invalidate_steps();
        }
    }

    pub fn ignore_null_field(&mut self, source_field: &str, enabled: bool) {
        if self.context.set_ignore_null_field(source_field, enabled) {
            self.invalidate_steps();
        }
    }

    pub fn ignore_from_field(&mut self, source_field: &str, enabled: bool) {
        if self.context.set_ignore_from(source_field, enabled) {
            self.invalidate_steps();
        }
    }

    pub fn ignore_to_field(&mut self, destination_field: &str, enabled: bool) {
        if self.context.set_ignore_to(destination_field, enabled) {
            self.invalidate_steps();
        }
    }

    // ------------------------------------------------------------------------
    // Call-time configuration (no invalidation)
    // ------------------------------------------------------------------------

    pub fn add_post_mapping<F>(&mut self, mapping: F)
    where
        F: Fn(&S, &mut D) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.context.add_post_mapping(Arc::new(mapping));
    }

    pub fn set_logger(&mut self, logger: Option<Arc<dyn PatchLogger>>) {
        self.context.set_logger(logger);
    }

    pub fn set_global_log_change(&mut self, enabled: bool) {
        self.context.set_global_log_change(enabled);
    }

    pub fn set_field_log_change(&mut self, destination_field: &str, enabled: bool) {
        self.context.set_field_log_change(destination_field, enabled);
    }

    pub fn set_validator<V>(&mut self, validator: V)
    where
        V: PatchValidator<D> + 'static,
    {
        self.context.set_validator(Some(Arc::new(validator)));
    }

    pub fn clear_validator(&mut self) {
        self.context.set_validator(None);
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Copies every bound field of `source` into `destination`.
    ///
    /// A failing step aborts the call; fields written by earlier steps stay written.
    pub fn patch(&self, source: &S, destination: &mut D) -> Result<()> {
        let steps = self.compiled_steps()?;
        self.execute(&steps, source, destination)
    }

    /// Like [`patch`](Self::patch), restricted to the given destination fields.
    /// The restricted step list is compiled per call and never cached.
    pub fn patch_selective<I, F>(&self, destination_fields: I, source: &S, destination: &mut D) -> Result<()>
    where
        I: IntoIterator<Item = F>,
        F: AsRef<str>,
    {
        let wanted: HashSet<String> = destination_fields
            .into_iter()
            .map(|field| field.as_ref().to_string())
            .collect();
        let (bindings, metadata) = self.discovery()?;
        let steps = self.compile(&bindings, &metadata, Some(&wanted))?;
        self.execute(&steps, source, destination)
    }

    /// Patches into `D::default()`.
    pub fn map(&self, source: &S) -> Result<D>
    where
        D: Default,
    {
        self.map_with(source, D::default)
    }

    /// Patches into an instance built by `supplier`.
    pub fn map_with<F>(&self, source: &S, supplier: F) -> Result<D>
    where
        F: FnOnce() -> D,
    {
        let mut destination = supplier();
        self.patch(source, &mut destination)?;
        Ok(destination)
    }

    /// Current bindings, discovered first if needed.
    pub fn bindings(&self) -> Result<Arc<[Binding<S, D>]>> {
        Ok(self.discovery()?.0)
    }

    /// Current compiled steps, compiled first if needed.
    pub fn steps(&self) -> Result<Arc<[PatchStep<S, D>]>> {
        self.compiled_steps()
    }

    // ------------------------------------------------------------------------
    // Discovery and compilation
    // ------------------------------------------------------------------------

    fn compiled_steps(&self) -> Result<Arc<[PatchStep<S, D>]>> {
        {
            let state = self.read_state();
            if !state.cache.needs_compilation() {
                return Ok(Arc::clone(&state.steps));
            }
        }

        let mut state = self.write_state();
        let metadata = self.refresh(&mut state)?;
        if state.cache.needs_compilation() {
            let bindings = Arc::clone(&state.bindings);
            let steps = self.compile(&bindings, &metadata, None)?;
            state.steps = Arc::from(steps);
            state.cache.compilation_done();
        }
        Ok(Arc::clone(&state.steps))
    }

    fn discovery(&self) -> Result<Discovery<S, D>> {
        {
            let state = self.read_state();
            if let (false, Some(metadata)) = (state.cache.needs_discovery(), &state.metadata) {
                return Ok((Arc::clone(&state.bindings), Arc::clone(metadata)));
            }
        }

        let mut state = self.write_state();
        let metadata = self.refresh(&mut state)?;
        Ok((Arc::clone(&state.bindings), metadata))
    }

    /// Extracts declarative metadata once, then rediscovers bindings if stale.
    fn refresh(&self, state: &mut EngineState<S, D>) -> Result<Arc<AnnotationMetadata>> {
        let metadata = match state.metadata.clone() {
            Some(metadata) => metadata,
            None => {
                let metadata = Arc::new(AnnotationMetadata::extract::<S, D>(&self.catalog)?);
                state.metadata = Some(Arc::clone(&metadata));
                metadata
            }
        };

        if state.cache.needs_discovery() {
            state.registry.set_declared_mappings(metadata.map_to.clone());
            state
                .registry
                .scan_entity_mappings(&S::descriptor(), &D::descriptor())?;
            state.bindings = Arc::from(state.registry.bindings().to_vec());
            state.cache.discovery_done();
        }
        Ok(metadata)
    }

    fn compile(
        &self,
        bindings: &[Binding<S, D>],
        metadata: &AnnotationMetadata,
        only: Option<&HashSet<String>>,
    ) -> Result<Vec<PatchStep<S, D>>> {
        let span = debug_span!(
            "patcher.compile",
            bindings = bindings.len(),
            selective = only.is_some()
        );
        let _enter = span.enter();

        let mut steps = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let (from, to) = (binding.source_field(), binding.destination_field());

            if only.is_some_and(|only| !only.contains(to)) {
                continue;
            }
            if self.context.is_source_ignored(from) || metadata.from_ignore.contains(from) {
                event!(Level::DEBUG, from = %from, "source field ignored");
                continue;
            }
            if self.context.is_destination_ignored(to) || metadata.to_ignore.contains(to) {
                event!(Level::DEBUG, to = %to, "destination field ignored");
                continue;
            }

            let conversion = match self.select_conversion(binding, metadata) {
                Some(conversion) => conversion,
                None if binding.is_convention() => {
                    event!(
                        Level::DEBUG,
                        from = %from,
                        to = %to,
                        "no suitable conversion, convention binding dropped"
                    );
                    continue;
                }
                None => {
                    event!(Level::DEBUG, from = %from, to = %to, "no suitable conversion");
                    Conversion::Missing
                }
            };

            steps.push(PatchStep::new(
                binding.clone(),
                conversion,
                metadata.ignore_if_null.contains(from),
                metadata.log_change.contains(to),
            ));
        }

        event!(Level::DEBUG, steps = steps.len(), "steps compiled");
        Ok(steps)
    }

    /// Field transformers first (explicit, then declared), then identity, then
    /// the global transformer for the exact type pair.
    fn select_conversion(
        &self,
        binding: &Binding<S, D>,
        metadata: &AnnotationMetadata,
    ) -> Option<Conversion> {
        let (source, destination) = (binding.source_type(), binding.destination_type());

        let attached = self
            .context
            .field_transformers(binding.source_field())
            .iter()
            .chain(metadata.field_transformers(binding.source_field()))
            .find(|transformer| transformer.accepts(source, destination));
        if let Some(transformer) = attached {
            return Some(Conversion::Transform(transformer.clone()));
        }

        if destination.accepts(&source) {
            return Some(Conversion::Identity);
        }

        self.context
            .global_transformer(source, destination)
            .cloned()
            .map(Conversion::Transform)
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    fn execute(&self, steps: &[PatchStep<S, D>], source: &S, destination: &mut D) -> Result<()> {
        let span = debug_span!(
            "patcher.patch",
            source = %type_name::<S>(),
            destination = %type_name::<D>(),
            steps = steps.len()
        );
        let _enter = span.enter();

        // Null checks and conditions see the instances as they were before this call.
        let mut planned: Vec<(&PatchStep<S, D>, Option<Value>)> = Vec::with_capacity(steps.len());
        for step in steps {
            let value = step
                .binding()
                .read(source)
                .map_err(|err| Self::step_error(step, err))?;
            if value.is_none() && self.skips_null(step) {
                event!(Level::TRACE, from = %step.source_field(), "null value skipped");
                continue;
            }
            if !self
                .context
                .conditions_hold(step.destination_field(), source, destination)
            {
                event!(Level::TRACE, to = %step.destination_field(), "condition not met");
                continue;
            }
            planned.push((step, value));
        }

        if let Some((step, _)) = planned.iter().find(|(step, _)| step.conversion().is_missing()) {
            let binding = step.binding();
            return Err(PatchError::mapping(format!(
                "Unable to find suitable transformation for {} ({}) to {} ({})",
                binding.source_field(),
                binding.source_type(),
                binding.destination_field(),
                binding.destination_type()
            )));
        }

        let logger = self.context.logger();
        if let Some(logger) = logger {
            logger.on_patch_start(
                PatchSubject::new(type_name::<S>(), source),
                PatchSubject::new(type_name::<D>(), &*destination),
            );
        }

        for (step, value) in planned {
            let converted = step
                .conversion()
                .apply(value)
                .map_err(|err| Self::step_error(step, err))?;
            let logged = match logger {
                Some(logger) if self.logs_change(step) => {
                    Some((logger, converted.as_ref().map(|value| value.clone_value())))
                }
                _ => None,
            };
            step.binding()
                .write(destination, converted)
                .map_err(|err| Self::step_error(step, err))?;
            if let Some((logger, value)) = logged {
                logger.on_field_patched(step.source_field(), step.destination_field(), value.as_deref());
            }
        }

        for post_mapping in self.context.post_mappings() {
            post_mapping(source, &mut *destination).map_err(|err| {
                PatchError::mapping_caused("Exception while processing post-mapping", err)
            })?;
        }

        if let Some(validator) = self.context.validator() {
            validator.validate(destination)?;
        }
        Ok(())
    }

    fn skips_null(&self, step: &PatchStep<S, D>) -> bool {
        step.declared_skip_if_null() || self.context.ignores_null(step.source_field())
    }

    fn logs_change(&self, step: &PatchStep<S, D>) -> bool {
        step.declared_log_change() || self.context.logs_change(step.destination_field())
    }

    fn step_error(step: &PatchStep<S, D>, cause: impl Into<BoxError>) -> PatchError {
        PatchError::mapping_caused(
            format!(
                "Exception during mapping {} to {}",
                step.source_field(),
                step.destination_field()
            ),
            cause,
        )
    }
}
