use tracing::{Level, debug_span, event};

use crate::core::{BindingOrigin, MappingStrategy, MatchingPathError, PathSide};
use crate::reflect::TypeDescriptor;

use super::binding::{Binding, ReadHandle, WriteHandle};
use super::naming::{DefaultNamingResolver, NamingResolver};

/// Produces the full binding set between a source and a destination type.
pub trait MappingRegistry<S, D>: Send + Sync {
    fn set_strategy(&mut self, strategy: MappingStrategy);

    fn strategy(&self) -> MappingStrategy;

    /// Explicit `source -> destination` pair. Replaces any earlier explicit
    /// pair targeting the same destination.
    fn register_field_mapping(&mut self, source: &str, destination: &str);

    /// Renames coming from `#[patch(map_to = "...")]`. Replaces the previous set.
    fn set_declared_mappings(&mut self, mappings: Vec<(String, String)>);

    /// Explicit pairs in registration order.
    fn explicit_mappings(&self) -> &[(String, String)];

    /// Resolved bindings fed by `source`.
    fn field_mappings(&self, source: &str) -> Vec<&Binding<S, D>>;

    /// Source fields with at least one resolved binding, in binding order.
    fn resolved_sources(&self) -> Vec<&str>;

    fn bindings(&self) -> &[Binding<S, D>];

    /// Full rebuild of the binding set.
    fn scan_entity_mappings(
        &mut self,
        source: &TypeDescriptor<S>,
        destination: &TypeDescriptor<D>,
    ) -> Result<(), MatchingPathError>;
}

pub struct DefaultMappingRegistry<S, D, R = DefaultNamingResolver> {
    resolver: R,
    strategy: MappingStrategy,
    explicit: Vec<(String, String)>,
    declared: Vec<(String, String)>,
    bindings: Vec<Binding<S, D>>,
}

impl<S, D> DefaultMappingRegistry<S, D> {
    pub fn new(strategy: MappingStrategy) -> Self {
        Self::with_resolver(DefaultNamingResolver, strategy)
    }
}

impl<S, D> Default for DefaultMappingRegistry<S, D> {
    fn default() -> Self {
        Self::new(MappingStrategy::default())
    }
}

impl<S, D, R: NamingResolver> DefaultMappingRegistry<S, D, R> {
    pub fn with_resolver(resolver: R, strategy: MappingStrategy) -> Self {
        Self {
            resolver,
            strategy,
            explicit: Vec::new(),
            declared: Vec::new(),
            bindings: Vec::new(),
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    fn resolve_reader(&self, descriptor: &TypeDescriptor<S>, name: &str) -> Option<ReadHandle<S>> {
        if self.strategy.allows_methods() {
            if let Some(handle) = self.resolver.resolve_getter(descriptor, name) {
                return Some(handle);
            }
        }
        if self.strategy.allows_fields() {
            return self
                .resolver
                .resolve_field(descriptor, name)
                .and_then(ReadHandle::from_field);
        }
        None
    }

    fn resolve_writer(&self, descriptor: &TypeDescriptor<D>, name: &str) -> Option<WriteHandle<D>> {
        if self.strategy.allows_methods() {
            if let Some(handle) = self.resolver.resolve_setter(descriptor, name) {
                return Some(handle);
            }
        }
        if self.strategy.allows_fields() {
            return self
                .resolver
                .resolve_field(descriptor, name)
                .and_then(WriteHandle::from_field);
        }
        None
    }

    fn missing(&self, side: PathSide, field: &str, type_name: &'static str) -> MatchingPathError {
        MatchingPathError {
            side,
            field: field.to_string(),
            type_name,
            strategy: self.strategy,
        }
    }

    fn resolve_pair(
        &self,
        source: &TypeDescriptor<S>,
        destination: &TypeDescriptor<D>,
        from: &str,
        to: &str,
        origin: BindingOrigin,
    ) -> Result<Binding<S, D>, MatchingPathError> {
        let reader = self
            .resolve_reader(source, from)
            .ok_or_else(|| self.missing(PathSide::Source, from, source.type_name()))?;
        let writer = self
            .resolve_writer(destination, to)
            .ok_or_else(|| self.missing(PathSide::Destination, to, destination.type_name()))?;
        Ok(Binding::new(from, to, reader, writer, origin))
    }

    /// Explicit and declared names are reserved in both roles.
    fn is_claimed(&self, name: &str, bindings: &[Binding<S, D>]) -> bool {
        self.explicit
            .iter()
            .chain(self.declared.iter())
            .any(|(from, to)| from == name || to == name)
            || bindings
                .iter()
                .any(|binding| binding.source_field() == name || binding.destination_field() == name)
    }

    fn discover(
        &self,
        name: &str,
        source: &TypeDescriptor<S>,
        destination: &TypeDescriptor<D>,
        bindings: &mut Vec<Binding<S, D>>,
    ) {
        if self.is_claimed(name, bindings) {
            return;
        }
        match (self.resolve_reader(source, name), self.resolve_writer(destination, name)) {
            (Some(reader), Some(writer)) => {
                bindings.push(Binding::new(name, name, reader, writer, BindingOrigin::Convention));
            }
            _ => event!(Level::TRACE, field = name, "no convention match"),
        }
    }
}

impl<S, D, R> MappingRegistry<S, D> for DefaultMappingRegistry<S, D, R>
where
    S: 'static,
    D: 'static,
    R: NamingResolver,
{
    fn set_strategy(&mut self, strategy: MappingStrategy) {
        self.strategy = strategy;
    }

    fn strategy(&self) -> MappingStrategy {
        self.strategy
    }

    fn register_field_mapping(&mut self, source: &str, destination: &str) {
        self.explicit.retain(|(_, to)| to != destination);
        self.explicit.push((source.to_string(), destination.to_string()));
    }

    fn set_declared_mappings(&mut self, mappings: Vec<(String, String)>) {
        let mut declared: Vec<(String, String)> = Vec::with_capacity(mappings.len());
        for (from, to) in mappings {
            declared.retain(|(_, existing)| existing != &to);
            declared.push((from, to));
        }
        self.declared = declared;
    }

    fn explicit_mappings(&self) -> &[(String, String)] {
        &self.explicit
    }

    fn field_mappings(&self, source: &str) -> Vec<&Binding<S, D>> {
        self.bindings
            .iter()
            .filter(|binding| binding.source_field() == source)
            .collect()
    }

    fn resolved_sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for binding in &self.bindings {
            if !sources.contains(&binding.source_field()) {
                sources.push(binding.source_field());
            }
        }
        sources
    }

    fn bindings(&self) -> &[Binding<S, D>] {
        &self.bindings
    }

    fn scan_entity_mappings(
        &mut self,
        source: &TypeDescriptor<S>,
        destination: &TypeDescriptor<D>,
    ) -> Result<(), MatchingPathError> {
        let span = debug_span!(
            "patcher.registry.scan",
            source = %source.type_name(),
            destination = %destination.type_name(),
            strategy = %self.strategy
        );
        let _guard = span.enter();

        self.bindings.clear();
        let mut bindings = Vec::new();

        for (from, to) in &self.explicit {
            bindings.push(self.resolve_pair(source, destination, from, to, BindingOrigin::Explicit)?);
        }

        for (from, to) in &self.declared {
            if self.explicit.iter().any(|(_, explicit_to)| explicit_to == to) {
                event!(Level::DEBUG, from = %from, to = %to, "declared mapping shadowed by explicit one");
                continue;
            }
            bindings.push(self.resolve_pair(source, destination, from, to, BindingOrigin::Declared)?);
        }

        if self.strategy.allows_methods() {
            for method in destination.methods() {
                if let Some(name) = self.resolver.setter_property(method) {
                    self.discover(name, source, destination, &mut bindings);
                }
            }
        }

        if self.strategy.allows_fields() {
            for field in destination.fields().iter().filter(|field| field.is_public()) {
                self.discover(field.name(), source, destination, &mut bindings);
            }
        }

        event!(Level::DEBUG, bindings = bindings.len(), "bindings resolved");
        self.bindings = bindings;
        Ok(())
    }
}
