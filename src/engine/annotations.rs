use std::collections::{HashMap, HashSet};

use tracing::{Level, event};

use crate::core::{PatchError, Result};
use crate::reflect::{Patchable, TypeDescriptor};
use crate::transform::{Transformer, TransformerCatalog};

/// Declarative `#[patch(...)]` directives of one (source, destination) pair.
#[derive(Debug, Clone, Default)]
pub struct AnnotationMetadata {
    /// Source fields marked `ignore`.
    pub from_ignore: HashSet<String>,
    /// Destination fields marked `ignore`.
    pub to_ignore: HashSet<String>,
    /// Source fields skipped when null, including every field of a type marked `ignore_if_null`.
    pub ignore_if_null: HashSet<String>,
    /// Destination fields marked `log_change`, including every field of a type marked `log_change`.
    pub log_change: HashSet<String>,
    /// `map_to` renames in declaration order.
    pub map_to: Vec<(String, String)>,
    /// `transform` references resolved against the catalog, keyed by source field.
    pub field_transformers: HashMap<String, Vec<Transformer>>,
}

impl AnnotationMetadata {
    pub fn extract<S: Patchable, D: Patchable>(catalog: &TransformerCatalog) -> Result<Self> {
        Self::from_descriptors(&S::descriptor(), &D::descriptor(), catalog)
    }

    pub fn from_descriptors<S, D>(
        source: &TypeDescriptor<S>,
        destination: &TypeDescriptor<D>,
        catalog: &TransformerCatalog,
    ) -> Result<Self> {
        let mut metadata = Self::default();

        let source_ignore_null = source.directives().ignore_if_null;
        for field in source.fields() {
            let name = field.name();
            let directives = field.directives();

            if directives.ignore {
                metadata.from_ignore.insert(name.to_string());
            }
            if source_ignore_null || directives.ignore_if_null {
                metadata.ignore_if_null.insert(name.to_string());
            }
            if let Some(target) = directives.map_to {
                metadata.map_to.push((name.to_string(), target.to_string()));
            }
            for key in directives.transforms {
                let transformer =
                    catalog
                        .lookup(key)
                        .ok_or_else(|| PatchError::TransformerNotFound {
                            key: key.to_string(),
                            field: name.to_string(),
                        })?;
                metadata
                    .field_transformers
                    .entry(name.to_string())
                    .or_default()
                    .push(transformer);
            }
        }

        let destination_log_change = destination.directives().log_change;
        for field in destination.fields() {
            let name = field.name();
            let directives = field.directives();

            if directives.ignore {
                metadata.to_ignore.insert(name.to_string());
            }
            if destination_log_change || directives.log_change {
                metadata.log_change.insert(name.to_string());
            }
        }

        event!(
            Level::DEBUG,
            source = %source.type_name(),
            destination = %destination.type_name(),
            renames = metadata.map_to.len(),
            transformers = metadata.field_transformers.len(),
            "declarative metadata extracted"
        );
        Ok(metadata)
    }

    pub fn field_transformers(&self, source_field: &str) -> &[Transformer] {
        self.field_transformers
            .get(source_field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
