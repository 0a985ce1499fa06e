use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lazy_static::lazy_static;
use tracing::{Level, event};

use super::Transformer;

lazy_static! {
    static ref GLOBAL_TRANSFORMER_CATALOG: Arc<TransformerCatalog> =
        Arc::new(TransformerCatalog::new());
}

/// Named transformers referenced by `#[patch(transform = "...")]`.
///
/// Engines hold an `Arc` to a catalog; the process-wide default is
/// [`TransformerCatalog::global`]. The catalog may be changed at any time, it
/// is only read when an engine extracts its declarative metadata.
#[derive(Debug, Default)]
pub struct TransformerCatalog {
    entries: RwLock<HashMap<String, Transformer>>,
}

impl TransformerCatalog {
    /// Shared default catalog.
    pub fn global() -> &'static Arc<TransformerCatalog> {
        &GLOBAL_TRANSFORMER_CATALOG
    }

    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `transformer` under `key`, returning the one it replaced.
    pub fn register(&self, key: impl Into<String>, transformer: Transformer) -> Option<Transformer> {
        let key = key.into();
        event!(
            Level::DEBUG,
            key = %key,
            input = %transformer.input_type(),
            output = %transformer.output_type(),
            "transformer registered"
        );
        self.write().insert(key, transformer)
    }

    pub fn unregister(&self, key: &str) -> Option<Transformer> {
        self.write().remove(key)
    }

    pub fn lookup(&self, key: &str) -> Option<Transformer> {
        self.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Entries stay consistent even if a holder panicked: every update is a
    // single map operation.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Transformer>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Transformer>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
