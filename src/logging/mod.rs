//! Patch notifications.

use std::any::Any;
use std::fmt;

use tracing::{Level, event};

use crate::core::PatchValue;

/// One side of a patch call, as seen by a [`PatchLogger`].
#[derive(Clone, Copy)]
pub struct PatchSubject<'a> {
    pub type_name: &'static str,
    pub value: &'a dyn Any,
}

impl<'a> PatchSubject<'a> {
    pub fn new<T: Any>(type_name: &'static str, value: &'a T) -> Self {
        Self { type_name, value }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for PatchSubject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchSubject")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Receives patch notifications. Failures inside a logger are not caught.
pub trait PatchLogger: Send + Sync {
    /// Called once per patch call, before any field is written.
    fn on_patch_start(&self, source: PatchSubject<'_>, destination: PatchSubject<'_>);

    /// Called after a logged field was written with its converted value.
    fn on_field_patched(
        &self,
        source_field: &str,
        destination_field: &str,
        new_value: Option<&dyn PatchValue>,
    );
}

/// Routes notifications to `tracing` at INFO level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPatchLogger;

impl PatchLogger for TracingPatchLogger {
    fn on_patch_start(&self, source: PatchSubject<'_>, destination: PatchSubject<'_>) {
        event!(
            Level::INFO,
            source = %source.type_name,
            destination = %destination.type_name,
            "patch started"
        );
    }

    fn on_field_patched(
        &self,
        source_field: &str,
        destination_field: &str,
        new_value: Option<&dyn PatchValue>,
    ) {
        match new_value {
            Some(value) => event!(
                Level::INFO,
                from = %source_field,
                to = %destination_field,
                value = ?value,
                "field patched"
            ),
            None => event!(
                Level::INFO,
                from = %source_field,
                to = %destination_field,
                "field patched with null"
            ),
        }
    }
}
