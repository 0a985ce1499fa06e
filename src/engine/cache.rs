/// Validity of the two cached stages of an engine.
///
/// ```text
/// Stale --discovery--> BindingsReady --compilation--> Ready
///   ^                        ^                          |
///   |                        +---- context mutation ----+
///   +------------------ registry mutation --------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheState {
    /// Bindings must be rediscovered.
    #[default]
    Stale,
    /// Bindings are current, steps must be recompiled.
    BindingsReady,
    /// Compiled steps can be reused.
    Ready,
}

impl CacheState {
    pub fn needs_discovery(self) -> bool {
        self == Self::Stale
    }

    pub fn needs_compilation(self) -> bool {
        self != Self::Ready
    }

    pub fn invalidate_discovery(&mut self) {
        *self = Self::Stale;
    }

    pub fn invalidate_steps(&mut self) {
        if *self == Self::Ready {
            *self = Self::BindingsReady;
        }
    }

    pub(crate) fn discovery_done(&mut self) {
        *self = Self::BindingsReady;
    }

    pub(crate) fn compilation_done(&mut self) {
        debug_assert_eq!(*self, Self::BindingsReady, "compiled steps without bindings");
        *self = Self::Ready;
    }
}
