//! Host context configuration

use serde::{Deserialize, Serialize};

/// Settings for a [`crate::Context`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostConfig {
    /// Raise a TypeError when a mutating operation is refused, instead of
    /// reporting `false`.
    /// Default: true
    pub strict: bool,

    /// Allocations between automatic collections in `maybe_collect`.
    /// Default: 4096
    pub gc_threshold: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            strict: true,
            gc_threshold: 4096,
        }
    }
}

impl HostConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config for sloppy-mode semantics.
    pub fn sloppy() -> Self {
        Self {
            strict: false,
            ..Default::default()
        }
    }

    /// Enable or disable strict mode.
    pub fn strict(mut self, enabled: bool) -> Self {
        self.strict = enabled;
        self
    }

    /// Set the collection threshold.
    pub fn gc_threshold(mut self, threshold: usize) -> Self {
        self.gc_threshold = threshold;
        self
    }
}
