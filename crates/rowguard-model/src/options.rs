//! Options controlling how cell values are compared during validation.

use serde::{Deserialize, Serialize};

/// How values are compared by `unique` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UniqueMatching {
    /// Byte-for-byte comparison.
    #[default]
    Exact,
    /// Compare after Unicode lowercasing.
    CaseInsensitive,
}

/// Options for a validation engine.
///
/// Defaults validate raw cell text exactly as supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Trim surrounding whitespace before running any check.
    /// Default: false.
    pub trim_values: bool,

    /// Comparison used when tracking duplicates.
    pub unique_matching: UniqueMatching,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_trim_values(mut self, enable: bool) -> Self {
        self.trim_values = enable;
        self
    }

    #[must_use]
    pub fn with_unique_matching(mut self, matching: UniqueMatching) -> Self {
        self.unique_matching = matching;
        self
    }
}
