//! Locale-aware type checks.
//!
//! When a column of a locale-aware type resolves a locale, its type check is
//! delegated to a [`LocaleProvider`]. The provider hands back a checker
//! instance owned by that one column, so columns with different locales never
//! share parser state.

mod standard;

use std::sync::Arc;

use rowguard_model::ColumnType;

pub use standard::StandardLocales;

/// Executable part of a locale type check.
pub trait LocaleChecker: Send + Sync {
    /// Offset of the first violated sub-error, or `None` if `value` is accepted.
    ///
    /// Never called with an empty value.
    fn check(&self, value: &str) -> Option<u8>;

    /// Locale-aware numeric parse used by `min`/`max` on number columns.
    fn parse_number(&self, _value: &str) -> Option<f64> {
        None
    }
}

/// One failure a locale check can report, relative to the column's base code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubError {
    pub offset: u8,
    pub message: String,
}

impl SubError {
    pub fn new(offset: u8, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Result of asking a provider for a type check.
pub struct LocaleTypeCheck {
    pub checker: Arc<dyn LocaleChecker>,
    pub sub_errors: Vec<SubError>,
}

impl std::fmt::Debug for LocaleTypeCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleTypeCheck")
            .field("sub_errors", &self.sub_errors)
            .finish_non_exhaustive()
    }
}

/// Source of locale type checks.
pub trait LocaleProvider: Send + Sync {
    /// Build a type check for `column_type` in `locale`.
    ///
    /// `base_code` is the first error code the compiler will assign; the
    /// returned sub-error offsets are added to it. Returns `None` when the
    /// locale is not supported.
    fn type_check(
        &self,
        column_type: ColumnType,
        locale: &str,
        base_code: u8,
    ) -> Option<LocaleTypeCheck>;
}
