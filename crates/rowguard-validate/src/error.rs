//! Errors raised while compiling a schema.
//!
//! Bad data never produces an error; only a malformed schema does.

use rowguard_model::{ColumnType, ModelError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    /// Schema-level problem such as duplicate column names.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A `pattern` rule does not compile.
    #[error("column '{column}': invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        column: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Rule cannot be applied to the column's type.
    #[error("column '{column}': rule '{rule}' cannot be applied to a {column_type} column")]
    RuleTypeMismatch {
        column: String,
        rule: &'static str,
        column_type: ColumnType,
    },

    /// `min`/`max` bound is NaN or infinite.
    #[error("column '{column}': rule '{rule}' has a non-finite bound")]
    InvalidBound { column: String, rule: &'static str },

    /// `enum` rule with no allowed values.
    #[error("column '{column}': enum rule has no allowed values")]
    EmptyEnum { column: String },

    /// No locale type check is available for the resolved locale.
    #[error("column '{column}': locale '{locale}' is not supported for {column_type} values")]
    UnsupportedLocale {
        column: String,
        locale: String,
        column_type: ColumnType,
    },

    /// Locale provider returned a type check without sub-errors.
    #[error("column '{column}': locale '{locale}' type check declares no errors")]
    EmptyLocaleCheck { column: String, locale: String },

    /// More compiled checks than the rule code band can hold.
    #[error("column '{column}': more than {limit} compiled checks")]
    TooManyChecks { column: String, limit: u8 },

    /// More custom rules than the custom code band can hold.
    #[error("column '{column}': {count} custom rules exceed the limit of {limit}")]
    TooManyCustomRules {
        column: String,
        count: usize,
        limit: usize,
    },
}

pub type Result<T> = std::result::Result<T, CompileError>;
