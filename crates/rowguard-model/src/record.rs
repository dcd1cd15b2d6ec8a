use serde::{Deserialize, Serialize};

use crate::kind::ErrorKind;

/// One failed cell, materialized from the error bitmap and code map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub row: usize,
    pub col: usize,
    /// Column name.
    pub field: String,
    /// Original cell text.
    pub value: String,
    pub code: ErrorKind,
    /// Name of the rule that failed (`"required"`, `"max"`, `"custom"`, ...).
    pub rule: String,
    pub message: String,
}
