use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical error kind, independent of column-local numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "REQUIRED")]
    RequiredMissing,
    #[serde(rename = "TYPE_MISMATCH")]
    TypeMismatch,
    #[serde(rename = "RANGE")]
    RangeViolation,
    #[serde(rename = "LENGTH")]
    LengthViolation,
    #[serde(rename = "PATTERN")]
    PatternMismatch,
    #[serde(rename = "ENUM")]
    EnumViolation,
    #[serde(rename = "EMAIL")]
    EmailFormatInvalid,
    #[serde(rename = "UNIQUE")]
    UniqueViolation,
    #[serde(rename = "CUSTOM")]
    CustomRuleFailure,
}

impl ErrorKind {
    /// Stable code string, identical to the serialized form.
    pub fn code(self) -> &'static str {
        match self {
            Self::RequiredMissing => "REQUIRED",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::RangeViolation => "RANGE",
            Self::LengthViolation => "LENGTH",
            Self::PatternMismatch => "PATTERN",
            Self::EnumViolation => "ENUM",
            Self::EmailFormatInvalid => "EMAIL",
            Self::UniqueViolation => "UNIQUE",
            Self::CustomRuleFailure => "CUSTOM",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
