//! Per-cell error codes.
//!
//! The code map stores one byte per cell, split into fixed bands that
//! downstream consumers rely on:
//!
//! | raw        | meaning                                  |
//! |------------|------------------------------------------|
//! | `0`        | valid                                    |
//! | `1..=200`  | compiled rule violation, column-local    |
//! | `201..=250`| custom rule violation, `201 + index`     |
//! | `251`      | duplicate value                          |
//!
//! Inside the crate codes are handled as [`ErrorCode`] and only flattened
//! to bytes when written to the code map.

pub const VALID: u8 = 0;
pub const MAX_RULE_CODE: u8 = 200;
pub const CUSTOM_BASE: u8 = 201;
pub const MAX_CUSTOM_RULES: usize = 50;
pub const UNIQUE_CODE: u8 = 251;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Compiled check, numbered per column starting at 1.
    Rule(u8),
    /// Index into the column's custom rule list.
    Custom(u8),
    Unique,
}

impl ErrorCode {
    pub fn to_raw(self) -> u8 {
        match self {
            Self::Rule(code) => code,
            Self::Custom(index) => CUSTOM_BASE + index,
            Self::Unique => UNIQUE_CODE,
        }
    }

    /// Decode a stored byte. Returns `None` for `0` and unassigned values.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            VALID => None,
            1..=MAX_RULE_CODE => Some(Self::Rule(raw)),
            CUSTOM_BASE..=250 => Some(Self::Custom(raw - CUSTOM_BASE)),
            UNIQUE_CODE => Some(Self::Unique),
            _ => None,
        }
    }
}
