//! Rule code generation.
//!
//! Each declarative [`Rule`] becomes a flat [`Check`] plus the metadata used
//! to describe a failure. A column's checks run in a single loop with one
//! `match` per check; there is no nested dispatch.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use rowguard_model::{ColumnType, ErrorKind, Rule};

use crate::error::{CompileError, Result};
use crate::locale::LocaleChecker;

pub(crate) static ISO_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid ISO date regex"));

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

static CURRENCY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?[$€£¥]?\s?(\d{1,3}(,\d{3})+|\d+)(\.\d{1,2})?$")
        .expect("Invalid currency regex")
});

const BOOLEAN_LITERALS: &[&str] = &["true", "false", "1", "0", "yes", "no"];

const PHONE_MIN_DIGITS: usize = 7;
const PHONE_MAX_DIGITS: usize = 15;

/// Human-readable description of one error code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMeta {
    pub rule_name: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorMeta {
    pub fn new(rule_name: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Type check used when no locale applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCheck {
    Number,
    Integer,
    Boolean,
    Date,
    Phone,
    Currency,
}

impl TypeCheck {
    fn for_type(column_type: ColumnType) -> Option<Self> {
        match column_type {
            ColumnType::Number => Some(Self::Number),
            ColumnType::Integer => Some(Self::Integer),
            ColumnType::Boolean => Some(Self::Boolean),
            ColumnType::Date => Some(Self::Date),
            ColumnType::Phone => Some(Self::Phone),
            ColumnType::Currency => Some(Self::Currency),
            ColumnType::String | ColumnType::Enum => None,
        }
    }

    fn accepts(self, value: &str) -> bool {
        match self {
            Self::Number => parse_plain_number(value).is_some(),
            Self::Integer => parse_plain_number(value).is_some_and(|n| n.fract() == 0.0),
            Self::Boolean => BOOLEAN_LITERALS
                .iter()
                .any(|literal| value.eq_ignore_ascii_case(literal)),
            Self::Date => ISO_DATE_REGEX.is_match(value),
            Self::Phone => is_plausible_phone(value),
            Self::Currency => CURRENCY_REGEX.is_match(value.trim()),
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::Number => "Must be a valid number",
            Self::Integer => "Must be a whole number",
            Self::Boolean => "Must be true/false, yes/no or 1/0",
            Self::Date => "Must be a date in YYYY-MM-DD format",
            Self::Phone => "Must be a valid phone number",
            Self::Currency => "Must be a valid currency amount",
        }
    }
}

/// How `min`/`max` turn a cell into a number.
#[derive(Clone, Default)]
pub enum NumberParse {
    #[default]
    Plain,
    /// Locale-aware parse shared with the column's type check.
    Locale(Arc<dyn LocaleChecker>),
}

impl NumberParse {
    pub fn parse(&self, value: &str) -> Option<f64> {
        match self {
            Self::Plain => parse_plain_number(value),
            Self::Locale(checker) => checker.parse_number(value),
        }
    }
}

impl fmt::Debug for NumberParse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("Plain"),
            Self::Locale(_) => f.write_str("Locale"),
        }
    }
}

/// One executable check.
pub enum Check {
    Required,
    Type(TypeCheck),
    /// Locale type check; the checker reports a sub-error offset.
    ///
    /// `offsets` holds the declared sub-error offsets, sorted and non-empty.
    LocaleType {
        checker: Arc<dyn LocaleChecker>,
        offsets: Vec<u8>,
    },
    Min { bound: f64, parse: NumberParse },
    Max { bound: f64, parse: NumberParse },
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    Enum(HashSet<String>),
    Email,
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("Required"),
            Self::Type(check) => f.debug_tuple("Type").field(check).finish(),
            Self::LocaleType { offsets, .. } => {
                f.debug_tuple("LocaleType").field(offsets).finish()
            }
            Self::Min { bound, .. } => f.debug_tuple("Min").field(bound).finish(),
            Self::Max { bound, .. } => f.debug_tuple("Max").field(bound).finish(),
            Self::MinLength(n) => f.debug_tuple("MinLength").field(n).finish(),
            Self::MaxLength(n) => f.debug_tuple("MaxLength").field(n).finish(),
            Self::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Self::Enum(values) => f.debug_tuple("Enum").field(&values.len()).finish(),
            Self::Email => f.write_str("Email"),
        }
    }
}

/// A check with the error code assigned to it.
#[derive(Debug)]
pub struct CompiledCheck {
    pub check: Check,
    pub code: u8,
}

impl CompiledCheck {
    /// Error code if `value` violates this check.
    ///
    /// Only `Required` looks at empty values; every other check passes them.
    #[inline]
    pub fn run(&self, value: &str) -> Option<u8> {
        if value.is_empty() {
            return matches!(self.check, Check::Required).then_some(self.code);
        }
        let failed = match &self.check {
            Check::Required => false,
            Check::Type(check) => !check.accepts(value),
            Check::LocaleType { checker, offsets } => {
                let offset = checker.check(value)?;
                // Undeclared offsets fold into the first declared sub-error.
                let offset = if offsets.contains(&offset) {
                    offset
                } else {
                    offsets.first().copied().unwrap_or(0)
                };
                return Some(self.code.checked_add(offset).unwrap_or(self.code));
            }
            Check::Min { bound, parse } => parse.parse(value).is_some_and(|n| n < *bound),
            Check::Max { bound, parse } => parse.parse(value).is_some_and(|n| n > *bound),
            Check::MinLength(min) => value.chars().count() < *min,
            Check::MaxLength(max) => value.chars().count() > *max,
            Check::Pattern(regex) => !regex.is_match(value),
            Check::Enum(allowed) => !allowed.contains(value),
            Check::Email => !EMAIL_REGEX.is_match(value),
        };
        failed.then_some(self.code)
    }
}

/// Output of the generator for one rule.
#[derive(Debug)]
pub struct Generated {
    pub check: CompiledCheck,
    pub meta: ErrorMeta,
}

/// Build the `required` check.
pub fn generate_required(code: u8) -> Generated {
    Generated {
        check: CompiledCheck {
            check: Check::Required,
            code,
        },
        meta: ErrorMeta::new("required", ErrorKind::RequiredMissing, "This field is required"),
    }
}

/// Build the plain type check for `column_type`, if it has one.
pub fn generate_type_check(column_type: ColumnType, code: u8) -> Option<Generated> {
    let check = TypeCheck::for_type(column_type)?;
    Some(Generated {
        check: CompiledCheck {
            check: Check::Type(check),
            code,
        },
        meta: ErrorMeta::new("type", ErrorKind::TypeMismatch, check.message()),
    })
}

/// Build the check for a value-level rule.
///
/// Returns `Ok(None)` for `required`, `unique` and `custom`, which are not
/// part of the per-value check list.
pub fn generate_rule(
    column: &str,
    column_type: ColumnType,
    rule: &Rule,
    code: u8,
    number_parse: &NumberParse,
) -> Result<Option<Generated>> {
    let (check, meta) = match rule {
        Rule::Required | Rule::Unique | Rule::Custom(_) => return Ok(None),
        Rule::Min { value } | Rule::Max { value } => {
            ensure_numeric(column, column_type, rule)?;
            if !value.is_finite() {
                return Err(CompileError::InvalidBound {
                    column: column.to_string(),
                    rule: rule.name(),
                });
            }
            let parse = number_parse.clone();
            if matches!(rule, Rule::Min { .. }) {
                (
                    Check::Min {
                        bound: *value,
                        parse,
                    },
                    ErrorMeta::new(
                        "min",
                        ErrorKind::RangeViolation,
                        format!("Must be at least {value}"),
                    ),
                )
            } else {
                (
                    Check::Max {
                        bound: *value,
                        parse,
                    },
                    ErrorMeta::new(
                        "max",
                        ErrorKind::RangeViolation,
                        format!("Must be at most {value}"),
                    ),
                )
            }
        }
        Rule::MinLength { value } => (
            Check::MinLength(*value),
            ErrorMeta::new(
                "minLength",
                ErrorKind::LengthViolation,
                format!("Must be at least {value} characters"),
            ),
        ),
        Rule::MaxLength { value } => (
            Check::MaxLength(*value),
            ErrorMeta::new(
                "maxLength",
                ErrorKind::LengthViolation,
                format!("Must be at most {value} characters"),
            ),
        ),
        Rule::Pattern { value } => {
            let regex = Regex::new(value).map_err(|source| CompileError::InvalidPattern {
                column: column.to_string(),
                pattern: value.clone(),
                source,
            })?;
            (
                Check::Pattern(regex),
                ErrorMeta::new(
                    "pattern",
                    ErrorKind::PatternMismatch,
                    "Does not match the required format",
                ),
            )
        }
        Rule::Enum { values } => {
            if values.is_empty() {
                return Err(CompileError::EmptyEnum {
                    column: column.to_string(),
                });
            }
            let message = format!("Must be one of: {}", values.join(", "));
            (
                Check::Enum(values.iter().cloned().collect()),
                ErrorMeta::new("enum", ErrorKind::EnumViolation, message),
            )
        }
        Rule::Email => {
            if column_type != ColumnType::String {
                return Err(CompileError::RuleTypeMismatch {
                    column: column.to_string(),
                    rule: rule.name(),
                    column_type,
                });
            }
            (
                Check::Email,
                ErrorMeta::new(
                    "email",
                    ErrorKind::EmailFormatInvalid,
                    "Must be a valid email address",
                ),
            )
        }
    };
    Ok(Some(Generated {
        check: CompiledCheck { check, code },
        meta,
    }))
}

fn ensure_numeric(column: &str, column_type: ColumnType, rule: &Rule) -> Result<()> {
    if column_type.is_numeric() {
        return Ok(());
    }
    Err(CompileError::RuleTypeMismatch {
        column: column.to_string(),
        rule: rule.name(),
        column_type,
    })
}

/// Parse a number written with `.` as decimal separator and no grouping.
pub fn parse_plain_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

fn is_plausible_phone(value: &str) -> bool {
    let mut digits = 0usize;
    for ch in value.chars() {
        match ch {
            '0'..='9' => digits += 1,
            ' ' | '-' | '+' | '(' | ')' | '.' => {}
            _ => return false,
        }
    }
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
}
