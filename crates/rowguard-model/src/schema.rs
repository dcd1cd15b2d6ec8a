//! Declarative column schema.
//!
//! A [`Schema`] is an ordered list of named columns. Column order is
//! significant: it fixes the column index used during validation and the
//! order in which errors are reported.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    Integer,
    Date,
    Boolean,
    Enum,
    Phone,
    Currency,
}

impl ColumnType {
    /// Whether the accepted format of this type depends on a locale.
    pub fn is_locale_aware(self) -> bool {
        matches!(
            self,
            Self::Date | Self::Number | Self::Boolean | Self::Phone | Self::Currency
        )
    }

    /// Whether `min`/`max` rules may be applied to this type.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Phone => "phone",
            Self::Currency => "currency",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A caller-supplied predicate evaluated against a non-empty cell value.
///
/// Returns `true` when the value is acceptable.
pub trait CustomPredicate: Send + Sync {
    fn evaluate(&self, value: &str) -> bool;
}

impl<F> CustomPredicate for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn evaluate(&self, value: &str) -> bool {
        self(value)
    }
}

/// A custom predicate paired with the message reported when it fails.
#[derive(Clone)]
pub struct CustomRule {
    pub predicate: Arc<dyn CustomPredicate>,
    pub message: String,
}

impl CustomRule {
    pub fn new(predicate: impl CustomPredicate + 'static, message: impl Into<String>) -> Self {
        Self {
            predicate: Arc::new(predicate),
            message: message.into(),
        }
    }

    pub fn evaluate(&self, value: &str) -> bool {
        self.predicate.evaluate(value)
    }

    /// Address of the shared predicate, used to tell apart two rules that
    /// carry the same message.
    pub fn predicate_id(&self) -> usize {
        Arc::as_ptr(&self.predicate) as *const () as usize
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// A single validation rule attached to a column.
///
/// In JSON, rules are tagged by `"rule"`:
/// `{"rule": "minLength", "value": 3}`. `custom` rules carry a closure and
/// can only be attached in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum Rule {
    Required,
    Min {
        value: f64,
    },
    Max {
        value: f64,
    },
    MinLength {
        value: usize,
    },
    MaxLength {
        value: usize,
    },
    Pattern {
        value: String,
    },
    Enum {
        values: Vec<String>,
    },
    Email,
    Unique,
    #[serde(skip)]
    Custom(CustomRule),
}

impl Rule {
    pub fn min(value: f64) -> Self {
        Self::Min { value }
    }

    pub fn max(value: f64) -> Self {
        Self::Max { value }
    }

    pub fn min_length(value: usize) -> Self {
        Self::MinLength { value }
    }

    pub fn max_length(value: usize) -> Self {
        Self::MaxLength { value }
    }

    pub fn pattern(value: impl Into<String>) -> Self {
        Self::Pattern {
            value: value.into(),
        }
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn custom(
        predicate: impl CustomPredicate + 'static,
        message: impl Into<String>,
    ) -> Self {
        Self::Custom(CustomRule::new(predicate, message))
    }

    /// Rule name used in error summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Min { .. } => "min",
            Self::Max { .. } => "max",
            Self::MinLength { .. } => "minLength",
            Self::MaxLength { .. } => "maxLength",
            Self::Pattern { .. } => "pattern",
            Self::Enum { .. } => "enum",
            Self::Email => "email",
            Self::Unique => "unique",
            Self::Custom(_) => "custom",
        }
    }

    /// Stable textual form of the rule, including custom predicate identity.
    pub fn fingerprint(&self) -> String {
        match self {
            Self::Required | Self::Email | Self::Unique => self.name().to_string(),
            Self::Min { value } | Self::Max { value } => {
                format!("{}={}", self.name(), value.to_bits())
            }
            Self::MinLength { value } | Self::MaxLength { value } => {
                format!("{}={value}", self.name())
            }
            Self::Pattern { value } => format!("pattern={value:?}"),
            Self::Enum { values } => format!("enum={values:?}"),
            Self::Custom(rule) => format!("custom@{:x}={:?}", rule.predicate_id(), rule.message),
        }
    }
}

/// Definition of one column: type, ordered rules and optional locale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Alternative header names. Consumed by column mapping, ignored by validation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            rules: Vec::new(),
            locale: None,
            aliases: Vec::new(),
        }
    }

    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name() == name)
    }
}

/// Ordered collection of column definitions plus an optional default locale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<ColumnDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column. A column with the same name is replaced in place,
    /// keeping its original position.
    #[must_use]
    pub fn column(mut self, definition: ColumnDefinition) -> Self {
        self.insert(definition);
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn insert(&mut self, definition: ColumnDefinition) {
        match self
            .columns
            .iter_mut()
            .find(|existing| existing.name == definition.name)
        {
            Some(existing) => *existing = definition,
            None => self.columns.push(definition),
        }
    }

    /// Parse a schema from its JSON form and check column names.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let schema: Schema = serde_json::from_str(json)?;
        schema.check_names()?;
        Ok(schema)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Reject empty or repeated column names.
    pub fn check_names(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for column in &self.columns {
            if column.name.is_empty() {
                return Err(ModelError::EmptyColumnName);
            }
            if !seen.insert(column.name.as_str()) {
                return Err(ModelError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
        }
        Ok(())
    }
}
