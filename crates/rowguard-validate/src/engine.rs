//! Validation engine.
//!
//! Runs a [`CompiledSchema`] over a row matrix in one pass. The pass only
//! writes bits, code bytes and two counters; error records are built later,
//! on request, by the result views.

use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rowguard_model::{Schema, UniqueMatching, ValidationOptions};
use tracing::{debug, debug_span};

use crate::bitmap::ErrorGrid;
use crate::codes::{ErrorCode, VALID};
use crate::compiler::{CompiledSchema, compile_schema};
use crate::error::Result;
use crate::result::{BitmapValidationResult, ValidationResult};

/// A row of cell text. Missing trailing cells read as empty.
pub trait Row {
    fn cell(&self, col: usize) -> Option<&str>;
}

impl<S: AsRef<str>> Row for [S] {
    fn cell(&self, col: usize) -> Option<&str> {
        self.get(col).map(AsRef::as_ref)
    }
}

impl<S: AsRef<str>> Row for Vec<S> {
    fn cell(&self, col: usize) -> Option<&str> {
        self.as_slice().cell(col)
    }
}

impl<S: AsRef<str>, const N: usize> Row for [S; N] {
    fn cell(&self, col: usize) -> Option<&str> {
        self.as_slice().cell(col)
    }
}

impl<R: Row + ?Sized> Row for &R {
    fn cell(&self, col: usize) -> Option<&str> {
        (**self).cell(col)
    }
}

/// Per-rule and per-column error counters, updated during the pass.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    pub(crate) by_rule: BTreeMap<String, usize>,
    pub(crate) by_column: BTreeMap<String, usize>,
}

impl Tally {
    fn bump(&mut self, rule: &str, column: &str) {
        bump(&mut self.by_rule, rule);
        bump(&mut self.by_column, column);
    }
}

fn bump(counts: &mut BTreeMap<String, usize>, key: &str) {
    match counts.get_mut(key) {
        Some(count) => *count += 1,
        None => {
            counts.insert(key.to_string(), 1);
        }
    }
}

/// Owns a compiled schema and validates datasets against it.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    schema: Arc<CompiledSchema>,
    options: ValidationOptions,
}

impl ValidationEngine {
    pub fn new(schema: impl Into<Arc<CompiledSchema>>) -> Self {
        Self {
            schema: schema.into(),
            options: ValidationOptions::default(),
        }
    }

    /// Compile `schema` with the standard locale provider.
    pub fn from_schema(schema: &Schema) -> Result<Self> {
        Ok(Self::new(compile_schema(schema)?))
    }

    #[must_use]
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    pub fn shared_schema(&self) -> Arc<CompiledSchema> {
        Arc::clone(&self.schema)
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validate every cell, recording errors in a fresh bitmap and code map.
    ///
    /// Uniqueness tracking starts empty on every call.
    pub fn validate_all_bitmap<'a, R: Row>(&'a self, data: &'a [R]) -> BitmapValidationResult<'a, R> {
        let schema = self.schema.as_ref();
        let rows = data.len();
        let cols = schema.column_count();
        let span = debug_span!("validate", rows, cols);
        let _enter = span.enter();

        let mut grid = ErrorGrid::new(rows, cols);
        let mut tally = Tally::default();
        let mut seen: Vec<Option<HashMap<Cow<'a, str>, usize>>> = schema
            .columns()
            .iter()
            .map(|column| column.has_unique().then(HashMap::new))
            .collect();

        for (row_index, row) in data.iter().enumerate() {
            for (col, column) in schema.columns().iter().enumerate() {
                let raw = row.cell(col).unwrap_or("");
                let value = if self.options.trim_values {
                    raw.trim()
                } else {
                    raw
                };

                let code = column.validate(value);
                if code != VALID {
                    grid.mark(row_index, col, ErrorCode::Rule(code));
                    let rule = column
                        .error_meta(code)
                        .map_or("unknown", |meta| meta.rule_name.as_str());
                    tally.bump(rule, column.name());
                    continue;
                }
                if value.is_empty() {
                    continue;
                }

                if let Some(index) = column.first_failing_custom(value) {
                    // Index fits: the compiler caps custom rules per column.
                    grid.mark(row_index, col, ErrorCode::Custom(index as u8));
                    tally.bump("custom", column.name());
                    continue;
                }

                if let Some(first_rows) = seen[col].as_mut() {
                    let key = match self.options.unique_matching {
                        UniqueMatching::Exact => Cow::Borrowed(value),
                        UniqueMatching::CaseInsensitive => Cow::Owned(value.to_lowercase()),
                    };
                    match first_rows.entry(key) {
                        Entry::Occupied(_) => {
                            grid.mark(row_index, col, ErrorCode::Unique);
                            tally.bump("unique", column.name());
                        }
                        Entry::Vacant(slot) => {
                            slot.insert(row_index);
                        }
                    }
                }
            }
        }

        let result = BitmapValidationResult::new(schema, data, grid, tally);
        debug!(
            errors = result.error_count(),
            error_rows = result.error_row_count(),
            "validation pass complete"
        );
        result
    }

    /// Validate and materialize every error at once.
    ///
    /// Peak memory grows with the error count; prefer
    /// [`validate_all_bitmap`](Self::validate_all_bitmap) for large datasets.
    pub fn validate_all<R: Row>(&self, data: &[R]) -> ValidationResult {
        self.validate_all_bitmap(data).into_eager()
    }
}
