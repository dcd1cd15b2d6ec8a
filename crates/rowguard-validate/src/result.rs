//! Result views over a finished validation pass.
//!
//! [`BitmapValidationResult`] keeps only the bitmap, the code map and the
//! counters. [`ValidationError`] records are built from them when an accessor
//! asks for them. [`ValidationResult`] is the fully materialized form.

use std::collections::BTreeMap;

use rowguard_model::{ErrorKind, ValidationError};
use serde::Serialize;

use crate::bitmap::{ErrorBitmap, ErrorCodeMap, ErrorGrid};
use crate::codes::ErrorCode;
use crate::compiler::CompiledSchema;
use crate::engine::{Row, Tally};

const DUPLICATE_MESSAGE: &str = "Duplicate value";

/// Window over the row-major error sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorPage {
    pub offset: usize,
    /// `None` returns everything after `offset`.
    pub limit: Option<usize>,
}

impl ErrorPage {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit: Some(limit),
        }
    }
}

/// Bytes held by the error storage of one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryUsage {
    pub bitmap_bytes: usize,
    pub code_map_bytes: usize,
    pub total_bytes: usize,
}

/// Lazy view over one validation pass.
#[derive(Debug)]
pub struct BitmapValidationResult<'a, R> {
    schema: &'a CompiledSchema,
    data: &'a [R],
    grid: ErrorGrid,
    tally: Tally,
    error_count: usize,
}

impl<'a, R: Row> BitmapValidationResult<'a, R> {
    pub(crate) fn new(
        schema: &'a CompiledSchema,
        data: &'a [R],
        grid: ErrorGrid,
        tally: Tally,
    ) -> Self {
        let error_count = grid.bitmap().count_errors();
        Self {
            schema,
            data,
            grid,
            tally,
            error_count,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error_count == 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn row_count(&self) -> usize {
        self.grid.bitmap().rows()
    }

    pub fn col_count(&self) -> usize {
        self.grid.bitmap().cols()
    }

    pub fn bitmap(&self) -> &ErrorBitmap {
        self.grid.bitmap()
    }

    pub fn code_map(&self) -> &ErrorCodeMap {
        self.grid.code_map()
    }

    /// Stored byte for a cell, in the external code bands.
    pub fn raw_code(&self, row: usize, col: usize) -> u8 {
        self.grid.code_map().get_code(row, col)
    }

    /// Errors in row-major order, restricted to `page`.
    pub fn errors(&self, page: ErrorPage) -> Vec<ValidationError> {
        let cols = self.col_count();
        if cols == 0 {
            return Vec::new();
        }
        self.grid
            .bitmap()
            .iter()
            .skip(page.offset)
            .take(page.limit.unwrap_or(usize::MAX))
            .filter_map(|index| self.materialize(index / cols, index % cols))
            .collect()
    }

    pub fn all_errors(&self) -> Vec<ValidationError> {
        self.errors(ErrorPage::all())
    }

    pub fn row_errors(&self, row: usize) -> Vec<ValidationError> {
        self.grid
            .bitmap()
            .get_row_error_columns(row)
            .into_iter()
            .filter_map(|col| self.materialize(row, col))
            .collect()
    }

    pub fn cell_error(&self, row: usize, col: usize) -> Option<ValidationError> {
        self.materialize(row, col)
    }

    /// Error counts keyed by rule name.
    pub fn error_summary(&self) -> &BTreeMap<String, usize> {
        &self.tally.by_rule
    }

    /// Error counts keyed by column name.
    pub fn column_error_summary(&self) -> &BTreeMap<String, usize> {
        &self.tally.by_column
    }

    /// Number of rows with at least one error.
    pub fn error_row_count(&self) -> usize {
        self.grid.bitmap().count_error_rows()
    }

    pub fn memory_usage(&self) -> MemoryUsage {
        let bitmap_bytes = self.grid.bitmap().byte_size();
        let code_map_bytes = self.grid.code_map().byte_size();
        MemoryUsage {
            bitmap_bytes,
            code_map_bytes,
            total_bytes: bitmap_bytes + code_map_bytes,
        }
    }

    /// Materialize everything into the eager form.
    pub fn into_eager(self) -> ValidationResult {
        let errors = self.all_errors();
        let error_rows = self.error_row_count();
        let total_rows = self.row_count();
        ValidationResult {
            valid: errors.is_empty(),
            errors,
            total_rows,
            valid_rows: total_rows - error_rows,
            error_rows,
            errors_by_rule: self.tally.by_rule,
            errors_by_column: self.tally.by_column,
        }
    }

    fn materialize(&self, row: usize, col: usize) -> Option<ValidationError> {
        let code = self.grid.code(row, col)?;
        let column = self.schema.column(col)?;
        let (rule, kind, message) = match code {
            ErrorCode::Rule(raw) => {
                let meta = column.error_meta(raw)?;
                (meta.rule_name.as_str(), meta.kind, meta.message.as_str())
            }
            ErrorCode::Custom(index) => {
                let custom = column.custom_rules().get(usize::from(index))?;
                ("custom", ErrorKind::CustomRuleFailure, custom.message.as_str())
            }
            ErrorCode::Unique => ("unique", ErrorKind::UniqueViolation, DUPLICATE_MESSAGE),
        };
        let value = self
            .data
            .get(row)
            .and_then(|cells| cells.cell(col))
            .unwrap_or_default();
        Some(ValidationError {
            row,
            col,
            field: column.name().to_string(),
            value: value.to_string(),
            code: kind,
            rule: rule.to_string(),
            message: message.to_string(),
        })
    }
}

/// Fully materialized validation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub error_rows: usize,
    pub errors_by_rule: BTreeMap<String, usize>,
    pub errors_by_column: BTreeMap<String, usize>,
}
