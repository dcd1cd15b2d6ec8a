//! Schema-driven validation of string-matrix datasets.
//!
//! A [`Schema`](rowguard_model::Schema) is compiled once into a
//! [`CompiledSchema`]: one flat list of coded checks per column. The
//! [`ValidationEngine`] runs it over any number of datasets, recording
//! failures in a packed [`ErrorBitmap`] and a one-byte-per-cell
//! [`ErrorCodeMap`]. Error records are only built when asked for.
//!
//! # Example
//!
//! ```
//! use rowguard_model::{ColumnDefinition, ColumnType, Rule, Schema};
//! use rowguard_validate::{ErrorPage, ValidationEngine};
//!
//! let schema = Schema::new()
//!     .column(
//!         ColumnDefinition::new("id", ColumnType::String)
//!             .rule(Rule::Required)
//!             .rule(Rule::Unique),
//!     )
//!     .column(
//!         ColumnDefinition::new("age", ColumnType::Integer)
//!             .rule(Rule::min(0.0))
//!             .rule(Rule::max(120.0)),
//!     );
//! let engine = ValidationEngine::from_schema(&schema).unwrap();
//!
//! let rows = vec![vec!["1", "30"], vec!["", "200"], vec!["1", "40"]];
//! let result = engine.validate_all_bitmap(&rows);
//! assert_eq!(result.error_count(), 3);
//! assert_eq!(result.errors(ErrorPage::new(0, 2)).len(), 2);
//! ```

mod bitmap;
mod cache;
mod codes;
mod column;
mod compiler;
mod engine;
mod error;
pub mod locale;
mod result;
mod rules;

pub use bitmap::{ErrorBitmap, ErrorCodeMap, ErrorIter};
pub use cache::{CompiledSchemaCache, schema_fingerprint};
pub use codes::{
    CUSTOM_BASE, ErrorCode, MAX_CUSTOM_RULES, MAX_RULE_CODE, UNIQUE_CODE, VALID,
};
pub use column::{CompiledColumn, compile_column};
pub use compiler::{CompiledSchema, SchemaCompiler, compile_schema};
pub use engine::{Row, ValidationEngine};
pub use error::{CompileError, Result};
pub use result::{BitmapValidationResult, ErrorPage, MemoryUsage, ValidationResult};
pub use rules::ErrorMeta;
