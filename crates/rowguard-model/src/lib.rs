//! Data model for schema-driven validation of tabular string data.
//!
//! Defines the declarative [`Schema`] consumed by `rowguard-validate`, the
//! canonical [`ErrorKind`] taxonomy and the materialized [`ValidationError`]
//! record.

mod error;
mod kind;
mod options;
mod record;
mod schema;

pub use error::{ModelError, Result};
pub use kind::ErrorKind;
pub use options::{UniqueMatching, ValidationOptions};
pub use record::ValidationError;
pub use schema::{ColumnDefinition, ColumnType, CustomPredicate, CustomRule, Rule, Schema};
