use thiserror::Error;

/// Errors raised while building or parsing a [`Schema`](crate::Schema).
#[derive(Debug, Error)]
pub enum ModelError {
    /// Schema JSON could not be parsed.
    #[error("invalid schema document: {0}")]
    Json(#[from] serde_json::Error),

    /// Two columns share the same name.
    #[error("duplicate column name: {name}")]
    DuplicateColumn { name: String },

    /// Column name is empty.
    #[error("column name must not be empty")]
    EmptyColumnName,
}

pub type Result<T> = std::result::Result<T, ModelError>;
