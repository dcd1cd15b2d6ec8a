//! Schema compiler.

use std::collections::HashMap;
use std::sync::Arc;

use rowguard_model::Schema;
use tracing::debug;

use crate::column::{CompiledColumn, compile_column};
use crate::error::Result;
use crate::locale::{LocaleProvider, StandardLocales};

/// Every column of a schema compiled in declared order.
///
/// Immutable once built; share it across threads and datasets freely.
#[derive(Debug)]
pub struct CompiledSchema {
    columns: Vec<CompiledColumn>,
    column_names: Vec<String>,
    index: HashMap<String, usize>,
}

impl CompiledSchema {
    pub fn columns(&self) -> &[CompiledColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> Option<&CompiledColumn> {
        self.columns.get(index)
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&CompiledColumn> {
        self.column_index(name).and_then(|index| self.column(index))
    }
}

/// Compiles schemas using a locale provider.
#[derive(Clone)]
pub struct SchemaCompiler {
    provider: Arc<dyn LocaleProvider>,
}

impl Default for SchemaCompiler {
    fn default() -> Self {
        Self::new(Arc::new(StandardLocales))
    }
}

impl std::fmt::Debug for SchemaCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCompiler").finish_non_exhaustive()
    }
}

impl SchemaCompiler {
    pub fn new(provider: Arc<dyn LocaleProvider>) -> Self {
        Self { provider }
    }

    /// Compile every column, failing on the first malformed rule.
    pub fn compile(&self, schema: &Schema) -> Result<CompiledSchema> {
        schema.check_names()?;
        let default_locale = schema.locale.as_deref();

        let mut columns = Vec::with_capacity(schema.len());
        let mut column_names = Vec::with_capacity(schema.len());
        let mut index = HashMap::with_capacity(schema.len());
        for (position, definition) in schema.columns.iter().enumerate() {
            let column = compile_column(definition, default_locale, self.provider.as_ref())?;
            debug!(
                column = %definition.name,
                checks = column.check_count(),
                custom_rules = column.custom_rules().len(),
                unique = column.has_unique(),
                locale = column.locale().unwrap_or("-"),
                "compiled column"
            );
            index.insert(definition.name.clone(), position);
            column_names.push(definition.name.clone());
            columns.push(column);
        }

        Ok(CompiledSchema {
            columns,
            column_names,
            index,
        })
    }
}

/// Compile a schema with the standard locale provider.
pub fn compile_schema(schema: &Schema) -> Result<CompiledSchema> {
    SchemaCompiler::default().compile(schema)
}
