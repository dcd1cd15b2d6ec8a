//! Caller-owned cache of compiled schemas.
//!
//! Entries are keyed by a SHA-256 fingerprint of the schema's structure.
//! Nothing is shared globally; drop or [`clear`](CompiledSchemaCache::clear)
//! the cache to release it.

use std::collections::HashMap;
use std::sync::Arc;

use rowguard_model::Schema;
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::compiler::{CompiledSchema, SchemaCompiler};
use crate::error::Result;

/// Structural fingerprint of a schema as lowercase hex.
///
/// Covers column order, names, types, locales and rules. Custom rules
/// contribute their message and predicate identity.
pub fn schema_fingerprint(schema: &Schema) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"locale:");
    hasher.update(schema.locale.as_deref().unwrap_or_default().as_bytes());
    for column in &schema.columns {
        hasher.update(b"\0column:");
        hasher.update(column.name.as_bytes());
        hasher.update(b"\0type:");
        hasher.update(column.column_type.as_str().as_bytes());
        hasher.update(b"\0locale:");
        hasher.update(column.locale.as_deref().unwrap_or_default().as_bytes());
        for rule in &column.rules {
            hasher.update(b"\0rule:");
            hasher.update(rule.fingerprint().as_bytes());
        }
    }
    hex::encode(hasher.finalize())
}

#[derive(Debug, Default)]
pub struct CompiledSchemaCache {
    compiler: SchemaCompiler,
    entries: HashMap<String, Arc<CompiledSchema>>,
}

impl CompiledSchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compiler(compiler: SchemaCompiler) -> Self {
        Self {
            compiler,
            entries: HashMap::new(),
        }
    }

    /// Return the cached compilation of `schema`, compiling it on a miss.
    ///
    /// Compilation errors are returned and nothing is cached.
    pub fn get_or_compile(&mut self, schema: &Schema) -> Result<Arc<CompiledSchema>> {
        let key = schema_fingerprint(schema);
        if let Some(compiled) = self.entries.get(&key) {
            trace!(fingerprint = %key, "compiled schema cache hit");
            return Ok(Arc::clone(compiled));
        }
        trace!(fingerprint = %key, "compiled schema cache miss");
        let compiled = Arc::new(self.compiler.compile(schema)?);
        self.entries.insert(key, Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn contains(&self, schema: &Schema) -> bool {
        self.entries.contains_key(&schema_fingerprint(schema))
    }

    /// Drop the entry for `schema`. Returns whether one was present.
    pub fn invalidate(&mut self, schema: &Schema) -> bool {
        self.entries.remove(&schema_fingerprint(schema)).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
