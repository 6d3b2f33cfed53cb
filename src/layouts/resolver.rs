//! Caching layout resolution by schema id.

use std::sync::Arc;

use eyre::{eyre, Result};
use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::layouts::{Layout, LayoutCompiler};
use crate::schemas::{Namespace, SchemaId};

/// Resolves schema ids to compiled layouts, memoizing compilation.
///
/// Resolution is concurrent: lookups take a read lock, and the first
/// resolution of a given id compiles under the write lock. Layouts are
/// shared via `Arc` so rows and cursors can hold them without copying.
pub struct LayoutResolver {
    namespace: Namespace,
    cache: RwLock<HashMap<i32, Arc<Layout>>>,
}

impl LayoutResolver {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Returns the layout for `schema_id`, compiling it on first use.
    pub fn resolve(&self, schema_id: SchemaId) -> Result<Arc<Layout>> {
        if let Some(layout) = self.cache.read().get(&schema_id.value()) {
            return Ok(Arc::clone(layout));
        }

        let schema = self
            .namespace
            .schema_by_id(schema_id)
            .ok_or_else(|| eyre!("no schema with id {} in namespace", schema_id.value()))?;
        let layout = Arc::new(LayoutCompiler::compile(&self.namespace, schema)?);

        let mut cache = self.cache.write();
        // Another thread may have compiled the same layout between the read
        // and write locks; keep whichever landed first.
        let entry = cache
            .entry(schema_id.value())
            .or_insert_with(|| Arc::clone(&layout));
        Ok(Arc::clone(entry))
    }
}
