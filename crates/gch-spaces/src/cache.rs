use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use gch_core::{ErrorInfo, GchError};
use gch_store::Store;
use indexmap::IndexMap;

use crate::space::GraphVectorSpace;

/// In-memory memo of basis content, keyed by store key.
///
/// Spaces are immutable descriptors, so a basis list, lookup or dimension
/// read once stays valid for the lifetime of the cache. The memo only
/// mirrors immutable store content and may be shared across workers.
#[derive(Debug, Default)]
pub struct BasisCache {
    bases: Mutex<HashMap<String, Arc<Vec<String>>>>,
    lookups: Mutex<HashMap<String, Arc<IndexMap<String, usize>>>>,
    dimensions: Mutex<HashMap<String, usize>>,
}

impl BasisCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the basis of `vs`, loading it from the store on first use.
    pub fn basis(
        &self,
        vs: &dyn GraphVectorSpace,
        store: &dyn Store,
    ) -> Result<Arc<Vec<String>>, GchError> {
        let key = vs.basis_key();
        if let Some(found) = guard(&self.bases)?.get(&key) {
            return Ok(Arc::clone(found));
        }
        let basis = Arc::new(vs.get_basis(store)?);
        guard(&self.bases)?.insert(key, Arc::clone(&basis));
        Ok(basis)
    }

    /// Returns the canonical-string to basis-position lookup of `vs`,
    /// derived from the cached basis.
    pub fn lookup(
        &self,
        vs: &dyn GraphVectorSpace,
        store: &dyn Store,
    ) -> Result<Arc<IndexMap<String, usize>>, GchError> {
        let key = vs.basis_key();
        if let Some(found) = guard(&self.lookups)?.get(&key) {
            return Ok(Arc::clone(found));
        }
        let basis = self.basis(vs, store)?;
        let lookup: Arc<IndexMap<String, usize>> = Arc::new(
            basis
                .iter()
                .enumerate()
                .map(|(index, g6)| (g6.clone(), index))
                .collect(),
        );
        guard(&self.lookups)?.insert(key, Arc::clone(&lookup));
        Ok(lookup)
    }

    /// Returns the dimension of `vs`, preferring already-cached content
    /// over a header read.
    pub fn dimension(
        &self,
        vs: &dyn GraphVectorSpace,
        store: &dyn Store,
    ) -> Result<usize, GchError> {
        let key = vs.basis_key();
        if let Some(&dim) = guard(&self.dimensions)?.get(&key) {
            return Ok(dim);
        }
        let dim = match guard(&self.bases)?.get(&key) {
            Some(basis) => basis.len(),
            None => vs.get_dimension(store)?,
        };
        guard(&self.dimensions)?.insert(key, dim);
        Ok(dim)
    }
}

fn guard<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, GchError> {
    mutex.lock().map_err(|_| {
        GchError::Store(ErrorInfo::new(
            "basis-cache-poisoned",
            "a basis reader panicked while holding the cache lock",
        ))
    })
}
