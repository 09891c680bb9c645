//! Keyed memoization for static reference data.
//!
//! Boundary files do not change while the process runs, so loads are cached
//! for the lifetime of the cache. There is no time-based eviction; callers
//! that know a file changed call [`Memo::invalidate`] or
//! [`BoundaryCache::reload`].

use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use mapdash_core::{builtin_aliases, AliasTable};

use crate::boundaries::{load_boundaries_with, BoundaryLevel, BoundarySet};
use crate::error::GeoError;

/// Unbounded keyed cache with a `get_or_compute` contract.
///
/// Failed computations are not cached.
pub struct Memo<K, V> {
    entries: RwLock<HashMap<K, Arc<V>>>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Returns the cached value for `key`, running `producer` on a miss.
    ///
    /// If two callers miss concurrently both run `producer`; the first value
    /// stored wins and both receive it.
    ///
    /// # Errors
    ///
    /// Propagates the producer's error; nothing is stored in that case.
    pub fn get_or_compute<E, F>(&self, key: K, producer: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let value = Arc::new(producer()?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key).or_insert(value)))
    }

    /// Drops one entry. Returns `true` if it was present.
    pub fn invalidate(&self, key: &K) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Boundary sets memoized by `(path, level)`.
pub struct BoundaryCache {
    aliases: Arc<AliasTable>,
    memo: Memo<(PathBuf, BoundaryLevel), BoundarySet>,
}

impl Default for BoundaryCache {
    fn default() -> Self {
        Self::new(Arc::new(builtin_aliases().clone()))
    }
}

impl BoundaryCache {
    #[must_use]
    pub fn new(aliases: Arc<AliasTable>) -> Self {
        Self {
            aliases,
            memo: Memo::new(),
        }
    }

    /// The alias table used to canonicalize feature names.
    #[must_use]
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Loads `path` once per level; later calls share the same set.
    ///
    /// # Errors
    ///
    /// Returns any [`GeoError`] from
    /// [`load_boundaries_with`](crate::boundaries::load_boundaries_with).
    pub fn load(&self, path: &Path, level: BoundaryLevel) -> Result<Arc<BoundarySet>, GeoError> {
        self.memo
            .get_or_compute((path.to_path_buf(), level), || {
                load_boundaries_with(path, level, &self.aliases)
            })
    }

    /// Drops the cached set for `(path, level)` and loads it again.
    ///
    /// # Errors
    ///
    /// Same as [`BoundaryCache::load`]. On failure the old entry is gone.
    pub fn reload(&self, path: &Path, level: BoundaryLevel) -> Result<Arc<BoundarySet>, GeoError> {
        self.memo.invalidate(&(path.to_path_buf(), level));
        self.load(path, level)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn get_or_compute_runs_producer_once_per_key() {
        let memo: Memo<&str, u32> = Memo::new();
        let calls = AtomicU32::new(0);
        let produce = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<u32, String>(7)
        };

        let first = memo.get_or_compute("territory", produce).unwrap();
        let second = memo
            .get_or_compute("territory", || Ok::<u32, String>(99))
            .unwrap();

        assert_eq!(*first, 7);
        assert_eq!(*second, 7, "second call must hit the cache");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let memo: Memo<&str, u32> = Memo::new();
        let err = memo
            .get_or_compute("county", || Err::<u32, _>("missing file"))
            .unwrap_err();
        assert_eq!(err, "missing file");
        assert!(memo.is_empty());

        let ok = memo.get_or_compute("county", || Ok::<u32, &str>(3)).unwrap();
        assert_eq!(*ok, 3);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let memo: Memo<u8, String> = Memo::new();
        memo.get_or_compute(1, || Ok::<_, ()>("old".to_string()))
            .unwrap();
        assert!(memo.invalidate(&1));
        assert!(!memo.invalidate(&1));
        let fresh = memo
            .get_or_compute(1, || Ok::<_, ()>("new".to_string()))
            .unwrap();
        assert_eq!(fresh.as_str(), "new");
    }

    #[test]
    fn clear_empties_everything() {
        let memo: Memo<u8, u8> = Memo::new();
        memo.get_or_compute(1, || Ok::<_, ()>(1)).unwrap();
        memo.get_or_compute(2, || Ok::<_, ()>(2)).unwrap();
        memo.clear();
        assert!(memo.is_empty());
    }

    #[test]
    fn boundary_cache_does_not_cache_missing_file() {
        let cache = BoundaryCache::default();
        let path = Path::new("/no/such/dir/territories.geojson");
        let err = cache.load(path, BoundaryLevel::Territory).unwrap_err();
        assert!(matches!(err, GeoError::NotFound { .. }));
        assert!(cache.is_empty());
    }
}
