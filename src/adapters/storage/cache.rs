//! Disk-backed memoization of expensive, externally deterministic operations
//!
//! Layout: `<root>/<account-or-org>/cache/<operation>`, one JSON object per
//! operation mapping a key to either `{"ok": value}` or `{"err": error}`.
//!
//! Failures are memoized too: with [`ErrorCaching::Always`] a transient error
//! stays poisoned until the entry is evicted or the file cleared.
//!
//! Writes go through a temp file and a rename, serialized by an in-process
//! lock. Separate processes writing the same account still race.

use crate::adapters::storage::root::{account_dir, check_segment, storage_root};
use crate::error::{EdgeError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Which failures get written to the cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorCaching {
    /// Every failure is replayed on later calls
    #[default]
    Always,
    /// Only failures reported as permanent are replayed
    PermanentOnly,
}

/// Failure types that can tell permanent outcomes from transient ones
pub trait CacheableFailure {
    fn is_permanent(&self) -> bool;
}

impl CacheableFailure for EdgeError {
    fn is_permanent(&self) -> bool {
        EdgeError::is_permanent(self)
    }
}

/// Lookup key within one operation's cache file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Canonical JSON of the request; object keys come out sorted.
    pub fn derive<A: Serialize + ?Sized>(request: &A) -> Result<Self> {
        let value = serde_json::to_value(request)?;
        Ok(Self(serde_json::to_string(&value)?))
    }

    /// Caller-chosen key, used verbatim
    pub fn explicit(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Slot {
    Ok(Value),
    Err(Value),
}

type CacheFile = BTreeMap<String, Slot>;

pub struct DiskCache {
    dir: PathBuf,
    error_caching: ErrorCaching,
    /// Operation name → file contents, loaded at most once
    loaded: Mutex<HashMap<String, CacheFile>>,
}

impl DiskCache {
    /// Cache for `account_or_org` under the resolved storage root.
    pub fn open(account_or_org: &str) -> Result<Self> {
        Self::with_root(storage_root()?, account_or_org)
    }

    pub fn with_root(root: impl AsRef<Path>, account_or_org: &str) -> Result<Self> {
        let dir = account_dir(root.as_ref(), account_or_org)?.join("cache");
        std::fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "Opened disk cache");
        Ok(Self {
            dir,
            error_caching: ErrorCaching::default(),
            loaded: Mutex::new(HashMap::new()),
        })
    }

    pub fn with_error_caching(mut self, error_caching: ErrorCaching) -> Self {
        self.error_caching = error_caching;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the stored outcome for `key`, or runs `op` and stores its
    /// outcome. A stored failure is returned again without running `op`.
    ///
    /// An operation name that cannot be a file in the cache directory fails
    /// with [`EdgeError::Storage`] before `op` runs.
    pub fn memoize<T, E, F>(&self, operation: &str, key: &CacheKey, op: F) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: Serialize + DeserializeOwned + CacheableFailure + From<EdgeError>,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        self.file_path(operation)?;

        if let Some(hit) = self.lookup::<T, E>(operation, key) {
            debug!(operation, "Cache hit");
            return hit;
        }

        debug!(operation, "Cache miss");
        let outcome = op();

        let slot = match &outcome {
            Ok(value) => Some(serde_json::to_value(value).map(Slot::Ok)),
            Err(err) if self.should_cache(err) => Some(serde_json::to_value(err).map(Slot::Err)),
            Err(_) => None,
        };

        match slot {
            Some(Ok(slot)) => self.store(operation, key, slot),
            Some(Err(e)) => warn!(operation, error = %e, "Result not cacheable, skipping"),
            None => debug!(operation, "Transient failure not cached"),
        }
        outcome
    }

    /// Drops the in-memory copy of `operation`; the next access rereads disk.
    pub fn invalidate(&self, operation: &str) {
        self.lock().remove(operation);
    }

    /// Removes one entry from memory and disk. Returns whether it existed.
    pub fn evict(&self, operation: &str, key: &CacheKey) -> Result<bool> {
        self.file_path(operation)?;
        let mut loaded = self.lock();
        let file = self.load_into(&mut loaded, operation);
        let removed = file.remove(key.as_str()).is_some();
        if removed {
            self.write_file(operation, file)?;
        }
        Ok(removed)
    }

    /// Deletes the cache file of `operation`.
    pub fn clear(&self, operation: &str) -> Result<()> {
        let path = self.file_path(operation)?;
        let mut loaded = self.lock();
        loaded.remove(operation);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Deletes every cache file of this account.
    pub fn clear_all(&self) -> Result<()> {
        let mut loaded = self.lock();
        loaded.clear();
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir)?;
        }
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Number of entries currently cached for `operation`
    pub fn len(&self, operation: &str) -> usize {
        let mut loaded = self.lock();
        self.load_into(&mut loaded, operation).len()
    }

    pub fn is_empty(&self, operation: &str) -> bool {
        self.len(operation) == 0
    }

    fn lookup<T, E>(&self, operation: &str, key: &CacheKey) -> Option<std::result::Result<T, E>>
    where
        T: DeserializeOwned,
        E: DeserializeOwned,
    {
        let mut loaded = self.lock();
        let slot = self.load_into(&mut loaded, operation).get(key.as_str())?;

        let decoded = match slot {
            Slot::Ok(v) => T::deserialize(v).map(Ok),
            Slot::Err(v) => E::deserialize(v).map(Err),
        };
        match decoded {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                debug!(operation, error = %e, "Stale cache entry, recomputing");
                None
            }
        }
    }

    fn store(&self, operation: &str, key: &CacheKey, slot: Slot) {
        let mut loaded = self.lock();
        let file = self.load_into(&mut loaded, operation);
        file.insert(key.as_str().to_string(), slot);
        if let Err(e) = self.write_file(operation, file) {
            warn!(operation, error = %e, "Failed to write cache file");
        }
    }

    fn should_cache<E: CacheableFailure>(&self, err: &E) -> bool {
        match self.error_caching {
            ErrorCaching::Always => true,
            ErrorCaching::PermanentOnly => err.is_permanent(),
        }
    }

    fn load_into<'a>(
        &self,
        loaded: &'a mut HashMap<String, CacheFile>,
        operation: &str,
    ) -> &'a mut CacheFile {
        loaded
            .entry(operation.to_string())
            .or_insert_with(|| self.read_file(operation))
    }

    /// Unreadable or corrupt files count as empty; the next miss rewrites them.
    fn read_file(&self, operation: &str) -> CacheFile {
        let Ok(path) = self.file_path(operation) else {
            return CacheFile::new();
        };
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return CacheFile::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable cache file, starting empty");
                return CacheFile::new();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Corrupt cache file, starting empty");
            CacheFile::new()
        })
    }

    fn write_file(&self, operation: &str, file: &CacheFile) -> Result<()> {
        let path = self.file_path(operation)?;
        let tmp = self.dir.join(format!(".{}.tmp", file_name(operation)));
        std::fs::write(&tmp, serde_json::to_vec(file)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn file_path(&self, operation: &str) -> Result<PathBuf> {
        let name = file_name(operation);
        check_segment("operation", &name)?;
        Ok(self.dir.join(name))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheFile>> {
        self.loaded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn file_name(operation: &str) -> String {
    operation.replace(['/', '\\'], "_")
}
