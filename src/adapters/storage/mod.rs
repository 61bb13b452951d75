pub mod cache;
pub mod root;

pub use cache::{CacheKey, CacheableFailure, DiskCache, ErrorCaching};
pub use root::{STORAGE_ENV_VAR, storage_root};
