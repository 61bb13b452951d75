use crate::error::{EdgeError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable that overrides the storage root
pub const STORAGE_ENV_VAR: &str = "REACHMAP_STORAGE";

const APP_DIR: &str = "reachmap";

/// Locates the storage root, creating it (owner-only) if needed.
///
/// `REACHMAP_STORAGE` wins; otherwise the platform data directory is used:
/// `%APPDATA%\reachmap`, `$XDG_DATA_HOME/reachmap` (or
/// `~/.local/share/reachmap`), `~/Library/Application Support/reachmap`.
pub fn storage_root() -> Result<PathBuf> {
    resolve_storage_root(std::env::var_os(STORAGE_ENV_VAR))
}

/// [`storage_root`] with the override passed explicitly.
pub fn resolve_storage_root(env_override: Option<OsString>) -> Result<PathBuf> {
    let root = match env_override.filter(|v| !v.is_empty()) {
        Some(path) => PathBuf::from(path),
        None => dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| EdgeError::Storage("no platform data directory available".into()))?,
    };

    ensure_private_dir(&root)?;
    debug!(root = %root.display(), "Resolved storage root");
    Ok(root)
}

/// Directory holding everything stored for one account or organization.
/// The name must be a single plain path segment so it stays under `root`.
pub fn account_dir(root: &Path, account_or_org: &str) -> Result<PathBuf> {
    check_segment("account", account_or_org)?;
    Ok(root.join(account_or_org))
}

/// Rejects names that are empty, `.`, `..`, absolute or contain a separator.
pub fn check_segment(what: &str, name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || Path::new(name).is_absolute();
    if invalid {
        return Err(EdgeError::Storage(format!("invalid {what} name: {name:?}")));
    }
    Ok(())
}

fn ensure_private_dir(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path).map_err(|e| {
        EdgeError::Storage(format!("cannot create {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_override_is_created() {
        let tmp = TempDir::new().unwrap();
        let wanted = tmp.path().join("nested").join("store");

        let root = resolve_storage_root(Some(wanted.clone().into_os_string())).unwrap();
        assert_eq!(root, wanted);
        assert!(root.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_created_root_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let wanted = tmp.path().join("private");
        let root = resolve_storage_root(Some(wanted.into_os_string())).unwrap();
        let mode = std::fs::metadata(&root).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn test_account_dir() {
        let dir = account_dir(Path::new("/data"), "123456789012").unwrap();
        assert_eq!(dir, PathBuf::from("/data/123456789012"));
    }

    #[test]
    fn test_account_dir_stays_under_root() {
        for bad in ["", ".", "..", "../outside", "/some/project", "a/b", "a\\b"] {
            let err = account_dir(Path::new("/data"), bad).unwrap_err();
            assert!(matches!(err, EdgeError::Storage(_)), "{bad:?} accepted");
        }
    }
}
