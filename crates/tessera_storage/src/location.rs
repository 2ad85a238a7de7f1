//! Where a store lives.

use crate::error::StoreResult;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File suffixes the engine may create next to a database file.
const SIDECAR_SUFFIXES: [&str; 3] = ["-wal", "-shm", "-journal"];

/// The physical location of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Private in-memory database with no file footprint.
    Memory,
    /// Explicit database file path.
    Path(PathBuf),
    /// Logical name, resolved to `<name>.db` in the user's local data directory.
    Named(String),
}

impl Location {
    /// Resolves the location to a file path.
    ///
    /// Returns `None` for [`Location::Memory`]. Named stores fall back to the
    /// working directory on platforms without a local data directory.
    #[must_use]
    pub fn resolve(&self) -> Option<PathBuf> {
        match self {
            Self::Memory => None,
            Self::Path(path) => Some(path.clone()),
            Self::Named(name) => {
                let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
                Some(base.join(format!("{name}.db")))
            }
        }
    }

    /// Returns true for the in-memory variant.
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

/// Removes a database file and any journal files next to it.
///
/// Missing files are not an error, so this is safe to call whether or not
/// the store was ever opened.
///
/// # Errors
///
/// Returns an error if a file exists but cannot be removed.
pub fn remove_store_file(path: &Path) -> StoreResult<()> {
    remove_if_exists(path)?;
    for suffix in SIDECAR_SUFFIXES {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(suffix);
        remove_if_exists(Path::new(&sidecar))?;
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> StoreResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
