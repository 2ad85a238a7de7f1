//! CLI command implementations.

pub mod check;
pub mod inspect;

use std::path::Path;
use tessera_storage::{Connection, ConnectionOptions, Location};

/// Opens an existing store file without creating it.
fn open_existing(path: &Path) -> Result<Connection, Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!("No store found at {}", path.display()).into());
    }
    let options = ConnectionOptions {
        create_if_missing: false,
        ..ConnectionOptions::default()
    };
    let connection = Connection::open(&Location::Path(path.to_path_buf()), &options)?;
    tracing::debug!(path = %path.display(), "store opened");
    Ok(connection)
}
