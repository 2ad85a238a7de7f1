//! Owned handle to one physical database connection.

use crate::error::{StoreError, StoreResult};
use crate::location::Location;
use crate::statement::Statement;
use rusqlite::OpenFlags;
use std::time::Duration;
use tessera_codec::Value;

/// Options applied when a connection is opened.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// Create the database file when it does not exist.
    pub create_if_missing: bool,
    /// How long the engine waits on a lock held by another process.
    pub busy_timeout: Duration,
    /// Emit every executed statement as a `debug` event.
    pub log_statements: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            busy_timeout: Duration::from_secs(5),
            log_statements: true,
        }
    }
}

/// A single database connection.
///
/// Statements borrow the connection, so none can outlive it; closing the
/// connection consumes it after every statement has been dropped.
///
/// Foreign-key enforcement is switched on for every connection.
pub struct Connection {
    inner: rusqlite::Connection,
    location: Location,
    log_statements: bool,
}

impl Connection {
    /// Opens a connection to `location`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot open the database or rejects
    /// the initial pragmas.
    pub fn open(location: &Location, options: &ConnectionOptions) -> StoreResult<Self> {
        let inner = match location.resolve() {
            None => rusqlite::Connection::open_in_memory()?,
            Some(path) => {
                let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
                    | OpenFlags::SQLITE_OPEN_URI;
                if options.create_if_missing {
                    flags |= OpenFlags::SQLITE_OPEN_CREATE;
                }
                rusqlite::Connection::open_with_flags(&path, flags)?
            }
        };
        inner.busy_timeout(options.busy_timeout)?;

        let connection = Self {
            inner,
            location: location.clone(),
            log_statements: options.log_statements,
        };
        connection.execute("PRAGMA foreign_keys=ON;")?;

        tracing::debug!(location = ?connection.location, "connection opened");
        Ok(connection)
    }

    /// Returns where this connection points.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Compiles `sql` into a statement.
    ///
    /// # Errors
    ///
    /// Returns the engine error if the text does not compile.
    pub fn prepare(&self, sql: &str) -> StoreResult<Statement<'_>> {
        self.log(sql);
        let inner = self.inner.prepare(sql)?;
        Ok(Statement::new(inner))
    }

    /// Runs `sql` to completion, discarding any rows.
    ///
    /// The text may hold several `;`-separated statements.
    ///
    /// # Errors
    ///
    /// Returns the first engine error encountered.
    pub fn execute(&self, sql: &str) -> StoreResult<()> {
        self.log(sql);
        self.inner.execute_batch(sql)?;
        Ok(())
    }

    /// Returns true if a table named `name` exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema table cannot be queried.
    pub fn table_exists(&self, name: &str) -> StoreResult<bool> {
        let mut statement =
            self.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1;")?;
        statement.bind(1, &Value::from(name))?;
        let mut rows = statement.query();
        let found = rows.step()?.is_some();
        Ok(found)
    }

    /// Returns false while a transaction is open.
    #[must_use]
    pub fn is_autocommit(&self) -> bool {
        self.inner.is_autocommit()
    }

    /// Closes the connection, releasing the engine handle.
    ///
    /// # Errors
    ///
    /// Returns the engine error if the handle could not be closed; the
    /// handle is released regardless.
    pub fn close(self) -> StoreResult<()> {
        let location = self.location;
        match self.inner.close() {
            Ok(()) => {
                tracing::debug!(?location, "connection closed");
                Ok(())
            }
            Err((_, err)) => Err(StoreError::from(err)),
        }
    }

    fn log(&self, sql: &str) {
        if self.log_statements {
            tracing::debug!(target: "tessera::sql", "{sql}");
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn memory() -> Connection {
        Connection::open(&Location::Memory, &ConnectionOptions::default()).unwrap()
    }

    #[test]
    fn foreign_keys_are_enabled() {
        let conn = memory();
        let mut statement = conn.prepare("PRAGMA foreign_keys;").unwrap();
        let mut rows = statement.query();
        let row = rows.step().unwrap().unwrap();
        assert_eq!(row.value(0).unwrap(), Value::Integer(1));
    }

    #[test]
    fn table_exists_reflects_ddl() {
        let conn = memory();
        assert!(!conn.table_exists("Person").unwrap());
        conn.execute("CREATE TABLE Person(id TEXT);").unwrap();
        assert!(conn.table_exists("Person").unwrap());
    }

    #[test]
    fn bad_sql_is_a_native_error() {
        let conn = memory();
        let err = conn.prepare("SELEKT 1").unwrap_err();
        assert_eq!(err.native_code(), Some(rusqlite::ffi::SQLITE_ERROR));
    }

    #[test]
    fn autocommit_tracks_transactions() {
        let conn = memory();
        assert!(conn.is_autocommit());
        conn.execute("BEGIN TRANSACTION;").unwrap();
        assert!(!conn.is_autocommit());
        conn.execute("ROLLBACK;").unwrap();
        assert!(conn.is_autocommit());
    }

    #[test]
    fn file_connection_persists_data() {
        let dir = tempdir().unwrap();
        let location = Location::Path(dir.path().join("store.db"));

        let conn = Connection::open(&location, &ConnectionOptions::default()).unwrap();
        conn.execute("CREATE TABLE T(x INTEGER); INSERT INTO T VALUES (7);")
            .unwrap();
        conn.close().unwrap();

        let conn = Connection::open(&location, &ConnectionOptions::default()).unwrap();
        let mut statement = conn.prepare("SELECT x FROM T;").unwrap();
        let mut rows = statement.query();
        assert_eq!(rows.step().unwrap().unwrap().column::<i64>(0).unwrap(), 7);
    }

    #[test]
    fn missing_file_without_create_fails() {
        let dir = tempdir().unwrap();
        let location = Location::Path(dir.path().join("absent.db"));
        let options = ConnectionOptions {
            create_if_missing: false,
            ..ConnectionOptions::default()
        };
        assert!(Connection::open(&location, &options).is_err());
    }
}
