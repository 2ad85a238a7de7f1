//! Check command implementation.

use std::path::Path;
use tessera_storage::Connection;

/// Check result.
#[derive(Debug, Default)]
pub struct CheckResult {
    /// Messages reported by the integrity check; empty when it passed.
    pub integrity_errors: Vec<String>,
    /// Rows whose foreign key has no parent row.
    pub foreign_key_violations: Vec<ForeignKeyViolation>,
}

/// A row referencing a missing parent.
#[derive(Debug, PartialEq, Eq)]
pub struct ForeignKeyViolation {
    /// Referencing table.
    pub table: String,
    /// Rowid of the referencing row.
    pub rowid: i64,
    /// Referenced table.
    pub parent: String,
}

impl CheckResult {
    fn is_ok(&self) -> bool {
        self.integrity_errors.is_empty() && self.foreign_key_violations.is_empty()
    }
}

/// Runs the check command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Checking store at {}", path.display());
    println!();

    let connection = super::open_existing(path)?;
    let result = check(&connection)?;

    for message in &result.integrity_errors {
        println!("  integrity: {message}");
    }
    for violation in &result.foreign_key_violations {
        println!(
            "  foreign key: {} row {} references missing {}",
            violation.table, violation.rowid, violation.parent
        );
    }

    println!();
    if result.is_ok() {
        println!("✓ Store check passed");
        Ok(())
    } else {
        println!("✗ Store check failed");
        Err("Check failed".into())
    }
}

/// Runs the engine's integrity and foreign-key checks.
pub fn check(connection: &Connection) -> Result<CheckResult, Box<dyn std::error::Error>> {
    let mut result = CheckResult::default();

    let mut statement = connection.prepare("PRAGMA integrity_check;")?;
    let mut rows = statement.query();
    while let Some(row) = rows.step()? {
        let message: String = row.column(0)?;
        if message != "ok" {
            result.integrity_errors.push(message);
        }
    }
    drop(rows);
    drop(statement);

    let mut statement = connection.prepare("PRAGMA foreign_key_check;")?;
    let mut rows = statement.query();
    while let Some(row) = rows.step()? {
        result.foreign_key_violations.push(ForeignKeyViolation {
            table: row.column(0)?,
            rowid: row.column(1)?,
            parent: row.column(2)?,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_storage::{ConnectionOptions, Location};

    fn memory() -> Connection {
        Connection::open(&Location::Memory, &ConnectionOptions::default()).unwrap()
    }

    #[test]
    fn clean_store_passes() {
        let connection = memory();
        connection
            .execute("CREATE TABLE Owner(id TEXT PRIMARY KEY); INSERT INTO Owner VALUES ('a');")
            .unwrap();
        assert!(check(&connection).unwrap().is_ok());
    }

    #[test]
    fn orphan_rows_are_reported() {
        let connection = memory();
        connection
            .execute(
                "CREATE TABLE Owner(id TEXT PRIMARY KEY); \
                 CREATE TABLE Dog(name TEXT, ownerID TEXT, \
                 FOREIGN KEY(ownerID) REFERENCES Owner(id) ON DELETE CASCADE); \
                 PRAGMA foreign_keys=OFF; \
                 INSERT INTO Dog VALUES ('Rex', 'nobody');",
            )
            .unwrap();

        let result = check(&connection).unwrap();
        assert!(!result.is_ok());
        assert_eq!(
            result.foreign_key_violations,
            vec![ForeignKeyViolation {
                table: "Dog".into(),
                rowid: 1,
                parent: "Owner".into(),
            }]
        );
    }
}
