//! Inspect command implementation.

use crate::Format;
use serde::Serialize;
use std::path::Path;
use tessera_core::schema::{table_columns, table_indices, table_names};
use tessera_storage::Connection;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store path.
    pub path: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Tables in name order.
    pub tables: Vec<TableStats>,
}

/// Description of a single table.
#[derive(Debug, Serialize)]
pub struct TableStats {
    /// Table (entity) name.
    pub name: String,
    /// Number of rows.
    pub row_count: u64,
    /// Columns in definition order.
    pub columns: Vec<ColumnStats>,
    /// Index names.
    pub indices: Vec<String>,
}

/// Description of a single column.
#[derive(Debug, Serialize)]
pub struct ColumnStats {
    /// Column name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub declared_type: String,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: Format) -> Result<(), Box<dyn std::error::Error>> {
    let connection = super::open_existing(path)?;
    let result = inspect(path, &connection)?;

    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Format::Text => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Collects the inspection result for an open store.
pub fn inspect(path: &Path, connection: &Connection) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let mut tables = Vec::new();
    for name in table_names(connection)? {
        let columns = table_columns(connection, &name)?
            .into_iter()
            .map(|column| ColumnStats {
                name: column.name,
                declared_type: column.declared_type,
                primary_key: column.primary_key,
            })
            .collect();
        tables.push(TableStats {
            row_count: row_count(connection, &name)?,
            indices: table_indices(connection, &name)?,
            columns,
            name,
        });
    }

    Ok(InspectResult {
        path: path.display().to_string(),
        file_size: std::fs::metadata(path)?.len(),
        tables,
    })
}

fn row_count(connection: &Connection, table: &str) -> Result<u64, Box<dyn std::error::Error>> {
    let mut statement = connection.prepare(&format!(
        "SELECT COUNT(*) FROM \"{}\";",
        table.replace('"', "\"\"")
    ))?;
    let mut rows = statement.query();
    let count = match rows.step()? {
        Some(row) => row.column::<i64>(0)?,
        None => 0,
    };
    Ok(u64::try_from(count)?)
}

fn print_text_output(result: &InspectResult) {
    println!("Tessera Store Inspection");
    println!("========================");
    println!();
    println!("Path: {}", result.path);
    println!("Size: {}", format_size(result.file_size));

    for table in &result.tables {
        println!();
        println!("{} ({} rows)", table.name, table.row_count);
        for column in &table.columns {
            let key = if column.primary_key { " [pk]" } else { "" };
            println!("  {} {}{}", column.name, column.declared_type, key);
        }
        for index in &table.indices {
            println!("  index {index}");
        }
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_testkit::prelude::*;

    #[test]
    fn inspects_saved_entities() {
        let test_store = TestStore::file();
        let mut owner = Owner::new("Ann");
        owner.adopt("Ebony");
        owner.adopt("Ivory");
        test_store.save(&owner).unwrap();
        test_store.close().unwrap();

        let path = test_store.path().unwrap();
        let connection = crate::commands::open_existing(path).unwrap();
        let result = inspect(path, &connection).unwrap();

        let names: Vec<&str> = result.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Dog", "Owner"]);
        assert_eq!(result.tables[0].row_count, 2);
        assert_eq!(result.tables[1].row_count, 1);
        assert!(result.tables[1].columns[0].primary_key);
        assert!(result.file_size > 0);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["tables"][1]["columns"][0]["type"], "TEXT");
    }

    #[test]
    fn missing_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&dir.path().join("absent.db"), Format::Text).is_err());
    }

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(10), "10 bytes");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
