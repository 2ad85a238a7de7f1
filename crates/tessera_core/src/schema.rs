//! Schema reconciliation and introspection.
//!
//! Reconciliation is additive: tables are created, columns are added and
//! indices follow the declared set, but existing columns are never altered
//! or dropped. Every save re-checks the live schema; nothing is cached.

use crate::container::{index_prefix, ColumnDef, IndexDef, Shape};
use crate::error::CoreResult;
use tessera_codec::{quote_identifier, Value};
use tessera_storage::Connection;

/// A column as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared type, as written in the DDL.
    pub declared_type: String,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
}

/// Brings the table for `shape` in line with its declaration.
pub(crate) fn reconcile(connection: &Connection, shape: &Shape) -> CoreResult<()> {
    shape.validate()?;
    if connection.table_exists(shape.entity)? {
        migrate(connection, shape)
    } else {
        create(connection, shape)
    }
}

fn create(connection: &Connection, shape: &Shape) -> CoreResult<()> {
    connection.execute(&create_table_sql(shape))?;
    for index in &shape.indices {
        connection.execute(&create_index_sql(shape.entity, index))?;
    }
    tracing::debug!(entity = shape.entity, "table created");
    Ok(())
}

fn migrate(connection: &Connection, shape: &Shape) -> CoreResult<()> {
    let existing: Vec<String> = table_columns(connection, shape.entity)?
        .into_iter()
        .map(|column| column.name)
        .collect();
    for column in &shape.columns {
        if !existing.iter().any(|name| name == column.name) {
            connection.execute(&add_column_sql(shape, column))?;
            tracing::debug!(entity = shape.entity, column = column.name, "column added");
        }
    }

    let prefix = index_prefix(shape.entity);
    let existing: Vec<String> = table_indices(connection, shape.entity)?
        .into_iter()
        .filter(|name| name.starts_with(&prefix))
        .collect();
    for index in &shape.indices {
        if !existing.contains(&index.name) {
            connection.execute(&create_index_sql(shape.entity, index))?;
        }
    }
    for name in &existing {
        if !shape.indices.iter().any(|index| &index.name == name) {
            connection.execute(&format!("DROP INDEX {};", quote_identifier(name)))?;
            tracing::debug!(entity = shape.entity, index = %name, "index dropped");
        }
    }
    Ok(())
}

fn create_table_sql(shape: &Shape) -> String {
    let inline_key = match shape.primary_key.as_slice() {
        [key] => Some(*key),
        _ => None,
    };
    let mut parts: Vec<String> = shape
        .columns
        .iter()
        .map(|column| {
            let mut part = column_sql(column);
            if inline_key == Some(column.name) {
                part.push_str(" PRIMARY KEY");
            }
            part
        })
        .collect();
    for relation in &shape.relations {
        parts.push(format!(
            "FOREIGN KEY({}) REFERENCES {}({}) ON DELETE CASCADE",
            quote_identifier(relation.column),
            quote_identifier(relation.table),
            quote_identifier(relation.key)
        ));
    }
    if shape.primary_key.len() > 1 {
        parts.push(format!("PRIMARY KEY({})", identifier_list(&shape.primary_key)));
    }
    format!(
        "CREATE TABLE {}({});",
        quote_identifier(shape.entity),
        parts.join(", ")
    )
}

// The engine has no ALTER TABLE ... ADD FOREIGN KEY, so a relation on an
// added column is declared inline on the column itself.
fn add_column_sql(shape: &Shape, column: &ColumnDef) -> String {
    let mut sql = format!(
        "ALTER TABLE {} ADD COLUMN {}",
        quote_identifier(shape.entity),
        column_sql(column)
    );
    if let Some(relation) = shape.relation(column.name) {
        sql.push_str(&format!(
            " REFERENCES {}({}) ON DELETE CASCADE",
            quote_identifier(relation.table),
            quote_identifier(relation.key)
        ));
    }
    sql.push(';');
    sql
}

fn create_index_sql(entity: &str, index: &IndexDef) -> String {
    format!(
        "CREATE INDEX {} ON {}({});",
        quote_identifier(&index.name),
        quote_identifier(entity),
        identifier_list(&index.keys)
    )
}

fn column_sql(column: &ColumnDef) -> String {
    format!("{} {}", quote_identifier(column.name), column.kind.sql_type())
}

pub(crate) fn identifier_list(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| quote_identifier(name))
        .collect::<Vec<_>>()
        .join(",")
}

/// Lists user tables, sorted by name.
///
/// # Errors
///
/// Returns an error if the schema table cannot be read.
pub fn table_names(connection: &Connection) -> CoreResult<Vec<String>> {
    let mut statement = connection.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name;",
    )?;
    let mut rows = statement.query();
    let mut names = Vec::new();
    while let Some(row) = rows.step()? {
        names.push(row.column::<String>(0)?);
    }
    Ok(names)
}

/// Lists the columns of `table` in definition order.
///
/// Returns an empty list if the table does not exist.
///
/// # Errors
///
/// Returns an error if the engine rejects the introspection statement.
pub fn table_columns(connection: &Connection, table: &str) -> CoreResult<Vec<ColumnInfo>> {
    let mut statement = connection.prepare(&format!("PRAGMA table_info({});", quote(table)))?;
    let mut rows = statement.query();
    let mut columns = Vec::new();
    while let Some(row) = rows.step()? {
        columns.push(ColumnInfo {
            name: row.column(1)?,
            declared_type: row.column(2)?,
            primary_key: row.column::<i64>(5)? > 0,
        });
    }
    Ok(columns)
}

/// Lists the names of all indices on `table`, including automatic ones.
///
/// # Errors
///
/// Returns an error if the engine rejects the introspection statement.
pub fn table_indices(connection: &Connection, table: &str) -> CoreResult<Vec<String>> {
    let mut statement = connection.prepare(&format!("PRAGMA index_list({});", quote(table)))?;
    let mut rows = statement.query();
    let mut names = Vec::new();
    while let Some(row) = rows.step()? {
        names.push(row.column(1)?);
    }
    Ok(names)
}

fn quote(name: &str) -> String {
    Value::from(name)
        .to_literal()
        .unwrap_or_else(|_| format!("'{name}'"))
}
