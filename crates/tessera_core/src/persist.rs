//! Entity-level operations against one open connection.
//!
//! These run inside whatever the caller holds: the store's exclusive access
//! for top-level operations, or an outer operation for nested loads and
//! enclosed saves.

use crate::container::{Input, Output, Shape};
use crate::entity::Entity;
use crate::error::CoreResult;
use crate::query::Query;
use crate::schema::{self, identifier_list};
use std::collections::HashMap;
use tessera_codec::quote_identifier;
use tessera_storage::{Connection, Statement};

/// Upserts `records` and their enclosed collections.
///
/// The insert statement is prepared once and reused while consecutive
/// records declare the same shape; a differing shape reconciles the schema
/// again first.
pub(crate) fn save_all<E: Entity>(connection: &Connection, records: &[E]) -> CoreResult<()> {
    let mut prepared: Option<(Shape, Statement<'_>)> = None;
    for record in records {
        let mut input = Input::new();
        record.fill(&mut input);
        let shape = input.shape();

        let (shape, statement) = match prepared.take() {
            Some((current, statement)) if current == shape => (current, statement),
            stale => {
                drop(stale);
                schema::reconcile(connection, &shape)?;
                let statement = connection.prepare(&insert_sql(&shape))?;
                (shape, statement)
            }
        };
        let (_, statement) = prepared.insert((shape, statement));
        statement.bind_all(input.values())?;
        statement.run()?;

        for enclosed in input.into_enclosed() {
            enclosed.save(connection)?;
        }
    }
    Ok(())
}

/// Loads every record matching `query`, in query order.
pub(crate) fn fetch<E: Entity>(
    connection: &Connection,
    query: &Query<E::Key>,
) -> CoreResult<Vec<E>> {
    if !connection.table_exists(E::NAME)? {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT * FROM {}{};",
        quote_identifier(E::NAME),
        query.render_suffix()?
    );
    let mut statement = connection.prepare(&sql)?;
    let columns: HashMap<String, usize> = statement
        .column_names()
        .into_iter()
        .enumerate()
        .map(|(position, name)| (name, position))
        .collect();

    let mut rows = statement.query();
    let mut records = Vec::new();
    while let Some(row) = rows.step()? {
        let output = Output::new(connection, row, &columns);
        records.push(E::from_row(&output)?);
    }
    Ok(records)
}

/// Loads the first record matching `query`.
pub(crate) fn fetch_first<E: Entity>(
    connection: &Connection,
    query: &Query<E::Key>,
) -> CoreResult<Option<E>> {
    let query = query.clone().limit(1);
    Ok(fetch(connection, &query)?.into_iter().next())
}

/// Counts the records matching `query`; order and window are ignored.
pub(crate) fn count<E: Entity>(connection: &Connection, query: &Query<E::Key>) -> CoreResult<usize> {
    if !connection.table_exists(E::NAME)? {
        return Ok(0);
    }
    let sql = format!(
        "SELECT COUNT(*) FROM {}{};",
        quote_identifier(E::NAME),
        query.render_where()?
    );
    let mut statement = connection.prepare(&sql)?;
    let mut rows = statement.query();
    let count = match rows.step()? {
        Some(row) => row.column::<i64>(0)?,
        None => 0,
    };
    Ok(usize::try_from(count).unwrap_or_default())
}

/// Deletes the records matching `query` and returns how many were removed.
///
/// Rows referencing a deleted record through a relation are removed by the
/// engine and are not included in the count.
pub(crate) fn delete<E: Entity>(connection: &Connection, query: &Query<E::Key>) -> CoreResult<usize> {
    if !connection.table_exists(E::NAME)? {
        return Ok(0);
    }
    let sql = format!(
        "DELETE FROM {}{};",
        quote_identifier(E::NAME),
        query.render_where()?
    );
    let mut statement = connection.prepare(&sql)?;
    Ok(statement.run()?)
}

/// Runs `work` inside a transaction.
///
/// Commits on success. On any failure the transaction is rolled back and
/// the original error is returned. A panic in `work` also rolls back while
/// unwinding, so the connection is never handed back mid-transaction.
pub(crate) fn transaction<T>(
    connection: &Connection,
    work: impl FnOnce(&Connection) -> CoreResult<T>,
) -> CoreResult<T> {
    connection.execute("BEGIN TRANSACTION;")?;
    let _open = OpenTransaction { connection };
    let value = work(connection)?;
    connection.execute("COMMIT;")?;
    Ok(value)
}

/// Rolls back on drop unless the transaction already ended.
struct OpenTransaction<'c> {
    connection: &'c Connection,
}

impl Drop for OpenTransaction<'_> {
    fn drop(&mut self) {
        rollback(self.connection);
    }
}

fn rollback(connection: &Connection) {
    if connection.is_autocommit() {
        return;
    }
    if let Err(e) = connection.execute("ROLLBACK;") {
        tracing::warn!(error = %e, "rollback failed");
    }
}

fn insert_sql(shape: &Shape) -> String {
    let names: Vec<&str> = shape.columns.iter().map(|column| column.name).collect();
    let placeholders = vec!["?"; names.len()].join(",");
    let mut sql = format!(
        "INSERT INTO {}({}) VALUES({placeholders})",
        quote_identifier(shape.entity),
        identifier_list(&names)
    );
    if !shape.primary_key.is_empty() {
        let updates: Vec<String> = names
            .iter()
            .copied()
            .filter(|name| !shape.primary_key.contains(name))
            .map(|name| {
                let name = quote_identifier(name);
                format!("{name}=excluded.{name}")
            })
            .collect();
        sql.push_str(&format!(
            " ON CONFLICT({})",
            identifier_list(&shape.primary_key)
        ));
        if updates.is_empty() {
            sql.push_str(" DO NOTHING");
        } else {
            sql.push_str(&format!(" DO UPDATE SET {}", updates.join(",")));
        }
    }
    sql.push(';');
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ColumnDef;
    use tessera_codec::ScalarKind;
    use tessera_storage::{ConnectionOptions, Location};

    fn shape(primary_key: Vec<&'static str>) -> Shape {
        Shape {
            entity: "Person",
            columns: vec![
                ColumnDef {
                    name: "id",
                    kind: ScalarKind::Text,
                },
                ColumnDef {
                    name: "name",
                    kind: ScalarKind::Text,
                },
            ],
            primary_key,
            relations: vec![],
            indices: vec![],
        }
    }

    #[test]
    fn keyless_insert_is_blind() {
        assert_eq!(
            insert_sql(&shape(vec![])),
            r#"INSERT INTO "Person"("id","name") VALUES(?,?);"#
        );
    }

    #[test]
    fn keyed_insert_upserts() {
        assert_eq!(
            insert_sql(&shape(vec!["id"])),
            concat!(
                r#"INSERT INTO "Person"("id","name") VALUES(?,?) "#,
                r#"ON CONFLICT("id") DO UPDATE SET "name"=excluded."name";"#
            )
        );
    }

    #[test]
    fn key_only_insert_does_nothing_on_conflict() {
        assert_eq!(
            insert_sql(&shape(vec!["id", "name"])),
            r#"INSERT INTO "Person"("id","name") VALUES(?,?) ON CONFLICT("id","name") DO NOTHING;"#
        );
    }

    fn memory() -> Connection {
        let conn = Connection::open(&Location::Memory, &ConnectionOptions::default()).unwrap();
        conn.execute("CREATE TABLE T(x INTEGER);").unwrap();
        conn
    }

    fn rows(conn: &Connection) -> i64 {
        let mut statement = conn.prepare("SELECT COUNT(*) FROM T;").unwrap();
        let mut rows = statement.query();
        let count = rows.step().unwrap().unwrap().column(0).unwrap();
        count
    }

    #[test]
    fn transaction_commits() {
        let conn = memory();
        transaction(&conn, |conn| Ok(conn.execute("INSERT INTO T VALUES (1);")?)).unwrap();
        assert!(conn.is_autocommit());
        assert_eq!(rows(&conn), 1);
    }

    #[test]
    fn transaction_rolls_back_and_keeps_error() {
        let conn = memory();
        let err = transaction(&conn, |conn| {
            conn.execute("INSERT INTO T VALUES (1);")?;
            conn.execute("INSERT INTO Missing VALUES (1);")?;
            Ok(())
        })
        .unwrap_err();

        assert!(err.native_code().is_some());
        assert!(conn.is_autocommit());
        assert_eq!(rows(&conn), 0);
    }

    #[test]
    fn transaction_rolls_back_on_panic() {
        let conn = memory();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            transaction(&conn, |conn| -> CoreResult<()> {
                conn.execute("INSERT INTO T VALUES (1);")?;
                panic!("work aborted");
            })
        }));

        assert!(outcome.is_err());
        assert!(conn.is_autocommit());
        assert_eq!(rows(&conn), 0);
        transaction(&conn, |conn| Ok(conn.execute("INSERT INTO T VALUES (2);")?)).unwrap();
        assert_eq!(rows(&conn), 1);
    }
}
