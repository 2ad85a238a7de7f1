//! Prepared statements, result cursors and rows.

use crate::error::StoreResult;
use rusqlite::types::{ToSqlOutput, ValueRef};
use tessera_codec::{CodecError, Scalar, Value};

/// A compiled statement borrowed from its [`Connection`](crate::Connection).
#[derive(Debug)]
pub struct Statement<'conn> {
    inner: rusqlite::Statement<'conn>,
}

impl<'conn> Statement<'conn> {
    pub(crate) fn new(inner: rusqlite::Statement<'conn>) -> Self {
        Self { inner }
    }

    /// Binds `value` to the 1-based parameter `position`.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of range.
    pub fn bind(&mut self, position: usize, value: &Value) -> StoreResult<()> {
        self.inner.raw_bind_parameter(position, to_sql(value))?;
        Ok(())
    }

    /// Binds `values` to parameters `1..=values.len()`.
    ///
    /// # Errors
    ///
    /// Returns the first binding error.
    pub fn bind_all<'v>(&mut self, values: impl IntoIterator<Item = &'v Value>) -> StoreResult<()> {
        for (index, value) in values.into_iter().enumerate() {
            self.bind(index + 1, value)?;
        }
        Ok(())
    }

    /// Number of columns in the result set.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.inner.column_count()
    }

    /// Name of the result column at 0-based `position`.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of range.
    pub fn column_name(&self, position: usize) -> StoreResult<&str> {
        Ok(self.inner.column_name(position)?)
    }

    /// Names of all result columns, in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.inner
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Steps the statement to completion and returns the number of changed rows.
    ///
    /// The statement is reset afterwards and may be bound and run again.
    ///
    /// # Errors
    ///
    /// Returns the engine error, or a driver error if the statement
    /// produced rows.
    pub fn run(&mut self) -> StoreResult<usize> {
        Ok(self.inner.raw_execute()?)
    }

    /// Starts stepping through the result rows.
    pub fn query(&mut self) -> Rows<'_> {
        Rows {
            inner: self.inner.raw_query(),
        }
    }
}

/// Cursor over the rows of an executing statement.
pub struct Rows<'stmt> {
    inner: rusqlite::Rows<'stmt>,
}

impl Rows<'_> {
    /// Advances to the next row.
    ///
    /// Returns `None` once the statement is done.
    ///
    /// # Errors
    ///
    /// Returns the engine error raised by the step.
    pub fn step(&mut self) -> StoreResult<Option<Row<'_>>> {
        Ok(self.inner.next()?.map(|inner| Row { inner }))
    }
}

/// One result row.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    inner: &'a rusqlite::Row<'a>,
}

impl Row<'_> {
    /// Reads the column at 0-based `position` as a raw [`Value`].
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of range or text is not UTF-8.
    pub fn value(&self, position: usize) -> StoreResult<Value> {
        let value = match self.inner.get_ref(position)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Integer(v),
            ValueRef::Real(v) => Value::Real(v),
            ValueRef::Text(bytes) => Value::Text(
                std::str::from_utf8(bytes)
                    .map_err(|_| CodecError::InvalidUtf8)?
                    .to_string(),
            ),
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        };
        Ok(value)
    }

    /// Reads and decodes the column at 0-based `position`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value cannot satisfy `V`.
    pub fn column<V: Scalar>(&self, position: usize) -> StoreResult<V> {
        Ok(V::decode(self.value(position)?)?)
    }
}

fn to_sql(value: &Value) -> ToSqlOutput<'_> {
    ToSqlOutput::Borrowed(match value {
        Value::Null => ValueRef::Null,
        Value::Integer(v) => ValueRef::Integer(*v),
        Value::Real(v) => ValueRef::Real(*v),
        Value::Text(s) => ValueRef::Text(s.as_bytes()),
        Value::Blob(b) => ValueRef::Blob(b),
    })
}

#[cfg(test)]
mod tests {
    use crate::{Connection, ConnectionOptions, Location};
    use tessera_codec::Value;

    fn memory() -> Connection {
        let conn = Connection::open(&Location::Memory, &ConnectionOptions::default()).unwrap();
        conn.execute("CREATE TABLE T(i INTEGER, r REAL, t TEXT, b BLOB, n TEXT);")
            .unwrap();
        conn
    }

    #[test]
    fn bind_and_read_every_kind() {
        let conn = memory();
        let values = [
            Value::Integer(42),
            Value::Real(1.5),
            Value::from("hello"),
            Value::Blob(vec![0, 1, 2]),
            Value::Null,
        ];

        let mut insert = conn.prepare("INSERT INTO T VALUES (?, ?, ?, ?, ?);").unwrap();
        insert.bind_all(&values).unwrap();
        assert_eq!(insert.run().unwrap(), 1);

        let mut select = conn.prepare("SELECT i, r, t, b, n FROM T;").unwrap();
        assert_eq!(select.column_count(), 5);
        assert_eq!(select.column_name(2).unwrap(), "t");

        let mut rows = select.query();
        let row = rows.step().unwrap().unwrap();
        for (position, expected) in values.iter().enumerate() {
            assert_eq!(&row.value(position).unwrap(), expected);
        }
        assert!(rows.step().unwrap().is_none());
    }

    #[test]
    fn statement_is_reusable_after_run() {
        let conn = memory();
        let mut insert = conn.prepare("INSERT INTO T(i) VALUES (?);").unwrap();
        for i in 0..3 {
            insert.bind(1, &Value::Integer(i)).unwrap();
            insert.run().unwrap();
        }

        let mut count = conn.prepare("SELECT COUNT(*) FROM T;").unwrap();
        let mut rows = count.query();
        assert_eq!(rows.step().unwrap().unwrap().column::<i64>(0).unwrap(), 3);
    }

    #[test]
    fn typed_column_decodes_null_as_default() {
        let conn = memory();
        conn.execute("INSERT INTO T(i) VALUES (NULL);").unwrap();
        let mut select = conn.prepare("SELECT i, t FROM T;").unwrap();
        let mut rows = select.query();
        let row = rows.step().unwrap().unwrap();
        assert_eq!(row.column::<i64>(0).unwrap(), 0);
        assert_eq!(row.column::<Option<String>>(1).unwrap(), None);
    }

    #[test]
    fn bind_out_of_range_fails() {
        let conn = memory();
        let mut insert = conn.prepare("INSERT INTO T(i) VALUES (?);").unwrap();
        assert!(insert.bind(5, &Value::Integer(1)).is_err());
    }

    #[test]
    fn constraint_violation_surfaces_on_run() {
        let conn = memory();
        conn.execute("CREATE TABLE U(id TEXT PRIMARY KEY);").unwrap();
        let mut insert = conn.prepare("INSERT INTO U VALUES ('a');").unwrap();
        insert.run().unwrap();
        let err = insert.run().unwrap_err();
        assert_eq!(
            err.native_code().map(|code| code & 0xff),
            Some(rusqlite::ffi::SQLITE_CONSTRAINT)
        );
    }
}
