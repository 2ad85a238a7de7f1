//! Load-side container.

use crate::entity::{Entity, FieldKey};
use crate::error::{CoreError, CoreResult};
use crate::persist;
use crate::query::Query;
use std::collections::HashMap;
use std::marker::PhantomData;
use tessera_codec::Scalar;
use tessera_storage::{Connection, Row};

/// One result row handed to [`Entity::from_row`].
///
/// Related entities are loaded through the same connection the row came
/// from, inside the operation that is already running.
pub struct Output<'a, E: Entity> {
    connection: &'a Connection,
    row: Row<'a>,
    columns: &'a HashMap<String, usize>,
    entity: PhantomData<fn() -> E>,
}

impl<'a, E: Entity> Output<'a, E> {
    pub(crate) fn new(
        connection: &'a Connection,
        row: Row<'a>,
        columns: &'a HashMap<String, usize>,
    ) -> Self {
        Self {
            connection,
            row,
            columns,
            entity: PhantomData,
        }
    }

    /// Reads the column for `key`.
    ///
    /// A NULL column decodes to the scalar's default unless `V` is an
    /// `Option`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingColumn`] if the row has no such column,
    /// or a codec error if the stored value cannot satisfy `V`.
    pub fn get<V: Scalar>(&self, key: E::Key) -> CoreResult<V> {
        let position = self
            .columns
            .get(key.name())
            .copied()
            .ok_or_else(|| CoreError::missing_column(E::NAME, key.name()))?;
        Ok(self.row.column(position)?)
    }

    /// Returns true if the row carries a column for `key`.
    #[must_use]
    pub fn contains(&self, key: E::Key) -> bool {
        self.columns.contains_key(key.name())
    }

    /// Loads the related records matching `query`.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the nested load.
    pub fn fetch<R: Entity>(&self, query: &Query<R::Key>) -> CoreResult<Vec<R>> {
        persist::fetch(self.connection, query)
    }

    /// Loads the first related record matching `query`.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the nested load.
    pub fn fetch_first<R: Entity>(&self, query: &Query<R::Key>) -> CoreResult<Option<R>> {
        persist::fetch_first(self.connection, query)
    }

    /// Counts the related records matching `query`.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the nested count.
    pub fn count<R: Entity>(&self, query: &Query<R::Key>) -> CoreResult<usize> {
        persist::count::<R>(self.connection, query)
    }
}
