//! Entity and field-key traits.

use crate::container::{Input, Output};
use crate::error::CoreResult;

/// Stable identifier of one entity attribute.
///
/// The returned name is the column name. It must be unique within the entity
/// and must not change between versions: renaming a key orphans the old
/// column and starts a new, empty one.
///
/// Usually implemented by a fieldless enum:
///
/// ```
/// use tessera_core::FieldKey;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum DogKey {
///     Id,
///     OwnerId,
/// }
///
/// impl FieldKey for DogKey {
///     fn name(self) -> &'static str {
///         match self {
///             Self::Id => "id",
///             Self::OwnerId => "ownerID",
///         }
///     }
/// }
/// ```
pub trait FieldKey: Copy + 'static {
    /// Returns the column name for this key.
    fn name(self) -> &'static str;
}

/// A record type persisted as one table.
///
/// The pair [`Entity::fill`] / [`Entity::from_row`] replaces any form of
/// reflection: `fill` declares columns, keys, relations, indices and enclosed
/// records on the save side, `from_row` reads them back on the load side.
pub trait Entity: Sized {
    /// Table name.
    const NAME: &'static str;

    /// Field keys of this entity.
    type Key: FieldKey;

    /// Declares this record's shape and values.
    ///
    /// Called exactly once per record per save.
    fn fill<'a>(&'a self, input: &mut Input<'a, Self>);

    /// Builds a record from one result row.
    ///
    /// # Errors
    ///
    /// Returns an error if a requested column is missing or cannot be decoded,
    /// or if loading a related entity fails.
    fn from_row(output: &Output<'_, Self>) -> CoreResult<Self>;
}
