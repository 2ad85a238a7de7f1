//! Save-side container.

use crate::condition::Condition;
use crate::entity::{Entity, FieldKey};
use crate::error::{CoreError, CoreResult};
use crate::persist;
use crate::query::Query;
use indexmap::IndexMap;
use std::marker::PhantomData;
use tessera_codec::{Scalar, ScalarKind, Value};
use tessera_storage::Connection;

/// Collects one record's columns, keys, relations, indices and enclosed
/// collections during [`Entity::fill`].
pub struct Input<'a, E: Entity> {
    primary_key: Vec<&'static str>,
    indices: Vec<IndexDef>,
    columns: IndexMap<&'static str, Column>,
    relations: IndexMap<&'static str, RelationDef>,
    enclosed: Vec<Box<dyn EnclosedSave + 'a>>,
    entity: PhantomData<fn() -> E>,
}

struct Column {
    kind: ScalarKind,
    value: Value,
}

impl<'a, E: Entity> Input<'a, E> {
    pub(crate) fn new() -> Self {
        Self {
            primary_key: Vec::new(),
            indices: Vec::new(),
            columns: IndexMap::new(),
            relations: IndexMap::new(),
            enclosed: Vec::new(),
            entity: PhantomData,
        }
    }

    /// Declares the primary key, replacing any earlier declaration.
    ///
    /// Records with a primary key are upserted; records without one are
    /// always inserted as new rows.
    pub fn set_primary_key(&mut self, keys: &[E::Key]) {
        self.primary_key = keys.iter().map(|key| key.name()).collect();
    }

    /// Declares an index over `keys`, in order.
    ///
    /// The index name is derived from the entity name and the keys, so
    /// declaring the same index again is a no-op and removing the
    /// declaration drops the index on the next save.
    pub fn set_index(&mut self, keys: &[E::Key]) {
        let keys: Vec<&'static str> = keys.iter().map(|key| key.name()).collect();
        let name = index_name(E::NAME, &keys);
        if !self.indices.iter().any(|index| index.name == name) {
            self.indices.push(IndexDef { name, keys });
        }
    }

    /// Sets the value of the column for `key`.
    pub fn set(&mut self, key: E::Key, value: &impl Scalar) {
        self.set_value(key.name(), value);
    }

    /// Sets a column that references `related_key` of entity `R`.
    ///
    /// The reference is enforced with `ON DELETE CASCADE`: deleting the
    /// referenced row deletes this one. `related_key` must be the primary key
    /// of `R` (or otherwise unique) for the engine to accept the reference.
    pub fn set_related<R: Entity>(&mut self, key: E::Key, value: &impl Scalar, related_key: R::Key) {
        self.set_value(key.name(), value);
        self.relations.insert(
            key.name(),
            RelationDef {
                column: key.name(),
                table: R::NAME,
                key: related_key.name(),
            },
        );
    }

    /// Attaches a collection of related records saved together with this one.
    ///
    /// When `scope` is given, the rows of `R` matching it are deleted before
    /// `records` are saved, which makes `records` the complete set for that
    /// scope. Without a scope the records are only upserted.
    pub fn enclose<R: Entity>(&mut self, records: &'a [R], scope: Option<Condition<R::Key>>) {
        self.enclosed.push(Box::new(Enclosed { records, scope }));
    }

    /// Attaches a single related record; see [`Input::enclose`].
    pub fn enclose_one<R: Entity>(&mut self, record: &'a R, scope: Option<Condition<R::Key>>) {
        self.enclose(std::slice::from_ref(record), scope);
    }

    /// Returns the table shape declared so far.
    #[must_use]
    pub fn shape(&self) -> Shape {
        Shape {
            entity: E::NAME,
            columns: self
                .columns
                .iter()
                .map(|(name, column)| ColumnDef {
                    name: *name,
                    kind: column.kind,
                })
                .collect(),
            primary_key: self.primary_key.clone(),
            relations: self.relations.values().cloned().collect(),
            indices: self.indices.clone(),
        }
    }

    /// Returns the current value of the column for `key`, if set.
    #[must_use]
    pub fn value(&self, key: E::Key) -> Option<&Value> {
        self.columns.get(key.name()).map(|column| &column.value)
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &Value> {
        self.columns.values().map(|column| &column.value)
    }

    pub(crate) fn into_enclosed(self) -> Vec<Box<dyn EnclosedSave + 'a>> {
        self.enclosed
    }

    fn set_value<V: Scalar>(&mut self, name: &'static str, value: &V) {
        let column = Column {
            kind: V::KIND,
            value: value.to_value(),
        };
        self.columns.insert(name, column);
    }
}

// `_` separates the parts of an index name; a `_` or `%` inside a part is
// percent-escaped so distinct key lists never share a name.
fn index_name(entity: &str, keys: &[&str]) -> String {
    let mut name = index_prefix(entity);
    name.push_str(&keys.iter().map(|key| escape(key)).collect::<Vec<_>>().join("_"));
    name
}

/// Prefix shared by every index name derived for `entity`.
pub(crate) fn index_prefix(entity: &str) -> String {
    format!("idx_{}_", escape(entity))
}

fn escape(part: &str) -> String {
    part.replace('%', "%25").replace('_', "%5F")
}

/// Everything a record declares about its table.
///
/// Two records of the same entity share a prepared insert only when their
/// shapes are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    /// Table name.
    pub entity: &'static str,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDef>,
    /// Primary-key columns; empty when no key is declared.
    pub primary_key: Vec<&'static str>,
    /// Foreign-key references.
    pub relations: Vec<RelationDef>,
    /// Declared indices.
    pub indices: Vec<IndexDef>,
}

impl Shape {
    /// Returns the relation declared on `column`, if any.
    #[must_use]
    pub fn relation(&self, column: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|relation| relation.column == column)
    }

    /// Checks that the shape describes a table the engine can create.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidOperation`] if no column is declared, an
    /// index has no keys, or a key or index names a column that was never
    /// set.
    pub fn validate(&self) -> CoreResult<()> {
        if self.columns.is_empty() {
            return Err(CoreError::invalid_operation(format!(
                "{} declares no columns",
                self.entity
            )));
        }
        if self.indices.iter().any(|index| index.keys.is_empty()) {
            return Err(CoreError::invalid_operation(format!(
                "{} declares an index without columns",
                self.entity
            )));
        }
        let keys = self
            .primary_key
            .iter()
            .chain(self.indices.iter().flat_map(|index| index.keys.iter()));
        for key in keys {
            if !self.columns.iter().any(|column| column.name == *key) {
                return Err(CoreError::invalid_operation(format!(
                    "{} uses undeclared column {key} in a key or index",
                    self.entity
                )));
            }
        }
        Ok(())
    }
}

/// One declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name.
    pub name: &'static str,
    /// Storage class.
    pub kind: ScalarKind,
}

/// A foreign-key reference from a column to another entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    /// Referencing column.
    pub column: &'static str,
    /// Referenced table.
    pub table: &'static str,
    /// Referenced column.
    pub key: &'static str,
}

/// A declared index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    /// Derived index name.
    pub name: String,
    /// Indexed columns, in order.
    pub keys: Vec<&'static str>,
}

/// A type-erased enclosed collection.
pub(crate) trait EnclosedSave {
    fn save(&self, connection: &Connection) -> CoreResult<()>;
}

struct Enclosed<'a, R: Entity> {
    records: &'a [R],
    scope: Option<Condition<R::Key>>,
}

impl<R: Entity> EnclosedSave for Enclosed<'_, R> {
    fn save(&self, connection: &Connection) -> CoreResult<()> {
        if let Some(scope) = &self.scope {
            persist::delete::<R>(connection, &Query::from(scope.clone()))?;
        }
        persist::save_all(connection, self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Output;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Key {
        Id,
        Name,
        Owner,
    }

    impl FieldKey for Key {
        fn name(self) -> &'static str {
            match self {
                Self::Id => "id",
                Self::Name => "name",
                Self::Owner => "owner",
            }
        }
    }

    struct Item {
        id: String,
        name: Option<String>,
        owner: i64,
    }

    impl Entity for Item {
        const NAME: &'static str = "Item";
        type Key = Key;

        fn fill<'a>(&'a self, input: &mut Input<'a, Self>) {
            input.set_primary_key(&[Key::Id]);
            input.set_index(&[Key::Name, Key::Id]);
            input.set(Key::Id, &self.id);
            input.set(Key::Name, &self.name);
            input.set_related::<Item>(Key::Owner, &self.owner, Key::Id);
        }

        fn from_row(output: &Output<'_, Self>) -> CoreResult<Self> {
            Ok(Self {
                id: output.get(Key::Id)?,
                name: output.get(Key::Name)?,
                owner: output.get(Key::Owner)?,
            })
        }
    }

    fn filled(item: &Item) -> Shape {
        let mut input = Input::new();
        item.fill(&mut input);
        input.shape()
    }

    #[test]
    fn shape_follows_declarations() {
        let item = Item {
            id: "a".into(),
            name: None,
            owner: 1,
        };
        let shape = filled(&item);

        assert_eq!(shape.entity, "Item");
        assert_eq!(
            shape.columns,
            vec![
                ColumnDef {
                    name: "id",
                    kind: ScalarKind::Text
                },
                ColumnDef {
                    name: "name",
                    kind: ScalarKind::Text
                },
                ColumnDef {
                    name: "owner",
                    kind: ScalarKind::Integer
                },
            ]
        );
        assert_eq!(shape.primary_key, vec!["id"]);
        assert_eq!(shape.indices[0].name, "idx_Item_name_id");
        assert_eq!(shape.relation("owner").unwrap().table, "Item");
        shape.validate().unwrap();
    }

    #[test]
    fn shape_is_independent_of_values() {
        let a = Item {
            id: "a".into(),
            name: None,
            owner: 1,
        };
        let b = Item {
            id: "b".into(),
            name: Some("x".into()),
            owner: 2,
        };
        assert_eq!(filled(&a), filled(&b));
    }

    #[test]
    fn values_follow_column_order() {
        let item = Item {
            id: "a".into(),
            name: Some("n".into()),
            owner: 3,
        };
        let mut input = Input::new();
        item.fill(&mut input);
        let values: Vec<&Value> = input.values().collect();
        assert_eq!(
            values,
            vec![&Value::from("a"), &Value::from("n"), &Value::Integer(3)]
        );
        assert_eq!(input.value(Key::Owner), Some(&Value::Integer(3)));
    }

    #[test]
    fn redeclared_index_is_kept_once() {
        let mut input = Input::<Item>::new();
        input.set(Key::Id, &"x".to_string());
        input.set_index(&[Key::Id]);
        input.set_index(&[Key::Id]);
        assert_eq!(input.shape().indices.len(), 1);
    }

    #[test]
    fn empty_shape_is_invalid() {
        let input = Input::<Item>::new();
        assert!(matches!(
            input.shape().validate(),
            Err(CoreError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn key_on_unset_column_is_invalid() {
        let mut input = Input::<Item>::new();
        input.set(Key::Name, &"x".to_string());
        input.set_primary_key(&[Key::Id]);
        assert!(input.shape().validate().is_err());
    }

    #[test]
    fn index_without_keys_is_invalid() {
        let mut input = Input::<Item>::new();
        input.set(Key::Id, &"x".to_string());
        input.set_index(&[]);
        assert!(matches!(
            input.shape().validate(),
            Err(CoreError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn index_names_do_not_collide() {
        assert_eq!(index_name("Item", &["a", "b"]), "idx_Item_a_b");
        assert_eq!(index_name("Item", &["a_b"]), "idx_Item_a%5Fb");
        assert_ne!(index_name("Item", &["a_", "b"]), index_name("Item", &["a", "_b"]));
        assert_ne!(index_name("A_b", &["c"]), index_name("A", &["b", "c"]));
        assert!(index_name("A_b", &["c"]).starts_with(&index_prefix("A_b")));
    }
}
