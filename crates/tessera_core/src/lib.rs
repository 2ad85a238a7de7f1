//! # Tessera Core
//!
//! Persistence engine for Tessera.
//!
//! This crate provides:
//! - [`Entity`] / [`FieldKey`] - how a record type maps onto one table
//! - [`Condition`] and [`Query`] - typed filters, ordering and pagination
//! - [`Input`] / [`Output`] - save-side and load-side record containers
//! - schema reconciliation - tables, added columns and indices follow what
//!   records declare, without ever dropping data
//! - [`Store`] - serialized access to one connection, transactional saves
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::{Condition, CoreResult, Entity, FieldKey, Input, Output, Query, Store};
//!
//! #[derive(Debug, Clone, Copy)]
//! enum NoteKey {
//!     Id,
//!     Text,
//! }
//!
//! impl FieldKey for NoteKey {
//!     fn name(self) -> &'static str {
//!         match self {
//!             Self::Id => "id",
//!             Self::Text => "text",
//!         }
//!     }
//! }
//!
//! struct Note {
//!     id: i64,
//!     text: String,
//! }
//!
//! impl Entity for Note {
//!     const NAME: &'static str = "Note";
//!     type Key = NoteKey;
//!
//!     fn fill<'a>(&'a self, input: &mut Input<'a, Self>) {
//!         input.set_primary_key(&[NoteKey::Id]);
//!         input.set(NoteKey::Id, &self.id);
//!         input.set(NoteKey::Text, &self.text);
//!     }
//!
//!     fn from_row(output: &Output<'_, Self>) -> CoreResult<Self> {
//!         Ok(Self {
//!             id: output.get(NoteKey::Id)?,
//!             text: output.get(NoteKey::Text)?,
//!         })
//!     }
//! }
//!
//! let store = Store::in_memory();
//! store.save(&Note { id: 1, text: "hello".into() }).unwrap();
//!
//! let query = Query::new().filter(Condition::like(NoteKey::Text, "hel%"));
//! let notes: Vec<Note> = store.fetch(&query).unwrap();
//! assert_eq!(notes[0].text, "hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod condition;
mod config;
mod container;
mod entity;
mod error;
mod persist;
mod query;
pub mod schema;
mod store;

pub use condition::Condition;
pub use config::Config;
pub use container::{ColumnDef, IndexDef, Input, Output, RelationDef, Shape};
pub use entity::{Entity, FieldKey};
pub use error::{CoreError, CoreResult};
pub use query::{Order, Query};
pub use store::Store;

pub use tessera_codec::{CodecError, Scalar, ScalarKind, Value};
pub use tessera_storage::{Connection, ConnectionOptions, Location, StoreError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
