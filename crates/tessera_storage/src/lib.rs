//! # Tessera Storage
//!
//! Connection and statement layer for Tessera.
//!
//! This crate owns the native database handle and exposes the small surface
//! the persistence engine is built on:
//!
//! - [`Connection`] - open, prepare, execute, close
//! - [`Statement`] - bind by position, run, query
//! - [`Rows`] / [`Row`] - step through results and decode columns
//! - [`Location`] - in-memory, explicit path, or named store
//!
//! Every engine failure becomes a [`StoreError::Native`] carrying the engine
//! code and message.
//!
//! ## Example
//!
//! ```rust
//! use tessera_storage::{Connection, ConnectionOptions, Location};
//! use tessera_codec::Value;
//!
//! let conn = Connection::open(&Location::Memory, &ConnectionOptions::default()).unwrap();
//! conn.execute("CREATE TABLE T(x INTEGER);").unwrap();
//!
//! let mut insert = conn.prepare("INSERT INTO T VALUES (?);").unwrap();
//! insert.bind(1, &Value::Integer(7)).unwrap();
//! insert.run().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod error;
mod location;
mod statement;

pub use connection::{Connection, ConnectionOptions};
pub use error::{StoreError, StoreResult};
pub use location::{remove_store_file, Location};
pub use statement::{Row, Rows, Statement};
