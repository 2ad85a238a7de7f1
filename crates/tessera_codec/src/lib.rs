//! # Tessera Codec
//!
//! Scalar value codec for Tessera.
//!
//! This crate fixes, for every scalar a record field may hold:
//! - the store type used in DDL (`INTEGER`, `REAL`, `TEXT`, `BLOB`)
//! - the [`Value`] bound to a statement parameter
//! - how a result column decodes back, including NULL handling
//! - the literal text embedded in generated WHERE clauses
//!
//! ## Usage
//!
//! ```
//! use tessera_codec::{Scalar, ScalarKind, Value};
//!
//! assert_eq!(<Option<String> as Scalar>::KIND, ScalarKind::Text);
//! assert_eq!("O'Hara".to_string().to_literal().unwrap(), "'O''Hara'");
//! assert_eq!(i64::decode(Value::Null).unwrap(), 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod scalar;
mod value;

pub use error::{CodecError, CodecResult};
pub use scalar::Scalar;
pub use value::{quote_identifier, ScalarKind, Value};
