//! # Tessera Testkit
//!
//! Test utilities for Tessera.
//!
//! This crate provides:
//! - Test fixtures: in-memory and temporary-file stores
//! - Sample entities (`Person`, `Owner`, `Dog`) covering every scalar kind,
//!   primary keys, relations, indices and enclosed collections
//! - Property-based test generators using proptest
//! - Oracles that evaluate conditions and pages in memory
//!
//! ## Usage
//!
//! ```rust
//! use tessera_testkit::prelude::*;
//! use tessera_core::Query;
//!
//! with_temp_store(|store| {
//!     store.save(&Person::new("Jack", Some("White"))).unwrap();
//!     assert_eq!(store.count::<Person>(&Query::new()).unwrap(), 1);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod entities;
pub mod fixtures;
pub mod generators;
pub mod oracles;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::entities::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::oracles::*;
}

pub use entities::*;
pub use fixtures::*;
pub use generators::*;
pub use oracles::*;
