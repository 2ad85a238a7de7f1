//! Shared helpers for the Tessera benchmarks.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
