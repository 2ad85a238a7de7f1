//! Per-call record containers.
//!
//! [`Input`] collects what a record declares when it is saved; [`Output`]
//! exposes one result row to the record's constructor when it is loaded.
//! Both are created for a single save or load and dropped right after.

mod input;
mod output;

pub use input::{ColumnDef, IndexDef, Input, RelationDef, Shape};
pub use output::Output;

pub(crate) use input::{index_prefix, EnclosedSave};
