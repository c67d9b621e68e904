//! In-memory string tables loaded from CSV exports.
//!
//! Every report loads its inputs fully, looks columns up by alias lists and
//! writes results back out with a stable header.

pub mod reader;
pub mod writer;

pub use reader::{Table, TableError};
pub use writer::{write_csv, write_json};
