//! DVN record expansion.
//!
//! Turns one fees-export row (parallel address lists, a flat fee array and
//! optional precomputed name/fee mappings) into one row per participating
//! verifier. Everything here is pure: the directory is passed in and rows
//! are returned, nothing is written.

pub mod directory;
pub mod expander;
pub mod layout;
pub mod mapping;
pub mod types;

pub use directory::VerifierDirectory;
pub use expander::{check_fee_alignment, expand, expand_all, Expansion};
pub use layout::FeeColumnLayout;
pub use mapping::map_names;
pub use types::*;
