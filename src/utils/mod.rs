//! Shared utilities: cell normalization, list-field parsing, units, timestamps.

pub mod list_field;
pub mod normalize;
pub mod timestamp;
pub mod units;

pub use list_field::{format_mapping_field, parse_list_field, parse_mapping_field};
pub use normalize::{normalize_address, normalize_guid, parse_bool_lossy, parse_f64_lossy, parse_int_lossy};
pub use timestamp::parse_timestamp;
pub use units::{format_eth, wei_to_eth};
