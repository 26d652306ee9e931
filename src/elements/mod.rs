//! Two-line element set validation.

mod element_set;
mod error;
mod parsing;

pub use element_set::{checksum, ElementSummary, OrbitalElementSet, TLE_LINE_LENGTH};
pub use error::{Field, InvalidElements};
pub use parsing::{parse_all, parse_tle_block, split_records, RawRecord};
