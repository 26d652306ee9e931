//! Where element sets come from.

mod memory;
mod tle_loader;

use std::collections::HashMap;

use thiserror::Error;

use crate::elements::{ElementSummary, InvalidElements, OrbitalElementSet};

pub use memory::MemorySource;
pub use tle_loader::TleLoader;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("TLE directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("invalid TLE in {file}: {source}")]
    InvalidElements {
        file: String,
        source: InvalidElements,
    },
}

/// Element sets keyed by catalog number. A missing entry is not an error;
/// the caller decides what absence means.
pub trait ElementSource: Send + Sync {
    fn lookup(&self, norad_id: u64) -> Option<OrbitalElementSet>;

    fn catalog(&self) -> Vec<ElementSummary>;
}

/// Inserts `set` unless an element set with an equal or newer epoch is
/// already present.
fn insert_newest(map: &mut HashMap<u64, OrbitalElementSet>, set: OrbitalElementSet) -> bool {
    match map.get(&set.norad_id()) {
        Some(existing) if !set.is_newer_than(existing) => false,
        _ => {
            map.insert(set.norad_id(), set);
            true
        }
    }
}
