use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::{insert_newest, ElementSource};
use crate::elements::{parse_all, ElementSummary, InvalidElements, OrbitalElementSet};

/// In-process catalog, e.g. seeded from a file given on the command line.
#[derive(Default)]
pub struct MemorySource {
    satellites: RwLock<HashMap<u64, OrbitalElementSet>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from multi-record text; every record must be valid.
    pub fn from_text(content: &str) -> Result<Self, InvalidElements> {
        let source = Self::new();
        for set in parse_all(content) {
            source.insert(set?);
        }
        Ok(source)
    }

    /// Stores `set`, replacing whatever was held for the same satellite.
    pub fn insert(&self, set: OrbitalElementSet) {
        self.write().insert(set.norad_id(), set);
    }

    /// Stores `set` only if it is newer than what is held. Returns whether it
    /// was stored.
    pub fn offer(&self, set: OrbitalElementSet) -> bool {
        insert_newest(&mut self.write(), set)
    }

    pub fn remove(&self, norad_id: u64) -> Option<OrbitalElementSet> {
        self.write().remove(&norad_id)
    }

    pub fn len(&self) -> usize {
        self.satellites
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<u64, OrbitalElementSet>> {
        self.satellites
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ElementSource for MemorySource {
    fn lookup(&self, norad_id: u64) -> Option<OrbitalElementSet> {
        self.satellites
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&norad_id)
            .cloned()
    }

    fn catalog(&self) -> Vec<ElementSummary> {
        let satellites = self.satellites.read().unwrap_or_else(PoisonError::into_inner);
        let mut catalog: Vec<_> = satellites.values().map(|s| s.summary()).collect();
        catalog.sort_by_key(|s| s.norad_id);
        catalog
    }
}
