use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use super::{insert_newest, ElementSource, SourceError};
use crate::elements::{split_records, ElementSummary, OrbitalElementSet};

/// Loads every `.tle`/`.txt` file of a directory. Later reloads replace the
/// whole catalog.
pub struct TleLoader {
    tle_dir: PathBuf,
    satellites: RwLock<HashMap<u64, OrbitalElementSet>>,
}

impl TleLoader {
    pub fn new(tle_dir: PathBuf) -> Self {
        Self {
            tle_dir,
            satellites: RwLock::new(HashMap::new()),
        }
    }

    pub fn tle_dir(&self) -> &Path {
        &self.tle_dir
    }

    /// Loads all TLE files from the directory and returns how many element
    /// sets are now available.
    pub fn load_all(&self) -> Result<usize, SourceError> {
        if !self.tle_dir.is_dir() {
            return Err(SourceError::DirectoryNotFound(
                self.tle_dir.display().to_string(),
            ));
        }

        let mut satellites = HashMap::new();

        let entries = fs::read_dir(&self.tle_dir)?;
        for entry in entries {
            let path = entry?.path();

            let is_tle = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == "tle" || ext == "txt");
            if !is_tle {
                continue;
            }

            match parse_tle_file(&path) {
                Ok(sets) => {
                    for set in sets {
                        insert_newest(&mut satellites, set);
                    }
                }
                Err(e) => {
                    log::warn!("Failed to read TLE file {}: {}", path.display(), e);
                }
            }
        }

        let count = satellites.len();
        log::info!(
            "Loaded {} element sets from {}",
            count,
            self.tle_dir.display()
        );
        *self
            .satellites
            .write()
            .unwrap_or_else(PoisonError::into_inner) = satellites;
        Ok(count)
    }

    pub fn reload(&self) -> Result<usize, SourceError> {
        self.load_all()
    }
}

impl ElementSource for TleLoader {
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

/// Parses one file. Invalid records are logged and skipped.
fn parse_tle_file(path: &Path) -> Result<Vec<OrbitalElementSet>, SourceError> {
    let content = fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let mut results = Vec::new();
    for record in split_records(&content) {
        match record.parse() {
            Ok(set) => results.push(set),
            Err(e) => {
                let err = SourceError::InvalidElements {
                    file: filename.clone(),
                    source: e,
                };
                log::warn!("{}", err);
            }
        }
    }

    Ok(results)
}
