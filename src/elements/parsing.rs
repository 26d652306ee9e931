use super::element_set::OrbitalElementSet;
use super::error::{Field, InvalidElements};

/// A two- or three-line record as found in text, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub name: Option<String>,
    pub line1: String,
    pub line2: String,
}

impl RawRecord {
    pub fn parse(&self) -> Result<OrbitalElementSet, InvalidElements> {
        OrbitalElementSet::parse(self.name.as_deref(), &self.line1, &self.line2)
    }
}

/// Parses a block holding exactly one record: two lines, or a name followed
/// by two lines.
pub fn parse_tle_block(tle: &str) -> Result<OrbitalElementSet, InvalidElements> {
    let lines: Vec<&str> = tle
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    match lines.as_slice() {
        [line1, line2] => OrbitalElementSet::parse(None, line1, line2),
        [name, line1, line2] => OrbitalElementSet::parse(Some(*name), line1, line2),
        other => Err(InvalidElements::record(
            Field::LineCount,
            format!("expected 2 or 3 non-empty lines, got {}", other.len()),
        )),
    }
}

/// Splits multi-satellite text into records. Lines that do not belong to a
/// `1 `/`2 ` pair are skipped.
pub fn split_records(content: &str) -> Vec<RawRecord> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push(RawRecord {
                name: None,
                line1: lines[i].to_string(),
                line2: lines[i + 1].to_string(),
            });
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            result.push(RawRecord {
                name: Some(lines[i].to_string()),
                line1: lines[i + 1].to_string(),
                line2: lines[i + 2].to_string(),
            });
            i += 3;
        } else {
            log::debug!("skipping stray element line: {}", lines[i]);
            i += 1;
        }
    }

    result
}

/// Parses every record in `content`, keeping failures alongside successes so
/// callers can report them per record.
pub fn parse_all(content: &str) -> Vec<Result<OrbitalElementSet, InvalidElements>> {
    split_records(content).iter().map(RawRecord::parse).collect()
}
