use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::error::{Field, InvalidElements};

pub const TLE_LINE_LENGTH: usize = 69;

/// A validated two-line element set. Immutable once built; fresher elements
/// replace it rather than mutate it.
#[derive(Debug, Clone)]
pub struct OrbitalElementSet {
    name: String,
    norad_id: u64,
    line1: String,
    line2: String,
    epoch: DateTime<Utc>,
    elements: sgp4::Elements,
}

/// Serializable view of an element set for catalog listings and snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ElementSummary {
    pub name: String,
    pub norad_id: u64,
    pub epoch: DateTime<Utc>,
    pub inclination_deg: f64,
    pub eccentricity: f64,
    pub mean_motion_rev_per_day: f64,
    pub period_minutes: f64,
    pub line1: String,
    pub line2: String,
}

impl OrbitalElementSet {
    /// Validates both lines and builds the element set.
    ///
    /// `name` may come from the first line of a three-line record; a leading
    /// `0 ` marker is stripped. Without a name the set is called `NORAD <id>`.
    pub fn parse(name: Option<&str>, line1: &str, line2: &str) -> Result<Self, InvalidElements> {
        let line1 = check_line(1, line1)?;
        let line2 = check_line(2, line2)?;

        let catalog1 = &line1[2..7];
        let catalog2 = &line2[2..7];
        if catalog1 != catalog2 {
            return Err(InvalidElements::record(
                Field::CatalogNumber,
                format!("line 1 has '{catalog1}' but line 2 has '{catalog2}'"),
            ));
        }

        let name = name
            .map(|n| n.trim())
            .map(|n| n.strip_prefix("0 ").unwrap_or(n).trim())
            .filter(|n| !n.is_empty())
            .map(String::from);

        let elements = sgp4::Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())
            .map_err(|e| InvalidElements::record(Field::Elements, e.to_string()))?;

        let norad_id = elements.norad_id;
        Ok(Self {
            name: name.unwrap_or_else(|| format!("NORAD {norad_id}")),
            norad_id,
            line1: line1.to_string(),
            line2: line2.to_string(),
            epoch: elements.datetime.and_utc(),
            elements,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn norad_id(&self) -> u64 {
        self.norad_id
    }

    pub fn line1(&self) -> &str {
        &self.line1
    }

    pub fn line2(&self) -> &str {
        &self.line2
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// The parsed elements as handed to the SGP4 capability.
    pub fn elements(&self) -> &sgp4::Elements {
        &self.elements
    }

    pub fn period_minutes(&self) -> f64 {
        if self.elements.mean_motion > 0.0 {
            1440.0 / self.elements.mean_motion
        } else {
            f64::INFINITY
        }
    }

    /// Signed distance of `at` from the element epoch.
    pub fn age_at(&self, at: DateTime<Utc>) -> Duration {
        at - self.epoch
    }

    pub fn is_newer_than(&self, other: &OrbitalElementSet) -> bool {
        self.epoch > other.epoch
    }

    pub fn summary(&self) -> ElementSummary {
        ElementSummary {
            name: self.name.clone(),
            norad_id: self.norad_id,
            epoch: self.epoch,
            inclination_deg: self.elements.inclination,
            eccentricity: self.elements.eccentricity,
            mean_motion_rev_per_day: self.elements.mean_motion,
            period_minutes: self.period_minutes(),
            line1: self.line1.clone(),
            line2: self.line2.clone(),
        }
    }
}

/// Modulo-10 TLE checksum over the first 68 columns: digits count their
/// value, `-` counts one, everything else zero.
pub fn checksum(line: &str) -> u8 {
    let sum: u32 = line
        .bytes()
        .take(TLE_LINE_LENGTH - 1)
        .map(|b| match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            b'-' => 1,
            _ => 0,
        })
        .sum();
    (sum % 10) as u8
}

fn check_line(number: u8, line: &str) -> Result<&str, InvalidElements> {
    let line = line.trim();
    if line.is_empty() {
        return Err(InvalidElements::line(number, Field::Missing, "line is empty"));
    }

    let expected = char::from(b'0' + number);
    if !line.starts_with(expected) {
        return Err(InvalidElements::line(
            number,
            Field::LineNumber,
            format!("expected line to start with '{expected}'"),
        ));
    }

    if !line.is_ascii() || line.len() != TLE_LINE_LENGTH {
        return Err(InvalidElements::line(
            number,
            Field::Length,
            format!(
                "expected {TLE_LINE_LENGTH} ASCII columns, got {}",
                line.chars().count()
            ),
        ));
    }

    let declared = line.as_bytes()[TLE_LINE_LENGTH - 1];
    let computed = checksum(line);
    if declared != b'0' + computed {
        return Err(InvalidElements::line(
            number,
            Field::Checksum,
            format!(
                "declared '{}' but computed {computed}",
                char::from(declared)
            ),
        ));
    }

    Ok(line)
}
