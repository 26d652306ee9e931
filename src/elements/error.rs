use thiserror::Error;

/// The part of a two-line record that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    LineCount,
    Missing,
    LineNumber,
    Length,
    Checksum,
    CatalogNumber,
    Elements,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid elements{}: {field}: {reason}", line_label(.line))]
pub struct InvalidElements {
    /// 1 or 2 when the failure is tied to a single line.
    pub line: Option<u8>,
    pub field: Field,
    pub reason: String,
}

impl InvalidElements {
    pub fn record(field: Field, reason: impl Into<String>) -> Self {
        Self {
            line: None,
            field,
            reason: reason.into(),
        }
    }

    pub fn line(line: u8, field: Field, reason: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            field,
            reason: reason.into(),
        }
    }
}

fn line_label(line: &Option<u8>) -> String {
    line.map(|l| format!(" (line {l})")).unwrap_or_default()
}
