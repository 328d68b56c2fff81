use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecommendationError>;

/// Errors that abort a whole recommendation call.
///
/// Per-record problems never show up here; they are reported as
/// [`MalformedRecord`] and the offending record is skipped.
#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Catalog is empty after normalization ({total_rows} raw rows)")]
    CatalogEmpty { total_rows: usize },

    #[error("Unknown user: {0}")]
    UnknownUser(i64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source error: {0}")]
    Source(String),
}

impl From<csv::Error> for RecommendationError {
    fn from(err: csv::Error) -> Self {
        RecommendationError::Source(err.to_string())
    }
}

impl From<std::io::Error> for RecommendationError {
    fn from(err: std::io::Error) -> Self {
        RecommendationError::Source(err.to_string())
    }
}

impl From<envy::Error> for RecommendationError {
    fn from(err: envy::Error) -> Self {
        RecommendationError::Config(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Book,
    User,
    HistoryEntry,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Book => "book",
            RecordKind::User => "user",
            RecordKind::HistoryEntry => "history_entry",
        }
    }
}

/// A single row or history entry that could not be parsed and was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRecord {
    pub kind: RecordKind,
    /// Row position in the raw table (entry position for history entries)
    pub position: usize,
    pub reason: String,
}

impl MalformedRecord {
    pub fn new(kind: RecordKind, position: usize, reason: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            reason: reason.into(),
        }
    }

    /// Log the record and hand it back so callers can collect it.
    pub fn warn(self) -> Self {
        tracing::warn!(
            kind = self.kind.as_str(),
            position = self.position,
            reason = %self.reason,
            "Skipping malformed record"
        );
        self
    }
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "malformed {} at position {}: {}",
            self.kind.as_str(),
            self.position,
            self.reason
        )
    }
}
