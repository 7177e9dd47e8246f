//! Error types for camera track synthesis and export

use std::path::PathBuf;

/// Which user-supplied path failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathRole {
    InputLog,
    OutputDir,
}

impl std::fmt::Display for PathRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathRole::InputLog => f.write_str("input log"),
            PathRole::OutputDir => f.write_str("output directory"),
        }
    }
}

/// Errors produced by the parse → synthesize → export pipeline.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum DemoCamError {
    /// Log file missing, or output path unusable as a directory.
    #[error("{role} not found or unusable: {}", path.display())]
    InputNotFound { role: PathRole, path: PathBuf },

    /// A required column is absent from the log header.
    #[error("missing required column '{column}' in log header")]
    MissingColumn { column: String },

    /// A required field is empty or cannot be coerced to its type.
    #[error("malformed record at line {line}: column '{column}' has value {value:?} ({reason})")]
    MalformedRecord {
        line: u64,
        column: String,
        value: String,
        reason: String,
    },

    /// The CSV reader itself failed (bad quoting, invalid UTF-8, ragged rows).
    #[error("csv read error: {reason}")]
    Csv { reason: String },

    /// The log's tick span cannot be shifted onto a timeline starting at 1.
    #[error("tick span {min_tick}..={max_tick} cannot be normalized without overflow")]
    TickOverflow { min_tick: i64, max_tick: i64 },

    /// Baking the scene range would produce more frames than allowed.
    #[error("baking {frames} frames exceeds the limit of {limit}")]
    TooManyFrames { frames: f64, limit: usize },

    /// Configuration rejected by validation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The host rejected a subject's export.
    #[error("export failed for subject '{subject}': {reason}")]
    Export { subject: String, reason: String },

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DemoCamError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Fatal errors abort the whole run; export failures only affect one subject.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Export { .. })
    }
}

impl From<csv::Error> for DemoCamError {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            reason: err.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DemoCamError>;
