use thiserror::Error;

/// Rejected `Assigner` construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("number of groups must be at least 1")]
    NoGroups,

    #[error("expected {expected} initial loads (one per group), got {actual}")]
    LoadCountMismatch { expected: usize, actual: usize },

    #[error("initial load for group {group} must be non-negative, got {load}")]
    NegativeLoad { group: usize, load: i64 },

    #[error("initial loads add up to more pages than can be counted")]
    LoadTotalOverflow,
}

/// A case in the submitted batch that cannot be assigned.
///
/// `position` is the 0-based index of the item in the input sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidItemError {
    #[error("case \"{name}\" (item {position}) has negative page count {weight}")]
    NegativeWeight {
        position: usize,
        name: String,
        weight: i64,
    },

    #[error("case \"{name}\" (item {position}) pushes the page total past what can be counted")]
    TotalOverflow { position: usize, name: String },
}

/// Problems reading cases from CSV or free-text input.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: {reason}")]
    Line { line: usize, reason: String },

    #[error("row {row}: {reason}")]
    Row { row: u64, reason: String },

    #[error("missing required column \"{0}\"")]
    MissingColumn(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
