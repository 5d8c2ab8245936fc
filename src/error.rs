use chrono::NaiveDate;

/// Failure taxonomy of the store and its collaborators. Batch callers are
/// expected to match on the kind: fetch and derivation failures are usually
/// skipped, storage failures abort the operation that hit them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("fetch failed for '{series_id}': {reason}")]
    Fetch { series_id: String, reason: String },

    #[error("indicator name must be non-empty")]
    EmptyName,

    #[error("non-finite value for '{name}' at {date}")]
    NonFinite { name: String, date: NaiveDate },

    #[error("no overlapping dates between {inputs}")]
    NoOverlap { inputs: String },

    #[error("'{name}' has zero variance over the joined window")]
    ZeroVariance { name: String },

    #[error("'{name}' has {have} observations, need at least {need}")]
    InsufficientHistory {
        name: String,
        have: usize,
        need: usize,
    },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl Error {
    /// True for failures of a derivation's inputs (empty join, constant
    /// component, too little history) as opposed to storage or validation.
    pub fn is_derivation(&self) -> bool {
        matches!(
            self,
            Error::NoOverlap { .. }
                | Error::ZeroVariance { .. }
                | Error::InsufficientHistory { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
