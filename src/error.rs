use ndarray_npy::ReadNpyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RaceError {
    /// A value after the word could not be parsed as a float.
    #[error("malformed embedding line {line}: '{token}' is not a number")]
    MalformedLine { line: usize, token: String },

    /// Distance was asked for a word the table does not hold.
    #[error("word '{0}' not present in embeddings")]
    WordNotFound(String),

    /// Two vectors of different width were compared.
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// The page source could not fetch or parse a page.
    #[error("failed to fetch {reference}: {reason}")]
    Fetch { reference: String, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("npy error: {0}")]
    Npy(#[from] ReadNpyError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
