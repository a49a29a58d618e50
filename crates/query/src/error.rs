use thiserror::Error;

use index::IndexError;

/// Errors raised while answering a question.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The language-model call failed. Retrieval had already succeeded;
    /// callers may retry generation without re-running the search.
    #[error("generation error: {0}")]
    Generation(String),

    #[error(transparent)]
    Index(#[from] IndexError),
}
