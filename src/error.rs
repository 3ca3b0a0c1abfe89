use thiserror::Error;

/// Stable error code constants.
///
/// Callers that need to branch on failure kind should match on
/// [`Error::code`] — codes never change; messages may be reworded.
pub mod error_code {
    pub const EMPTY_VALUE: &str = "EMPTY_VALUE";
    pub const TYPE: &str = "TYPE";
    pub const ARITY_MISMATCH: &str = "ARITY_MISMATCH";
    pub const PATH_NOT_FOUND: &str = "PATH_NOT_FOUND";
    pub const MISSING_STORE: &str = "MISSING_STORE";
}

/// Unified error type for every public entry point.
///
/// All checks run eagerly at the call boundary, before any side effect
/// (dispatch, registration, subscription). Errors are never caught
/// internally; they propagate to the caller via `Result`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required string or sequence argument is empty or whitespace-only,
    /// including an empty segment inside a path string.
    #[error("{0}")]
    EmptyValue(String),

    /// A value has the wrong shape for where it appears, e.g. a
    /// non-numeric bracket index inside a path string.
    #[error("{0}")]
    Type(String),

    /// A declared function arity does not match the number of dependency
    /// paths or payload arguments supplied.
    #[error("arity mismatch: expected {expected} argument(s), got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// A path does not resolve against the current state.
    #[error("path '{path}' not found in state (failed at segment '{segment}')")]
    PathNotFound { path: String, segment: String },

    /// No store override was supplied and no default store is installed
    /// in the context.
    #[error(
        "no store instance available: pass a store explicitly or install \
         a default store in the StoreContext"
    )]
    MissingStore,
}

impl Error {
    /// Stable, machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Error::EmptyValue(_) => error_code::EMPTY_VALUE,
            Error::Type(_) => error_code::TYPE,
            Error::ArityMismatch { .. } => error_code::ARITY_MISMATCH,
            Error::PathNotFound { .. } => error_code::PATH_NOT_FOUND,
            Error::MissingStore => error_code::MISSING_STORE,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
