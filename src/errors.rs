//! Unified error type for the fitness tracker core.
//!
//! Logical authentication failures (unknown user, wrong password, taken username)
//! are not errors; they are reported through
//! [`LoginOutcome`](crate::state::LoginOutcome) and
//! [`RegisterOutcome`](crate::state::RegisterOutcome).

use thiserror::Error;

/// Every failure the core can surface to a caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The store rejected or failed an operation
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure while preparing the store location
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Text that does not name a known meditation type
    #[error("Invalid record: {message}")]
    InvalidRecord {
        /// The offending value and its field
        message: String,
    },

    /// The owning state holder was shut down before the job ran
    #[error("Operation cancelled: the state holder was closed")]
    Cancelled,
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
