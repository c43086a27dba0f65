//! # Error Types
//!
//! Domain-specific error types for atelier-core.
//!
//! ## Error Flow
//! ```text
//! ValidationError -> CoreError -> DbError (atelier-db) -> ApiError (apps/api)
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field names, offending values)
//! 3. Errors are enum variants, never bare Strings

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stored document number whose trailing sequence is not a number.
    ///
    /// The allocator increments the trailing 4-digit sequence of the most
    /// recent document of the year. If that suffix cannot be parsed the
    /// sequence state is corrupt; allocation refuses to guess and the
    /// whole operation fails instead of silently restarting at 0001.
    #[error("document number '{number}' has a malformed trailing sequence")]
    MalformedDocumentNumber { number: String },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements. Used for early
/// validation before any persistence work runs; a failed validation means
/// no mutation has happened.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Date must lie strictly in the future.
    #[error("{field} must be a date in the future")]
    MustBeInFuture { field: String },

    /// Invalid format (bad decimal string, malformed email, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
