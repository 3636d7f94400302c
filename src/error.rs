//! Error types for the corpus/tokenizer core.
//!
//! The core recovers from nothing locally: validation errors surface at the
//! earliest observable point, and upstream I/O errors are propagated
//! unchanged. Sentinel/past-the-end termination of [`crate::pen::Pen::render`]
//! is ordinary iterator exhaustion, never an [`PenError`].

use thiserror::Error;

/// Errors raised by the corpus/tokenizer core.
#[derive(Debug, Error)]
pub enum PenError {
    /// `render` was called with a negative N.
    #[error("N must be non-negative, got {n}")]
    InvalidN { n: i64 },

    /// The picker returned a value outside `[0, max(n, 1))` for a query of
    /// width `n`.
    #[error("picker returned {returned}, which is out of range for width {n}")]
    PickerOutOfRange { n: usize, returned: usize },

    /// The async tokenizer observed a cancellation request.
    #[error("tokenization was cancelled")]
    Cancelled,

    /// An I/O error from the input reader, propagated unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for fallible core operations.
pub type PenResult<T> = Result<T, PenError>;
