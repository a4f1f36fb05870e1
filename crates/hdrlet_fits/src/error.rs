//! Error types for FITS reading and writing.

use thiserror::Error;

/// Errors that can occur while building, reading or writing FITS structures.
#[derive(Error, Debug)]
pub enum FitsError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A header record could not be parsed
    #[error("Invalid card '{keyword}': {message}")]
    InvalidCard {
        /// Keyword of the offending card (may be empty)
        keyword: String,
        /// Description of the problem
        message: String,
    },

    /// Header is structurally broken (missing END, wrong first card, ...)
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the problem
        message: String,
    },

    /// Input ended in the middle of a header or data block
    #[error("Unexpected end of file while reading {context}")]
    UnexpectedEof {
        /// What was being read
        context: String,
    },

    /// BITPIX value outside the FITS standard set
    #[error("Unsupported BITPIX value: {0}")]
    UnsupportedBitpix(i64),

    /// A value does not fit in a single 80-character card
    #[error("Value of '{keyword}' does not fit in one card")]
    ValueTooLong {
        /// Keyword whose value is too long
        keyword: String,
    },

    /// Keyword violates the FITS keyword rules
    #[error("Invalid keyword: '{0}'")]
    InvalidKeyword(String),

    /// Array shape does not match the number of elements
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl FitsError {
    /// Create an invalid card error.
    pub fn invalid_card(keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCard {
            keyword: keyword.into(),
            message: message.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unexpected end-of-file error.
    pub fn eof(context: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            context: context.into(),
        }
    }
}
