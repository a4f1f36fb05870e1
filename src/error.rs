//! Error types for headerlet operations.

use hdrlet_fits::FitsError;
use thiserror::Error;

/// Errors that can occur while building, applying, comparing or archiving
/// headerlets.
#[derive(Error, Debug)]
pub enum HeaderletError {
    /// Error from the FITS layer
    #[error("FITS error: {0}")]
    Fits(#[from] FitsError),

    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive (ZIP) error
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No destination identity given and the dataset has no ROOTNAME/DESTIM
    #[error("No destination identity: pass one explicitly or set ROOTNAME in the primary header")]
    MissingIdentity,

    /// Headerlet name not given
    #[error("A headerlet name (HDRNAME) is required")]
    MissingName,

    /// Headerlet primary header lacks required keywords
    #[error("Headerlet failed verification: missing or blank {missing}")]
    StructuralVerification {
        /// Comma-separated list of missing keywords
        missing: String,
    },

    /// Destination root identity does not match the headerlet's DESTIM
    #[error(
        "Observation {destination} cannot be updated with headerlet {headerlet}: \
         DESTIM '{destim}' does not match '{found}'"
    )]
    IdentityMismatch {
        /// Destination description (path or root name)
        destination: String,
        /// Headerlet name
        headerlet: String,
        /// DESTIM of the headerlet
        destim: String,
        /// Root identity found on the destination
        found: String,
    },

    /// A reference keyword is present without its companion
    #[error("'{keyword}' present without '{companion}' in {extension}")]
    InconsistentReference {
        /// Keyword that was found
        keyword: String,
        /// Required companion keyword
        companion: String,
        /// Extension description
        extension: String,
    },

    /// Archived headerlet has no members
    #[error("The headerlet archive '{hdrname}' has no members")]
    EmptyArchive {
        /// HDRNAME of the archive extension
        hdrname: String,
    },

    /// Archive payload is malformed
    #[error("Invalid headerlet archive: {message}")]
    InvalidArchive {
        /// Description of the problem
        message: String,
    },

    /// A required extension is missing
    #[error("Extension ({name}, {version}) not found")]
    MissingExtension {
        /// EXTNAME
        name: String,
        /// EXTVER
        version: i64,
    },

    /// The headerlet carries more solutions than the destination has science extensions
    #[error("Headerlet has {headerlet} SIPWCS extensions but destination has {destination} SCI extensions")]
    ScienceCountMismatch {
        /// SIPWCS count in the headerlet
        headerlet: usize,
        /// SCI count in the destination
        destination: usize,
    },

    /// A record-valued keyword could not be interpreted
    #[error("Invalid record value for '{keyword}': '{value}'")]
    InvalidRecord {
        /// Keyword of the record card
        keyword: String,
        /// Raw value
        value: String,
    },

    /// Extension is not of the type a decoder expects
    #[error("Unsupported extension type '{found}', expected '{expected}'")]
    UnsupportedExtension {
        /// Expected type tag
        expected: String,
        /// Found type tag
        found: String,
    },
}

impl HeaderletError {
    /// Create a missing extension error.
    pub fn missing_extension(name: impl Into<String>, version: i64) -> Self {
        Self::MissingExtension {
            name: name.into(),
            version,
        }
    }

    /// Create an invalid archive error.
    pub fn invalid_archive(message: impl Into<String>) -> Self {
        Self::InvalidArchive {
            message: message.into(),
        }
    }

    /// Create an inconsistent reference error.
    pub fn inconsistent_reference(
        keyword: impl Into<String>,
        companion: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self::InconsistentReference {
            keyword: keyword.into(),
            companion: companion.into(),
            extension: extension.into(),
        }
    }
}

/// Result alias for headerlet operations.
pub type Result<T> = std::result::Result<T, HeaderletError>;
