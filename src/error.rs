//! Unified error types for sbom-base-images.
//!
//! Malformed inputs (unresolvable build stages, undetectable SBOM formats,
//! ambiguous SPDX roots) are unrecoverable and reported with the values that
//! triggered them. Expected omissions — scratch stages, archive pseudo-stages,
//! stages without a recorded digest — are not errors and never reach this type.

use thiserror::Error;

/// Main error type for sbom-base-images operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BaseImageError {
    /// A stage reference chain did not terminate in a literal image.
    #[error("Failed to resolve build stage: {0}")]
    StageResolution(String),

    /// An image reference was not in the `repository[:tag]@digest` form.
    #[error("Malformed image reference '{reference}': {reason}")]
    InvalidImageReference { reference: String, reason: String },

    /// A digest-mapping line did not hold exactly two fields.
    #[error("Malformed digest mapping entry: {0:?} (expected '<reference> <digested-reference>')")]
    InvalidDigestEntry(String),

    /// The SBOM document is neither CycloneDX nor SPDX.
    #[error("Unknown SBOM format - expected CycloneDX or SPDX markers")]
    UnknownFormat,

    /// The SBOM document is structurally unusable for the detected format.
    #[error("Invalid SBOM structure: {0}")]
    InvalidSbom(String),

    /// The SPDX document does not describe exactly one root element.
    #[error(
        "Expected to find exactly one <DOCUMENT> DESCRIBES <ROOT> relationship. \
         Found {count} ROOTs: {targets:?}"
    )]
    SpdxRootCount { count: usize, targets: Vec<String> },

    /// Package URL construction rejected one of its parts.
    #[error("Invalid package URL: {0}")]
    Purl(#[from] packageurl::Error),

    /// JSON (de)serialization errors.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type for sbom-base-images operations
pub type Result<T> = std::result::Result<T, BaseImageError>;

impl BaseImageError {
    /// Create a stage resolution error
    pub fn stage(message: impl Into<String>) -> Self {
        Self::StageResolution(message.into())
    }

    /// Create a malformed image reference error
    pub fn image_reference(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidImageReference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }
}
