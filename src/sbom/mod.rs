//! SBOM document handling: format detection and base image merging.
//!
//! The SBOM is externally owned and treated as opaque JSON. The emitters
//! append base image components to the one format-specific section they own
//! (`formulation` for CycloneDX, `packages`/`relationships` for SPDX) and
//! leave every other part of the document byte-for-byte alone.

pub mod cyclonedx;
pub mod spdx;

use crate::components::BaseImageComponent;
use crate::error::{BaseImageError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

pub use cyclonedx::update_cyclonedx_sbom;
pub use spdx::update_spdx_sbom;

/// SBOM format identified during detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SbomFormat {
    CycloneDx,
    Spdx,
}

impl SbomFormat {
    /// Get the human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CycloneDx => "CycloneDX",
            Self::Spdx => "SPDX",
        }
    }
}

/// Detect the format of an SBOM document.
///
/// CycloneDX documents declare `"bomFormat": "CycloneDX"`; SPDX documents
/// carry a non-empty `spdxVersion`. Anything else is unrecoverable input.
pub fn detect_sbom_format(sbom: &Value) -> Result<SbomFormat> {
    if sbom.get("bomFormat").and_then(Value::as_str) == Some("CycloneDX") {
        Ok(SbomFormat::CycloneDx)
    } else if sbom
        .get("spdxVersion")
        .and_then(Value::as_str)
        .is_some_and(|version| !version.is_empty())
    {
        Ok(SbomFormat::Spdx)
    } else {
        Err(BaseImageError::UnknownFormat)
    }
}

/// Merge base image components into an SBOM document, in place.
///
/// Dispatches on the detected format. `annotation_date` is only used by the
/// SPDX emitter; passing it in keeps every annotation of one run on the same
/// instant and keeps the emitters deterministic under test.
pub fn update_sbom(
    sbom: &mut Value,
    components: &[BaseImageComponent],
    annotation_date: DateTime<Utc>,
) -> Result<()> {
    match detect_sbom_format(sbom)? {
        SbomFormat::CycloneDx => update_cyclonedx_sbom(sbom, components),
        SbomFormat::Spdx => update_spdx_sbom(sbom, components, annotation_date),
    }
}
