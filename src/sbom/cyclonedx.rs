//! CycloneDX emitter.
//!
//! Base images are recorded as a formulation entry: one new item appended to
//! the document's `formulation` list, holding the component list verbatim.
//! Prior formulation entries are never touched, so re-runs of the build keep
//! their own history.

use crate::components::BaseImageComponent;
use crate::error::{BaseImageError, Result};
use serde_json::{json, Value};

/// Append the base image components to the SBOM's `formulation` section,
/// creating the section if the document has none yet.
pub fn update_cyclonedx_sbom(sbom: &mut Value, components: &[BaseImageComponent]) -> Result<()> {
    let document = sbom
        .as_object_mut()
        .ok_or_else(|| BaseImageError::InvalidSbom("document root is not an object".to_string()))?;

    let formulation = document
        .entry("formulation")
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(|| {
            BaseImageError::InvalidSbom("'formulation' section is not an array".to_string())
        })?;

    formulation.push(json!({ "components": components }));
    Ok(())
}
