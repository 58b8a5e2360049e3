//! Normalization of resolved base images into SBOM components.
//!
//! This is where the ordered per-stage reference list and the digest mapping
//! meet: pseudo-stages are skipped, stage roles are assigned, and repeated
//! images collapse into one component that accumulates a property per use.

use crate::dockerfile::SCRATCH;
use crate::error::Result;
use crate::image::{DigestMap, ParsedImage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Prefix of archive-export pseudo-stages (flatpaks built `FROM oci-archive:...`).
pub const OCI_ARCHIVE_PREFIX: &str = "oci-archive";

/// Property marking the final base image of the build.
pub const IS_BASE_IMAGE: &str = "konflux:container:is_base_image";

/// Property marking an image used only in an intermediate build stage.
pub const IS_BUILDER_IMAGE_FOR_STAGE: &str = "konflux:container:is_builder_image:for_stage";

/// A name/value annotation pair in CycloneDX property shape.
///
/// Field order matters: SPDX annotations carry this struct re-encoded as
/// compact JSON, with `name` before `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    /// The final base image of the build.
    pub fn base_image() -> Self {
        Self {
            name: IS_BASE_IMAGE.to_string(),
            value: "true".to_string(),
        }
    }

    /// A builder image used at stage `index` (0-based, counted over the
    /// original stage list, pseudo-stages included).
    pub fn builder_image(index: usize) -> Self {
        Self {
            name: IS_BUILDER_IMAGE_FOR_STAGE.to_string(),
            value: index.to_string(),
        }
    }
}

/// One deduplicated base image, in CycloneDX component shape.
///
/// Identity is the purl. A component is created on the first stage that uses
/// a given digest-pinned image; every later stage using the same image
/// appends a property instead of creating a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseImageComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    pub name: String,
    pub purl: String,
    pub properties: Vec<Property>,
}

impl BaseImageComponent {
    fn new(image: &ParsedImage, purl: String, property: Property) -> Self {
        Self {
            component_type: "container".to_string(),
            name: image.repository.clone(),
            purl,
            properties: vec![property],
        }
    }
}

/// Build the deduplicated base image component list.
///
/// `base_images` is the ordered output of the stage resolver, one reference
/// per stage. Per stage, in order:
///
/// - `scratch` and `oci-archive*` pseudo-stages contribute nothing, but keep
///   their slot in the numbering — stage indices in properties always match
///   the original Dockerfile.
/// - The last stage is the base image of the final product; every earlier
///   stage is a builder image for its index.
/// - A stage whose reference has no recorded digest was skipped by the build
///   tool as unreachable, so it is skipped here too.
///
/// An all-scratch or all-skipped input yields an empty list; that is a valid
/// "nothing to merge" outcome, not an error.
pub fn base_image_components(
    base_images: &[String],
    digests: &DigestMap,
) -> Result<Vec<BaseImageComponent>> {
    let mut components: Vec<BaseImageComponent> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (index, image) in base_images.iter().enumerate() {
        if image == SCRATCH || image.starts_with(OCI_ARCHIVE_PREFIX) {
            continue;
        }

        // Not reached when the last stage is scratch or an archive export:
        // those are not base images and never enter the SBOM.
        let property = if index == base_images.len() - 1 {
            Property::base_image()
        } else {
            Property::builder_image(index)
        };

        let Some(digested) = digests.get(image) else {
            tracing::debug!("No digest recorded for '{image}', stage {index} skipped");
            continue;
        };

        let parsed = ParsedImage::parse(digested)?;
        let purl = parsed.purl()?;

        if let Some(&position) = seen.get(&purl) {
            components[position].properties.push(property);
        } else {
            seen.insert(purl.clone(), components.len());
            components.push(BaseImageComponent::new(&parsed, purl, property));
        }
    }

    Ok(components)
}
