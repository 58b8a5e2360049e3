//! SPDX emitter.
//!
//! Base images become SPDX packages appended to the document's `packages`
//! list, each wired to the document root by a `BUILD_TOOL_OF` relationship.
//! The root is the single element the document DESCRIBES; anything other
//! than exactly one such relationship is malformed input.
//!
//! CycloneDX-style properties have no direct SPDX equivalent, so each one is
//! carried as an annotation whose comment is the property re-encoded as
//! compact JSON, following the Konflux SPDX support ADR.

use crate::components::{BaseImageComponent, Property};
use crate::error::{BaseImageError, Result};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Date format of the SPDX annotationDate field (UTC, second precision).
const ANNOTATION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Append base image packages and their `BUILD_TOOL_OF` relationships to an
/// SPDX document.
///
/// `annotation_date` stamps every produced annotation, so all annotations of
/// one run carry the same instant.
pub fn update_spdx_sbom(
    sbom: &mut Value,
    components: &[BaseImageComponent],
    annotation_date: DateTime<Utc>,
) -> Result<()> {
    let root = find_spdx_root_element(sbom)?;

    let packages: Vec<Value> = components
        .iter()
        .map(|component| spdx_package(component, annotation_date))
        .collect::<Result<_>>()?;

    let relationships: Vec<Value> = packages
        .iter()
        .map(|package| {
            json!({
                "spdxElementId": package["SPDXID"],
                "relationshipType": "BUILD_TOOL_OF",
                "relatedSpdxElement": root,
            })
        })
        .collect();

    section_array(sbom, "packages")?.extend(packages);
    section_array(sbom, "relationships")?.extend(relationships);
    Ok(())
}

/// Find the element in the `<DOCUMENT> DESCRIBES <ELEMENT>` relationship.
///
/// Exactly one such relationship must exist; the error reports how many were
/// found and which elements they point at.
pub fn find_spdx_root_element(sbom: &Value) -> Result<String> {
    let document_id = sbom
        .get("SPDXID")
        .and_then(Value::as_str)
        .ok_or_else(|| BaseImageError::InvalidSbom("document has no SPDXID".to_string()))?;

    let empty = Vec::new();
    let relationships = sbom
        .get("relationships")
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    let mut described: Vec<String> = relationships
        .iter()
        .filter(|relationship| {
            relationship.get("spdxElementId").and_then(Value::as_str) == Some(document_id)
                && relationship.get("relationshipType").and_then(Value::as_str)
                    == Some("DESCRIBES")
        })
        .filter_map(|relationship| relationship.get("relatedSpdxElement"))
        .filter_map(Value::as_str)
        .map(String::from)
        .collect();

    if described.len() == 1 {
        return Ok(described.remove(0));
    }
    Err(BaseImageError::SpdxRootCount {
        count: described.len(),
        targets: described,
    })
}

/// Translate one base image component into an SPDX package.
///
/// The SPDXID hashes the purl so the identifier is a pure function of the
/// image: re-running against the same inputs regenerates the same ID, which
/// keeps incrementally updated SBOMs stable. The same scheme is used for
/// index image SBOMs, so the two stay join-compatible.
fn spdx_package(component: &BaseImageComponent, annotation_date: DateTime<Utc>) -> Result<Value> {
    let spdxid = format!(
        "SPDXRef-image-{}-{}",
        component.name,
        sha256_hex(component.purl.as_bytes())
    );

    let annotations = component
        .properties
        .iter()
        .map(|property| property_annotation(property, annotation_date))
        .collect::<Result<Vec<_>>>()?;

    Ok(json!({
        "SPDXID": spdxid,
        "name": component.name,
        "downloadLocation": "NOASSERTION",
        "externalRefs": [
            {
                "referenceCategory": "PACKAGE-MANAGER",
                "referenceType": "purl",
                "referenceLocator": component.purl,
            }
        ],
        "annotations": annotations,
    }))
}

/// Encode one property as an SPDX annotation with a compact JSON comment.
fn property_annotation(property: &Property, annotation_date: DateTime<Utc>) -> Result<Value> {
    Ok(json!({
        "annotator": "Tool: konflux:jsonencoded",
        "comment": serde_json::to_string(property)?,
        "annotationDate": annotation_date.format(ANNOTATION_DATE_FORMAT).to_string(),
        "annotationType": "OTHER",
    }))
}

/// Get a mutable handle to a top-level array section, creating it if absent.
fn section_array<'a>(sbom: &'a mut Value, key: &str) -> Result<&'a mut Vec<Value>> {
    sbom.as_object_mut()
        .ok_or_else(|| BaseImageError::InvalidSbom("document root is not an object".to_string()))?
        .entry(key)
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(|| BaseImageError::InvalidSbom(format!("'{key}' section is not an array")))
}

/// Lowercase hex sha256 of `data`.
fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .fold(String::with_capacity(64), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        })
}
