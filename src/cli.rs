//! CLI command handlers.
//!
//! This module provides the testable handler invoked by main.rs. It owns all
//! file IO; the core modules only ever see in-memory structures.

use crate::components::base_image_components;
use crate::dockerfile::{base_images_from_dockerfile, ParsedDockerfile};
use crate::image::DigestMap;
use crate::sbom::update_sbom;
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use std::path::{Path, PathBuf};

/// Configuration for the `update` command.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    /// The SBOM file to enrich, rewritten in place.
    pub sbom: PathBuf,
    /// Parsed Dockerfile JSON from `dockerfile-json`.
    pub parsed_dockerfile: PathBuf,
    /// Digest mapping recorded from `buildah images` output.
    pub base_images_digests: PathBuf,
}

/// Enrich the SBOM file with base image data, in place.
///
/// When no base images resolve (single-stage scratch builds, fully skipped
/// stages), the SBOM file is left untouched.
pub fn run_update(config: &UpdateConfig) -> Result<()> {
    let dockerfile: ParsedDockerfile = read_json(&config.parsed_dockerfile)
        .with_context(|| {
            format!(
                "Failed to load parsed Dockerfile: {}",
                config.parsed_dockerfile.display()
            )
        })?;
    let base_images = base_images_from_dockerfile(&dockerfile)?;
    tracing::debug!("Resolved {} build stage(s)", base_images.len());

    let digests_text = std::fs::read_to_string(&config.base_images_digests)
        .with_context(|| {
            format!(
                "Failed to read digest mapping: {}",
                config.base_images_digests.display()
            )
        })?;
    let digests = DigestMap::parse(&digests_text)?;

    let components = base_image_components(&base_images, &digests)?;
    if components.is_empty() {
        tracing::info!("No base images resolved, leaving SBOM unchanged");
        return Ok(());
    }
    tracing::info!("Merging {} base image component(s) into SBOM", components.len());

    let mut sbom: Value = read_json(&config.sbom)
        .with_context(|| format!("Failed to load SBOM: {}", config.sbom.display()))?;
    update_sbom(&mut sbom, &components, Utc::now())?;

    write_json_pretty(&config.sbom, &sbom)
        .with_context(|| format!("Failed to write SBOM: {}", config.sbom.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))
}

/// Serialize with 4-space indentation, matching the encoding the rest of the
/// build pipeline writes, so re-runs produce stable diffs.
fn write_json_pretty(path: &Path, value: &Value) -> Result<()> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    serde::Serialize::serialize(value, &mut serializer)?;
    std::fs::write(path, buffer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn config_in(dir: &TempDir, sbom: &Value, dockerfile: &Value, digests: &str) -> UpdateConfig {
        UpdateConfig {
            sbom: write_file(dir, "sbom.json", &sbom.to_string()),
            parsed_dockerfile: write_file(dir, "dockerfile.json", &dockerfile.to_string()),
            base_images_digests: write_file(dir, "digests.txt", digests),
        }
    }

    #[test]
    fn test_update_cyclonedx_end_to_end() {
        let dir = TempDir::new().unwrap();
        let config = config_in(
            &dir,
            &json!({"bomFormat": "CycloneDX", "specVersion": "1.5"}),
            &json!({"Stages": [
                {"From": {"Image": "registry.access.redhat.com/ubi8/ubi:latest"}}
            ]}),
            "registry.access.redhat.com/ubi8/ubi:latest \
             registry.access.redhat.com/ubi8/ubi:latest@sha256:627867e53ad6846afba2dfbf5cef1d54c868a9025633ef0afd546278d4654eac\n",
        );

        run_update(&config).unwrap();

        let updated: Value =
            serde_json::from_str(&fs::read_to_string(&config.sbom).unwrap()).unwrap();
        let formulation = updated["formulation"].as_array().unwrap();
        assert_eq!(formulation.len(), 1);
        assert_eq!(
            formulation[0]["components"][0]["properties"][0]["name"],
            "konflux:container:is_base_image"
        );
    }

    #[test]
    fn test_update_leaves_sbom_alone_when_nothing_resolved() {
        let dir = TempDir::new().unwrap();
        let config = config_in(
            &dir,
            &json!({"bomFormat": "CycloneDX"}),
            &json!({"Stages": [{"From": {"Scratch": true}}]}),
            "",
        );
        let before = fs::read_to_string(&config.sbom).unwrap();

        run_update(&config).unwrap();

        assert_eq!(fs::read_to_string(&config.sbom).unwrap(), before);
    }

    #[test]
    fn test_update_rejects_unknown_sbom_format() {
        let dir = TempDir::new().unwrap();
        let config = config_in(
            &dir,
            &json!({"neither": "format"}),
            &json!({"Stages": [{"From": {"Image": "quay.io/a/a:1"}}]}),
            "quay.io/a/a:1 quay.io/a/a:1@sha256:a1\n",
        );

        let err = run_update(&config).unwrap_err();
        assert!(err.to_string().contains("Unknown SBOM format"), "{err}");
    }

    #[test]
    fn test_written_sbom_uses_four_space_indent() {
        let dir = TempDir::new().unwrap();
        let config = config_in(
            &dir,
            &json!({"bomFormat": "CycloneDX"}),
            &json!({"Stages": [{"From": {"Image": "quay.io/a/a:1"}}]}),
            "quay.io/a/a:1 quay.io/a/a:1@sha256:a1\n",
        );

        run_update(&config).unwrap();

        let written = fs::read_to_string(&config.sbom).unwrap();
        assert!(written.contains("\n    \"formulation\""), "{written}");
    }
}
