//! **Enrich container-image SBOMs with base image provenance.**
//!
//! `sbom-base-images` takes the two artifacts a container build leaves
//! behind — the parsed multi-stage Dockerfile (from `dockerfile-json`) and
//! the mapping of declared image references to the digest-pinned references
//! actually pulled (from `buildah images`) — and merges a normalized list of
//! base image components into an existing SBOM document, in either
//! **CycloneDX** or **SPDX** format.
//!
//! ## Core Concepts & Modules
//!
//! - **[`dockerfile`]**: typed model of the parsed build stages and the
//!   resolver that turns stage aliases (`FROM builder`) into the literal
//!   image references they stand for.
//! - **[`image`]**: image reference parsing, `pkg:oci` package URL
//!   derivation, and the digest mapping file format.
//! - **[`components`]**: the normalized [`BaseImageComponent`] list —
//!   deduplicated by purl, annotated per build stage with builder/base
//!   provenance properties.
//! - **[`sbom`]**: format detection plus the two emitters that merge the
//!   component list into a CycloneDX `formulation` entry or into SPDX
//!   `packages` with `BUILD_TOOL_OF` relationships.
//!
//! ## Getting Started
//!
//! ```no_run
//! use chrono::Utc;
//! use sbom_base_images::{
//!     base_image_components, base_images_from_dockerfile, update_sbom, DigestMap,
//!     ParsedDockerfile,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dockerfile: ParsedDockerfile =
//!         serde_json::from_str(&std::fs::read_to_string("dockerfile.json")?)?;
//!     let base_images = base_images_from_dockerfile(&dockerfile)?;
//!
//!     let digests = DigestMap::parse(&std::fs::read_to_string("digests.txt")?)?;
//!     let components = base_image_components(&base_images, &digests)?;
//!
//!     let mut sbom = serde_json::from_str(&std::fs::read_to_string("sbom.json")?)?;
//!     update_sbom(&mut sbom, &components, Utc::now())?;
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]

pub mod cli;
pub mod components;
pub mod dockerfile;
pub mod error;
pub mod image;
pub mod sbom;

// Re-export main types for convenience
pub use cli::{run_update, UpdateConfig};
pub use components::{base_image_components, BaseImageComponent, Property};
pub use dockerfile::{base_images_from_dockerfile, ParsedDockerfile, Stage, StageOrigin};
pub use error::{BaseImageError, Result};
pub use image::{DigestMap, ParsedImage};
pub use sbom::{detect_sbom_format, update_sbom, SbomFormat};
