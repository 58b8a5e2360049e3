//! Typed model of a parsed multi-stage Dockerfile and base image resolution.
//!
//! The input is the JSON document emitted by `dockerfile-json` during the
//! build: a `Stages` list where every stage declares its origin under `From`.
//! An origin is exactly one of a literal image reference, scratch, or a
//! reference to an earlier named stage. Stage references may chain (a named
//! stage deriving from another named stage); resolution follows the chain
//! until it reaches a literal image.

use crate::error::{BaseImageError, Result};
use serde::Deserialize;

/// Sentinel emitted for stages built `FROM scratch`.
pub const SCRATCH: &str = "scratch";

/// A parsed Dockerfile as produced by `dockerfile-json`.
///
/// Only the stage origins are modeled; everything else in the document
/// (commands, args, platform flags) is irrelevant to base image extraction
/// and ignored during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct ParsedDockerfile {
    #[serde(rename = "Stages", default)]
    pub stages: Vec<Stage>,
}

/// One build stage of a multi-stage Dockerfile.
#[derive(Debug, Clone, Deserialize)]
pub struct Stage {
    #[serde(rename = "From")]
    pub from: StageOrigin,
}

/// The origin of a build stage.
///
/// Exhaustive matching over this enum is what lets the resolver enforce
/// that an alias chain must terminate in a literal image.
#[derive(Debug, Clone, Deserialize)]
pub enum StageOrigin {
    /// A literal image reference, e.g. `registry.access.redhat.com/ubi8/ubi:latest`.
    Image(String),
    /// `FROM scratch` — no parent image.
    Scratch(bool),
    /// A reference to an earlier stage by name and index.
    Stage(StageRef),
}

/// A `FROM <stage>` reference to an earlier build stage.
#[derive(Debug, Clone, Deserialize)]
pub struct StageRef {
    #[serde(rename = "Named")]
    pub named: String,
    #[serde(rename = "Index")]
    pub index: usize,
}

/// Resolve every stage of `dockerfile` to its base image reference.
///
/// Returns one entry per stage, in stage order. Literal images are emitted
/// verbatim, scratch stages emit the [`SCRATCH`] sentinel, and stage
/// references are followed back to the literal image of the stage they
/// ultimately alias. Only that final resolution is emitted for the referring
/// stage; intermediate alias hops contribute nothing at its position.
pub fn base_images_from_dockerfile(dockerfile: &ParsedDockerfile) -> Result<Vec<String>> {
    let stages = &dockerfile.stages;
    let mut base_images = Vec::with_capacity(stages.len());

    for (position, stage) in stages.iter().enumerate() {
        match &stage.from {
            StageOrigin::Image(image) => base_images.push(image.clone()),
            StageOrigin::Scratch(_) => base_images.push(SCRATCH.to_string()),
            StageOrigin::Stage(reference) => {
                base_images.push(resolve_stage_reference(stages, position, reference)?);
            }
        }
    }

    Ok(base_images)
}

/// Follow a stage reference chain until it lands on a literal image.
fn resolve_stage_reference(
    stages: &[Stage],
    position: usize,
    reference: &StageRef,
) -> Result<String> {
    let mut index = reference.index;
    // A well-formed chain visits each stage at most once.
    let mut remaining_hops = stages.len();

    loop {
        let target = stages.get(index).ok_or_else(|| {
            BaseImageError::stage(format!(
                "stage {position} refers to stage index {index}, but the Dockerfile has only {} stages",
                stages.len()
            ))
        })?;

        match &target.from {
            StageOrigin::Image(image) => return Ok(image.clone()),
            StageOrigin::Stage(next) => {
                if remaining_hops == 0 {
                    return Err(BaseImageError::stage(format!(
                        "stage {position} ('{}') forms a reference cycle",
                        reference.named
                    )));
                }
                remaining_hops -= 1;
                index = next.index;
            }
            StageOrigin::Scratch(_) => {
                return Err(BaseImageError::stage(format!(
                    "stage {position} ('{}') resolves to scratch instead of a literal image",
                    reference.named
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_stage(image: &str) -> Stage {
        Stage {
            from: StageOrigin::Image(image.to_string()),
        }
    }

    fn scratch_stage() -> Stage {
        Stage {
            from: StageOrigin::Scratch(true),
        }
    }

    fn alias_stage(named: &str, index: usize) -> Stage {
        Stage {
            from: StageOrigin::Stage(StageRef {
                named: named.to_string(),
                index,
            }),
        }
    }

    fn dockerfile(stages: Vec<Stage>) -> ParsedDockerfile {
        ParsedDockerfile { stages }
    }

    #[test]
    fn test_literal_images_pass_through() {
        let parsed = dockerfile(vec![
            image_stage("quay.io/builder/builder:latest"),
            image_stage("registry.access.redhat.com/ubi8/ubi:latest"),
        ]);
        let base_images = base_images_from_dockerfile(&parsed).unwrap();
        assert_eq!(
            base_images,
            vec![
                "quay.io/builder/builder:latest",
                "registry.access.redhat.com/ubi8/ubi:latest"
            ]
        );
    }

    #[test]
    fn test_scratch_emits_sentinel() {
        let parsed = dockerfile(vec![image_stage("quay.io/builder:1"), scratch_stage()]);
        let base_images = base_images_from_dockerfile(&parsed).unwrap();
        assert_eq!(base_images, vec!["quay.io/builder:1", SCRATCH]);
    }

    #[test]
    fn test_stage_reference_resolves_to_literal() {
        let parsed = dockerfile(vec![
            image_stage("registry.access.redhat.com/ubi8/ubi:latest"),
            alias_stage("builder", 0),
        ]);
        let base_images = base_images_from_dockerfile(&parsed).unwrap();
        assert_eq!(
            base_images,
            vec![
                "registry.access.redhat.com/ubi8/ubi:latest",
                "registry.access.redhat.com/ubi8/ubi:latest"
            ]
        );
    }

    #[test]
    fn test_chained_stage_references() {
        // FROM a AS one / FROM one AS two / FROM two
        let parsed = dockerfile(vec![
            image_stage("quay.io/org/base:9"),
            alias_stage("one", 0),
            alias_stage("two", 1),
        ]);
        let base_images = base_images_from_dockerfile(&parsed).unwrap();
        assert_eq!(base_images[2], "quay.io/org/base:9");
        assert_eq!(base_images.len(), 3);
    }

    #[test]
    fn test_reference_to_scratch_is_an_error() {
        let parsed = dockerfile(vec![scratch_stage(), alias_stage("empty", 0)]);
        let err = base_images_from_dockerfile(&parsed).unwrap_err();
        assert!(err.to_string().contains("scratch"), "{err}");
    }

    #[test]
    fn test_reference_out_of_range_is_an_error() {
        let parsed = dockerfile(vec![alias_stage("ghost", 7)]);
        let err = base_images_from_dockerfile(&parsed).unwrap_err();
        assert!(err.to_string().contains("stage index 7"), "{err}");
    }

    #[test]
    fn test_reference_cycle_is_an_error() {
        let parsed = dockerfile(vec![alias_stage("a", 1), alias_stage("b", 0)]);
        let err = base_images_from_dockerfile(&parsed).unwrap_err();
        assert!(err.to_string().contains("cycle"), "{err}");
    }

    #[test]
    fn test_deserializes_dockerfile_json_shape() {
        let raw = r#"{
            "Stages": [
                {
                    "BaseName": "registry.access.redhat.com/ubi8/ubi:latest",
                    "As": "builder",
                    "From": {"Image": "registry.access.redhat.com/ubi8/ubi:latest"}
                },
                {"BaseName": "scratch", "From": {"Scratch": true}},
                {"BaseName": "builder", "From": {"Stage": {"Named": "builder", "Index": 0}}}
            ]
        }"#;
        let parsed: ParsedDockerfile = serde_json::from_str(raw).unwrap();
        let base_images = base_images_from_dockerfile(&parsed).unwrap();
        assert_eq!(
            base_images,
            vec![
                "registry.access.redhat.com/ubi8/ubi:latest",
                SCRATCH,
                "registry.access.redhat.com/ubi8/ubi:latest"
            ]
        );
    }
}
