//! Image reference parsing, package URL derivation, and the digest mapping.

use crate::error::{BaseImageError, Result};
use indexmap::IndexMap;
use packageurl::PackageUrl;

/// An image reference decomposed into the parts the SBOM cares about.
///
/// The input is the digest-pinned form recorded at build time from
/// `buildah images --format '{{ .Name }}:{{ .Tag }}@{{ .Digest }}'`, e.g.
/// `registry.access.redhat.com/ubi8/ubi:latest@sha256:627867e...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedImage {
    /// Registry host and path, without tag or digest
    /// (`registry.access.redhat.com/ubi8/ubi`).
    pub repository: String,
    /// Algorithm-prefixed content digest (`sha256:627867e...`).
    pub digest: String,
    /// Last path segment of the repository (`ubi`).
    pub name: String,
}

impl ParsedImage {
    /// Parse a digest-pinned image reference.
    ///
    /// Splits off the digest at `@`, then drops the tag by splitting from the
    /// right on `:` — the repository itself may contain a registry port
    /// (`host:port/path`), so only the rightmost colon is the tag separator.
    pub fn parse(reference: &str) -> Result<Self> {
        let (repository_with_tag, digest) = reference
            .split_once('@')
            .ok_or_else(|| BaseImageError::image_reference(reference, "missing '@<digest>' suffix"))?;

        let (repository, _tag) = repository_with_tag
            .rsplit_once(':')
            .ok_or_else(|| BaseImageError::image_reference(reference, "missing ':<tag>' before the digest"))?;

        let name = repository.rsplit('/').next().unwrap_or(repository);

        Ok(Self {
            repository: repository.to_string(),
            digest: digest.to_string(),
            name: name.to_string(),
        })
    }

    /// Derive the canonical `pkg:oci` package URL for this image.
    ///
    /// The digest is the version and the full repository path travels in the
    /// `repository_url` qualifier:
    /// `pkg:oci/<name>@<digest>?repository_url=<repository>`. The purl is the
    /// component identity, so this string doubles as the dedup key.
    pub fn purl(&self) -> Result<String> {
        let mut purl = PackageUrl::new("oci", self.name.as_str())?;
        purl.with_version(self.digest.as_str());
        purl.add_qualifier("repository_url", self.repository.as_str())?;
        Ok(purl.to_string())
    }
}

/// Mapping from declared image reference to the digest-pinned reference
/// actually pulled at build time.
///
/// Not every declared reference has an entry: the build tool skips stages it
/// proves unreachable or redundant, and those never get a digest recorded.
#[derive(Debug, Clone, Default)]
pub struct DigestMap {
    entries: IndexMap<String, String>,
}

impl DigestMap {
    /// Parse the whitespace-separated digest mapping file.
    ///
    /// One pair per line: `<declared-reference> <digested-reference>`.
    /// Blank lines are ignored; anything else with a field count other than
    /// two is malformed input.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = IndexMap::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (Some(reference), Some(digested), None) => {
                    entries.insert(reference.to_string(), digested.to_string());
                }
                _ => return Err(BaseImageError::InvalidDigestEntry(line.to_string())),
            }
        }
        Ok(Self { entries })
    }

    /// Look up the digest-pinned reference for a declared reference.
    pub fn get(&self, reference: &str) -> Option<&str> {
        self.entries.get(reference).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for DigestMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
