#![deny(missing_docs)]

//! # binfetch-schema
//!
//! This crate exists to deserialize the release descriptions binfetch reads.
//! The format is the subset of a goreleaser config that matters for fetching
//! a prebuilt archive: which platforms get built, what the archives and
//! checksum files are called, and where the release lives. Everything else
//! in the document is ignored, so a complete goreleaser config can be fed in
//! as-is.
//!
//! The root type of the schema is [`Project`][]. All fields are optional here;
//! defaults are applied by binfetch when it resolves a `Project` into its
//! own release config.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The name of an operating system as Go spells it (`linux`, `darwin`, `windows`, ...)
pub type Goos = String;
/// The name of an architecture as Go spells it (`amd64`, `386`, `arm`, `arm64`, ...)
pub type Goarch = String;

/// A release description
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Project {
    /// The name of the project (defaults to the repository name)
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Where releases are published
    #[serde(default)]
    pub release: Release,
    /// The builds that produce binaries for the archives
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub builds: Vec<Build>,
    /// How the release archives are named and packed
    #[serde(default)]
    pub archive: Archive,
    /// How the checksum file is named
    #[serde(default)]
    pub checksum: Checksum,
}

/// Release hosting info
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Release {
    /// The GitHub repository releases are uploaded to
    #[serde(default)]
    pub github: GithubRepo,
}

/// A GitHub repository like `owner/name`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GithubRepo {
    /// The owner (user or org)
    #[serde(default)]
    pub owner: String,
    /// The repository name
    #[serde(default)]
    pub name: String,
}

/// One build of one binary across several platforms
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Build {
    /// The name of the produced binary (defaults to the project name)
    #[serde(default)]
    pub binary: String,
    /// Operating systems to build for
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub goos: Vec<Goos>,
    /// Architectures to build for
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(deserialize_with = "scalars::deserialize_vec")]
    pub goarch: Vec<Goarch>,
    /// ARM revisions to build for when `goarch` contains `arm`
    ///
    /// YAML users usually write these as bare numbers (`goarm: [6, 7]`),
    /// so both numbers and strings are accepted.
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(deserialize_with = "scalars::deserialize_vec")]
    pub goarm: Vec<String>,
    /// Platform combinations to skip
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<IgnoredBuild>,
}

/// A platform combination that is not built
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct IgnoredBuild {
    /// Operating system
    #[serde(default)]
    pub goos: Goos,
    /// Architecture
    #[serde(default)]
    #[serde(deserialize_with = "scalars::deserialize")]
    pub goarch: Goarch,
    /// ARM revision, only meaningful with `goarch: arm`
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "scalars::deserialize_opt")]
    pub goarm: Option<String>,
}

/// Release archive settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Archive {
    /// A Go-template style name for the archive (without extension)
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_template: Option<String>,
    /// The archive format (`tar.gz`, `tar`, `zip`)
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Per-OS archive formats
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub format_overrides: Vec<FormatOverride>,
    /// Token replacements applied to the OS and arch names in archive names
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub replacements: BTreeMap<String, String>,
    /// Whether the archive contents are nested under a directory named like the archive
    #[serde(default)]
    pub wrap_in_directory: bool,
}

/// An archive format used for one OS
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FormatOverride {
    /// The OS this applies to
    pub goos: Goos,
    /// The format to use for it
    pub format: String,
}

/// Checksum file settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Checksum {
    /// A Go-template style name for the checksum file
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_template: Option<String>,
}

impl Project {
    /// Get the JSON Schema for a Project
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Project)
    }
}

/// YAML scalars that we want as strings even when they were written as numbers
/// (`goarch: 386`, `goarm: 7`).
mod scalars {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Str(String),
        Int(i64),
    }

    impl From<Scalar> for String {
        fn from(scalar: Scalar) -> String {
            match scalar {
                Scalar::Str(s) => s,
                Scalar::Int(i) => i.to_string(),
            }
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Scalar::deserialize(deserializer)?.into())
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
    }

    pub fn deserialize_vec<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        Ok(Vec::<Scalar>::deserialize(deserializer)?
            .into_iter()
            .map(String::from)
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn numeric_platform_fields() {
        let project: Project = serde_json::from_str(
            r#"{
                "builds": [{
                    "binary": "bar",
                    "goarch": ["amd64", 386, "arm"],
                    "goarm": [6, "7"],
                    "ignore": [{"goos": "darwin", "goarch": "arm", "goarm": 6}]
                }]
            }"#,
        )
        .unwrap();

        let build = &project.builds[0];
        assert_eq!(build.goarch, vec!["amd64", "386", "arm"]);
        assert_eq!(build.goarm, vec!["6", "7"]);
        assert_eq!(build.ignore[0].goarm.as_deref(), Some("6"));
        assert!(build.goos.is_empty());
    }

    #[test]
    fn everything_optional() {
        let project: Project = serde_json::from_str("{}").unwrap();
        assert!(project.project_name.is_none());
        assert!(project.builds.is_empty());
        assert!(project.archive.name_template.is_none());
        assert!(!project.archive.wrap_in_directory);
        assert!(project.release.github.owner.is_empty());
    }

    #[test]
    fn schema_names_the_root() {
        let schema = Project::json_schema();
        let json_schema = serde_json::to_string_pretty(&schema).unwrap();
        assert!(json_schema.contains(r#""title": "Project""#));
        assert!(json_schema.contains("name_template"));
        assert!(json_schema.contains("format_overrides"));
    }
}
