//! Config types (for both the raw release description and the resolved release)

use binfetch_schema::Project;
use serde::Serialize;
use tracing::info;

use crate::{
    errors::{DistError, DistResult},
    naming::is_shell_word_char,
    repo::GithubRepoPair,
    SortedMap,
};

pub mod loader;

/// goreleaser's default archive name
pub const DEFAULT_ARCHIVE_NAME_TEMPLATE: &str =
    "{{ .Binary }}_{{ .Version }}_{{ .Os }}_{{ .Arch }}{{ if .Arm }}v{{ .Arm }}{{ end }}";
/// goreleaser's default checksum file name
pub const DEFAULT_CHECKSUM_NAME_TEMPLATE: &str = "{{ .ProjectName }}_{{ .Version }}_checksums.txt";
/// goreleaser's default archive format
pub const DEFAULT_ARCHIVE_FORMAT: &str = "tar.gz";
/// goreleaser's default operating systems
pub const DEFAULT_GOOS: &[&str] = &["linux", "darwin"];
/// goreleaser's default architectures
pub const DEFAULT_GOARCH: &[&str] = &["amd64", "386"];
/// goreleaser's default ARM revisions
pub const DEFAULT_GOARM: &[&str] = &["6"];
/// The archive formats the installer knows how to unpack
pub const SUPPORTED_FORMATS: &[&str] = &["tar.gz", "tgz", "tar", "zip"];

/// A fully resolved release: defaults applied, owner/name known
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseConfig {
    /// The project name
    pub project_name: String,
    /// GitHub owner
    pub owner: String,
    /// GitHub repository name
    pub repo_name: String,
    /// Builds, never empty. The first one decides the platform matrix.
    pub builds: Vec<BuildTarget>,
    /// Archive settings
    pub archive: ArchiveSpec,
    /// Checksum settings
    pub checksum: ChecksumSpec,
}

/// One binary built for some platforms
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
    /// The binary's file name (without `.exe`)
    pub binary_name: String,
    /// Operating systems
    pub os_list: Vec<String>,
    /// Architectures
    pub arch_list: Vec<String>,
    /// ARM revisions, used for `arm` in `arch_list`
    pub arm_revisions: Vec<String>,
    /// Platforms that are skipped despite the lists above
    pub ignore_rules: Vec<PlatformExclusion>,
}

/// A platform that isn't built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformExclusion {
    /// Operating system
    pub os: String,
    /// Architecture
    pub arch: String,
    /// ARM revision
    pub arm_revision: Option<String>,
}

/// How archives are named and packed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSpec {
    /// Name template, translated into shell later
    pub name_template: String,
    /// Default format
    pub format: String,
    /// OS => format
    pub format_overrides: SortedMap<String, String>,
    /// OS/arch name => replacement used in archive names
    pub replacements: SortedMap<String, String>,
    /// Whether the archive nests its contents under a directory named like itself
    pub wrap_in_directory: bool,
}

/// How the checksum file is named
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksumSpec {
    /// Name template, translated into shell later
    pub name_template: String,
}

impl ReleaseConfig {
    /// Apply defaults to a raw release description
    ///
    /// `repo` fills in the GitHub coordinates if the description doesn't say.
    pub fn resolve(project: Project, repo: Option<&GithubRepoPair>) -> DistResult<Self> {
        let Project {
            project_name,
            release,
            builds,
            archive,
            checksum,
        } = project;

        let (owner, repo_name) = if release.github.owner.is_empty() {
            let Some(repo) = repo else {
                return Err(DistError::RepoNotSpecified);
            };
            (repo.owner.clone(), repo.repo.clone())
        } else {
            (release.github.owner, release.github.name)
        };
        if owner.is_empty() || repo_name.is_empty() {
            return Err(DistError::RepoNotSpecified);
        }

        let project_name = project_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| repo_name.clone());

        let mut builds = builds;
        if builds.is_empty() {
            builds.push(Default::default());
        }
        let builds = builds
            .into_iter()
            .map(|build| BuildTarget {
                binary_name: non_empty_or(build.binary, &project_name),
                os_list: list_or(build.goos, DEFAULT_GOOS),
                arch_list: list_or(build.goarch, DEFAULT_GOARCH),
                arm_revisions: list_or(build.goarm, DEFAULT_GOARM),
                ignore_rules: build
                    .ignore
                    .into_iter()
                    .map(|ignore| PlatformExclusion {
                        os: ignore.goos,
                        arch: ignore.goarch,
                        arm_revision: ignore.goarm.filter(|arm| !arm.is_empty()),
                    })
                    .collect(),
            })
            .collect();

        let archive = ArchiveSpec {
            name_template: archive
                .name_template
                .unwrap_or_else(|| DEFAULT_ARCHIVE_NAME_TEMPLATE.to_owned()),
            format: archive
                .format
                .unwrap_or_else(|| DEFAULT_ARCHIVE_FORMAT.to_owned()),
            format_overrides: archive
                .format_overrides
                .into_iter()
                .map(|over| (over.goos, over.format))
                .collect(),
            replacements: archive.replacements,
            wrap_in_directory: archive.wrap_in_directory,
        };
        let checksum = ChecksumSpec {
            name_template: checksum
                .name_template
                .unwrap_or_else(|| DEFAULT_CHECKSUM_NAME_TEMPLATE.to_owned()),
        };

        let config = ReleaseConfig {
            project_name,
            owner,
            repo_name,
            builds,
            archive,
            checksum,
        };
        config.validate()?;
        info!("resolved release config for {}/{}", config.owner, config.repo_name);
        Ok(config)
    }

    /// The build that decides the platform matrix
    pub fn primary_build(&self) -> &BuildTarget {
        &self.builds[0]
    }

    /// Check that everything we're about to paste into sh is inert there
    pub fn validate(&self) -> DistResult<()> {
        if self.builds.is_empty() {
            return Err(DistError::UnsafeConfigValue {
                field: "builds",
                value: String::new(),
            });
        }

        check_word("release.github.owner", &self.owner)?;
        check_word("release.github.name", &self.repo_name)?;
        check_word("project_name", &self.project_name)?;
        for build in &self.builds {
            check_word("builds.binary", &build.binary_name)?;
            check_words("builds.goos", &build.os_list)?;
            check_words("builds.goarch", &build.arch_list)?;
            check_words("builds.goarm", &build.arm_revisions)?;
            for ignore in &build.ignore_rules {
                check_word("builds.ignore.goos", &ignore.os)?;
                check_word("builds.ignore.goarch", &ignore.arch)?;
                if let Some(arm) = &ignore.arm_revision {
                    check_word("builds.ignore.goarm", arm)?;
                }
            }
        }

        let formats = std::iter::once(&self.archive.format)
            .chain(self.archive.format_overrides.values());
        for format in formats {
            if !SUPPORTED_FORMATS.contains(&format.as_str()) {
                return Err(DistError::UnsupportedFormat {
                    format: format.clone(),
                });
            }
        }
        check_words("archive.format_overrides.goos", self.archive.format_overrides.keys())?;
        check_words("archive.replacements", self.archive.replacements.keys())?;
        check_words("archive.replacements", self.archive.replacements.values())?;

        Ok(())
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_owned()
    } else {
        value
    }
}

fn list_or(values: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if values.is_empty() {
        defaults.iter().map(|s| (*s).to_owned()).collect()
    } else {
        values
    }
}

fn check_word(field: &'static str, value: &str) -> DistResult<()> {
    if value.is_empty() || !value.chars().all(is_shell_word_char) {
        return Err(DistError::UnsafeConfigValue {
            field,
            value: value.to_owned(),
        });
    }
    Ok(())
}

fn check_words<'a>(
    field: &'static str,
    values: impl IntoIterator<Item = &'a String>,
) -> DistResult<()> {
    values
        .into_iter()
        .try_for_each(|value| check_word(field, value))
}
