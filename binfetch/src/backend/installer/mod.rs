//! Installer Generation
//!
//! There's only one kind of installer right now (installer.sh), but the
//! information it's rendered from is kept separate from the rendering.

use serde::Serialize;

use crate::{
    config::ReleaseConfig,
    naming::TranslatedAssignment,
    platform::{JinjaPlatformMatrix, PlatformMatrix, RuntimeAdjustments},
    repo::GithubRepoPair,
};

pub mod shell;

/// Settings that affect the generated text without being part of the release
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSettings {
    /// Timestamp to put in the "generated by" header, if any
    pub generated_at: Option<String>,
}

/// Everything installer.sh is rendered from
#[derive(Debug, Clone, Serialize)]
pub struct InstallerInfo {
    /// Version of binfetch that made this (display only)
    pub binfetch_version: String,
    /// Timestamp for the header
    pub generated_at: Option<String>,
    /// Project name
    pub project_name: String,
    /// GitHub owner
    pub owner: String,
    /// GitHub repo
    pub repo: String,
    /// The repo's page on github.com
    pub repo_url: String,
    /// The binary of the first build
    pub binary: String,
    /// Every binary to install
    pub binaries: Vec<String>,
    /// Default archive format
    pub format: String,
    /// Whether the archive nests its contents in a directory
    pub wrap_in_directory: bool,
    /// `NAME=...` line
    pub archive_name: String,
    /// `CHECKSUM=...` line
    pub checksum_name: String,
    /// Platform support matrix
    pub matrix: JinjaPlatformMatrix,
    /// Format overrides and replacements
    pub adjustments: RuntimeAdjustments,
}

impl InstallerInfo {
    /// Gather up what the installer needs from a release
    pub fn new(
        config: &ReleaseConfig,
        archive_name: &TranslatedAssignment,
        checksum_name: &TranslatedAssignment,
        settings: &ScriptSettings,
    ) -> Self {
        let primary = config.primary_build();
        let repo = GithubRepoPair {
            owner: config.owner.clone(),
            repo: config.repo_name.clone(),
        };
        InstallerInfo {
            binfetch_version: env!("CARGO_PKG_VERSION").to_owned(),
            generated_at: settings.generated_at.clone(),
            project_name: config.project_name.clone(),
            owner: config.owner.clone(),
            repo: config.repo_name.clone(),
            repo_url: repo.web_url(),
            binary: primary.binary_name.clone(),
            binaries: config
                .builds
                .iter()
                .map(|build| build.binary_name.clone())
                .collect(),
            format: config.archive.format.clone(),
            wrap_in_directory: config.archive.wrap_in_directory,
            archive_name: archive_name.to_string(),
            checksum_name: checksum_name.to_string(),
            matrix: PlatformMatrix::new(primary).into_jinja(),
            adjustments: RuntimeAdjustments::new(&config.archive),
        }
    }
}
