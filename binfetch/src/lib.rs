#![deny(missing_docs)]
#![allow(clippy::result_large_err)]

//! # binfetch
//!
//! This is the library at the core of the 'binfetch' CLI. Given a goreleaser-style
//! release description it produces a POSIX sh installer that downloads, verifies,
//! and installs the right prebuilt archive for whatever machine runs it.
//!
//! The pipeline is:
//!
//! 1. load the release description (from disk, or from a GitHub repo) and resolve
//!    its defaults ([`config`][])
//! 2. translate the archive and checksum name templates into shell ([`naming`][])
//! 3. work out which platforms the installer accepts ([`platform`][])
//! 4. render the installer ([`backend::installer`][])

use std::collections::BTreeMap;

use backend::installer::{self, ScriptSettings};
use binfetch_schema::Project;
use camino::Utf8PathBuf;
use config::ReleaseConfig;
use tracing::{debug, info};

use errors::*;
use naming::{ARCHIVE_NAME_PREFIX, CHECKSUM_NAME_PREFIX};
use repo::GithubRepoPair;

pub mod backend;
pub mod config;
pub mod errors;
pub mod naming;
pub mod net;
pub mod platform;
pub mod repo;
#[cfg(test)]
mod tests;

/// A map where the order of entries is fixed, so output is reproducible
pub type SortedMap<K, V> = BTreeMap<K, V>;

/// Arguments for `binfetch generate` ([`do_generate`][])
#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    /// A release description on disk
    pub file: Option<Utf8PathBuf>,
    /// A GitHub repo to fetch the release description from (or to take owner/name from)
    pub repo: Option<String>,
    /// A file name to try before the usual goreleaser ones when fetching from a repo
    pub config_name: Option<String>,
    /// Where to write the installer (stdout if None)
    pub output: Option<Utf8PathBuf>,
    /// Write the output even if it's equivalent to what's there
    pub force: bool,
    /// Check whether the output differs without writing to disk
    pub check: bool,
    /// Settings for the generated text
    pub settings: ScriptSettings,
}

/// What [`do_generate`][] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// There was no output path, so here's the script to print
    Script(String),
    /// The installer was written to this path
    Wrote(Utf8PathBuf),
    /// The installer at this path was already equivalent, so it was left alone
    Unchanged(Utf8PathBuf),
    /// `--check` found the installer at this path up to date
    UpToDate(Utf8PathBuf),
}

/// Load and resolve the release description `args` point at
pub fn load_release(args: &GenerateArgs) -> DistResult<ReleaseConfig> {
    let repo = args
        .repo
        .as_deref()
        .map(str::parse::<GithubRepoPair>)
        .transpose()?;

    let project: Project = match (&args.file, &repo) {
        (Some(file), _) => config::loader::load(file)?,
        (None, Some(repo)) => config::loader::load_repo(repo, args.config_name.as_deref())?,
        (None, None) => return Err(DistError::NoInput),
    };

    ReleaseConfig::resolve(project, repo.as_ref())
}

/// Produce the installer for a resolved release
pub fn generate_installer(config: &ReleaseConfig, settings: &ScriptSettings) -> DistResult<String> {
    let archive_name = naming::translate(ARCHIVE_NAME_PREFIX, &config.archive.name_template)?;
    debug!("archive name: {archive_name}");
    let checksum_name = naming::translate(CHECKSUM_NAME_PREFIX, &config.checksum.name_template)?;
    debug!("checksum name: {checksum_name}");

    installer::shell::assemble(config, &archive_name, &checksum_name, settings)
}

/// Generate an installer (impl of `binfetch generate`)
pub fn do_generate(args: &GenerateArgs) -> DistResult<GenerateOutcome> {
    let config = load_release(args)?;
    let script = generate_installer(&config, &args.settings)?;

    let Some(output) = &args.output else {
        return Ok(GenerateOutcome::Script(script));
    };

    if args.check {
        backend::diff_files(output, &script)?;
        return Ok(GenerateOutcome::UpToDate(output.clone()));
    }

    if !args.force && !backend::should_write_file(output, &script)? {
        info!("{output} is up to date, leaving it alone");
        return Ok(GenerateOutcome::Unchanged(output.clone()));
    }

    installer::shell::write_install_sh_script(&script, output)?;
    info!("wrote {output}");
    Ok(GenerateOutcome::Wrote(output.clone()))
}

/// The JSON Schema of release descriptions (impl of `binfetch config-schema`)
pub fn do_config_schema() -> DistResult<String> {
    let schema = Project::json_schema();
    Ok(serde_json::to_string_pretty(&schema)?)
}
