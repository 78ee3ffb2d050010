//! Code for generating installer.sh

use axoasset::LocalAsset;
use camino::Utf8Path;
use tracing::debug;

use crate::{
    backend::templates::{Templates, TEMPLATE_INSTALLER_SH},
    config::ReleaseConfig,
    errors::DistResult,
    naming::TranslatedAssignment,
};

use super::{InstallerInfo, ScriptSettings};

/// Render installer.sh for a release whose names have already been translated
pub fn assemble(
    config: &ReleaseConfig,
    archive_name: &TranslatedAssignment,
    checksum_name: &TranslatedAssignment,
    settings: &ScriptSettings,
) -> DistResult<String> {
    let templates = Templates::new()?;
    let info = InstallerInfo::new(config, archive_name, checksum_name, settings);
    debug!(
        "rendering installer for {}/{} with {} platforms",
        info.owner,
        info.repo,
        info.matrix.supported.len()
    );
    generate_install_sh_script(&templates, &info)
}

pub(crate) fn write_install_sh_script(script: &str, dest_path: &Utf8Path) -> DistResult<()> {
    LocalAsset::write_new_all(script, dest_path)?;
    Ok(())
}

fn generate_install_sh_script(templates: &Templates, info: &InstallerInfo) -> DistResult<String> {
    templates.render_file_to_clean_string(TEMPLATE_INSTALLER_SH, info)
}
