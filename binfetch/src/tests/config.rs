//! Tests for resolving release descriptions

use super::mock::*;
use crate::{
    config::{loader, ReleaseConfig, DEFAULT_ARCHIVE_NAME_TEMPLATE, DEFAULT_CHECKSUM_NAME_TEMPLATE},
    errors::DistError,
    DistResult,
};

fn resolve(yaml: &str) -> DistResult<ReleaseConfig> {
    let project = loader::parse(source(yaml))?;
    ReleaseConfig::resolve(project, None)
}

#[test]
fn goreleaser_defaults() {
    let release = release_minimal();
    assert_eq!(release.owner, OWNER);
    assert_eq!(release.repo_name, REPO);
    assert_eq!(release.project_name, REPO);
    assert_eq!(release.builds.len(), 1);

    let build = release.primary_build();
    assert_eq!(build.binary_name, REPO);
    assert_eq!(build.os_list, ["linux", "darwin"]);
    assert_eq!(build.arch_list, ["amd64", "386"]);
    assert_eq!(build.arm_revisions, ["6"]);
    assert!(build.ignore_rules.is_empty());

    assert_eq!(release.archive.name_template, DEFAULT_ARCHIVE_NAME_TEMPLATE);
    assert_eq!(release.archive.format, "tar.gz");
    assert!(release.archive.format_overrides.is_empty());
    assert!(release.archive.replacements.is_empty());
    assert!(!release.archive.wrap_in_directory);
    assert_eq!(release.checksum.name_template, DEFAULT_CHECKSUM_NAME_TEMPLATE);
}

#[test]
fn explicit_values_win() {
    let release = release_kitchen_sink();
    assert_eq!(release.project_name, "barproj");
    assert_eq!(release.builds.len(), 2);
    assert_eq!(release.primary_build().binary_name, BIN_BAR_NAME);
    assert_eq!(release.primary_build().arm_revisions, ["6", "7"]);
    assert_eq!(release.archive.format_overrides["windows"], "zip");
    assert_eq!(release.archive.replacements["darwin"], "Darwin");
    assert!(release.archive.wrap_in_directory);
}

#[test]
fn repo_fills_in_missing_github() {
    let project = loader::parse(source("project_name: thing\n")).unwrap();
    let release = ReleaseConfig::resolve(project, Some(&repo_foo_bar())).unwrap();
    assert_eq!(release.owner, OWNER);
    assert_eq!(release.repo_name, REPO);
    assert_eq!(release.project_name, "thing");
    assert_eq!(release.primary_build().binary_name, "thing");
}

#[test]
fn config_github_beats_repo() {
    let project = loader::parse(source(
        "release:\n  github:\n    owner: someone\n    name: else\n",
    ))
    .unwrap();
    let release = ReleaseConfig::resolve(project, Some(&repo_foo_bar())).unwrap();
    assert_eq!(release.owner, "someone");
    assert_eq!(release.repo_name, "else");
}

#[test]
fn no_repo_anywhere() {
    let err = resolve("project_name: thing\n").unwrap_err();
    assert!(matches!(err, DistError::RepoNotSpecified), "{err:?}");
}

#[test]
fn unsupported_format() {
    let err = resolve(&format!("{YAML_MINIMAL}archive:\n  format: rar\n")).unwrap_err();
    let DistError::UnsupportedFormat { format } = err else {
        panic!("unexpected error {err:?}");
    };
    assert_eq!(format, "rar");
}

#[test]
fn unsupported_override_format() {
    let yaml = format!(
        "{YAML_MINIMAL}archive:\n  format_overrides:\n    - goos: windows\n      format: 7z\n"
    );
    let err = resolve(&yaml).unwrap_err();
    assert!(matches!(err, DistError::UnsupportedFormat { .. }), "{err:?}");
}

#[test]
fn shell_metacharacters_rejected() {
    let cases = [
        format!("{YAML_MINIMAL}builds:\n  - binary: \"bar; rm -rf /\"\n"),
        format!("{YAML_MINIMAL}builds:\n  - goos: [\"linux)\"]\n"),
        format!("{YAML_MINIMAL}archive:\n  replacements:\n    amd64: \"$(id)\"\n"),
        "release:\n  github:\n    owner: \"foo bar\"\n    name: baz\n".to_owned(),
    ];
    for yaml in cases {
        let err = resolve(&yaml).unwrap_err();
        assert!(
            matches!(err, DistError::UnsafeConfigValue { .. }),
            "{yaml}: {err:?}"
        );
    }
}
