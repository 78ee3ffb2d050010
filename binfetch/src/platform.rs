//! Which platforms the installer accepts
//!
//! The installer detects `$OS/$ARCH` at runtime (with arm revisions folded into
//! the arch, so a Raspberry Pi is `linux/armv7`) and runs it through two `case`
//! statements: one listing every platform we built for, and one listing the
//! platforms the build config explicitly ignores. The second always runs after
//! the first, so an ignore rule beats any inclusion of the same platform.
//!
//! Everything here is computed up front as plain data so the policy can be
//! tested without rendering a script.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::config::{ArchiveSpec, BuildTarget, PlatformExclusion};

/// The arch name Go uses for 32-bit ARM, which gets expanded per revision
pub const ARCH_ARM: &str = "arm";

/// An `os/arch` pair as the installer spells it (`linux/amd64`, `linux/armv7`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Platform {
    /// Operating system
    pub os: String,
    /// Architecture, including any arm revision
    pub arch: String,
}

impl Platform {
    /// A platform with a plain arch
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: os.to_owned(),
            arch: arch.to_owned(),
        }
    }

    /// An arch with an arm revision tacked on (`arm` + `7` => `armv7`)
    pub fn with_revision(os: &str, arch: &str, revision: &str) -> Self {
        Self {
            os: os.to_owned(),
            arch: format!("{arch}v{revision}"),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

impl From<&PlatformExclusion> for Platform {
    fn from(rule: &PlatformExclusion) -> Self {
        match &rule.arm_revision {
            Some(revision) => Platform::with_revision(&rule.os, &rule.arch, revision),
            None => Platform::new(&rule.os, &rule.arch),
        }
    }
}

/// The platform support matrix of a build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformMatrix {
    /// Platforms the first `case` accepts, in config order
    pub supported: Vec<Platform>,
    /// Platforms the second `case` rejects, in config order
    pub excluded: Vec<Platform>,
}

impl PlatformMatrix {
    /// Compute the matrix for a build
    pub fn new(build: &BuildTarget) -> Self {
        let supported = build
            .os_list
            .iter()
            .cartesian_product(&build.arch_list)
            .flat_map(|(os, arch)| {
                if arch == ARCH_ARM && !build.arm_revisions.is_empty() {
                    build
                        .arm_revisions
                        .iter()
                        .map(|revision| Platform::with_revision(os, arch, revision))
                        .collect::<Vec<_>>()
                } else {
                    vec![Platform::new(os, arch)]
                }
            })
            .unique()
            .collect();

        let excluded = build
            .ignore_rules
            .iter()
            .map(Platform::from)
            .unique()
            .collect();

        Self {
            supported,
            excluded,
        }
    }

    /// Would the installer accept this platform (`os/arch`)?
    pub fn is_supported(&self, platform: &str) -> bool {
        let included = self.supported.iter().any(|p| p.to_string() == platform);
        let excluded = self.excluded.iter().any(|p| p.to_string() == platform);
        included && !excluded
    }

    /// Convert this into a jinja-friendly form
    pub fn into_jinja(self) -> JinjaPlatformMatrix {
        JinjaPlatformMatrix {
            supported: self.supported.iter().map(ToString::to_string).collect(),
            excluded: self.excluded.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Jinja-friendly version of [`PlatformMatrix`][]
#[derive(Debug, Clone, Serialize)]
pub struct JinjaPlatformMatrix {
    /// `os/arch` patterns
    pub supported: Vec<String>,
    /// `os/arch` patterns
    pub excluded: Vec<String>,
}

/// One `pattern) VAR=value ;;` line in the installer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseArm {
    /// What to match
    pub pattern: String,
    /// What to assign
    pub value: String,
}

/// The name/format tweaks the installer applies after detecting the platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeAdjustments {
    /// `case ${OS}` arms that set `FORMAT`
    pub format_overrides: Vec<CaseArm>,
    /// `case ${OS}` and `case ${ARCH}` arms that rename tokens
    pub replacements: Vec<CaseArm>,
}

impl RuntimeAdjustments {
    /// Compute the adjustments for an archive config
    pub fn new(archive: &ArchiveSpec) -> Self {
        let arms = |map: &crate::SortedMap<String, String>| {
            map.iter()
                .map(|(pattern, value)| CaseArm {
                    pattern: pattern.clone(),
                    value: value.clone(),
                })
                .collect()
        };
        Self {
            format_overrides: arms(&archive.format_overrides),
            replacements: arms(&archive.replacements),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn build(os: &[&str], arch: &[&str], arm: &[&str]) -> BuildTarget {
        let strings = |v: &[&str]| v.iter().map(|s| (*s).to_owned()).collect();
        BuildTarget {
            binary_name: "bar".to_owned(),
            os_list: strings(os),
            arch_list: strings(arch),
            arm_revisions: strings(arm),
            ignore_rules: vec![],
        }
    }

    fn names(platforms: &[Platform]) -> Vec<String> {
        platforms.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn cross_product_in_config_order() {
        let matrix = PlatformMatrix::new(&build(&["linux", "darwin"], &["amd64", "386"], &[]));
        assert_eq!(
            names(&matrix.supported),
            ["linux/amd64", "linux/386", "darwin/amd64", "darwin/386"]
        );
        assert!(matrix.excluded.is_empty());
    }

    #[test]
    fn duplicates_dropped() {
        let matrix = PlatformMatrix::new(&build(&["linux", "linux"], &["amd64"], &[]));
        assert_eq!(names(&matrix.supported), ["linux/amd64"]);
    }

    #[test]
    fn bare_arm_without_revisions() {
        let matrix = PlatformMatrix::new(&build(&["linux"], &["arm"], &[]));
        assert_eq!(names(&matrix.supported), ["linux/arm"]);
    }

    #[test]
    fn arm64_is_not_arm() {
        let matrix = PlatformMatrix::new(&build(&["linux"], &["arm64"], &["7"]));
        assert_eq!(names(&matrix.supported), ["linux/arm64"]);
    }

    #[test]
    fn exclusion_without_revision() {
        let mut target = build(&["windows", "linux"], &["386"], &[]);
        target.ignore_rules.push(PlatformExclusion {
            os: "windows".to_owned(),
            arch: "386".to_owned(),
            arm_revision: None,
        });
        let matrix = PlatformMatrix::new(&target);
        assert_eq!(names(&matrix.excluded), ["windows/386"]);
        assert!(!matrix.is_supported("windows/386"));
        assert!(matrix.is_supported("linux/386"));
        assert!(!matrix.is_supported("linux/amd64"));
    }
}
