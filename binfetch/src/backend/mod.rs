//! The backend of binfetch -- things it outputs

use std::time::Duration;

use axoasset::{LocalAsset, SourceFile};
use camino::Utf8Path;
use newline_converter::dos2unix;

use crate::errors::{DistError, DistResult};

pub mod installer;
pub mod templates;

/// The start of the "generated by" comment at the top of installer.sh
const GENERATED_HEADER_PREFIX: &str = "# Code generated by ";
/// The end of the "generated by" comment at the top of installer.sh
const GENERATED_HEADER_SUFFIX: &str = ". DO NOT EDIT.";

/// Check if the given file has the same contents we generated
///
/// The generation timestamp in the header doesn't count.
pub fn diff_files(existing_file: &Utf8Path, new_file_contents: &str) -> DistResult<()> {
    let existing = if existing_file.exists() {
        SourceFile::load_local(existing_file)?
    } else {
        SourceFile::new(existing_file.as_str(), String::new())
    };
    diff_generated(existing, new_file_contents)
}

/// [`diff_source`][] with the generation timestamps taken out of both sides
pub(crate) fn diff_generated(existing: SourceFile, new_file_contents: &str) -> DistResult<()> {
    let undated = without_generated_at(&dos2unix(existing.contents()));
    let existing = SourceFile::new(existing.origin_path(), undated);
    diff_source(existing, &without_generated_at(&dos2unix(new_file_contents)))
}

pub(crate) fn diff_source(existing: SourceFile, new_file_contents: &str) -> DistResult<()> {
    // Normalize away newline differences, those aren't worth failing things over
    let a = dos2unix(existing.contents());
    let b = dos2unix(new_file_contents);

    // Diff the files with the Pretty "patience" algorithm
    //
    // The timeout exists because essentially diff algorithms iteratively refine the results,
    // and can convince themselves to try way too hard for minimum benefit. Hitting the timeout
    // isn't fatal, it just tells the algorithm to call the result "good enough" if it hits
    // something pathalogical.
    let diff = similar::TextDiff::configure()
        .algorithm(similar::Algorithm::Patience)
        .timeout(Duration::from_millis(10))
        .diff_lines(&a, &b)
        .unified_diff()
        .header(existing.origin_path(), existing.origin_path())
        .to_string();

    if !diff.is_empty() {
        Err(DistError::CheckFileMismatch {
            file: existing,
            diff,
        })
    } else {
        Ok(())
    }
}

/// Whether writing `new_file_contents` to `path` would change anything meaningful
///
/// Comments and whitespace don't count, so regenerating an installer whose only
/// difference is the timestamp in its header leaves the file alone.
pub fn should_write_file(path: &Utf8Path, new_file_contents: &str) -> DistResult<bool> {
    if !path.exists() {
        return Ok(true);
    }
    let existing = LocalAsset::load_string(path)?;
    Ok(semantic_lines(&existing) != semantic_lines(new_file_contents))
}

/// Drop the `on <timestamp>` part of any "generated by" header lines
fn without_generated_at(script: &str) -> String {
    script
        .split_inclusive('\n')
        .map(|line| {
            let (body, newline) = match line.strip_suffix('\n') {
                Some(body) => (body, "\n"),
                None => (line, ""),
            };
            match undated_header(body) {
                Some(header) => format!("{header}{newline}"),
                None => line.to_owned(),
            }
        })
        .collect()
}

fn undated_header(line: &str) -> Option<String> {
    let generator = line
        .strip_prefix(GENERATED_HEADER_PREFIX)?
        .strip_suffix(GENERATED_HEADER_SUFFIX)?;
    let (generator, _timestamp) = generator.split_once(" on ")?;
    Some(format!(
        "{GENERATED_HEADER_PREFIX}{generator}{GENERATED_HEADER_SUFFIX}"
    ))
}

/// The lines of a shell script that actually do something, whitespace-normalized
fn semantic_lines(script: &str) -> Vec<String> {
    script
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn comments_and_spacing_dont_count() {
        let a = "#!/bin/sh\n# generated on monday\nfoo  bar\n\n  baz\n";
        let b = "#!/bin/sh\n# generated on tuesday\nfoo bar\nbaz";
        assert_eq!(semantic_lines(a), semantic_lines(b));
    }

    #[test]
    fn code_changes_count() {
        assert_ne!(semantic_lines("NAME=${OS}\n"), semantic_lines("NAME=${ARCH}\n"));
    }

    #[test]
    fn diff_reports_mismatch() {
        let existing = SourceFile::new("install.sh", "a\nb\n".to_owned());
        let err = diff_source(existing, "a\nc\n").unwrap_err();
        let DistError::CheckFileMismatch { diff, .. } = err else {
            panic!("unexpected error {err:?}");
        };
        assert!(diff.contains("-b"));
        assert!(diff.contains("+c"));
    }

    #[test]
    fn timestamps_dont_count_for_check() {
        let existing = SourceFile::new(
            "install.sh",
            "#!/bin/sh\n# Code generated by binfetch 0.4.0 on 2024-01-01T00:00:00Z. DO NOT EDIT.\nfoo\n"
                .to_owned(),
        );
        let new = "#!/bin/sh\n# Code generated by binfetch 0.4.0 on 2024-06-30T23:59:59Z. DO NOT EDIT.\nfoo\n";
        diff_generated(existing.clone(), new).unwrap();

        let undated = "#!/bin/sh\n# Code generated by binfetch 0.4.0. DO NOT EDIT.\nfoo\n";
        diff_generated(existing, undated).unwrap();
    }

    #[test]
    fn timestamps_dont_hide_changes() {
        let existing = SourceFile::new(
            "install.sh",
            "# Code generated by binfetch 0.4.0 on 2024-01-01T00:00:00Z. DO NOT EDIT.\nfoo\n"
                .to_owned(),
        );
        let new = "# Code generated by binfetch 0.4.0 on 2024-06-30T23:59:59Z. DO NOT EDIT.\nbar\n";
        let err = diff_generated(existing, new).unwrap_err();
        assert!(matches!(err, DistError::CheckFileMismatch { .. }), "{err:?}");
    }

    #[test]
    fn other_comments_untouched() {
        let script = "# Code generated by hand on a tuesday\n# ships on monday. DO NOT EDIT.\n";
        assert_eq!(without_generated_at(script), script);
    }

    #[test]
    fn diff_accepts_crlf() {
        let existing = SourceFile::new("install.sh", "a\r\nb\r\n".to_owned());
        diff_source(existing, "a\nb\n").unwrap();
    }
}
