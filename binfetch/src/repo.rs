//! Figuring out which GitHub repo we're generating an installer for

use std::fmt;

use url::Url;

use crate::errors::{DistError, DistResult};

/// A GitHub repo like 'axodotdev/axolotlsay'
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubRepoPair {
    /// owner (axodotdev)
    pub owner: String,
    /// repo (axolotlsay)
    pub repo: String,
}

impl GithubRepoPair {
    /// Returns a URL suitable for web access to the repository.
    pub fn web_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }

    /// The directory raw files on the default branch are served from
    pub fn raw_content_url(&self) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/master",
            self.owner, self.repo
        )
    }
}

impl fmt::Display for GithubRepoPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl std::str::FromStr for GithubRepoPair {
    type Err = DistError;

    /// Accepts `owner/name` as well as the various URL-ish ways people
    /// paste a repo: `github.com/owner/name`, `https://github.com/owner/name/`,
    /// `git@github.com:owner/name.git`...
    fn from_str(input: &str) -> DistResult<Self> {
        let trimmed = input.trim();
        let path = if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
            url_path(trimmed).ok_or_else(|| parse_error(input))?
        } else if let Some(rest) = trimmed.strip_prefix("git@github.com:") {
            rest.to_owned()
        } else if let Some(rest) = trimmed.strip_prefix("github.com/") {
            rest.to_owned()
        } else {
            trimmed.to_owned()
        };

        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let Some((owner, repo)) = path.split_once('/') else {
            return Err(parse_error(input));
        };
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(parse_error(input));
        }
        Ok(GithubRepoPair {
            owner: owner.to_owned(),
            repo: repo.to_owned(),
        })
    }
}

/// The path of a github.com URL, or None for other hosts
fn url_path(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if parsed.domain() != Some("github.com") {
        return None;
    }
    Some(parsed.path().to_owned())
}

fn parse_error(input: &str) -> DistError {
    DistError::RepoParse {
        repo: input.to_owned(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pair(input: &str) -> GithubRepoPair {
        input.parse().unwrap()
    }

    #[test]
    fn plain_pair() {
        let repo = pair("foo/bar");
        assert_eq!(repo.owner, "foo");
        assert_eq!(repo.repo, "bar");
        assert_eq!(repo.to_string(), "foo/bar");
    }

    #[test]
    fn url_forms() {
        for input in [
            "https://github.com/foo/bar",
            "http://github.com/foo/bar",
            "https://github.com/foo/bar/",
            "https://github.com/foo/bar.git",
            "github.com/foo/bar",
            "/foo/bar/",
            "git@github.com:foo/bar.git",
        ] {
            assert_eq!(pair(input), pair("foo/bar"), "{input}");
        }
    }

    #[test]
    fn bad_pairs() {
        for input in [
            "foo",
            "foo/",
            "/bar",
            "foo/bar/baz",
            "https://gitlab.com/foo/bar",
        ] {
            let err = input.parse::<GithubRepoPair>().unwrap_err();
            assert!(matches!(err, DistError::RepoParse { .. }), "{input}");
        }
    }

    #[test]
    fn urls() {
        let repo = pair("foo/bar");
        assert_eq!(repo.web_url(), "https://github.com/foo/bar");
        assert_eq!(
            repo.raw_content_url(),
            "https://raw.githubusercontent.com/foo/bar/master"
        );
    }
}
