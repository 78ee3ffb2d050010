//! Finding and reading release descriptions

use axoasset::{AxoClient, SourceFile};
use binfetch_schema::Project;
use camino::Utf8Path;
use tracing::{info, warn};

use crate::{
    errors::{DistError, DistResult},
    net::{self, ClientSettings},
    repo::GithubRepoPair,
};

/// File names a repo's release description is usually committed under, in the order we try them
pub const CONFIG_CANDIDATES: &[&str] = &[
    "goreleaser.yml",
    ".goreleaser.yml",
    "goreleaser.yaml",
    ".goreleaser.yaml",
];

/// Loads a release description from disk.
pub fn load(path: &Utf8Path) -> DistResult<Project> {
    info!("reading file {path:?}");
    let src = SourceFile::load_local(path)?;
    parse(src)
}

/// Given a SourceFile of a release description, deserializes it.
pub fn parse(src: SourceFile) -> DistResult<Project> {
    Ok(src.deserialize_yaml()?)
}

/// The file names to try under a remote directory, `preferred` first
pub fn candidate_names(preferred: Option<&str>) -> Vec<String> {
    preferred
        .filter(|name| !name.is_empty())
        .into_iter()
        .chain(CONFIG_CANDIDATES.iter().copied())
        .map(ToOwned::to_owned)
        .collect()
}

/// Fetches the release description of a GitHub repo from its default branch
///
/// Candidates that aren't there (any non-success status) are skipped, but a
/// failed request is fatal.
pub async fn load_remote(
    client: &AxoClient,
    base_url: &str,
    preferred: Option<&str>,
) -> DistResult<Project> {
    let tried = candidate_names(preferred);
    for file in &tried {
        let url = format!("{base_url}/{file}");
        info!("reading {url}");
        let response = client.get(&url).await?;
        let status = response.status();
        if !status.is_success() {
            warn!("reading {url} returned {status}");
            continue;
        }
        let text = response.text().await?;
        return parse(SourceFile::new(&url, text));
    }
    Err(DistError::RemoteConfigNotFound {
        base_url: base_url.to_owned(),
        tried,
    })
}

/// Blocking version of [`load_remote`][] for a GitHub repo
pub fn load_repo(repo: &GithubRepoPair, preferred: Option<&str>) -> DistResult<Project> {
    info!("reading repo {repo} on github");
    let client = net::create_axoasset_client(&ClientSettings::new())?;
    let base_url = repo.raw_content_url();
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(load_remote(&client, &base_url, preferred))
}
