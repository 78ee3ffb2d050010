//! Errors!

use axoasset::SourceFile;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// An alias for the common Result type for this crate
pub type DistResult<T> = std::result::Result<T, DistError>;

/// Errors binfetch can have
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum DistError {
    /// random i/o error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// random axoasset error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Asset(#[from] axoasset::AxoassetError),

    /// random reqwest error
    #[error(transparent)]
    Http(#[from] axoasset::reqwest::Error),

    /// random minijinja error
    #[error(transparent)]
    Jinja(#[from] minijinja::Error),

    /// random serde_json error
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// A name template uses a conditional (or an ARM field) we can't express in shell
    #[error("name_template {template:?} contains unknown conditional or ARM format")]
    #[diagnostic(help("Please file a bug at https://github.com/binfetch/binfetch/issues/new"))]
    UnsupportedConditional {
        /// The template as the user wrote it
        #[source_code]
        template: String,
        /// The offending action
        #[label("can't be translated to shell")]
        span: Option<SourceSpan>,
    },

    /// A name template refers to a field we don't know a shell variable for
    #[error("name_template {template:?} refers to unknown field {field}")]
    #[diagnostic(help(
        "only .Os, .Arch, .Version, .Tag, .Binary and .ProjectName can be used in names"
    ))]
    UnknownPlaceholder {
        /// The template as the user wrote it
        #[source_code]
        template: String,
        /// The field name
        field: String,
        /// Where the field was used
        #[label("unknown field")]
        span: Option<SourceSpan>,
    },

    /// A name template uses a function, pipeline, or other template logic
    #[error("name_template {template:?} uses {action:?}, which can't be translated to shell")]
    #[diagnostic(help("Please file a bug at https://github.com/binfetch/binfetch/issues/new"))]
    UnsupportedAction {
        /// The template as the user wrote it
        #[source_code]
        template: String,
        /// The action text
        action: String,
        /// Where the action was used
        #[label]
        span: Option<SourceSpan>,
    },

    /// A name template has literal text that isn't safe in an unquoted shell word
    #[error("name_template {template:?} contains {text:?}, which isn't safe in a shell assignment")]
    #[diagnostic(help("archive and checksum names may only use letters, digits, and -_.+,@%:/="))]
    UnsafeLiteral {
        /// The template as the user wrote it
        #[source_code]
        template: String,
        /// The offending text
        text: String,
        /// Where the text is
        #[label]
        span: Option<SourceSpan>,
    },

    /// A name template isn't even well-formed
    #[error("name_template {template:?} is malformed: {reason}")]
    MalformedTemplate {
        /// The template as the user wrote it
        #[source_code]
        template: String,
        /// What's wrong with it
        reason: String,
        /// Where things went wrong
        #[label]
        span: Option<SourceSpan>,
    },

    /// Neither a repo nor a file was given
    #[error("repo or file not specified")]
    #[diagnostic(help("pass --repo owner/name, or the path to a goreleaser config"))]
    NoInput,

    /// We don't know the owner/name of the repo
    #[error("owner/name repo not specified")]
    #[diagnostic(help(
        "set release.github.owner/name in the config, or pass --repo owner/name"
    ))]
    RepoNotSpecified,

    /// The repo string wasn't of the form owner/name
    #[error("couldn't parse {repo:?} as a GitHub owner/name")]
    #[diagnostic(help("expected something like 'owner/name' or 'https://github.com/owner/name'"))]
    RepoParse {
        /// The input
        repo: String,
    },

    /// None of the candidate config files existed remotely
    #[error("could not fetch a goreleaser configuration file from {base_url} (tried {})", .tried.join(", "))]
    RemoteConfigNotFound {
        /// The directory we looked in
        base_url: String,
        /// The file names we tried
        tried: Vec<String>,
    },

    /// A config asked for an archive format we can't unpack
    #[error("archive format {format:?} isn't supported")]
    #[diagnostic(help("supported formats are tar.gz, tgz, tar, and zip"))]
    UnsupportedFormat {
        /// The format
        format: String,
    },

    /// A config value would break out of the generated script
    #[error("{field} value {value:?} isn't safe to embed in a shell script")]
    UnsafeConfigValue {
        /// Which setting this came from
        field: &'static str,
        /// The value
        value: String,
    },

    /// A generated file is out of date
    #[error("{} has out of date contents and needs to be regenerated:\n{diff}", .file.origin_path())]
    #[diagnostic(help("run 'binfetch' again without --check to update it"))]
    CheckFileMismatch {
        /// The file whose contents differ
        file: SourceFile,
        /// The diff
        diff: String,
    },
}
