//! All the clap stuff for parsing/documenting the cli

use camino::Utf8PathBuf;
use clap::{
    builder::{PossibleValuesParser, TypedValueParser},
    Args, Parser, Subcommand,
};
use tracing::level_filters::LevelFilter;

#[derive(Parser, Clone, Debug)]
#[clap(version)]
#[clap(args_conflicts_with_subcommands = true)]
/// Generate curl|sh installers for prebuilt GitHub release archives.
///
/// Reads a goreleaser release description and writes a POSIX sh script that
/// downloads the right archive for the machine running it, verifies its
/// checksum, and installs the binaries.
///
/// When run without a subcommand, `binfetch` will invoke the `generate`
/// subcommand. See `binfetch help generate` for more details.
pub struct Cli {
    /// Subcommands ("no subcommand" defaults to `generate`)
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Arguments for the default `generate` subcommand
    #[clap(flatten)]
    pub generate: GenerateArgs,

    /// How verbose logging should be (log level)
    #[clap(long, short)]
    #[clap(default_value_t = LevelFilter::WARN)]
    #[clap(value_parser = PossibleValuesParser::new(["off", "error", "warn", "info", "debug", "trace"]).map(|s| s.parse::<LevelFilter>().expect("possible values are valid")))]
    #[clap(help_heading = "GLOBAL OPTIONS", global = true)]
    pub verbose: LevelFilter,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Generate an installer (the default)
    #[clap(disable_version_flag = true)]
    Generate(GenerateArgs),
    /// Print the JSON Schema of the release description format
    #[clap(disable_version_flag = true)]
    ConfigSchema(ConfigSchemaArgs),
}

#[derive(Args, Clone, Debug, Default)]
pub struct GenerateArgs {
    /// A goreleaser config on disk
    ///
    /// If omitted, --repo must be given and the config is fetched from the
    /// repo's default branch.
    #[clap(value_name = "FILE")]
    pub file: Option<Utf8PathBuf>,

    /// The GitHub repo releases are published to (owner/name or a github.com URL)
    ///
    /// Fills in release.github when the config doesn't say.
    #[clap(long, short)]
    pub repo: Option<String>,

    /// A config file name to try before the usual goreleaser ones when fetching from --repo
    #[clap(long)]
    pub config_name: Option<String>,

    /// Write the installer here instead of to stdout
    ///
    /// An existing file is only rewritten if something besides comments and
    /// whitespace changed.
    #[clap(long, short)]
    pub output: Option<Utf8PathBuf>,

    /// Write --output even if it's already equivalent
    #[clap(long, short)]
    pub force: bool,

    /// Check whether --output is up to date instead of writing it
    ///
    /// Fails (with a diff) if it isn't.
    #[clap(long, requires = "output", conflicts_with = "force")]
    pub check: bool,

    /// Leave the generation timestamp out of the installer's header
    #[clap(long)]
    pub no_timestamp: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ConfigSchemaArgs {}
