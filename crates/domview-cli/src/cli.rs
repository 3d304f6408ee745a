use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu",
    version,
    about = "domview CLI - Renders images of a protein domain in structure, chain, and domain context.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the structure, chain, and domain images of one domain.
    Render(RenderArgs),
    /// Print the rainbow color assigned to each residue of a range.
    Colors(ColorsArgs),
}

/// Where structures are looked up and which configuration file is used.
#[derive(Args, Debug, Clone, Default)]
pub struct RepositoryArgs {
    /// Path to a configuration file in TOML format.
    /// Defaults to `config.toml` in the user configuration directory, if present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the legacy PDB path template (`{mid}` = middle two characters, `{id}` = code).
    #[arg(long, value_name = "TEMPLATE")]
    pub pdb_template: Option<String>,

    /// Override the mmCIF path template, tried when no legacy PDB file exists.
    #[arg(long, value_name = "TEMPLATE")]
    pub mmcif_template: Option<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S thresholds.ribbon-atom-limit=50000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

/// Arguments for the `render` subcommand.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Domain identifier (e.g., e4hhhA1); names the output files.
    #[arg(value_name = "UID")]
    pub uid: String,

    /// Four-character PDB code of the structure holding the domain.
    #[arg(value_name = "PDB")]
    pub pdb: String,

    /// Domain range as comma-separated `chain:start-end` segments (e.g., A:1-129,B:5-40).
    #[arg(value_name = "RANGE")]
    pub range: String,

    /// A ligand list such as `A:801,A:802` (no '-'), and ranges of assembly partner
    /// domains (with '-'), in any order.
    #[arg(value_name = "EXTRA")]
    pub extra: Vec<String>,

    #[command(flatten)]
    pub repository: RepositoryArgs,

    /// Root of the output tree; images land in `<root>/<uid[2..-2]>/<uid>`.
    #[arg(short, long, value_name = "PATH")]
    pub output_root: Option<PathBuf>,

    /// Renderer executable used to run the generated script.
    #[arg(long, value_name = "PATH")]
    pub renderer: Option<PathBuf>,

    /// Write the renderer script without running the renderer.
    #[arg(long)]
    pub script_only: bool,
}

/// Arguments for the `colors` subcommand.
#[derive(Args, Debug)]
pub struct ColorsArgs {
    /// Four-character PDB code of the structure.
    #[arg(value_name = "PDB")]
    pub pdb: String,

    /// Range as comma-separated `chain:start-end` segments.
    #[arg(value_name = "RANGE")]
    pub range: String,

    #[command(flatten)]
    pub repository: RepositoryArgs,
}
