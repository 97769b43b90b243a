use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dsv",
    about = "DSV: content-addressed dataset versions with generated commit messages",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<OutputFormat> for dsv_diff::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the differences between two dataset documents
    Diff(DiffArgs),
    /// Generate the commit message for a change between two datasets
    Describe(DescribeArgs),
    /// Save one or two versions into a scratch store and show the result
    Create(CreateArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    /// Left-hand dataset JSON file
    pub left: PathBuf,
    /// Right-hand dataset JSON file
    pub right: PathBuf,
    /// Compare a single component (meta, structure, body, ...)
    #[arg(short, long)]
    pub selector: Option<String>,
}

#[derive(Args)]
pub struct DescribeArgs {
    /// Previous dataset JSON file
    pub prev: PathBuf,
    /// Next dataset JSON file
    pub next: PathBuf,
    /// Describe as a forced update when nothing changed
    #[arg(long)]
    pub force: bool,
    /// Largest body change, as a percentage of its weight, listed row by row
    #[arg(long, default_value_t = 70)]
    pub max_itemized_percent: u32,
    /// Largest number of changed body rows listed one by one
    #[arg(long, default_value_t = 3)]
    pub max_itemized_rows: usize,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Dataset JSON file to save
    pub next: PathBuf,
    /// Dataset JSON file saved first as the previous version
    #[arg(long)]
    pub prev: Option<PathBuf>,
    /// Hex-encoded 32-byte Ed25519 secret key; a fresh key is generated when omitted
    #[arg(long)]
    pub key: Option<String>,
    /// Abort when any body row fails schema validation
    #[arg(long)]
    pub strict: bool,
    /// Save even when nothing changed
    #[arg(long)]
    pub force: bool,
}
