use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tinker_crypto::DigestAlgorithm;
use tinker_store::OutputStyle;

#[derive(Parser)]
#[command(
    name = "genesis-tinker",
    about = "Rewrite Cosmos genesis files for local testnets",
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

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum DigestArg {
    Sha256,
    Blake3,
}

impl From<DigestArg> for DigestAlgorithm {
    fn from(d: DigestArg) -> Self {
        match d {
            DigestArg::Sha256 => DigestAlgorithm::Sha256,
            DigestArg::Blake3 => DigestAlgorithm::Blake3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StyleArg {
    Canonical,
    Pretty,
    Compact,
}

impl From<StyleArg> for OutputStyle {
    fn from(s: StyleArg) -> Self {
        match s {
            StyleArg::Canonical => OutputStyle::Canonical,
            StyleArg::Pretty => OutputStyle::Pretty,
            StyleArg::Compact => OutputStyle::Compact,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a task plan against a genesis file
    Run(RunArgs),
    /// Parse a task plan and check its ordering without touching any file
    Check(CheckArgs),
    /// Print the checksum of a file
    Digest(DigestArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// TOML task plan
    #[arg(short, long)]
    pub plan: PathBuf,
    /// Input genesis path or URL, overriding the plan
    #[arg(short, long)]
    pub input: Option<String>,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Expected checksum of the decompressed input
    #[arg(long)]
    pub shasum: Option<String>,
    /// Where to write the scratch copy
    #[arg(long)]
    pub preprocessing: Option<PathBuf>,
    #[arg(long)]
    pub keep_preprocessing: bool,
    #[arg(long)]
    pub digest: Option<DigestArg>,
    #[arg(long)]
    pub style: Option<StyleArg>,
}

#[derive(Args)]
pub struct CheckArgs {
    #[arg(short, long)]
    pub plan: PathBuf,
}

#[derive(Args)]
pub struct DigestArgs {
    pub file: PathBuf,
    #[arg(short, long, default_value = "sha256")]
    pub algorithm: DigestArg,
}
