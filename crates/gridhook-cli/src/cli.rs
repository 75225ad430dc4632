use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "gridhook",
    about = "Spreadsheet change detection with webhook delivery",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./gridhook.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Push the whole grid as an initial load and record it as the baseline
    Open,
    /// Run one change cycle against the stored baseline
    Change,
    /// Compare two grid files without touching stored state
    Diff(DiffArgs),
    /// Show the initialized flag and stored snapshot sizes
    Status,
    /// Forget the baseline, the last recorded grid and the initialized flag
    Reset,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Earlier grid or workbook file
    pub previous: PathBuf,
    /// Later grid or workbook file
    pub current: PathBuf,
    /// Sheet to read from workbook files
    #[arg(long)]
    pub sheet: Option<String>,
}
