use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::commands::{movies::MoviesArgs, traffic::TrafficArgs};

#[derive(Debug, Parser)]
#[command(
    name = "dbreports",
    version,
    about = "Menu-driven reports over local movie and traffic camera databases"
)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    #[arg(long, global = true, value_name = "PATH")]
    pub home_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH")]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Movie database statistics, search, top-rated lists, reviews and taglines
    Movies(MoviesArgs),
    /// Chicago traffic camera and violation analysis
    Traffic(TrafficArgs),
}
