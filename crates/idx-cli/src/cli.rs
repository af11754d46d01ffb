//! CLI argument definitions.
//!
//! Uses `clap` derive macros to define the command surface (spec §6):
//! a single `pack` command driving one publication cycle.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "idx-pack",
    version,
    about = "Produces and publishes a portable artifact index from a Maven-style repository"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a repository and publish an index into the target directory
    Pack {
        /// Repository root to scan
        #[arg(long)]
        repository: PathBuf,
        /// Durable indexing context directory
        #[arg(long)]
        index: PathBuf,
        /// Directory the publication set is written into
        #[arg(long)]
        target: PathBuf,
        /// Publication format: v1, legacy, or both
        #[arg(long, default_value = "v1")]
        format: String,
        /// Also compute and emit an incremental chunk
        #[arg(long)]
        chunks: bool,
        /// Write .sha1/.md5 checksum siblings for every emitted file
        #[arg(long)]
        checksums: bool,
        /// Historical chunk markers to retain in the descriptor
        #[arg(long)]
        chunk_retention: Option<usize>,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
