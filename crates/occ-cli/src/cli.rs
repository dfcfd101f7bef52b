//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Org clock CSV exporter.
///
/// Flattens the clock entries of org outline documents into one CSV table,
/// each row carrying the full ancestry and inherited metadata of the
/// headline it was logged under.
#[derive(Debug, Parser)]
#[command(name = "occ", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export clock entries from org files as CSV.
    Export {
        /// Org files to export; defaults to the configured file list.
        files: Vec<PathBuf>,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the existence pre-check on input files.
        #[arg(long)]
        no_check: bool,

        /// Separator used to join the parents path.
        #[arg(long)]
        separator: Option<String>,

        /// Override the emitted header line.
        #[arg(long)]
        header: Option<String>,
    },
}
