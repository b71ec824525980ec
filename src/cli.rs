// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use delve_config::FingerprintMode;
use std::path::PathBuf;

/// Output format for `delve replay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormatArg {
    /// One line per tool card followed by the final workspace.
    #[default]
    Text,
    /// A single JSON document: session stats, every card and the workspace.
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "delve",
    about = "Project research-agent tool events into a workspace of plans, files and sources",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (overrides auto-discovery)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a JSONL log of tool events through a fresh session
    Replay {
        /// Event log, one JSON tool event per line ("-" reads stdin)
        #[arg(value_name = "FILE", default_value = "-")]
        input: PathBuf,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormatArg,

        /// Print the expanded detail under each card
        #[arg(long)]
        expand: bool,

        /// Also write the workspace files into this directory
        #[arg(long, value_name = "DIR")]
        export: Option<PathBuf>,

        /// Override the configured fingerprint strategy
        #[arg(long, value_enum)]
        fingerprint: Option<FingerprintMode>,

        /// Override the configured dedup capacity
        #[arg(long, value_name = "N")]
        dedup_capacity: Option<usize>,
    },
    /// Replay a JSONL log and write every produced file, named by basename
    Export {
        #[arg(value_name = "FILE", default_value = "-")]
        input: PathBuf,

        /// Target directory (defaults to `export.dir` from config)
        #[arg(long, short = 'o', value_name = "DIR")]
        out: Option<PathBuf>,

        /// Replace files that already exist in the target directory
        #[arg(long)]
        overwrite: bool,
    },
    /// Print the merged configuration and exit
    ShowConfig,
    /// Generate shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "delve", &mut std::io::stdout());
}
