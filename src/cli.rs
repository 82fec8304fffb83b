use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "skel",
    version,
    about = "Materialize placeholder directory trees for app skeletons"
)]
pub struct Cli {
    /// Change to this directory before doing anything else.
    #[arg(short = 'C', long = "chdir", global = true)]
    pub chdir: Option<PathBuf>,
    /// Use this config file instead of discovering `.skel/config.toml`.
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<PathBuf>,
    /// Report what would be created without writing anything.
    #[arg(short = 'n', long = "dry-run", global = true)]
    pub dry_run: bool,
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the admin app skeleton (default: apps/admin).
    Admin,
    /// Create the public web app skeleton (default: apps/web).
    Web,
    /// Create every built-in skeleton.
    All,
    /// List built-in and configured layouts.
    List,
    /// Print the outline of a layout, or of one directory inside it.
    Show {
        layout: String,
        /// `/`-separated directory inside the layout, e.g. `src/app/api`.
        path: Option<String>,
    },
    /// Create any layout: a configured or built-in name, or a layout file.
    Apply {
        layout: String,
        /// Target directory; defaults to the layout's configured base.
        #[arg(long = "into")]
        into: Option<PathBuf>,
    },
    /// Configuration display, validation, and template generation.
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommand>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    Path,
    Check,
    Generate {
        #[arg()]
        path: Option<PathBuf>,
        #[arg(long = "force", default_value_t = false)]
        force: bool,
    },
}

/// Helper entry point so `main` can stay minimal.
pub fn parse() -> Cli {
    Cli::parse()
}
