//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Path-addressed node tree: define paths, set leaf values, watch changes bubble up
#[derive(Parser, Debug)]
#[command(name = "pathtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d, -dd, -ddd)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Definitions file (overrides config)
    #[arg(short = 'f', long, global = true, value_hint = ValueHint::FilePath)]
    pub definitions: Option<PathBuf>,

    /// Path segment separator (overrides config)
    #[arg(long, global = true)]
    pub separator: Option<char>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the node tree
    Tree,

    /// List leaf paths with their values
    Leaves,

    /// Print the value of a node
    Get {
        /// Node path, e.g. light/kitchen
        path: String,
    },

    /// Set leaf values and report bubbled notifications
    Set {
        /// Assignments of the form path=value
        #[arg(required = true, value_name = "PATH=VALUE")]
        assignments: Vec<String>,

        /// Node to observe; every notification it receives is printed
        #[arg(short, long, value_name = "PATH")]
        watch: Vec<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a config template
    Template,
    /// Show config file locations
    Path,
}
