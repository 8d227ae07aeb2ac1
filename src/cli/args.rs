//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Checkbox tree state engine: inspect and mutate tree descriptions
#[derive(Parser, Debug)]
#[command(name = "treehouse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: ./.treehouse.toml if present)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Draw the tree with checkboxes
    Show {
        /// Tree description (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print the description with defaults filled in
    Normalize {
        /// Tree description (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Write the result back to the file
        #[arg(short, long)]
        write: bool,
    },

    /// Check nodes (with propagation)
    Check(MutateArgs),

    /// Uncheck nodes (with propagation)
    Uncheck(MutateArgs),

    /// Toggle nodes
    Toggle(MutateArgs),

    /// Expand nodes
    Expand(MutateArgs),

    /// Collapse nodes
    Collapse(MutateArgs),

    /// Click node labels (expand/collapse or toggle, per config)
    Click(MutateArgs),

    /// Show one node
    Get {
        /// Tree description (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Node id
        id: String,
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

/// Arguments shared by the state-changing commands.
#[derive(Args, Debug)]
pub struct MutateArgs {
    /// Tree description (JSON)
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Node ids, applied in order
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,

    /// Write the result back to the file
    #[arg(short, long)]
    pub write: bool,

    /// Print the events fired by each operation
    #[arg(short, long)]
    pub events: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented config template
    Template,
    /// Show global config file location
    Path,
}
