use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding activities.txt, plans/ and logs/
    /// (falls back to $WEEKPLAN_DIR, then the current directory)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive planner
    Tui,
    /// List all activities with their priorities
    List,
    /// Add a new activity
    Add {
        #[arg(value_name = "NAME")]
        name: String,
        /// Priority level, 0 (never scheduled) to 10
        #[arg(short = 'p', long = "priority", default_value_t = 1)]
        priority: u32,
    },
    /// Remove an activity
    Remove {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Print one history-weighted random activity
    Random,
    /// List exported week plans, most recent first
    Plans,
    /// Generate shell completions
    Completions {
        #[arg(value_name = "SHELL")]
        shell: String,
    },
}
