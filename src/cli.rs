//! Command-line interface for tictactoe_ladder.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tic-tac-toe ladder - two-player games with scores and rankings
#[derive(Parser, Debug)]
#[command(name = "tictactoe_ladder")]
#[command(about = "Tic-tac-toe game service with score history and rankings", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file (defaults apply if it is missing)
    #[arg(short, long, global = true, default_value = "tictactoe_ladder.toml")]
    pub config: PathBuf,

    /// Path to the database file, overriding the configuration
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP league server
    Serve {
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Print the leaderboard
    Rankings,

    /// Print reminders for players with games in progress
    Reminders,
}
