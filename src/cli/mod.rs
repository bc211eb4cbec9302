//! Command-line interface for opsboard
//!
//! This module defines the CLI structure using clap derive macros.
//! Board mutations live in `task`, one-shot remote fetches in `fetch`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::output::OutputOptions;

mod fetch;
mod task;

/// opsboard - operational dashboard board
///
/// A terminal dashboard over a read-only JSON data endpoint: a local
/// task board with drag-style column moves plus polled token stats,
/// activity feed and bot status.
#[derive(Parser, Debug)]
#[command(name = "opsboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding .opsboard.toml (defaults to current directory)
    #[arg(long, global = true, env = "OPSBOARD_DIR")]
    pub dir: Option<PathBuf>,

    /// Override the data endpoint base URL
    #[arg(long, global = true, env = "OPSBOARD_API_URL")]
    pub api_url: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive board (TUI)
    Board,

    /// Task board management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Fetch and show the bot status
    Status,

    /// Fetch and show the activity feed
    Activity {
        /// Maximum entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Fetch and show token usage statistics
    Tokens,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task on the board
    New {
        /// Task title
        #[arg(long)]
        title: String,

        /// Longer description
        #[arg(long)]
        description: Option<String>,

        /// Priority: high, medium, low
        #[arg(long, default_value = "medium")]
        priority: String,

        /// Due date (YYYY-MM-DD, today or later)
        #[arg(long)]
        due: Option<String>,
    },

    /// List tasks on the board
    List {
        /// Only show one column: todo, progress, done
        #[arg(long)]
        status: Option<String>,
    },

    /// Move a task to another column
    Move {
        /// Task id
        id: String,

        /// Target column: todo, progress, done
        status: String,
    },

    /// Remove a task from the board
    Rm {
        /// Task id
        id: String,
    },

    /// Show per-column counts and overdue total
    Stats,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let mut config = Config::load_from_dir(&dir);
        if let Some(api_url) = &self.api_url {
            config.api.base_url = api_url.clone();
        }
        Ok(config)
    }

    fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let config = self.config()?;
        let output = self.output();

        match self.command {
            Commands::Board => crate::ui::board::run(config),
            Commands::Task(cmd) => match cmd {
                TaskCommands::New {
                    title,
                    description,
                    priority,
                    due,
                } => task::run_new(task::NewOptions {
                    title,
                    description,
                    priority,
                    due,
                    config,
                    output,
                }),
                TaskCommands::List { status } => task::run_list(task::ListOptions {
                    status,
                    config,
                    output,
                }),
                TaskCommands::Move { id, status } => task::run_move(task::MoveOptions {
                    id,
                    status,
                    config,
                    output,
                }),
                TaskCommands::Rm { id } => task::run_rm(task::RmOptions {
                    id,
                    config,
                    output,
                }),
                TaskCommands::Stats => task::run_stats(task::StatsOptions { config, output }),
            },
            Commands::Status => fetch::run_status(fetch::FetchOptions { config, output }),
            Commands::Activity { limit } => {
                fetch::run_activity(fetch::ActivityOptions {
                    limit,
                    config,
                    output,
                })
            }
            Commands::Tokens => fetch::run_tokens(fetch::FetchOptions { config, output }),
        }
    }
}
