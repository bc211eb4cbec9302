//! opsboard - operational dashboard board
//!
//! This library backs the opsboard CLI and TUI: a local task board over
//! a read-only JSON data endpoint, refreshed in the background.
//!
//! # Core Concepts
//!
//! - **Task board**: three fixed columns (todo, progress, done) with
//!   free moves between any pair of them
//! - **Polling**: each remote resource refreshes on its own fixed
//!   interval and keeps its last good snapshot across failures
//! - **Drag mapping**: a press-move-release gesture resolves to at most
//!   one board mutation
//! - **Local persistence**: the board snapshot outlives the process;
//!   the remote tasks resource only seeds an unedited board
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.opsboard.toml`
//! - `error`: Error types and result aliases
//! - `task`: Task model, state machine, and persistent store
//! - `form`: Add-task input validation
//! - `board`: Column layout and drag gesture mapping
//! - `remote`: Wire types for the read-only resources
//! - `client`: HTTP client for the data endpoint
//! - `poller`: Background refresh loops and per-resource poll state
//! - `storage`: File storage and atomic snapshot writes
//! - `output`: Shared CLI output formatting
//! - `ui`: Interactive board (ratatui)

pub mod board;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod output;
pub mod poller;
pub mod remote;
pub mod storage;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
