//! Command-line interface for tunelink.
//!
//! This module provides the CLI commands that stand in for a chat front end:
//! one-shot identification, a stdin listen loop, the static messages and a
//! tool check.

mod commands;

pub use commands::{Cli, Commands, run_command};
