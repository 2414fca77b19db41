//! CLI module for git-cli
//!
//! This module contains the command definitions (clap) and the terminal
//! front end of the `commit` command.

pub mod commands;
pub mod commit;

pub use commands::{Cli, Commands};
