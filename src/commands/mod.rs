//! CLI command implementations for mmapbench-live.
//!
//! This module provides implementations for all CLI subcommands:
//! - `check`: Counter source and config validation
//! - `generate-feed`: Synthetic benchmark feed generation

pub mod check;
pub mod generate;

// Re-export command functions
pub use check::command_check;
pub use generate::command_generate_feed;
