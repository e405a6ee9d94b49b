//! Subcommand implementations.

pub mod check;
pub mod check_config;
pub mod init;
pub mod list_rules;
pub mod output;
