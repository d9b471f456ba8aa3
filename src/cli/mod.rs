//! CLI module for toolgate - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
