//! CLI subcommand implementations.

pub mod export;
