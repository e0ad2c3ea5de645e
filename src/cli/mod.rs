//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Keepsake using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Keepsake - Photo project archive exporter
#[derive(Parser, Debug)]
#[command(name = "keepsake")]
#[command(version, about, long_about = None)]
#[command(author = "Keepsake Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "keepsake.toml", env = "KEEPSAKE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "KEEPSAKE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a project's images into downloadable archives
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show the archive parts recorded for a project
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
