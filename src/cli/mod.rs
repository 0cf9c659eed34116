//! CLI module for EasyVideo
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::Parser;

use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

/// EasyVideo
///
/// Builds ffmpeg-family command lines for common video chores and runs them.
/// Use --show to print the command instead of running it.
#[derive(Parser, Debug)]
#[command(name = "easyvideo")]
#[command(about = "EasyVideo - everyday video chores as one-line commands")]
#[command(version)]
#[command(long_about = None)]
#[command(after_help = "Options go before <INPUT>; everything after the operation is passed to it.\n\n\
Example: easyvideo --show clip.avi trim clip.mp4 \"1m 3s\" 30s")]
pub struct Cli {
    /// Print the command instead of running it
    #[arg(long)]
    pub show: bool,

    /// Log intermediate parsing values
    #[arg(long)]
    pub debug: bool,

    /// Configuration file
    #[arg(long, env = "EASYVIDEO_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for intermediate files
    #[arg(long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Logging level
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Do not pass -y to the transcoder
    #[arg(long)]
    pub no_overwrite: bool,

    /// List every operation
    #[arg(long, conflicts_with = "search")]
    pub list: bool,

    /// List operations whose name or description matches a regular expression
    #[arg(long, value_name = "PATTERN")]
    pub search: Option<String>,

    /// Print --list/--search results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub invocation: args::InvocationArgs,
}
