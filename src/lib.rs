//! EasyVideo Library
//!
//! A command-line convenience layer over installed media tools (ffmpeg,
//! avconv, ffprobe, exiftool, mplayer, ffplay, youtube-dl). Each operation
//! turns a few named parameters into one external command line, which is
//! either returned (dry-run) or executed.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod ports;
pub mod registry;
pub mod utils;

// Re-export commonly used types
pub use app::{OperationInteractor, OperationRequest};
pub use domain::model::{CommandLine, DurationSeconds, MediaInput, Outcome, Session, Toolchain};
pub use error::{EasyVideoError, EasyVideoResult};
pub use registry::{BuildOptions, CommandPlan};
pub use utils::time::{normalize_human_duration, parse_tool_duration};
