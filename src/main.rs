//! EasyVideo CLI
//!
//! Everyday video chores as one-line commands over ffmpeg and friends.
//!
//! # Usage
//!
//! ```bash
//! easyvideo video.avi transcode video.mp4
//! easyvideo video.mp4 trim clip.mp4 "1m 3s" 30s
//! easyvideo --show video.mp4 speedup fast.mp4 x4
//! easyvideo --search audio
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use easyvideo::cli::{commands, Cli};
use easyvideo::config_initialization::initialize_configuration;
use easyvideo::utils::logging::LoggingSystem;
use easyvideo::EasyVideoError;

/// Main entry point for the EasyVideo CLI application
fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            let code = err
                .downcast_ref::<EasyVideoError>()
                .map(EasyVideoError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = initialize_configuration(cli)?;
    LoggingSystem::new(config.logging()).initialize()?;
    debug!(?config, "effective configuration");

    commands::dispatch(cli, &config)
}
