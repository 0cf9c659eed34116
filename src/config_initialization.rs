//! Configuration initialization and hierarchy management

use tracing::debug;

use crate::adapters::{EasyVideoConfig, TomlConfigAdapter};
use crate::cli::Cli;
use crate::error::EasyVideoResult;
use crate::utils::logging::LogLevel;

/// Build the effective configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration(cli: &Cli) -> EasyVideoResult<EasyVideoConfig> {
    let mut config = TomlConfigAdapter::load(cli.config.as_deref())?;

    let env_overrides = TomlConfigAdapter::apply_env(&mut config, |var| std::env::var(var).ok())?;
    if env_overrides > 0 {
        debug!("Applied {} environment variable overrides", env_overrides);
    }

    let cli_overrides = apply_cli_overrides(&mut config, cli)?;
    if cli_overrides > 0 {
        debug!("Applied {} CLI configuration overrides", cli_overrides);
    }

    Ok(config)
}

/// Apply command-line flags on top of file and environment settings
pub fn apply_cli_overrides(config: &mut EasyVideoConfig, cli: &Cli) -> EasyVideoResult<usize> {
    let mut applied = 0;

    if let Some(dir) = &cli.working_dir {
        config.working_dir = dir.clone();
        applied += 1;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.parse()?;
        applied += 1;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
        applied += 1;
    }
    if cli.no_overwrite {
        config.overwrite = false;
        applied += 1;
    }
    if cli.debug {
        config.log_level = config.log_level.max(LogLevel::Debug);
        applied += 1;
    }

    Ok(applied)
}
