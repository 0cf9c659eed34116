//! Process execution adapter
//!
//! Runs external tools through `std::process::Command`, without a shell.

use std::io;

use tracing::debug;

use crate::domain::model::CommandLine;
use crate::error::{EasyVideoError, EasyVideoResult};
use crate::ports::{CapturedOutput, CommandRunner, ToolExit};

/// Runs commands as child processes of the current process
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

fn spawn_error(command: &CommandLine, err: io::Error) -> EasyVideoError {
    if err.kind() == io::ErrorKind::NotFound {
        EasyVideoError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not installed or not on PATH", command.program()),
        ))
    } else {
        EasyVideoError::Io(err)
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &CommandLine) -> EasyVideoResult<ToolExit> {
        debug!(program = command.program(), args = ?command.arguments(), "spawning");
        let status = command
            .to_command()
            .status()
            .map_err(|e| spawn_error(command, e))?;
        Ok(ToolExit {
            code: status.code(),
        })
    }

    fn capture(&self, command: &CommandLine) -> EasyVideoResult<CapturedOutput> {
        debug!(program = command.program(), args = ?command.arguments(), "spawning with captured output");
        let output = command
            .to_command()
            .output()
            .map_err(|e| spawn_error(command, e))?;
        Ok(CapturedOutput {
            exit: ToolExit {
                code: output.status.code(),
            },
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
