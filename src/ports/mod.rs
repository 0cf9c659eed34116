// Ports - Interface definitions (contracts)

use crate::domain::model::CommandLine;
use crate::error::EasyVideoResult;

/// Exit information of a finished external process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolExit {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl ToolExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Output of a process whose streams were captured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub exit: ToolExit,
    pub stdout: String,
    pub stderr: String,
}

/// Port for running external media tools.
///
/// Both calls block until the process exits.
pub trait CommandRunner {
    /// Run with inherited standard streams
    fn run(&self, command: &CommandLine) -> EasyVideoResult<ToolExit>;

    /// Run and capture standard output and standard error
    fn capture(&self, command: &CommandLine) -> EasyVideoResult<CapturedOutput>;
}
