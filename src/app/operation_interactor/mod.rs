// Operation interactor - Builds an operation's command and runs it, or shows it

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::model::*;
use crate::error::{EasyVideoError, EasyVideoResult};
use crate::ports::*;
use crate::registry::{self, BuildOptions, CommandPlan, ScreencastPlan};
use crate::utils::time::parse_tool_duration;

/// One operation invocation
#[derive(Debug, Clone)]
pub struct OperationRequest {
    pub session: Session,
    pub operation: String,
    pub args: Vec<String>,
    /// Dry-run: return the command instead of running it
    pub show: bool,
}

impl OperationRequest {
    pub fn new(session: Session, operation: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            session,
            operation: operation.into(),
            args,
            show: false,
        }
    }

    pub fn dry_run(mut self) -> Self {
        self.show = true;
        self
    }
}

/// Interactor for running catalogue operations
pub struct OperationInteractor {
    runner: Arc<dyn CommandRunner>,
    options: BuildOptions,
}

impl OperationInteractor {
    /// Create new operation interactor with an injected runner
    pub fn new(runner: Arc<dyn CommandRunner>, options: BuildOptions) -> Self {
        Self { runner, options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Execute one operation request
    pub fn execute(&self, request: &OperationRequest) -> EasyVideoResult<Outcome> {
        let plan = registry::build(
            &request.operation,
            &request.session,
            &request.args,
            &self.options,
        )?;
        let operation = registry::lookup(&request.operation)?.name;
        debug!(operation, ?plan, "built command plan");

        if request.show {
            return Ok(Outcome::DryRun(plan.render()));
        }

        match plan {
            CommandPlan::Run(line) => {
                self.run_checked(operation, &line)?;
                Ok(Outcome::Completed {
                    command: line.to_string(),
                })
            }
            CommandPlan::Duration(line) => {
                let captured = self.capture_checked(operation, &line)?;
                parse_tool_duration(&captured.stdout)
                    .map(Outcome::Duration)
                    .ok_or_else(|| EasyVideoError::DurationUnavailable {
                        input: request.session.input_path().to_string(),
                    })
            }
            CommandPlan::Report(line) => {
                let captured = self.capture_checked(operation, &line)?;
                let mut report = captured.stdout;
                report.push_str(&captured.stderr);
                Ok(Outcome::Report(report))
            }
            CommandPlan::Screencast(plan) => self.run_screencast(operation, &plan),
        }
    }

    /// Record into a private temporary directory, then transcode.
    ///
    /// The directory and the intermediate image are removed on every path out.
    fn run_screencast(&self, operation: &str, plan: &ScreencastPlan) -> EasyVideoResult<Outcome> {
        let workspace = tempfile::Builder::new()
            .prefix("easyvideo-screencast-")
            .tempdir_in(plan.working_dir())?;
        let intermediate = workspace.path().join(plan.intermediate_name());

        let record = plan.record_command(&intermediate);
        self.run_checked(operation, &record)?;

        let transcode = plan.transcode_command(&intermediate);
        self.run_checked(operation, &transcode)?;

        workspace.close()?;
        Ok(Outcome::Completed {
            command: format!("{} && {}", record, transcode),
        })
    }

    fn run_checked(&self, operation: &str, line: &CommandLine) -> EasyVideoResult<()> {
        info!("Using -> {}", line);
        let exit = self.runner.run(line)?;
        if !exit.success() {
            warn!(operation, code = ?exit.code, "external tool failed");
            return Err(EasyVideoError::ExternalToolFailure {
                operation: operation.to_string(),
                command: line.to_string(),
                code: exit.code,
                stderr: None,
            });
        }
        Ok(())
    }

    fn capture_checked(&self, operation: &str, line: &CommandLine) -> EasyVideoResult<CapturedOutput> {
        info!("Using -> {}", line);
        let captured = self.runner.capture(line)?;
        if !captured.exit.success() {
            warn!(operation, code = ?captured.exit.code, "external tool failed");
            return Err(EasyVideoError::ExternalToolFailure {
                operation: operation.to_string(),
                command: line.to_string(),
                code: captured.exit.code,
                stderr: Some(captured.stderr),
            });
        }
        Ok(captured)
    }
}
