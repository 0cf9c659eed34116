//! Command implementations

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::CommandFactory;
use tracing::info;

use crate::adapters::{EasyVideoConfig, ProcessRunner};
use crate::app::{OperationInteractor, OperationRequest};
use crate::cli::args::InvocationArgs;
use crate::cli::Cli;
use crate::domain::model::{Outcome, Session};
use crate::error::EasyVideoError;
use crate::registry::{self, CatalogueEntry};

/// Run whatever the command line asks for
pub fn dispatch(cli: &Cli, config: &EasyVideoConfig) -> Result<()> {
    if cli.list {
        return list(cli.json);
    }
    if let Some(pattern) = &cli.search {
        return search(pattern, cli.json);
    }
    run_operation(cli, config)
}

/// Execute the list command
pub fn list(json: bool) -> Result<()> {
    print_entries(&registry::catalogue(), json)
}

/// Execute the search command
pub fn search(pattern: &str, json: bool) -> Result<()> {
    let entries = registry::search(pattern)?;
    info!("{} operations match '{}'", entries.len(), pattern);
    print_entries(&entries, json)
}

fn print_entries(entries: &[CatalogueEntry], json: bool) -> Result<()> {
    if json {
        let json = serde_json::to_string_pretty(entries)
            .context("Failed to serialize catalogue to JSON")?;
        println!("{}", json);
    } else if !entries.is_empty() {
        println!("{}", registry::format_entries(entries));
    }
    Ok(())
}

/// Build the session context for one invocation
pub fn build_session(invocation: &InvocationArgs, config: &EasyVideoConfig, debug: bool) -> Session {
    let input = invocation.input.clone().unwrap_or_default();
    let output = invocation
        .output
        .clone()
        .unwrap_or_else(|| config.output.clone());
    Session::new(input)
        .with_output(output)
        .with_working_dir(config.working_dir.clone())
        .with_debug(debug)
}

/// Execute one catalogue operation
pub fn run_operation(cli: &Cli, config: &EasyVideoConfig) -> Result<()> {
    let invocation = &cli.invocation;
    let operation = invocation
        .operation
        .clone()
        .context("No operation given; run with --list to see the catalogue")?;

    if let Some(flag) = misplaced_flag(&invocation.args) {
        return Err(EasyVideoError::invalid_params(
            &operation,
            format!("option '{}' must come before the input file", flag),
        )
        .into());
    }

    let request = OperationRequest {
        session: build_session(invocation, config, cli.debug),
        operation,
        args: invocation.args.clone(),
        show: cli.show,
    };
    info!(
        operation = %request.operation,
        input = request.session.input_path(),
        output = request.session.output(),
        "Starting operation"
    );

    let interactor = OperationInteractor::new(Arc::new(ProcessRunner::new()), config.build_options());
    let outcome = interactor.execute(&request)?;
    print_outcome(&outcome);
    Ok(())
}

/// First operation argument that is really one of our own long options
pub fn misplaced_flag(args: &[String]) -> Option<&str> {
    let command = Cli::command();
    let known: Vec<&str> = command.get_arguments().filter_map(|arg| arg.get_long()).collect();
    args.iter().map(String::as_str).find(|arg| {
        arg.strip_prefix("--")
            .map(|name| name.split_once('=').map_or(name, |(name, _)| name))
            .map_or(false, |name| known.contains(&name))
    })
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::DryRun(command) => println!("{}", command),
        Outcome::Completed { command } => info!("Completed: {}", command),
        Outcome::Duration(seconds) => println!("{}", seconds),
        Outcome::Report(report) => print!("{}", report),
    }
}
