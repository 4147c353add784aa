//! Command-line runtime for the gantry container controller.
//!
//! The module owns argument parsing, configuration bootstrapping, and the
//! wiring between parsed commands and the lifecycle controller. The interface
//! is designed to be exercised both from the binary entrypoint and from tests
//! where configuration loading and IO streams can be substituted.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use gantry_config::Config;
use gantry_core::{
    ContainerInstance, LaunchSpec, LifecycleController, LifecycleError, LifecycleOp,
};
use thiserror::Error;

mod config;
pub mod telemetry;

use config::{ConfigArgumentSplit, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use telemetry::TelemetryError;

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: This list must be kept in sync with the configuration flags
/// defined in `gantry-config`. When adding new configuration options, update
/// this array accordingly.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--home",
    "--config-home",
    "--runtime-home",
    "--profile",
    "--profile-path",
    "--properties",
    "--extra-classpath",
    "--deployables",
    "--log-filter",
    "--log-format",
];

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
#[must_use]
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let cli_arguments = prepare_cli_arguments(&args, &split);

    let cli = match Cli::try_parse_from(cli_arguments) {
        Ok(cli) => cli,
        Err(error) => return report_usage(&error, stdout, stderr),
    };

    let result = loader
        .load(&split.config_arguments)
        .and_then(|config| execute(&cli, &config, stdout));

    match result {
        Ok(exit_code) => exit_code,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    let mut cli_arguments: Vec<OsString> = Vec::new();
    if let Some(first) = args.first() {
        cli_arguments.push(first.clone());
    }
    if split.command_start < args.len() {
        cli_arguments.extend(args[split.command_start..].iter().cloned());
    }
    cli_arguments
}

/// Reports a parse failure, or renders help and version requests.
///
/// Help and version output is not a usage failure. Clap models both as
/// errors, so the stream and exit code follow `Error::use_stderr`.
fn report_usage<W, E>(error: &clap::Error, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    W: Write,
    E: Write,
{
    if error.use_stderr() {
        let _ = write!(stderr, "{error}");
        ExitCode::FAILURE
    } else {
        let _ = write!(stdout, "{error}");
        ExitCode::SUCCESS
    }
}

fn execute<W>(cli: &Cli, config: &Config, stdout: &mut W) -> Result<ExitCode, AppError>
where
    W: Write,
{
    telemetry::initialise(config)?;

    let instance = ContainerInstance::from_config(config)?;
    let mut controller = LifecycleController::with_system(instance);

    match cli.command {
        CliCommand::Start => {
            let summary = controller.start()?;
            writeln!(
                stdout,
                "container started (staged {}, deployed {})",
                summary.staged, summary.deployed
            )
            .map_err(AppError::Output)?;
        }
        CliCommand::Stop => {
            let summary = controller.stop()?;
            writeln!(stdout, "container stopped (unstaged {})", summary.unstaged)
                .map_err(AppError::Output)?;
        }
        CliCommand::Inspect { operation } => {
            let spec = controller.inspect(operation.into())?;
            render_launch_spec(&spec, stdout).map_err(AppError::Output)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Writes the launch environment line by line for operator inspection.
fn render_launch_spec<W>(spec: &LaunchSpec, stdout: &mut W) -> io::Result<()>
where
    W: Write,
{
    if let Some(main_class) = spec.main_class() {
        writeln!(stdout, "main class: {main_class}")?;
    }
    for entry in spec.classpath() {
        writeln!(stdout, "classpath: {entry}")?;
    }
    for (key, value) in spec.properties() {
        writeln!(stdout, "property: -D{key}={value}")?;
    }
    for argument in spec.arguments() {
        writeln!(stdout, "argument: {argument}")?;
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    name = "gantry",
    about = "Lifecycle controller for installed application servers",
    disable_help_subcommand = true
)]
struct Cli {
    /// The lifecycle command to run.
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum CliCommand {
    /// Starts the configured container and delivers pending deployables.
    Start,
    /// Stops the configured container and removes staged class path entries.
    Stop,
    /// Prints the launch environment for an operation without spawning it.
    Inspect {
        /// The operation whose launch environment to print.
        #[arg(value_enum, default_value_t = OperationArg::Start)]
        operation: OperationArg,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum OperationArg {
    /// The environment used to start the container.
    Start,
    /// The environment used to stop the container.
    Stop,
}

impl From<OperationArg> for LifecycleOp {
    fn from(operation: OperationArg) -> Self {
        match operation {
            OperationArg::Start => Self::Start,
            OperationArg::Stop => Self::Stop,
        }
    }
}

#[derive(Debug, Error)]
enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("container lifecycle command failed: {0}")]
    Lifecycle(#[from] LifecycleError),
    #[error("failed to write command output: {0}")]
    Output(io::Error),
}
