//! Error type spanning a whole lifecycle operation.

use gantry_config::{ConfigError, LayoutError, ProfileError};
use thiserror::Error;

use crate::controller::LifecycleOp;
use crate::deploy::DeployError;
use crate::environment::EnvironmentError;
use crate::runner::LaunchError;
use crate::staging::StagingError;

/// Any failure a lifecycle operation can surface.
///
/// Phase-specific errors pass through unchanged; the two variants defined
/// here describe a process that ran but did not finish cleanly.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Configuration could not be resolved into lifecycle inputs.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The container profile could not be loaded or rendered.
    #[error(transparent)]
    Profile(#[from] ProfileError),
    /// The installation layout is absent or malformed.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// The launch environment could not be assembled.
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
    /// Extra class path entries could not be staged.
    #[error(transparent)]
    Staging(#[from] StagingError),
    /// The runtime process could not be spawned or awaited.
    #[error(transparent)]
    Launch(#[from] LaunchError),
    /// An archive could not be redeployed.
    #[error(transparent)]
    Deploy(#[from] DeployError),
    /// The runtime process ran and exited with a nonzero code.
    #[error("container {operation} exited with code {code}")]
    UncleanExit {
        /// The operation whose process exited.
        operation: LifecycleOp,
        /// The nonzero exit code.
        code: i32,
    },
    /// The runtime process was terminated before reporting an exit code.
    #[error("container {operation} was terminated before reporting an exit code")]
    Interrupted {
        /// The operation whose process was terminated.
        operation: LifecycleOp,
    },
}
