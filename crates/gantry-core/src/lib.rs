//! Lifecycle control for installed JVM application servers.
//!
//! The crate starts and stops a container that is already installed on the
//! local machine by running the vendor's own launcher classes in a child
//! JVM. A [`ContainerProfile`](gantry_config::ContainerProfile) describes
//! the vendor specifics; this crate supplies the machinery: probing the
//! installation shape, assembling the launch environment, staging extra
//! jars, running the invocation to completion, and delivering deployables
//! once the container is up.

pub mod controller;
pub mod deploy;
pub mod environment;
pub mod error;
pub mod launch;
pub mod probe;
pub mod runner;
pub mod staging;

pub use controller::{
    ContainerInstance, LifecycleController, LifecycleOp, Phase, StartSummary, StopSummary,
};
pub use deploy::{DeployError, Deployer, InboxDeployer};
pub use environment::{
    EnvironmentBuilder, EnvironmentError, SEARCH_PATH_VARIABLE, SearchPathProvider,
    SystemSearchPath,
};
pub use error::LifecycleError;
pub use launch::LaunchSpec;
pub use probe::{ProbeError, single_subdirectory};
pub use runner::{ExitOutcome, JavaRunner, LaunchError, LaunchHandle, SystemJavaRunner};
pub use staging::StagingError;
