//! Drives container start and stop end to end.
//!
//! The controller owns the phase ordering: extra jars are staged before a
//! start, the launch environment is assembled and validated before any
//! process is spawned, the exit code decides success, and only then do the
//! follow-up effects run. Deployables are delivered after a verified start;
//! staged jars are removed after a verified stop and deliberately left in
//! place when a stop fails, so the next start finds the installation as it
//! was.

use std::collections::BTreeMap;
use std::fmt;

use camino::Utf8PathBuf;
use gantry_config::{Config, ContainerProfile, InstallationLayout};
use tracing::{debug, info, warn};

use crate::deploy::{Deployer, InboxDeployer};
use crate::environment::{EnvironmentBuilder, SearchPathProvider, SystemSearchPath};
use crate::error::LifecycleError;
use crate::launch::LaunchSpec;
use crate::runner::{ExitOutcome, JavaRunner, SystemJavaRunner};
use crate::staging;

/// The lifecycle operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    /// Starting the container.
    Start,
    /// Stopping the container.
    Stop,
}

impl fmt::Display for LifecycleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Stop => "stop",
        };
        f.write_str(name)
    }
}

/// Phase of a lifecycle operation, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Copying extra jars into the extension directory.
    Staging,
    /// Assembling and validating the launch environment.
    Preparing,
    /// Running the container invocation.
    Executing,
    /// Interpreting the exit outcome.
    Verifying,
    /// Delivering deployables after a verified start.
    Deploying,
    /// Removing staged jars after a verified stop.
    RollingBack,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Staging => "staging",
            Self::Preparing => "preparing",
            Self::Executing => "executing",
            Self::Verifying => "verifying",
            Self::Deploying => "deploying",
            Self::RollingBack => "rolling-back",
        };
        f.write_str(name)
    }
}

/// Everything describing one container instance under management.
#[derive(Debug, Clone)]
pub struct ContainerInstance {
    /// Resolved installation layout.
    pub layout: InstallationLayout,
    /// Vendor profile interpreted during launch preparation.
    pub profile: ContainerProfile,
    /// Instance properties referenced by profile argument templates.
    pub properties: BTreeMap<String, String>,
    /// Extra jars staged into the extension directory around start/stop.
    pub extra_classpath: Vec<Utf8PathBuf>,
    /// Archives delivered to the container inbox after start.
    pub deployables: Vec<Utf8PathBuf>,
}

impl ContainerInstance {
    /// Resolves an instance from merged configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when required settings are absent or the profile
    /// cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self, LifecycleError> {
        Ok(Self {
            layout: config.installation_layout()?,
            profile: config.container_profile()?,
            properties: config.instance_properties()?,
            extra_classpath: config.extra_classpath().to_vec(),
            deployables: config.deployables().to_vec(),
        })
    }

    fn extension_dir(&self) -> Utf8PathBuf {
        self.layout.home().join(&self.profile.extension_dir)
    }
}

/// Summary of a completed start operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartSummary {
    /// Extra jars copied into the extension directory.
    pub staged: usize,
    /// Archives delivered to the deployment inbox.
    pub deployed: usize,
}

/// Summary of a completed stop operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopSummary {
    /// Staged jars removed during cleanup; zero when cleanup failed.
    pub unstaged: usize,
}

/// Sequences lifecycle phases over injectable process and deployment
/// backends.
pub struct LifecycleController<R, S, D> {
    instance: ContainerInstance,
    runner: R,
    search_path: S,
    deployer: D,
}

impl LifecycleController<SystemJavaRunner, SystemSearchPath, InboxDeployer> {
    /// Creates a controller wired to the real process environment.
    #[must_use]
    pub fn with_system(instance: ContainerInstance) -> Self {
        let deployer = InboxDeployer::from_profile(&instance.layout, &instance.profile);
        Self::new(instance, SystemJavaRunner, SystemSearchPath, deployer)
    }
}

impl<R, S, D> LifecycleController<R, S, D>
where
    R: JavaRunner,
    S: SearchPathProvider,
    D: Deployer,
{
    /// Creates a controller over explicit backends.
    pub fn new(instance: ContainerInstance, runner: R, search_path: S, deployer: D) -> Self {
        Self {
            instance,
            runner,
            search_path,
            deployer,
        }
    }

    /// The instance under management.
    #[must_use]
    pub fn instance(&self) -> &ContainerInstance {
        &self.instance
    }

    /// Starts the container and delivers deployables once it is up.
    ///
    /// Blocks until the start invocation exits. On any failure after
    /// staging, staged jars stay in place for the operator to inspect.
    ///
    /// # Errors
    ///
    /// Returns an error when staging, preparation, the invocation itself,
    /// or redeployment fails.
    pub fn start(&mut self) -> Result<StartSummary, LifecycleError> {
        let extension_dir = self.instance.extension_dir();
        debug!(
            phase = %Phase::Staging,
            count = self.instance.extra_classpath.len(),
            extension_dir = %extension_dir,
            "staging extra class path entries"
        );
        let staged = staging::stage(&self.instance.extra_classpath, &extension_dir)?;

        let spec = self.prepare(LifecycleOp::Start)?;
        self.execute(&spec, LifecycleOp::Start)?;

        debug!(
            phase = %Phase::Deploying,
            count = self.instance.deployables.len(),
            "delivering deployables"
        );
        let mut deployed = 0;
        for artifact in &self.instance.deployables {
            self.deployer.redeploy(artifact)?;
            deployed += 1;
        }

        info!(staged, deployed, "container started");
        Ok(StartSummary { staged, deployed })
    }

    /// Stops the container and cleans up staged jars on success.
    ///
    /// Blocks until the stop invocation exits. Cleanup runs only after a
    /// verified stop; a failed stop leaves every staged jar in place.
    /// Cleanup failures are logged rather than propagated, since the
    /// container itself stopped cleanly.
    ///
    /// # Errors
    ///
    /// Returns an error when preparation or the invocation itself fails.
    pub fn stop(&mut self) -> Result<StopSummary, LifecycleError> {
        let spec = self.prepare(LifecycleOp::Stop)?;
        self.execute(&spec, LifecycleOp::Stop)?;

        let extension_dir = self.instance.extension_dir();
        debug!(
            phase = %Phase::RollingBack,
            count = self.instance.extra_classpath.len(),
            extension_dir = %extension_dir,
            "removing staged extension jars"
        );
        let unstaged = match staging::unstage(&self.instance.extra_classpath, &extension_dir) {
            Ok(count) => count,
            Err(error) => {
                warn!(error = %error, "extension directory cleanup incomplete");
                0
            }
        };

        info!(unstaged, "container stopped");
        Ok(StopSummary { unstaged })
    }

    /// Assembles the launch specification for `operation` without running
    /// it.
    ///
    /// # Errors
    ///
    /// Returns the same preparation errors as [`LifecycleController::start`]
    /// and [`LifecycleController::stop`].
    pub fn inspect(&self, operation: LifecycleOp) -> Result<LaunchSpec, LifecycleError> {
        self.prepare(operation)
    }

    fn prepare(&self, operation: LifecycleOp) -> Result<LaunchSpec, LifecycleError> {
        self.instance.layout.validate()?;
        debug!(
            operation = %operation,
            phase = %Phase::Preparing,
            "assembling launch environment"
        );

        let mut spec = LaunchSpec::new();
        let builder = EnvironmentBuilder::new(
            &self.instance.layout,
            &self.instance.profile,
            &self.search_path,
        );
        builder.populate(&mut spec)?;

        let overlay = match operation {
            LifecycleOp::Start => &self.instance.profile.start,
            LifecycleOp::Stop => &self.instance.profile.stop,
        };
        spec.set_main_class(overlay.main_class.clone());
        for template in &overlay.properties {
            spec.set_property(template.key.clone(), template.value(&self.instance.layout)?);
        }
        for argument in &overlay.arguments {
            spec.push_argument(argument.render(&self.instance.layout, &self.instance.properties)?);
        }
        Ok(spec)
    }

    fn execute(&self, spec: &LaunchSpec, operation: LifecycleOp) -> Result<(), LifecycleError> {
        debug!(
            operation = %operation,
            phase = %Phase::Executing,
            main_class = spec.main_class().unwrap_or_default(),
            "running container invocation"
        );
        let outcome = self.runner.launch(&self.instance.layout, spec)?;

        debug!(operation = %operation, phase = %Phase::Verifying, ?outcome, "invocation finished");
        match outcome {
            ExitOutcome::Code(0) => Ok(()),
            ExitOutcome::Code(code) => Err(LifecycleError::UncleanExit { operation, code }),
            ExitOutcome::Interrupted => Err(LifecycleError::Interrupted { operation }),
        }
    }
}
