//! Runs assembled launch specifications as real JVM processes.
//!
//! The runner is deliberately synchronous. Container start and stop
//! invocations are foreground administrative actions: the process is
//! spawned, its output is inherited by the caller's terminal, and the
//! calling thread blocks until it exits. Callers needing early termination
//! spawn explicitly and keep the [`LaunchHandle`].

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};

use camino::Utf8PathBuf;
use gantry_config::InstallationLayout;
use thiserror::Error;
use tracing::debug;

use crate::launch::LaunchSpec;

/// File name of the runtime launcher below `<runtime home>/bin`.
const JAVA_BINARY: &str = if cfg!(windows) { "java.exe" } else { "java" };

/// How a launched process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The process exited on its own with a status code.
    Code(i32),
    /// The process was terminated before reporting a status code, for
    /// example by a signal.
    Interrupted,
}

impl ExitOutcome {
    /// Maps a process exit status onto an outcome.
    #[must_use]
    pub fn from_status(status: ExitStatus) -> Self {
        status.code().map_or(Self::Interrupted, Self::Code)
    }

    /// Whether the outcome is a clean zero exit.
    #[must_use]
    pub const fn is_clean(self) -> bool {
        matches!(self, Self::Code(0))
    }
}

/// Launches container invocations and reports how they finished.
pub trait JavaRunner {
    /// Runs `spec` to completion, blocking the calling thread.
    ///
    /// # Errors
    ///
    /// Returns an error when the specification is incomplete or the process
    /// cannot be spawned or awaited. A process that runs and exits
    /// uncleanly is not an error at this level; the outcome carries the
    /// code.
    fn launch(
        &self,
        layout: &InstallationLayout,
        spec: &LaunchSpec,
    ) -> Result<ExitOutcome, LaunchError>;
}

/// Runs invocations with the runtime bundled in the installation layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemJavaRunner;

impl SystemJavaRunner {
    /// Spawns `spec` without waiting, handing back a [`LaunchHandle`].
    ///
    /// # Errors
    ///
    /// Returns an error when the specification lacks a main class or the
    /// process cannot be spawned.
    pub fn spawn(
        &self,
        layout: &InstallationLayout,
        spec: &LaunchSpec,
    ) -> Result<LaunchHandle, LaunchError> {
        let main_class = spec.main_class().ok_or(LaunchError::MissingMainClass)?;
        let binary = layout.runtime_home().join("bin").join(JAVA_BINARY);

        let mut command = Command::new(binary.as_std_path());
        if !spec.classpath().is_empty() {
            command.arg("-cp").arg(spec.classpath_line());
        }
        for (key, value) in spec.properties() {
            command.arg(format!("-D{key}={value}"));
        }
        command.arg(main_class);
        command.args(spec.arguments());
        command
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        debug!(binary = %binary, main_class, "spawning container runtime");
        let child = command.spawn().map_err(|source| LaunchError::Spawn {
            binary: binary.clone(),
            source,
        })?;
        Ok(LaunchHandle { child, binary })
    }
}

impl JavaRunner for SystemJavaRunner {
    fn launch(
        &self,
        layout: &InstallationLayout,
        spec: &LaunchSpec,
    ) -> Result<ExitOutcome, LaunchError> {
        let mut handle = self.spawn(layout, spec)?;
        handle.wait()
    }
}

/// A spawned container invocation.
///
/// Dropping the handle leaves the process running; call
/// [`LaunchHandle::wait`] to reap it or [`LaunchHandle::terminate`] to kill
/// it first.
#[derive(Debug)]
pub struct LaunchHandle {
    child: Child,
    binary: Utf8PathBuf,
}

impl LaunchHandle {
    /// Operating system identifier of the spawned process.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Blocks until the process exits.
    ///
    /// # Errors
    ///
    /// Returns an error when waiting on the process fails.
    pub fn wait(&mut self) -> Result<ExitOutcome, LaunchError> {
        let status = self.child.wait().map_err(|source| LaunchError::Wait {
            binary: self.binary.clone(),
            source,
        })?;
        debug!(binary = %self.binary, ?status, "container runtime exited");
        Ok(ExitOutcome::from_status(status))
    }

    /// Kills the process and reaps it.
    ///
    /// # Errors
    ///
    /// Returns an error when the kill signal cannot be delivered or the
    /// process cannot be reaped afterwards.
    pub fn terminate(&mut self) -> Result<ExitOutcome, LaunchError> {
        self.child.kill().map_err(|source| LaunchError::Terminate {
            binary: self.binary.clone(),
            source,
        })?;
        self.wait()
    }
}

/// Errors raised while spawning or awaiting a container invocation.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The launch specification carries no main class.
    #[error("launch specification has no main class")]
    MissingMainClass,
    /// The runtime process could not be spawned.
    #[error("failed to spawn container runtime '{binary}': {source}")]
    Spawn {
        /// The launcher binary.
        binary: Utf8PathBuf,
        /// Underlying IO failure.
        source: io::Error,
    },
    /// Waiting on the runtime process failed.
    #[error("failed to wait for container runtime '{binary}': {source}")]
    Wait {
        /// The launcher binary.
        binary: Utf8PathBuf,
        /// Underlying IO failure.
        source: io::Error,
    },
    /// Terminating the runtime process failed.
    #[error("failed to terminate container runtime '{binary}': {source}")]
    Terminate {
        /// The launcher binary.
        binary: Utf8PathBuf,
        /// Underlying IO failure.
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::TempDir;

    fn empty_layout() -> (TempDir, InstallationLayout) {
        let guard = TempDir::new().expect("create temporary directory");
        let root = Utf8PathBuf::from_path_buf(guard.path().to_path_buf())
            .expect("temporary directory should be UTF-8");
        let layout = InstallationLayout::resolve(
            root.join("was"),
            root.join("profiles/node01"),
            root.join("java"),
        )
        .expect("resolve layout");
        (guard, layout)
    }

    #[test]
    fn launch_requires_a_main_class() {
        let (_guard, layout) = empty_layout();
        let spec = LaunchSpec::new();
        let error = SystemJavaRunner
            .launch(&layout, &spec)
            .expect_err("no main class");
        assert!(matches!(error, LaunchError::MissingMainClass));
    }

    #[test]
    fn missing_runtime_binary_fails_to_spawn() {
        let (_guard, layout) = empty_layout();
        let mut spec = LaunchSpec::new();
        spec.set_main_class("com.example.Main");
        let error = SystemJavaRunner
            .launch(&layout, &spec)
            .expect_err("runtime binary is absent");
        assert!(matches!(error, LaunchError::Spawn { .. }));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        use rstest::rstest;

        fn install_fake_runtime(layout: &InstallationLayout, body: &str) {
            let bin = layout.runtime_home().join("bin");
            fs::create_dir_all(&bin).expect("create bin directory");
            let java = bin.join("java");
            fs::write(&java, body).expect("write fake runtime");
            let mut permissions = fs::metadata(&java)
                .expect("stat fake runtime")
                .permissions();
            permissions.set_mode(0o755);
            fs::set_permissions(&java, permissions).expect("mark fake runtime executable");
        }

        fn minimal_spec() -> LaunchSpec {
            let mut spec = LaunchSpec::new();
            spec.set_main_class("com.ibm.ws.bootstrap.WSLauncher");
            spec
        }

        #[rstest]
        #[case::clean(0)]
        #[case::unclean(42)]
        fn exit_codes_pass_through(#[case] code: i32) {
            let (_guard, layout) = empty_layout();
            install_fake_runtime(&layout, &format!("#!/bin/sh\nexit {code}\n"));
            let outcome = SystemJavaRunner
                .launch(&layout, &minimal_spec())
                .expect("launch fake runtime");
            assert_eq!(outcome, ExitOutcome::Code(code));
            assert_eq!(outcome.is_clean(), code == 0);
        }

        #[test]
        fn signal_deaths_are_interrupted() {
            let (_guard, layout) = empty_layout();
            install_fake_runtime(&layout, "#!/bin/sh\nkill -KILL $$\n");
            let outcome = SystemJavaRunner
                .launch(&layout, &minimal_spec())
                .expect("launch fake runtime");
            assert_eq!(outcome, ExitOutcome::Interrupted);
        }

        #[test]
        fn terminate_kills_and_reaps() {
            let (_guard, layout) = empty_layout();
            install_fake_runtime(&layout, "#!/bin/sh\nsleep 30\n");
            let mut handle = SystemJavaRunner
                .spawn(&layout, &minimal_spec())
                .expect("spawn fake runtime");
            let outcome = handle.terminate().expect("terminate fake runtime");
            assert_eq!(outcome, ExitOutcome::Interrupted);
        }
    }
}
