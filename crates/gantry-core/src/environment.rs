//! Assembles the shared launch environment for container invocations.
//!
//! Start and stop invocations differ in main class and arguments but share
//! one environment: the native library directory and its search-path
//! precondition, the endorsed-standards and installation-root properties,
//! and the bootstrap class path. The builder derives all of it from the
//! installation layout and the container profile, failing before any
//! process is spawned when the installation shape is wrong.

use std::env;
use std::ffi::OsString;

use camino::{Utf8Path, Utf8PathBuf};
use gantry_config::{
    ContainerProfile, InstallationLayout, forward_slashed, path_list_separator,
};
use thiserror::Error;
use tracing::debug;

use crate::launch::LaunchSpec;
use crate::probe::{ProbeError, single_subdirectory};

/// Name of the environment variable searched for the native library
/// directory.
pub const SEARCH_PATH_VARIABLE: &str = "PATH";

/// Supplies the process search path consulted during validation.
///
/// The indirection keeps environment assembly testable without mutating the
/// test process environment.
pub trait SearchPathProvider {
    /// The raw search path value, or `None` when the variable is unset.
    fn search_path(&self) -> Option<OsString>;
}

/// Reads the search path from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSearchPath;

impl SearchPathProvider for SystemSearchPath {
    fn search_path(&self) -> Option<OsString> {
        env::var_os(SEARCH_PATH_VARIABLE)
    }
}

/// Derives the launch environment from a layout and a profile.
pub struct EnvironmentBuilder<'a> {
    layout: &'a InstallationLayout,
    profile: &'a ContainerProfile,
    search_path: &'a dyn SearchPathProvider,
}

impl<'a> EnvironmentBuilder<'a> {
    /// Creates a builder over the given layout and profile.
    pub fn new(
        layout: &'a InstallationLayout,
        profile: &'a ContainerProfile,
        search_path: &'a dyn SearchPathProvider,
    ) -> Self {
        Self {
            layout,
            profile,
            search_path,
        }
    }

    /// Populates `spec` with the shared launch environment.
    ///
    /// The native library directory is rediscovered on every call rather
    /// than cached; the installation can change between operations.
    ///
    /// # Errors
    ///
    /// Returns an error when the native library nesting is malformed or the
    /// discovered directory is not on the process search path.
    pub fn populate(&self, spec: &mut LaunchSpec) -> Result<(), EnvironmentError> {
        let native_dir = self.native_library_dir()?;
        self.ensure_on_search_path(&native_dir)?;
        spec.set_property("java.library.path", forward_slashed(&native_dir));

        if !self.profile.endorsed_dirs.is_empty() {
            let mut endorsed = String::new();
            for dir in &self.profile.endorsed_dirs {
                if !endorsed.is_empty() {
                    endorsed.push(path_list_separator());
                }
                endorsed.push_str(&forward_slashed(&dir.resolve(self.layout)));
            }
            spec.set_property("java.endorsed.dirs", endorsed);
        }

        for key in &self.profile.install_root_keys {
            spec.set_property(key, forward_slashed(self.layout.home()));
        }
        spec.set_property(
            &self.profile.user_root_key,
            forward_slashed(self.layout.config_home()),
        );

        for entry in &self.profile.classpath {
            let resolved = entry.resolve(self.layout);
            if entry.optional && !resolved.is_file() {
                debug!(path = %resolved, "skipping optional class path entry");
                continue;
            }
            spec.push_classpath(resolved);
        }

        Ok(())
    }

    /// Discovers the platform-specific native library directory.
    ///
    /// Installers nest it two levels below the profile's native root, one
    /// directory per detected operating system and architecture.
    fn native_library_dir(&self) -> Result<Utf8PathBuf, EnvironmentError> {
        let root = self.layout.home().join(&self.profile.native_library_root);
        let platform_dir = single_subdirectory(&root)?;
        let arch_dir = single_subdirectory(&platform_dir)?;
        Ok(arch_dir)
    }

    fn ensure_on_search_path(&self, native_dir: &Utf8Path) -> Result<(), EnvironmentError> {
        let Some(raw) = self.search_path.search_path() else {
            return Err(EnvironmentError::SearchPathMissing {
                path: native_dir.to_owned(),
                variable: SEARCH_PATH_VARIABLE,
            });
        };
        let expected = native_dir.as_std_path();
        if env::split_paths(&raw).any(|entry| entry.as_path() == expected) {
            return Ok(());
        }
        Err(EnvironmentError::SearchPathMissing {
            path: native_dir.to_owned(),
            variable: SEARCH_PATH_VARIABLE,
        })
    }
}

/// Errors raised while assembling the launch environment.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// The native library nesting did not match the expected shape.
    #[error(transparent)]
    Probe(#[from] ProbeError),
    /// The native library directory is absent from the search path.
    #[error(
        "native library directory '{path}' is not on {variable}; \
         add it before starting the container"
    )]
    SearchPathMissing {
        /// The directory that must be present.
        path: Utf8PathBuf,
        /// The search path variable consulted.
        variable: &'static str,
    },
}
