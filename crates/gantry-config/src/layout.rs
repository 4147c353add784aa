//! Resolves the directory layout of an installed container.
//!
//! Lifecycle operations need three directories to agree on: the container
//! installation itself, the instance configuration it runs with, and the
//! runtime used to launch it. The layout is resolved once from configuration
//! and revalidated before every launch attempt, since the installation can
//! change between operations.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role a directory plays within an installed container layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutRole {
    /// The container installation directory.
    Home,
    /// The instance configuration directory.
    ConfigHome,
    /// The runtime installation used to launch the container.
    RuntimeHome,
}

impl fmt::Display for LayoutRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Home => "container home",
            Self::ConfigHome => "configuration home",
            Self::RuntimeHome => "runtime home",
        };
        f.write_str(label)
    }
}

/// Absolute directories of an installed container instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationLayout {
    home: Utf8PathBuf,
    config_home: Utf8PathBuf,
    runtime_home: Utf8PathBuf,
}

impl InstallationLayout {
    /// Resolves a layout from configured directories.
    ///
    /// Relative paths are anchored to the current working directory so that
    /// every value handed to a child process or rendered into a property is
    /// absolute. No filesystem inspection happens here; call
    /// [`InstallationLayout::validate`] before acting on the layout.
    ///
    /// # Errors
    ///
    /// Returns an error when the working directory cannot be determined or is
    /// not valid UTF-8.
    pub fn resolve(
        home: Utf8PathBuf,
        config_home: Utf8PathBuf,
        runtime_home: Utf8PathBuf,
    ) -> Result<Self, LayoutError> {
        Ok(Self {
            home: absolutise(home)?,
            config_home: absolutise(config_home)?,
            runtime_home: absolutise(runtime_home)?,
        })
    }

    /// Checks that every layout directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first directory that is missing, is not a
    /// directory, or cannot be inspected.
    pub fn validate(&self) -> Result<(), LayoutError> {
        for (role, path) in [
            (LayoutRole::Home, &self.home),
            (LayoutRole::ConfigHome, &self.config_home),
            (LayoutRole::RuntimeHome, &self.runtime_home),
        ] {
            check_directory(role, path)?;
        }
        Ok(())
    }

    /// The container installation directory.
    #[must_use]
    pub fn home(&self) -> &Utf8Path {
        self.home.as_path()
    }

    /// The instance configuration directory.
    #[must_use]
    pub fn config_home(&self) -> &Utf8Path {
        self.config_home.as_path()
    }

    /// The runtime installation used to launch the container.
    #[must_use]
    pub fn runtime_home(&self) -> &Utf8Path {
        self.runtime_home.as_path()
    }

    /// The directory playing `role` in this layout.
    #[must_use]
    pub fn dir(&self, role: LayoutRole) -> &Utf8Path {
        match role {
            LayoutRole::Home => self.home(),
            LayoutRole::ConfigHome => self.config_home(),
            LayoutRole::RuntimeHome => self.runtime_home(),
        }
    }
}

fn absolutise(path: Utf8PathBuf) -> Result<Utf8PathBuf, LayoutError> {
    if path.is_absolute() {
        return Ok(path);
    }
    let current = env::current_dir().map_err(|source| LayoutError::WorkingDirectory { source })?;
    let current = Utf8PathBuf::from_path_buf(current)
        .map_err(|raw| LayoutError::NonUtf8WorkingDirectory { path: raw })?;
    Ok(current.join(path))
}

fn check_directory(role: LayoutRole, path: &Utf8Path) -> Result<(), LayoutError> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(LayoutError::NotADirectory {
            role,
            path: path.to_owned(),
        }),
        Err(source) if source.kind() == io::ErrorKind::NotFound => Err(LayoutError::Missing {
            role,
            path: path.to_owned(),
        }),
        Err(source) => Err(LayoutError::Inspect {
            role,
            path: path.to_owned(),
            source,
        }),
    }
}

/// Errors raised while resolving or validating an installation layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The working directory could not be read to anchor a relative path.
    #[error("failed to determine the working directory: {source}")]
    WorkingDirectory {
        /// Underlying IO failure.
        source: io::Error,
    },
    /// The working directory contains non UTF-8 components.
    #[error("working directory '{}' is not valid UTF-8", path.display())]
    NonUtf8WorkingDirectory {
        /// The raw directory path.
        path: PathBuf,
    },
    /// A layout directory does not exist.
    #[error("{role} '{path}' does not exist")]
    Missing {
        /// Role the directory plays in the layout.
        role: LayoutRole,
        /// The missing path.
        path: Utf8PathBuf,
    },
    /// A layout path exists but is not a directory.
    #[error("{role} '{path}' is not a directory")]
    NotADirectory {
        /// Role the directory plays in the layout.
        role: LayoutRole,
        /// The offending path.
        path: Utf8PathBuf,
    },
    /// A layout path could not be inspected.
    #[error("failed to inspect {role} '{path}': {source}")]
    Inspect {
        /// Role the directory plays in the layout.
        role: LayoutRole,
        /// The path that failed inspection.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        source: io::Error,
    },
}
