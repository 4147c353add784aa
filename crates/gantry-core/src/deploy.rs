//! Redeploys archives by dropping them into the container inbox.
//!
//! Containers with a monitored deployment directory pick up archives copied
//! into it while running. Redeployment after start is therefore a plain
//! copy: the archive lands under its own file name, replacing any earlier
//! version.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use gantry_config::{ContainerProfile, InstallationLayout};
use thiserror::Error;
use tracing::debug;

/// Redeploys one archive into a running container.
pub trait Deployer {
    /// Makes `artifact` available to the running container.
    ///
    /// # Errors
    ///
    /// Returns an error when the artifact cannot be delivered.
    fn redeploy(&self, artifact: &Utf8Path) -> Result<(), DeployError>;
}

/// Copies archives into the monitored inbox directory.
#[derive(Debug, Clone)]
pub struct InboxDeployer {
    inbox: Utf8PathBuf,
}

impl InboxDeployer {
    /// Creates a deployer writing into `inbox`.
    pub fn new(inbox: impl Into<Utf8PathBuf>) -> Self {
        Self {
            inbox: inbox.into(),
        }
    }

    /// Creates a deployer for the inbox declared by `profile`.
    #[must_use]
    pub fn from_profile(layout: &InstallationLayout, profile: &ContainerProfile) -> Self {
        Self::new(profile.deploy_inbox.resolve(layout))
    }

    /// The inbox directory archives are copied into.
    #[must_use]
    pub fn inbox(&self) -> &Utf8Path {
        self.inbox.as_path()
    }
}

impl Deployer for InboxDeployer {
    fn redeploy(&self, artifact: &Utf8Path) -> Result<(), DeployError> {
        let name = artifact
            .file_name()
            .ok_or_else(|| DeployError::MissingFileName {
                artifact: artifact.to_owned(),
            })?;
        fs::create_dir_all(&self.inbox).map_err(|source| DeployError::Inbox {
            path: self.inbox.clone(),
            source,
        })?;
        let destination = self.inbox.join(name);
        fs::copy(artifact, &destination).map_err(|source| DeployError::Copy {
            artifact: artifact.to_owned(),
            destination: destination.clone(),
            source,
        })?;
        debug!(artifact = %artifact, destination = %destination, "redeployed archive");
        Ok(())
    }
}

/// Errors raised while redeploying archives.
#[derive(Debug, Error)]
pub enum DeployError {
    /// An artifact path has no file name to deliver under.
    #[error("deployable '{artifact}' has no file name")]
    MissingFileName {
        /// The offending artifact path.
        artifact: Utf8PathBuf,
    },
    /// The inbox directory could not be prepared.
    #[error("failed to prepare deployment inbox '{path}': {source}")]
    Inbox {
        /// The inbox directory.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        source: io::Error,
    },
    /// Copying an artifact into the inbox failed.
    #[error("failed to deploy '{artifact}' to '{destination}': {source}")]
    Copy {
        /// The source artifact.
        artifact: Utf8PathBuf,
        /// The inbox destination.
        destination: Utf8PathBuf,
        /// Underlying IO failure.
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .expect("temporary directory should be UTF-8")
    }

    #[test]
    fn copies_archives_under_their_file_names() {
        let dir = TempDir::new().expect("create temporary directory");
        let root = utf8_root(&dir);
        let artifact = root.join("orders.war");
        fs::write(&artifact, b"archive").expect("write artifact");

        let deployer = InboxDeployer::new(root.join("installableApps"));
        deployer.redeploy(&artifact).expect("redeploy archive");

        assert!(root.join("installableApps/orders.war").is_file());
    }

    #[test]
    fn creates_the_inbox_when_absent() {
        let dir = TempDir::new().expect("create temporary directory");
        let root = utf8_root(&dir);
        let artifact = root.join("orders.war");
        fs::write(&artifact, b"archive").expect("write artifact");

        let inbox = root.join("deep/nested/inbox");
        let deployer = InboxDeployer::new(inbox.clone());
        deployer.redeploy(&artifact).expect("redeploy archive");
        assert!(inbox.join("orders.war").is_file());
    }

    #[test]
    fn replaces_previous_versions() {
        let dir = TempDir::new().expect("create temporary directory");
        let root = utf8_root(&dir);
        let artifact = root.join("orders.war");
        let deployer = InboxDeployer::new(root.join("installableApps"));

        fs::write(&artifact, b"v1").expect("write artifact");
        deployer.redeploy(&artifact).expect("deploy first version");
        fs::write(&artifact, b"v2").expect("update artifact");
        deployer.redeploy(&artifact).expect("deploy second version");

        let delivered =
            fs::read(root.join("installableApps/orders.war")).expect("read delivered archive");
        assert_eq!(delivered, b"v2");
    }

    #[test]
    fn missing_artifacts_are_reported() {
        let dir = TempDir::new().expect("create temporary directory");
        let root = utf8_root(&dir);
        let deployer = InboxDeployer::new(root.join("installableApps"));

        let error = deployer
            .redeploy(&root.join("absent.war"))
            .expect_err("artifact is missing");
        assert!(matches!(error, DeployError::Copy { .. }));
    }
}
