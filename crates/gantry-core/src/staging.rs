//! Copies extra class path jars in and out of the container extension
//! directory.
//!
//! Installed containers only load what sits inside the installation, so
//! extra jars are staged by copying them under the extension directory
//! before start and removed again after a successful stop. Destinations are
//! always derived from the entry file name; staging never mirrors source
//! directory structure.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::debug;

/// Copies each entry into the extension directory.
///
/// Destinations keep only the entry file name. An existing destination is
/// overwritten, which makes repeated starts idempotent. Returns the number
/// of entries copied.
///
/// # Errors
///
/// Returns an error for an entry without a file name or when a copy fails;
/// earlier copies are left in place.
pub fn stage(entries: &[Utf8PathBuf], extension_dir: &Utf8Path) -> Result<usize, StagingError> {
    let mut staged = 0;
    for entry in entries {
        let destination = staged_destination(entry, extension_dir)?;
        fs::copy(entry, &destination).map_err(|source| StagingError::Copy {
            entry: entry.clone(),
            destination: destination.clone(),
            source,
        })?;
        debug!(entry = %entry, destination = %destination, "staged extension jar");
        staged += 1;
    }
    Ok(staged)
}

/// Removes the staged counterpart of each entry from the extension
/// directory.
///
/// Missing destinations are skipped, so the operation is idempotent. Every
/// entry is attempted before the first failure, if any, is reported.
/// Returns the number of entries removed.
///
/// # Errors
///
/// Returns the first removal failure other than a missing destination.
pub fn unstage(entries: &[Utf8PathBuf], extension_dir: &Utf8Path) -> Result<usize, StagingError> {
    let mut removed = 0;
    let mut first_error = None;
    for entry in entries {
        let destination = match staged_destination(entry, extension_dir) {
            Ok(destination) => destination,
            Err(error) => {
                if first_error.is_none() {
                    first_error = Some(error);
                }
                continue;
            }
        };
        match fs::remove_file(&destination) {
            Ok(()) => {
                debug!(destination = %destination, "removed staged extension jar");
                removed += 1;
            }
            Err(source) if source.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                if first_error.is_none() {
                    first_error = Some(StagingError::Remove {
                        destination,
                        source,
                    });
                }
            }
        }
    }
    match first_error {
        Some(error) => Err(error),
        None => Ok(removed),
    }
}

fn staged_destination(
    entry: &Utf8Path,
    extension_dir: &Utf8Path,
) -> Result<Utf8PathBuf, StagingError> {
    let name = entry.file_name().ok_or_else(|| StagingError::MissingFileName {
        entry: entry.to_owned(),
    })?;
    Ok(extension_dir.join(name))
}

/// Errors raised while staging extra class path entries.
#[derive(Debug, Error)]
pub enum StagingError {
    /// An entry path has no file name to derive a destination from.
    #[error("extra class path entry '{entry}' has no file name")]
    MissingFileName {
        /// The offending entry.
        entry: Utf8PathBuf,
    },
    /// Copying an entry into the extension directory failed.
    #[error("failed to stage '{entry}' as '{destination}': {source}")]
    Copy {
        /// The source entry.
        entry: Utf8PathBuf,
        /// The derived destination.
        destination: Utf8PathBuf,
        /// Underlying IO failure.
        source: io::Error,
    },
    /// Removing a staged entry failed.
    #[error("failed to remove staged entry '{destination}': {source}")]
    Remove {
        /// The staged destination.
        destination: Utf8PathBuf,
        /// Underlying IO failure.
        source: io::Error,
    },
}
