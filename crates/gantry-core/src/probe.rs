//! Inspects installation directories whose exact names vary per machine.
//!
//! Container installations nest their native libraries below directories
//! named after the operating system and architecture the installer detected,
//! for example `lib/native/linux/x86_64`. The names are not predictable, but
//! a healthy installation has exactly one entry at each level, so the probe
//! descends by requiring a sole child.

use std::fs;
use std::io;
use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Returns the sole child of `dir`.
///
/// Every child counts, whatever its kind: a stray file next to the expected
/// directory marks a misconfigured installation rather than noise to skip.
///
/// # Errors
///
/// Returns an error when `dir` is absent or not a directory, cannot be read,
/// does not contain exactly one child, or a child path is not valid UTF-8.
pub fn single_subdirectory(dir: &Utf8Path) -> Result<Utf8PathBuf, ProbeError> {
    if !dir.is_dir() {
        return Err(ProbeError::NotFound {
            path: dir.to_owned(),
        });
    }

    let entries = fs::read_dir(dir).map_err(|source| ProbeError::ReadDir {
        path: dir.to_owned(),
        source,
    })?;

    let mut found: Vec<Utf8PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ProbeError::ReadDir {
            path: dir.to_owned(),
            source,
        })?;
        let path = Utf8PathBuf::from_path_buf(entry.path())
            .map_err(|raw| ProbeError::NonUtf8 { path: raw })?;
        found.push(path);
    }

    // Directory iteration order is platform dependent; sort so ambiguity
    // reports are stable.
    found.sort();

    let mut found = found.into_iter();
    match (found.next(), found.next()) {
        (Some(sole), None) => Ok(sole),
        (None, _) => Err(ProbeError::Ambiguous {
            path: dir.to_owned(),
            found: Vec::new(),
        }),
        (Some(first), Some(second)) => {
            let mut names = vec![child_name(&first), child_name(&second)];
            names.extend(found.map(|path| child_name(&path)));
            Err(ProbeError::Ambiguous {
                path: dir.to_owned(),
                found: names,
            })
        }
    }
}

fn child_name(path: &Utf8Path) -> String {
    path.file_name().unwrap_or(path.as_str()).to_string()
}

/// Errors raised while probing an installation directory.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The directory is absent or not a directory.
    #[error("installation directory '{path}' does not exist")]
    NotFound {
        /// The absent directory.
        path: Utf8PathBuf,
    },
    /// The directory could not be read.
    #[error("failed to read installation directory '{path}': {source}")]
    ReadDir {
        /// The unreadable directory.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        source: io::Error,
    },
    /// The directory does not contain exactly one child.
    #[error("expected one entry under '{path}', found {}", describe_children(found))]
    Ambiguous {
        /// The directory probed.
        path: Utf8PathBuf,
        /// Names of the children found.
        found: Vec<String>,
    },
    /// A child path contains non UTF-8 components.
    #[error("installation path '{}' is not valid UTF-8", path.display())]
    NonUtf8 {
        /// The raw child path.
        path: PathBuf,
    },
}

fn describe_children(found: &[String]) -> String {
    if found.is_empty() {
        "none".to_string()
    } else {
        format!("{}: {}", found.len(), found.join(", "))
    }
}
