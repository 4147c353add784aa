//! Path rendering helpers shared by the launch-environment plumbing.
//!
//! Container runtimes on the JVM accept forward slashes in system property
//! values on every platform, so property rendering normalises the host
//! separator away. List-valued settings (endorsed directories, class paths)
//! join their entries with the platform path-list separator instead.

use camino::Utf8Path;

/// Renders a path with forward slashes regardless of the host platform.
#[must_use]
pub fn forward_slashed(path: &Utf8Path) -> String {
    path.as_str().replace(std::path::MAIN_SEPARATOR, "/")
}

/// Separator used between entries of path-list values such as class paths.
#[must_use]
pub const fn path_list_separator() -> char {
    if cfg!(windows) { ';' } else { ':' }
}
