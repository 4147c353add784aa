//! Log output selection for the gantry binary.

use serde::{Deserialize, Serialize};

/// How telemetry events are rendered on stderr.
///
/// The container process owns stdout, so the format only governs gantry's
/// own diagnostics alongside it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Single-line human-readable events for interactive sessions.
    #[default]
    Compact,
    /// JSON events for collectors that index structured fields.
    Json,
}
