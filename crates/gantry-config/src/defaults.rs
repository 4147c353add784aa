//! Fallback values applied when a setting is absent from every layer.

use crate::logging::LogFormat;
use crate::profile;

/// Filter expression applied when no log filter is configured.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Borrowed form of the default log filter.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned form of the default log filter for serde default hooks.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Log format selected when none is configured.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Identifier of the container profile selected when none is configured.
#[must_use]
pub const fn default_profile() -> &'static str {
    profile::WEBSPHERE_85X
}

/// Owned form of the default profile identifier for serde default hooks.
#[must_use]
pub fn default_profile_string() -> String {
    profile::WEBSPHERE_85X.to_string()
}
