//! Shared configuration for the gantry binaries.
//!
//! Settings merge from four layers in ascending precedence: built-in
//! defaults, a TOML configuration file, `GANTRY_*` environment variables, and
//! command-line flags. The merged [`Config`] resolves into the richer types
//! the lifecycle machinery consumes: an [`InstallationLayout`], a
//! [`ContainerProfile`], and the instance property map.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

pub mod defaults;
mod layout;
mod logging;
mod paths;
pub mod profile;

pub use defaults::{DEFAULT_LOG_FILTER, default_log_filter, default_log_format, default_profile};
pub use layout::{InstallationLayout, LayoutError, LayoutRole};
pub use logging::LogFormat;
pub use paths::{forward_slashed, path_list_separator};
pub use profile::{ContainerProfile, ProfileError};

/// Merged configuration consumed by the gantry binaries.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GANTRY")]
pub struct Config {
    /// Container installation directory.
    #[serde(default)]
    pub home: Option<Utf8PathBuf>,
    /// Instance configuration directory.
    #[serde(default)]
    pub config_home: Option<Utf8PathBuf>,
    /// Runtime installation used to launch the container.
    #[serde(default)]
    pub runtime_home: Option<Utf8PathBuf>,
    /// Identifier of the built-in container profile to use.
    #[serde(default = "defaults::default_profile_string")]
    #[ortho_config(default = defaults::default_profile_string())]
    pub profile: String,
    /// Path to a JSON profile definition overriding the catalogue.
    #[serde(default)]
    pub profile_path: Option<Utf8PathBuf>,
    /// Instance properties as `name=value` entries.
    #[serde(default)]
    pub properties: Vec<String>,
    /// Extra jars staged into the container extension directory.
    #[serde(default)]
    pub extra_classpath: Vec<Utf8PathBuf>,
    /// Deployable archives copied to the container inbox after start.
    #[serde(default)]
    pub deployables: Vec<Utf8PathBuf>,
    /// Log filter expression in `tracing` env-filter syntax.
    #[serde(default = "defaults::default_log_filter_string")]
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default)]
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
}

impl Config {
    /// Loads configuration by merging defaults, the configuration file,
    /// environment variables, and the provided command-line arguments.
    ///
    /// # Errors
    ///
    /// Returns the underlying loader error when any layer fails to parse or
    /// merge.
    pub fn load_from_iter<I>(arguments: I) -> Result<Self, Arc<ortho_config::OrthoError>>
    where
        I: IntoIterator,
        I::Item: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(arguments)
    }

    /// The configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// The configured log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Resolves the configured directories into an installation layout.
    ///
    /// # Errors
    ///
    /// Returns an error when a directory setting is absent or a relative
    /// path cannot be anchored to the working directory.
    pub fn installation_layout(&self) -> Result<InstallationLayout, ConfigError> {
        let home = self
            .home
            .clone()
            .ok_or(ConfigError::MissingSetting { name: "home" })?;
        let config_home = self.config_home.clone().ok_or(ConfigError::MissingSetting {
            name: "config-home",
        })?;
        let runtime_home = self
            .runtime_home
            .clone()
            .ok_or(ConfigError::MissingSetting {
                name: "runtime-home",
            })?;
        Ok(InstallationLayout::resolve(
            home,
            config_home,
            runtime_home,
        )?)
    }

    /// Resolves the configured container profile.
    ///
    /// A `profile_path` takes precedence over the catalogue identifier.
    ///
    /// # Errors
    ///
    /// Returns an error when the identifier is unknown or the definition
    /// file cannot be loaded.
    pub fn container_profile(&self) -> Result<ContainerProfile, ProfileError> {
        if let Some(path) = &self.profile_path {
            return profile::from_json_file(path);
        }
        profile::builtin(&self.profile).ok_or_else(|| ProfileError::Unknown {
            id: self.profile.clone(),
        })
    }

    /// Parses the configured `name=value` entries into a property map.
    ///
    /// Later entries override earlier ones with the same name.
    ///
    /// # Errors
    ///
    /// Returns an error for entries without a `=` or with an empty name.
    pub fn instance_properties(&self) -> Result<BTreeMap<String, String>, ConfigError> {
        let mut parsed = BTreeMap::new();
        for entry in &self.properties {
            let Some((name, value)) = entry.split_once('=') else {
                return Err(ConfigError::InvalidProperty {
                    entry: entry.clone(),
                });
            };
            if name.is_empty() {
                return Err(ConfigError::InvalidProperty {
                    entry: entry.clone(),
                });
            }
            parsed.insert(name.to_string(), value.to_string());
        }
        Ok(parsed)
    }

    /// Extra jars staged into the container extension directory.
    #[must_use]
    pub fn extra_classpath(&self) -> &[Utf8PathBuf] {
        &self.extra_classpath
    }

    /// Deployable archives copied to the container inbox after start.
    #[must_use]
    pub fn deployables(&self) -> &[Utf8PathBuf] {
        &self.deployables
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home: None,
            config_home: None,
            runtime_home: None,
            profile: defaults::default_profile_string(),
            profile_path: None,
            properties: Vec::new(),
            extra_classpath: Vec::new(),
            deployables: Vec::new(),
            log_filter: defaults::default_log_filter_string(),
            log_format: defaults::default_log_format(),
        }
    }
}

/// Errors raised while resolving configuration into lifecycle inputs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required directory setting is absent.
    #[error("required setting '{name}' is not configured")]
    MissingSetting {
        /// Kebab-case setting name as spelt on the command line.
        name: &'static str,
    },
    /// An instance property entry is not of the form `name=value`.
    #[error("invalid instance property '{entry}': expected name=value")]
    InvalidProperty {
        /// The offending entry.
        entry: String,
    },
    /// The configured directories could not be resolved into a layout.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_selects_websphere() {
        let config = Config::default();
        assert_eq!(config.profile, profile::WEBSPHERE_85X);
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Compact);
    }

    #[test]
    fn layout_requires_all_three_directories() {
        let config = Config {
            home: Some(Utf8PathBuf::from("/opt/was")),
            runtime_home: Some(Utf8PathBuf::from("/opt/java")),
            ..Config::default()
        };
        let error = config
            .installation_layout()
            .expect_err("config home is unset");
        assert!(matches!(
            error,
            ConfigError::MissingSetting {
                name: "config-home"
            }
        ));
    }

    #[test]
    fn layout_resolves_when_fully_configured() {
        let config = Config {
            home: Some(Utf8PathBuf::from("/opt/was")),
            config_home: Some(Utf8PathBuf::from("/opt/was/profiles/node01")),
            runtime_home: Some(Utf8PathBuf::from("/opt/java")),
            ..Config::default()
        };
        let layout = config.installation_layout().expect("resolve layout");
        assert_eq!(layout.home(), "/opt/was");
    }

    #[test]
    fn instance_properties_parse_name_value_pairs() {
        let config = Config {
            properties: vec![
                "cell=node01Cell".to_string(),
                "node=node01".to_string(),
                "server=server1".to_string(),
            ],
            ..Config::default()
        };
        let properties = config.instance_properties().expect("parse properties");
        assert_eq!(properties.get("cell").map(String::as_str), Some("node01Cell"));
        assert_eq!(properties.len(), 3);
    }

    #[test]
    fn later_property_entries_win() {
        let config = Config {
            properties: vec!["server=server1".to_string(), "server=server2".to_string()],
            ..Config::default()
        };
        let properties = config.instance_properties().expect("parse properties");
        assert_eq!(properties.get("server").map(String::as_str), Some("server2"));
    }

    #[test]
    fn malformed_property_entries_are_rejected() {
        let config = Config {
            properties: vec!["cell".to_string()],
            ..Config::default()
        };
        let error = config
            .instance_properties()
            .expect_err("entry without separator");
        assert!(matches!(error, ConfigError::InvalidProperty { entry } if entry == "cell"));
    }

    #[test]
    fn empty_property_names_are_rejected() {
        let config = Config {
            properties: vec!["=server1".to_string()],
            ..Config::default()
        };
        let error = config.instance_properties().expect_err("empty name");
        assert!(matches!(error, ConfigError::InvalidProperty { .. }));
    }

    #[test]
    fn unknown_profiles_are_rejected() {
        let config = Config {
            profile: "jonas4x".to_string(),
            ..Config::default()
        };
        let error = config.container_profile().expect_err("unknown profile");
        assert!(matches!(error, ProfileError::Unknown { id } if id == "jonas4x"));
    }

    #[test]
    fn default_profile_resolves_from_catalogue() {
        let config = Config::default();
        let resolved = config.container_profile().expect("catalogue profile");
        assert_eq!(resolved.id, profile::WEBSPHERE_85X);
    }
}
