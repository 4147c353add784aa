//! Declarative container profiles.
//!
//! A profile captures everything vendor-specific about launching an installed
//! container: where native libraries and extension directories live inside the
//! installation, which system properties and bootstrap class path entries the
//! runtime expects, and the main class and argument shape of the start and
//! stop invocations. Lifecycle code stays vendor-neutral and interprets a
//! profile instead of hard-coding any one product.
//!
//! Profiles are ordinary serde records. The built-in catalogue ships the
//! WebSphere 8.5 profile; additional vendors can be described in a JSON file
//! and selected with `profile_path` without touching lifecycle code.

use std::collections::BTreeMap;
use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::layout::{InstallationLayout, LayoutRole};
use crate::paths::forward_slashed;

/// Identifier of the built-in WebSphere 8.5 profile.
pub const WEBSPHERE_85X: &str = "websphere85x";

/// A path anchored to one of the installation layout directories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RootedPath {
    /// Layout directory the path is relative to.
    pub root: LayoutRole,
    /// Relative path below the root.
    pub path: Utf8PathBuf,
}

impl RootedPath {
    /// Builds a rooted path from a role and a relative path.
    pub fn new(root: LayoutRole, path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root,
            path: path.into(),
        }
    }

    /// Resolves the path against a concrete layout.
    #[must_use]
    pub fn resolve(&self, layout: &InstallationLayout) -> Utf8PathBuf {
        layout.dir(self.root).join(&self.path)
    }
}

/// A bootstrap class path entry contributed by the profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClasspathEntry {
    /// Layout directory the entry is relative to.
    pub root: LayoutRole,
    /// Relative path below the root.
    pub path: Utf8PathBuf,
    /// Whether the entry is skipped silently when absent on disk.
    #[serde(default)]
    pub optional: bool,
}

impl ClasspathEntry {
    /// Resolves the entry against a concrete layout.
    #[must_use]
    pub fn resolve(&self, layout: &InstallationLayout) -> Utf8PathBuf {
        layout.dir(self.root).join(&self.path)
    }
}

/// How a path-valued system property is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathRender {
    /// Render as a `file:` URL.
    FileUrl,
    /// Render as a forward-slashed plain path.
    Plain,
}

/// A system property whose value is derived from the installation layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PropertyTemplate {
    /// System property key.
    pub key: String,
    /// Path the value is derived from.
    pub path: RootedPath,
    /// Rendering applied to the resolved path.
    pub render: PathRender,
}

impl PropertyTemplate {
    /// Renders the property value against a concrete layout.
    ///
    /// # Errors
    ///
    /// Returns an error when the resolved path cannot be expressed as a
    /// `file:` URL.
    pub fn value(&self, layout: &InstallationLayout) -> Result<String, ProfileError> {
        let resolved = self.path.resolve(layout);
        match self.render {
            PathRender::FileUrl => {
                let url = Url::from_file_path(resolved.as_std_path())
                    .map_err(|()| ProfileError::FileUrl { path: resolved })?;
                Ok(url.to_string())
            }
            PathRender::Plain => Ok(forward_slashed(&resolved)),
        }
    }
}

/// A single token of a start or stop invocation's argument list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaunchArgument {
    /// Fixed token passed through verbatim.
    Literal {
        /// The token.
        value: String,
    },
    /// Path resolved against an installation directory.
    Path {
        /// Layout directory the path is relative to.
        root: LayoutRole,
        /// Relative path below the root.
        path: Utf8PathBuf,
    },
    /// Value of a configured instance property, such as the cell name.
    Property {
        /// Name of the instance property.
        name: String,
    },
}

impl LaunchArgument {
    /// Renders the argument against a layout and the instance properties.
    ///
    /// # Errors
    ///
    /// Returns an error when the argument references an instance property
    /// that has not been configured.
    pub fn render(
        &self,
        layout: &InstallationLayout,
        properties: &BTreeMap<String, String>,
    ) -> Result<String, ProfileError> {
        match self {
            Self::Literal { value } => Ok(value.clone()),
            Self::Path { root, path } => Ok(layout.dir(*root).join(path).into_string()),
            Self::Property { name } => {
                properties
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ProfileError::MissingProperty { name: name.clone() })
            }
        }
    }
}

/// Main class, properties, and arguments of one lifecycle invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OperationProfile {
    /// Fully qualified main class of the invocation.
    pub main_class: String,
    /// Properties specific to this invocation.
    #[serde(default)]
    pub properties: Vec<PropertyTemplate>,
    /// Argument tokens in invocation order.
    #[serde(default)]
    pub arguments: Vec<LaunchArgument>,
}

/// Vendor-specific description of an installed container.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContainerProfile {
    /// Stable identifier used for catalogue lookup.
    pub id: String,
    /// Human-readable product name.
    pub name: String,
    /// Directory below the container home holding nested native libraries.
    pub native_library_root: Utf8PathBuf,
    /// Directory below the container home scanned for extension jars.
    pub extension_dir: Utf8PathBuf,
    /// Directories joined into the endorsed-standards override property.
    #[serde(default)]
    pub endorsed_dirs: Vec<RootedPath>,
    /// Property keys that receive the container home path.
    #[serde(default)]
    pub install_root_keys: Vec<String>,
    /// Property key that receives the configuration home path.
    pub user_root_key: String,
    /// Bootstrap class path entries in load order.
    #[serde(default)]
    pub classpath: Vec<ClasspathEntry>,
    /// Directory watched by the container for dropped-in deployables.
    pub deploy_inbox: RootedPath,
    /// Invocation used to start the container.
    pub start: OperationProfile,
    /// Invocation used to stop the container.
    pub stop: OperationProfile,
}

/// Looks up a profile in the built-in catalogue.
#[must_use]
pub fn builtin(id: &str) -> Option<ContainerProfile> {
    match id {
        WEBSPHERE_85X => Some(websphere85x()),
        _ => None,
    }
}

/// Loads a profile from a JSON definition on disk.
///
/// # Errors
///
/// Returns an error when the file cannot be read or does not parse as a
/// profile definition.
pub fn from_json_file(path: &Utf8Path) -> Result<ContainerProfile, ProfileError> {
    let contents = fs::read_to_string(path).map_err(|source| ProfileError::Read {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ProfileError::Parse {
        path: path.to_owned(),
        source,
    })
}

/// The built-in profile for WebSphere Application Server 8.5.
#[must_use]
pub fn websphere85x() -> ContainerProfile {
    ContainerProfile {
        id: WEBSPHERE_85X.into(),
        name: "WebSphere 8.5".into(),
        native_library_root: "lib/native".into(),
        extension_dir: "lib/ext".into(),
        endorsed_dirs: vec![
            RootedPath::new(LayoutRole::Home, "endorsed_apis"),
            RootedPath::new(LayoutRole::RuntimeHome, "lib/endorsed"),
        ],
        install_root_keys: vec!["was.install.root".into(), "WAS_HOME".into()],
        user_root_key: "user.install.root".into(),
        classpath: vec![
            ClasspathEntry {
                root: LayoutRole::RuntimeHome,
                path: "lib/tools.jar".into(),
                optional: true,
            },
            ClasspathEntry {
                root: LayoutRole::ConfigHome,
                path: "properties".into(),
                optional: false,
            },
            ClasspathEntry {
                root: LayoutRole::Home,
                path: "properties".into(),
                optional: false,
            },
            ClasspathEntry {
                root: LayoutRole::Home,
                path: "lib/startup.jar".into(),
                optional: false,
            },
            ClasspathEntry {
                root: LayoutRole::Home,
                path: "lib/bootstrap.jar".into(),
                optional: false,
            },
            ClasspathEntry {
                root: LayoutRole::Home,
                path: "lib/lmproxy.jar".into(),
                optional: false,
            },
            ClasspathEntry {
                root: LayoutRole::Home,
                path: "lib/urlprotocols.jar".into(),
                optional: false,
            },
            ClasspathEntry {
                root: LayoutRole::Home,
                path: "deploytool/itp/batchboot.jar".into(),
                optional: false,
            },
            ClasspathEntry {
                root: LayoutRole::Home,
                path: "deploytool/itp/batch2.jar".into(),
                optional: false,
            },
        ],
        deploy_inbox: RootedPath::new(LayoutRole::ConfigHome, "installableApps"),
        start: OperationProfile {
            main_class: "com.ibm.ws.bootstrap.WSLauncher".into(),
            properties: vec![
                PropertyTemplate {
                    key: "com.ibm.CORBA.ConfigURL".into(),
                    path: RootedPath::new(LayoutRole::ConfigHome, "properties/sas.client.props"),
                    render: PathRender::FileUrl,
                },
                PropertyTemplate {
                    key: "com.ibm.SSL.ConfigURL".into(),
                    path: RootedPath::new(LayoutRole::ConfigHome, "properties/ssl.client.props"),
                    render: PathRender::FileUrl,
                },
            ],
            arguments: vec![
                LaunchArgument::Literal {
                    value: "com.ibm.ws.management.tools.WsServerLauncher".into(),
                },
                LaunchArgument::Path {
                    root: LayoutRole::ConfigHome,
                    path: "config".into(),
                },
                LaunchArgument::Property {
                    name: "cell".into(),
                },
                LaunchArgument::Property {
                    name: "node".into(),
                },
                LaunchArgument::Property {
                    name: "server".into(),
                },
            ],
        },
        stop: OperationProfile {
            main_class: "com.ibm.wsspi.bootstrap.WSPreLauncher".into(),
            properties: vec![
                PropertyTemplate {
                    key: "com.ibm.SOAP.ConfigURL".into(),
                    path: RootedPath::new(LayoutRole::ConfigHome, "properties/soap.client.props"),
                    render: PathRender::FileUrl,
                },
                PropertyTemplate {
                    key: "com.ibm.CORBA.ConfigURL".into(),
                    path: RootedPath::new(LayoutRole::ConfigHome, "properties/sas.client.props"),
                    render: PathRender::FileUrl,
                },
                PropertyTemplate {
                    key: "com.ibm.SSL.ConfigURL".into(),
                    path: RootedPath::new(LayoutRole::ConfigHome, "properties/ssl.client.props"),
                    render: PathRender::FileUrl,
                },
                PropertyTemplate {
                    key: "java.security.auth.login.config".into(),
                    path: RootedPath::new(
                        LayoutRole::ConfigHome,
                        "properties/wsjaas_client.conf",
                    ),
                    render: PathRender::Plain,
                },
            ],
            arguments: vec![
                LaunchArgument::Literal {
                    value: "-nosplash".into(),
                },
                LaunchArgument::Literal {
                    value: "-application".into(),
                },
                LaunchArgument::Literal {
                    value: "com.ibm.ws.bootstrap.WSLauncher".into(),
                },
                LaunchArgument::Literal {
                    value: "com.ibm.ws.admin.services.WsServerStop".into(),
                },
                LaunchArgument::Path {
                    root: LayoutRole::ConfigHome,
                    path: "config".into(),
                },
                LaunchArgument::Property {
                    name: "cell".into(),
                },
                LaunchArgument::Property {
                    name: "node".into(),
                },
                LaunchArgument::Property {
                    name: "server".into(),
                },
            ],
        },
    }
}

/// Errors raised while loading or rendering container profiles.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The requested profile is not in the built-in catalogue.
    #[error("unknown container profile '{id}'")]
    Unknown {
        /// The requested identifier.
        id: String,
    },
    /// A profile definition file could not be read.
    #[error("failed to read profile definition '{path}': {source}")]
    Read {
        /// Path of the definition file.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        source: io::Error,
    },
    /// A profile definition file could not be parsed.
    #[error("failed to parse profile definition '{path}': {source}")]
    Parse {
        /// Path of the definition file.
        path: Utf8PathBuf,
        /// Underlying parse failure.
        source: serde_json::Error,
    },
    /// A property path could not be rendered as a `file:` URL.
    #[error("cannot express '{path}' as a file URL")]
    FileUrl {
        /// The offending path.
        path: Utf8PathBuf,
    },
    /// A launch argument references an instance property that is not set.
    #[error("launch argument references unset instance property '{name}'")]
    MissingProperty {
        /// Name of the missing property.
        name: String,
    },
}
