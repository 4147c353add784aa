//! The launch specification assembled ahead of a container invocation.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use gantry_config::path_list_separator;

/// Everything a JVM invocation needs: class path, system properties, the
/// main class, and its arguments.
///
/// The specification is plain data. Building one performs no process work,
/// which lets callers inspect an invocation without running it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchSpec {
    main_class: Option<String>,
    classpath: Vec<Utf8PathBuf>,
    properties: BTreeMap<String, String>,
    arguments: Vec<String>,
}

impl LaunchSpec {
    /// Creates an empty specification.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fully qualified main class.
    pub fn set_main_class(&mut self, main_class: impl Into<String>) {
        self.main_class = Some(main_class.into());
    }

    /// The main class, when one has been set.
    #[must_use]
    pub fn main_class(&self) -> Option<&str> {
        self.main_class.as_deref()
    }

    /// Appends a class path entry, preserving insertion order.
    pub fn push_classpath(&mut self, entry: impl Into<Utf8PathBuf>) {
        self.classpath.push(entry.into());
    }

    /// Class path entries in insertion order.
    #[must_use]
    pub fn classpath(&self) -> &[Utf8PathBuf] {
        &self.classpath
    }

    /// Class path entries joined with the platform list separator.
    #[must_use]
    pub fn classpath_line(&self) -> String {
        let mut line = String::new();
        for entry in &self.classpath {
            if !line.is_empty() {
                line.push(path_list_separator());
            }
            line.push_str(entry.as_str());
        }
        line
    }

    /// Sets a system property, replacing any previous value for the key.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// The value of a system property, when set.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// All system properties, keyed uniquely.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Appends a program argument, preserving insertion order.
    pub fn push_argument(&mut self, argument: impl Into<String>) {
        self.arguments.push(argument.into());
    }

    /// Program arguments in insertion order.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Whether the class path contains `entry`.
    #[must_use]
    pub fn has_classpath_entry(&self, entry: &Utf8Path) -> bool {
        self.classpath.iter().any(|candidate| candidate == entry)
    }
}
