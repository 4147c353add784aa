//! Exercises the layered configuration loader end to end.
//!
//! Settings must merge with command-line flags beating environment
//! variables, environment variables beating the configuration file, and the
//! file beating built-in defaults.

use std::ffi::OsString;
use std::fs;
use std::sync::Mutex;

use camino::Utf8PathBuf;
use once_cell::sync::Lazy;
use rstest::rstest;
use tempfile::TempDir;

use gantry_config::{Config, LogFormat};

// Environment mutation is process-global, so tests touching it take this
// lock to keep parallel test threads from interleaving overrides.
static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct EnvGuard {
    key: String,
    previous: Option<OsString>,
}

impl EnvGuard {
    fn set(key: &str, value: &str) -> Self {
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` on edition 2024; the guard
        // restores the previous value on drop.
        unsafe { std::env::set_var(key, value) };
        Self {
            key: key.to_string(),
            previous,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(&self.key, value) },
            None => unsafe { std::env::remove_var(&self.key) },
        }
    }
}

fn write_config_file(dir: &TempDir, contents: &str) -> Utf8PathBuf {
    let path = dir.path().join("gantry.toml");
    match fs::write(&path, contents) {
        Ok(()) => {}
        Err(error) => panic!("failed to write configuration: {error}"),
    }
    match Utf8PathBuf::from_path_buf(path) {
        Ok(path) => path,
        Err(raw) => panic!("temporary path is not UTF-8: {}", raw.display()),
    }
}

fn load(args: &[&str]) -> Config {
    let mut argv: Vec<OsString> = vec![OsString::from("gantry")];
    argv.extend(args.iter().map(OsString::from));
    match Config::load_from_iter(argv) {
        Ok(config) => config,
        Err(error) => panic!("configuration failed to load: {error}"),
    }
}

#[test]
fn file_values_override_defaults() {
    let _lock = ENV_LOCK.lock().expect("env lock");
    let dir = TempDir::new().expect("create temporary directory");
    let config_path = write_config_file(
        &dir,
        concat!(
            "home = \"/opt/was\"\n",
            "config_home = \"/opt/was/profiles/node01\"\n",
            "runtime_home = \"/opt/java\"\n",
            "log_filter = \"warn\"\n",
            "properties = [\"cell=node01Cell\"]\n",
        ),
    );

    let config = load(&["--config-path", config_path.as_str()]);
    assert_eq!(config.home.as_deref(), Some(Utf8PathBuf::from("/opt/was").as_path()));
    assert_eq!(config.log_filter(), "warn");
    assert_eq!(config.properties, vec!["cell=node01Cell".to_string()]);
}

#[test]
fn environment_overrides_file() {
    let _lock = ENV_LOCK.lock().expect("env lock");
    let dir = TempDir::new().expect("create temporary directory");
    let config_path = write_config_file(&dir, "log_filter = \"warn\"\n");
    let _filter = EnvGuard::set("GANTRY_LOG_FILTER", "debug");

    let config = load(&["--config-path", config_path.as_str()]);
    assert_eq!(config.log_filter(), "debug");
}

#[test]
fn cli_flags_override_environment() {
    let _lock = ENV_LOCK.lock().expect("env lock");
    let _filter = EnvGuard::set("GANTRY_LOG_FILTER", "debug");

    let config = load(&["--log-filter", "trace"]);
    assert_eq!(config.log_filter(), "trace");
}

#[test]
fn repeated_cli_properties_collect() {
    let _lock = ENV_LOCK.lock().expect("env lock");
    let config = load(&[
        "--properties",
        "cell=node01Cell",
        "--properties",
        "node=node01",
    ]);
    let properties = config.instance_properties().expect("parse properties");
    assert_eq!(properties.len(), 2);
    assert_eq!(properties.get("node").map(String::as_str), Some("node01"));
}

#[rstest]
#[case("json", LogFormat::Json)]
#[case("compact", LogFormat::Compact)]
fn log_format_parses_from_file(#[case] raw: &str, #[case] expected: LogFormat) {
    let _lock = ENV_LOCK.lock().expect("env lock");
    let dir = TempDir::new().expect("create temporary directory");
    let config_path = write_config_file(&dir, &format!("log_format = \"{raw}\"\n"));

    let config = load(&["--config-path", config_path.as_str()]);
    assert_eq!(config.log_format(), expected);
}
