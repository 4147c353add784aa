//! Integration tests for the `gantry` binary entry point.
//!
//! A temporary container installation and a shell script posing as `java`
//! stand in for a real application server, so the binary can be driven
//! through its full argument surface without a product install.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;

use anyhow::{Context, Result, anyhow};
use assert_cmd::cargo::cargo_bin_cmd;
use camino::Utf8PathBuf;
use predicates::str::contains;
use tempfile::TempDir;

fn gantry() -> assert_cmd::Command {
    let mut command = cargo_bin_cmd!("gantry");
    command.env_clear();
    command
}

struct Installation {
    _guard: TempDir,
    root: Utf8PathBuf,
    home: Utf8PathBuf,
    config_home: Utf8PathBuf,
    runtime_home: Utf8PathBuf,
    native_dir: Utf8PathBuf,
}

impl Installation {
    fn new() -> Result<Self> {
        let guard = TempDir::new().context("create temporary directory")?;
        let root = Utf8PathBuf::from_path_buf(guard.path().to_path_buf())
            .map_err(|path| anyhow!("temporary directory is not UTF-8: {}", path.display()))?;
        let home = root.join("was");
        let config_home = root.join("profiles/node01");
        let runtime_home = root.join("java");
        let native_dir = home.join("lib/native/linux/x86_64");
        for dir in [&home, &config_home, &runtime_home, &native_dir] {
            fs::create_dir_all(dir).with_context(|| format!("create {dir}"))?;
        }
        fs::create_dir_all(runtime_home.join("bin")).context("create runtime bin directory")?;
        Ok(Self {
            _guard: guard,
            root,
            home,
            config_home,
            runtime_home,
            native_dir,
        })
    }

    fn install_runtime(&self, exit_code: i32) -> Result<()> {
        let java = self.runtime_home.join("bin/java");
        fs::write(&java, format!("#!/bin/sh\nexit {exit_code}\n"))
            .context("write stand-in runtime")?;
        let mut permissions = fs::metadata(&java)
            .context("stat stand-in runtime")?
            .permissions();
        permissions.set_mode(0o755);
        fs::set_permissions(&java, permissions).context("mark stand-in runtime executable")
    }

    fn command(&self) -> assert_cmd::Command {
        let mut command = gantry();
        command
            .current_dir(self.root.as_std_path())
            .env("PATH", self.native_dir.as_str())
            .args(["--home", self.home.as_str()])
            .args(["--config-home", self.config_home.as_str()])
            .args(["--runtime-home", self.runtime_home.as_str()])
            .args(["--properties", "cell=node01Cell"])
            .args(["--properties", "node=node01"])
            .args(["--properties", "server=server1"]);
        command
    }
}

#[test]
fn missing_subcommands_are_usage_failures() {
    gantry().assert().failure().stderr(contains("Usage"));
}

#[test]
fn help_prints_to_stdout_and_succeeds() {
    gantry()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Lifecycle controller"));
}

#[test]
fn start_without_configuration_reports_the_missing_setting() -> Result<()> {
    let scratch = TempDir::new().context("create scratch directory")?;
    gantry()
        .current_dir(scratch.path())
        .arg("start")
        .assert()
        .failure()
        .stderr(contains("required setting 'home'"));
    Ok(())
}

#[test]
fn inspect_previews_the_start_environment() -> Result<()> {
    let installation = Installation::new()?;
    installation
        .command()
        .arg("inspect")
        .assert()
        .success()
        .stdout(contains("main class: com.ibm.ws.bootstrap.WSLauncher"))
        .stdout(contains("property: -Djava.library.path="))
        .stdout(contains("argument: server1"));
    Ok(())
}

#[test]
fn inspect_stop_renders_the_shutdown_environment() -> Result<()> {
    let installation = Installation::new()?;
    installation
        .command()
        .args(["inspect", "stop"])
        .assert()
        .success()
        .stdout(contains("main class: com.ibm.wsspi.bootstrap.WSPreLauncher"))
        .stdout(contains("argument: -nosplash"));
    Ok(())
}

#[test]
fn start_reports_the_lifecycle_summary() -> Result<()> {
    let installation = Installation::new()?;
    installation.install_runtime(0)?;
    installation
        .command()
        .arg("start")
        .assert()
        .success()
        .stdout(contains("container started (staged 0, deployed 0)"));
    Ok(())
}

#[test]
fn unclean_runtime_exits_are_reported() -> Result<()> {
    let installation = Installation::new()?;
    installation.install_runtime(9)?;
    installation
        .command()
        .arg("start")
        .assert()
        .failure()
        .stderr(contains("exited with code 9"));
    Ok(())
}

#[test]
fn unknown_profiles_fail_before_any_launch() -> Result<()> {
    let installation = Installation::new()?;
    installation
        .command()
        .args(["--profile", "liberty", "start"])
        .assert()
        .failure()
        .stderr(contains("unknown container profile 'liberty'"));
    Ok(())
}
