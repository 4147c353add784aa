//! Configuration loading helpers for the gantry CLI.
//!
//! Configuration flags come first on the command line and are handed to the
//! `ortho-config` loader; everything from the first non-flag token onwards
//! belongs to the subcommand parser. Every gantry configuration flag takes a
//! value, inline (`--home=/opt/was`) or as the following argument, so the
//! split is a plain scan over flag/value pairs.

use std::ffi::OsString;

use gantry_config::Config;

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration from the leading configuration flags.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

pub(crate) struct ConfigArgumentSplit {
    /// The binary name plus every leading configuration flag and value.
    pub(crate) config_arguments: Vec<OsString>,
    /// Index of the first token that belongs to the subcommand parser.
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some(binary) = args.first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut config_arguments = vec![binary.clone()];
    let mut index = 1;
    while index < args.len() {
        let text = args[index].to_string_lossy();
        let (flag, inline_value) = match text.split_once('=') {
            Some((flag, _)) => (flag, true),
            None => (text.as_ref(), false),
        };
        if !super::CONFIG_CLI_FLAGS.contains(&flag) {
            break;
        }
        config_arguments.push(args[index].clone());
        index += 1;
        if !inline_value {
            if let Some(value) = args.get(index) {
                config_arguments.push(value.clone());
                index += 1;
            }
        }
    }

    ConfigArgumentSplit {
        config_arguments,
        command_start: index,
    }
}
