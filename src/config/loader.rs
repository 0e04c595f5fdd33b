use std::path::Path;

use crate::error::ConfigError;

use super::types::{CommandConfig, CommandFile};

/// Reads every command in a `.json` or `.toml` command file.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn load_command_file(path: &Path) -> Result<Vec<CommandConfig>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|err| ConfigError::ReadCommand {
        path: path.to_path_buf(),
        source: err,
    })?;
    let file: CommandFile = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source: err,
        })?,
        Some("json") => serde_json::from_str(&content).map_err(|err| ConfigError::ParseJson {
            path: path.to_path_buf(),
            source: err,
        })?,
        Some(ext) => {
            return Err(ConfigError::UnsupportedExtension {
                ext: ext.to_owned(),
            });
        }
        None => return Err(ConfigError::MissingExtension),
    };
    Ok(file.into_commands())
}

/// Loads the command selected by experiment `id`.
///
/// # Errors
///
/// Returns an error when the file cannot be loaded or `id` is out of range.
pub fn load_command(path: &Path, id: usize) -> Result<CommandConfig, ConfigError> {
    let mut commands = load_command_file(path)?;
    let len = commands.len();
    if id >= len {
        return Err(ConfigError::CommandIndexOutOfRange { id, len });
    }
    Ok(commands.swap_remove(id))
}
