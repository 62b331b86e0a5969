//! Config file location.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Config file name inside the config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name under the user config root.
const APP_DIR_NAME: &str = "moviesearch";

/// Resolves the config file path.
///
/// - If `dir` is `Some`, returns `{dir}/config.toml`.
/// - Else if `XDG_CONFIG_HOME` is set and absolute, returns
///   `$XDG_CONFIG_HOME/moviesearch/config.toml`.
/// - Otherwise returns `~/.config/moviesearch/config.toml`.
///
/// # Errors
///
/// Returns an error if no config root can be determined (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE_NAME));
    }

    let root = config_root(
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
    .context("neither XDG_CONFIG_HOME nor HOME is set")?;

    Ok(root.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Picks the user config root. A relative `XDG_CONFIG_HOME` is ignored.
fn config_root(xdg_config_home: Option<PathBuf>, home: Option<PathBuf>) -> Option<PathBuf> {
    xdg_config_home
        .filter(|p| p.is_absolute())
        .or_else(|| home.map(|h| h.join(".config")))
}
