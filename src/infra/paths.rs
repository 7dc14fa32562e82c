// src/infra/paths.rs — XDG-compliant path management
//
// All paths respect the SENTICHAT_HOME environment variable for isolation.
// When SENTICHAT_HOME is set, config and data live under that directory.
// When unset, config uses ~/.sentichat/ and data uses XDG_DATA_HOME/sentichat.

use anyhow::Context;
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Returns the SENTICHAT_HOME override, if set.
fn sentichat_home() -> Option<PathBuf> {
    std::env::var_os("SENTICHAT_HOME").map(PathBuf::from)
}

/// Configuration directory: $SENTICHAT_HOME/ or ~/.sentichat/
pub fn config_dir() -> anyhow::Result<PathBuf> {
    if let Some(home) = sentichat_home() {
        return Ok(home);
    }
    let base = BaseDirs::new().context("Could not determine home directory")?;
    Ok(base.home_dir().join(".sentichat"))
}

/// Data directory: $SENTICHAT_HOME/data/ or ~/.local/share/sentichat/
pub fn data_dir() -> anyhow::Result<PathBuf> {
    if let Some(home) = sentichat_home() {
        return Ok(home.join("data"));
    }
    let dirs =
        ProjectDirs::from("", "", "sentichat").context("Could not determine home directory")?;
    Ok(dirs.data_local_dir().to_path_buf())
}

/// Default database path
pub fn db_path() -> anyhow::Result<PathBuf> {
    Ok(data_dir()?.join("chat_history.db"))
}

/// Config file path
pub fn config_file_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}
