use crate::error::{CoreError, Result};
use std::path::{Path, PathBuf};

pub const CULTIVA_DIR: &str = ".cultiva";
pub const CONFIG_FILE: &str = "config.yaml";
pub const TOKEN_FILE: &str = "token";

/// `~/.cultiva`, the per-user directory holding config and the cached token.
pub fn cultiva_dir() -> Result<PathBuf> {
    home::home_dir()
        .map(|h| h.join(CULTIVA_DIR))
        .ok_or(CoreError::HomeNotFound)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(cultiva_dir()?.join(CONFIG_FILE))
}

/// Token file that sits next to `config_path`.
pub fn sibling_token_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .unwrap_or(Path::new("."))
        .join(TOKEN_FILE)
}
