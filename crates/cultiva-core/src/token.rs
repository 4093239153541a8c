use std::path::{Path, PathBuf};

use crate::error::Result;

// ---------------------------------------------------------------------------
// TokenProvider
// ---------------------------------------------------------------------------

/// Source of the bearer credential sent with every control API call.
///
/// `None` means there is no session; callers must not attempt any request.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Fixed in-memory credential.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn absent() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

// ---------------------------------------------------------------------------
// TokenStore
// ---------------------------------------------------------------------------

/// The single cached login token, kept in one file on disk.
///
/// ```rust,ignore
/// let store = TokenStore::new(config.token_path(&config_path));
/// store.save(&token)?;          // after login
/// let t = store.load();         // on startup
/// store.clear()?;               // on logout
/// ```
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the stored token, or `None` if none exists or it is blank.
    pub fn load(&self) -> Option<String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
    }

    /// Persist `token`, creating the parent directory if needed.
    pub fn save(&self, token: &str) -> Result<()> {
        crate::io::atomic_write(&self.path, token.trim().as_bytes())?;
        restrict_permissions(&self.path)
    }

    /// Delete the stored token (no-op if none exists). Returns whether a token was removed.
    pub fn clear(&self) -> Result<bool> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            return Ok(true);
        }
        Ok(false)
    }
}

impl TokenProvider for TokenStore {
    fn token(&self) -> Option<String> {
        self.load()
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
