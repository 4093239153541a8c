use std::path::{Path, PathBuf};
use std::sync::Arc;

use actuator_sync::{HttpActuatorApi, SyncEngine};
use anyhow::Context as _;
use cultiva_core::config::Config;
use cultiva_core::{paths, TokenStore};

/// Everything a command needs: the effective config and where it came from.
pub struct Context {
    pub config_path: PathBuf,
    pub config: Config,
}

impl Context {
    /// Load config from `explicit` (flag / `CULTIVA_CONFIG`) or `~/.cultiva/config.yaml`,
    /// then apply a `--base-url` override.
    pub fn load(explicit: Option<&Path>, base_url: Option<String>) -> anyhow::Result<Self> {
        let config_path = resolve_config_path(explicit)?;
        let mut config = Config::load(&config_path)
            .with_context(|| format!("failed to load config from {}", config_path.display()))?;
        if let Some(url) = base_url {
            config.api.base_url = url;
        }
        Ok(Self {
            config_path,
            config,
        })
    }

    pub fn token_store(&self) -> TokenStore {
        TokenStore::new(self.config.token_path(&self.config_path))
    }

    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = self.config.timeout() {
            builder = builder.timeout(t);
        }
        builder.build().context("failed to build HTTP client")
    }

    pub fn engine(&self) -> anyhow::Result<SyncEngine<HttpActuatorApi>> {
        let api = HttpActuatorApi::with_client(self.http_client()?, &self.config.api.base_url)
            .timeout(self.config.timeout());
        Ok(SyncEngine::new(
            api,
            Arc::new(self.token_store()),
            self.config.debounce(),
        ))
    }
}

pub fn resolve_config_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    paths::default_config_path().context("cannot locate config directory")
}
