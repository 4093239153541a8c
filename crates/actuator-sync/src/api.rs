use std::future::Future;
use std::time::Duration;

use cultiva_core::ActuatorFlags;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Result, SyncError};

// ─── ApiMode ──────────────────────────────────────────────────────────────

/// Which of the two independent flag sets an `/activation` call addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMode {
    Auto,
    Active,
}

impl ApiMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiMode::Auto => "auto",
            ApiMode::Active => "active",
        }
    }
}

impl std::fmt::Display for ApiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── ActuatorApi ──────────────────────────────────────────────────────────

/// Client side of the actuator control API.
///
/// The engine only talks to the backend through this trait, so tests can
/// swap in an in-memory recorder.
pub trait ActuatorApi: Send + Sync + 'static {
    /// `GET /activation?mode=<mode>`
    fn fetch(&self, token: &str, mode: ApiMode)
        -> impl Future<Output = Result<ActuatorFlags>> + Send;

    /// `PATCH /activation?mode=<mode>` with `flags` as the body.
    fn update(
        &self,
        token: &str,
        mode: ApiMode,
        flags: &ActuatorFlags,
    ) -> impl Future<Output = Result<()>> + Send;
}

// ─── HttpActuatorApi ──────────────────────────────────────────────────────

/// [`ActuatorApi`] over HTTP+JSON with bearer auth.
#[derive(Debug, Clone)]
pub struct HttpActuatorApi {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpActuatorApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            timeout: None,
        }
    }

    /// Apply a per-request timeout; without one the transport default applies.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, token: &str, mode: ApiMode) -> reqwest::RequestBuilder {
        let url = format!("{}/activation", self.base_url);
        let mut req = self
            .client
            .request(method, url)
            .query(&[("mode", mode.as_str())])
            .bearer_auth(token);
        if let Some(t) = self.timeout {
            req = req.timeout(t);
        }
        req
    }
}

impl ActuatorApi for HttpActuatorApi {
    async fn fetch(&self, token: &str, mode: ApiMode) -> Result<ActuatorFlags> {
        debug!(mode = %mode, "GET /activation");
        let resp = self.request(Method::GET, token, mode).send().await?;
        decode_json(ensure_success(resp).await?).await
    }

    async fn update(&self, token: &str, mode: ApiMode, flags: &ActuatorFlags) -> Result<()> {
        debug!(mode = %mode, actuators = flags.len(), "PATCH /activation");
        let resp = self
            .request(Method::PATCH, token, mode)
            .json(flags)
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }
}

// ─── Response helpers ─────────────────────────────────────────────────────

/// Turn any non-2xx status into [`SyncError::Server`], keeping the body for logs.
pub(crate) async fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SyncError::Server {
        status: status.as_u16(),
        body,
    })
}

pub(crate) async fn decode_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|source| SyncError::Decode { body, source })
}
