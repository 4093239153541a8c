use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded {status}: {body}")]
    Server { status: u16, body: String },

    #[error("no auth token available: log in first")]
    AuthAbsent,

    #[error("failed to decode response: {source}\n  body: {body}")]
    Decode {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("login failed: {0}")]
    Login(String),

    #[error("registration failed: {0}")]
    Register(String),
}

impl SyncError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SyncError::Transport(_) => FailureKind::Transport,
            SyncError::Server { .. } | SyncError::Login(_) | SyncError::Register(_) => {
                FailureKind::Server
            },
            SyncError::AuthAbsent => FailureKind::AuthAbsent,
            SyncError::Decode { .. } => FailureKind::Decode,
        }
    }
}

/// Coarse classification used for diagnostics. Every kind is handled the
/// same way by the engine: abandon the attempt, keep local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Server,
    AuthAbsent,
    Decode,
}
