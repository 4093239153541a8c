use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::decode_json;
use crate::{Result, SyncError};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    name: &'a str,
    password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Exchange credentials for a bearer token via `POST {base_url}/users/login`.
///
/// Succeeds only on a 2xx response carrying a non-empty `token`. On failure
/// the server's `message` field is surfaced when it sent one.
pub async fn login(client: &Client, base_url: &str, email: &str, password: &str) -> Result<String> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(SyncError::Login("email and password are required".into()));
    }

    let url = format!("{}/users/login", base_url.trim_end_matches('/'));
    let resp = client
        .post(url)
        .json(&LoginRequest { email, password })
        .send()
        .await?;

    let status = resp.status();
    let body: LoginResponse = if status.is_success() {
        decode_json(resp).await?
    } else {
        // Error bodies are best-effort: fall back to a generic message.
        resp.json().await.unwrap_or_default()
    };

    match body.token.filter(|t| !t.trim().is_empty()) {
        Some(token) if status.is_success() => {
            info!(email, "logged in");
            Ok(token)
        }
        _ => {
            let message = body
                .message
                .unwrap_or_else(|| "check your email and password".to_string());
            warn!(email, status = status.as_u16(), %message, "login rejected");
            Err(SyncError::Login(message))
        }
    }
}

/// Create an account via `POST {base_url}/users`. Does not log in.
///
/// Name and email are trimmed. Any 2xx counts as created; the response body
/// is not inspected.
pub async fn register(
    client: &Client,
    base_url: &str,
    name: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    let (name, email) = (name.trim(), email.trim());
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(SyncError::Register(
            "name, email and password are required".into(),
        ));
    }

    let url = format!("{}/users", base_url.trim_end_matches('/'));
    let resp = client
        .post(url)
        .json(&RegisterRequest {
            email,
            name,
            password,
        })
        .send()
        .await?;

    let status = resp.status();
    if status.is_success() {
        info!(email, "account created");
        return Ok(());
    }

    let body: ErrorBody = resp.json().await.unwrap_or_default();
    let message = body
        .message
        .unwrap_or_else(|| "the email may already be in use".to_string());
    warn!(email, status = status.as_u16(), %message, "registration rejected");
    Err(SyncError::Register(message))
}
