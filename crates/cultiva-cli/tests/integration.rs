#![allow(deprecated)]
use assert_cmd::Command;
use mockito::Matcher;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

/// `cultiva` pointed at a config inside `dir`, isolated from the caller's environment.
fn cultiva(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cultiva").unwrap();
    cmd.env_remove("CULTIVA_BASE_URL")
        .env_remove("CULTIVA_PASSWORD")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.path().join("config.yaml"));
    cmd
}

/// Write a config with a short debounce window talking to `base_url`.
fn write_config(dir: &TempDir, base_url: &str) {
    std::fs::write(
        dir.path().join("config.yaml"),
        format!("api:\n  base_url: {base_url}\n  timeout_secs: 5\nsync:\n  debounce_ms: 10\n"),
    )
    .unwrap();
}

fn write_token(dir: &TempDir, token: &str) {
    std::fs::write(dir.path().join("token"), token).unwrap();
}

fn mode(m: &str) -> Matcher {
    Matcher::UrlEncoded("mode".into(), m.into())
}

/// Serve both `GET /activation` reads with the given JSON bodies.
fn serve_activation(server: &mut mockito::ServerGuard, auto: &str, active: &str) {
    server
        .mock("GET", "/activation")
        .match_query(mode("auto"))
        .with_status(200)
        .with_body(auto)
        .create();
    server
        .mock("GET", "/activation")
        .match_query(mode("active"))
        .with_status(200)
        .with_body(active)
        .create();
}

// ---------------------------------------------------------------------------
// cultiva config
// ---------------------------------------------------------------------------

#[test]
fn config_validate_passes_with_defaults() {
    let dir = TempDir::new().unwrap();
    cultiva(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid. No warnings."));
}

#[test]
fn config_validate_fails_on_bad_base_url() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "ftp://greenhouse");
    cultiva(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"))
        .stderr(predicate::str::contains("config validation found errors"));
}

#[test]
fn config_init_writes_defaults_and_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    cultiva(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join("config.yaml").exists());

    cultiva(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    cultiva(&dir)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn config_show_reports_base_url_override() {
    let dir = TempDir::new().unwrap();
    let output = cultiva(&dir)
        .args(["--base-url", "http://localhost:9999", "-j", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["config"]["api"]["base_url"], "http://localhost:9999");
    assert_eq!(value["config"]["sync"]["debounce_ms"], 800);
}

// ---------------------------------------------------------------------------
// cultiva login / logout
// ---------------------------------------------------------------------------

#[test]
fn login_saves_token_next_to_config() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let m = server
        .mock("POST", "/users/login")
        .match_body(Matcher::Json(json!({"email": "ana@cultiva.mx", "password": "s3cret"})))
        .with_status(200)
        .with_body(r#"{"token":"jwt-abc"}"#)
        .expect(1)
        .create();
    write_config(&dir, &server.url());

    cultiva(&dir)
        .args(["login", "--email", "ana@cultiva.mx"])
        .env("CULTIVA_PASSWORD", "s3cret")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as ana@cultiva.mx."));

    let token = std::fs::read_to_string(dir.path().join("token")).unwrap();
    assert_eq!(token.trim(), "jwt-abc");
    m.assert();
}

#[test]
fn login_rejected_shows_server_message() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/users/login")
        .with_status(401)
        .with_body(r#"{"message":"Credenciales inválidas"}"#)
        .create();
    write_config(&dir, &server.url());

    cultiva(&dir)
        .args(["login", "--email", "ana@cultiva.mx", "--password", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Credenciales inválidas"));
    assert!(!dir.path().join("token").exists());
}

#[test]
fn login_without_password_fails() {
    let dir = TempDir::new().unwrap();
    cultiva(&dir)
        .args(["login", "--email", "ana@cultiva.mx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("password required"));
}

#[test]
fn register_creates_account() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let m = server
        .mock("POST", "/users")
        .match_body(Matcher::Json(json!({
            "email": "ana@cultiva.mx",
            "name": "Ana",
            "password": "s3cret",
        })))
        .with_status(201)
        .expect(1)
        .create();
    write_config(&dir, &server.url());

    cultiva(&dir)
        .args(["register", "--name", "Ana", "--email", "ana@cultiva.mx"])
        .env("CULTIVA_PASSWORD", "s3cret")
        .assert()
        .success()
        .stdout(predicate::str::contains("Account created for ana@cultiva.mx"));

    assert!(!dir.path().join("token").exists(), "registering does not log in");
    m.assert();
}

#[test]
fn register_rejected_shows_server_message() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/users")
        .with_status(409)
        .with_body(r#"{"message":"El correo ya está registrado"}"#)
        .create();
    write_config(&dir, &server.url());

    cultiva(&dir)
        .args(["register", "--name", "Ana", "--email", "ana@cultiva.mx", "--password", "pw"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("El correo ya está registrado"));
}

#[test]
fn logout_removes_token() {
    let dir = TempDir::new().unwrap();
    write_token(&dir, "jwt-abc");

    cultiva(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));
    assert!(!dir.path().join("token").exists());

    cultiva(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));
}

// ---------------------------------------------------------------------------
// cultiva status
// ---------------------------------------------------------------------------

#[test]
fn status_without_token_asks_to_log_in() {
    let dir = TempDir::new().unwrap();
    cultiva(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("log in"));
}

#[test]
fn status_shows_reconciled_modes() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/activation")
        .match_query(mode("auto"))
        .match_header("authorization", "Bearer jwt-abc")
        .with_status(200)
        .with_body(r#"{"irrigator":true,"heater":false,"lighting":true,"uv":true,"shading":true}"#)
        .create();
    server
        .mock("GET", "/activation")
        .match_query(mode("active"))
        .match_header("authorization", "Bearer jwt-abc")
        .with_status(200)
        .with_body(r#"{"heater":true}"#)
        .create();
    write_config(&dir, &server.url());
    write_token(&dir, "jwt-abc");

    let output = cultiva(&dir).args(["-j", "status"]).output().unwrap();
    assert!(output.status.success(), "{output:?}");

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["state"]["heater"], "on");
    assert_eq!(value["state"]["irrigator"], "auto");
    assert_eq!(value["changes"].as_array().map(Vec::len), Some(1));
}

// ---------------------------------------------------------------------------
// cultiva set
// ---------------------------------------------------------------------------

#[test]
fn set_sends_one_coalesced_update() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    serve_activation(
        &mut server,
        r#"{"irrigator":true,"heater":true,"lighting":true,"uv":true,"shading":true}"#,
        "{}",
    );
    let auto = server
        .mock("PATCH", "/activation")
        .match_query(mode("auto"))
        .match_body(Matcher::Json(json!({
            "irrigator": true,
            "heater": false,
            "lighting": false,
            "uv": true,
            "shading": true,
        })))
        .with_status(200)
        .expect(1)
        .create();
    let active = server
        .mock("PATCH", "/activation")
        .match_query(mode("active"))
        .match_body(Matcher::Json(json!({"heater": true, "lighting": false})))
        .with_status(200)
        .expect(1)
        .create();
    write_config(&dir, &server.url());
    write_token(&dir, "jwt-abc");

    cultiva(&dir)
        .args(["set", "heater=on", "lighting=off"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[on]"))
        .stdout(predicate::str::contains("auto:   sent"));

    auto.assert();
    active.assert();
}

#[test]
fn set_keeps_remote_manual_actuators() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    serve_activation(
        &mut server,
        r#"{"irrigator":false,"heater":true,"lighting":false,"uv":true,"shading":true}"#,
        r#"{"irrigator":false,"lighting":true}"#,
    );
    let auto = server
        .mock("PATCH", "/activation")
        .match_query(mode("auto"))
        .match_body(Matcher::Json(json!({
            "irrigator": false,
            "heater": false,
            "lighting": false,
            "uv": true,
            "shading": true,
        })))
        .with_status(200)
        .expect(1)
        .create();
    let active = server
        .mock("PATCH", "/activation")
        .match_query(mode("active"))
        .match_body(Matcher::Json(json!({
            "irrigator": false,
            "heater": true,
            "lighting": true,
        })))
        .with_status(200)
        .expect(1)
        .create();
    write_config(&dir, &server.url());
    write_token(&dir, "jwt-abc");

    let output = cultiva(&dir)
        .args(["-j", "set", "heater=on"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["state"]["irrigator"], "off");
    assert_eq!(report["state"]["lighting"], "on");
    assert_eq!(report["state"]["heater"], "on");
    auto.assert();
    active.assert();
}

#[test]
fn set_sends_nothing_when_remote_state_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/activation")
        .match_query(mode("auto"))
        .with_status(503)
        .create();
    server
        .mock("GET", "/activation")
        .match_query(mode("active"))
        .with_status(200)
        .with_body("{}")
        .create();
    let patch = server
        .mock("PATCH", "/activation")
        .match_query(Matcher::Any)
        .expect(0)
        .create();
    write_config(&dir, &server.url());
    write_token(&dir, "jwt-abc");

    cultiva(&dir)
        .args(["set", "uv=off"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing was sent"));
    patch.assert();
}

#[test]
fn set_without_token_reports_failure() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "http://127.0.0.1:1");
    cultiva(&dir)
        .args(["set", "heater=on"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("log in"));
}

#[test]
fn set_rejects_unknown_actuator() {
    let dir = TempDir::new().unwrap();
    cultiva(&dir)
        .args(["set", "fan=on"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown actuator"));
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    cultiva(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("login"));
}
