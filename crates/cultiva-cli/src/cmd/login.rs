use crate::context::Context;
use crate::output::print_json;
use anyhow::Context as _;

pub fn run(ctx: &Context, email: &str, password: Option<&str>, json: bool) -> anyhow::Result<()> {
    let Some(password) = password else {
        anyhow::bail!("password required: pass --password or set CULTIVA_PASSWORD");
    };

    let client = ctx.http_client()?;
    let base_url = ctx.config.api.base_url.clone();
    let rt = tokio::runtime::Runtime::new()?;
    let token = rt
        .block_on(actuator_sync::login(&client, &base_url, email, password))
        .context("login failed")?;

    let store = ctx.token_store();
    store.save(&token).context("failed to save token")?;

    if json {
        print_json(&serde_json::json!({
            "status": "logged_in",
            "email": email.trim(),
            "token_path": store.path(),
        }))?;
    } else {
        println!("Logged in as {}.", email.trim());
    }
    Ok(())
}

pub fn register(
    ctx: &Context,
    name: &str,
    email: &str,
    password: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let Some(password) = password else {
        anyhow::bail!("password required: pass --password or set CULTIVA_PASSWORD");
    };

    let client = ctx.http_client()?;
    let base_url = ctx.config.api.base_url.clone();
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(actuator_sync::register(&client, &base_url, name, email, password))
        .context("could not create account")?;

    if json {
        print_json(&serde_json::json!({
            "status": "registered",
            "email": email.trim(),
        }))?;
    } else {
        println!(
            "Account created for {}. Log in with `cultiva login --email {}`.",
            email.trim(),
            email.trim()
        );
    }
    Ok(())
}

pub fn logout(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let store = ctx.token_store();
    let removed = store.clear().context("failed to remove token")?;

    if json {
        print_json(&serde_json::json!({
            "status": "logged_out",
            "removed": removed,
        }))?;
    } else if removed {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}
