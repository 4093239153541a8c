use crate::context::Context;
use crate::output::{print_json, print_state};
use actuator_sync::SyncError;
use anyhow::Context as _;

pub fn run(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let engine = ctx.engine()?;
    let rt = tokio::runtime::Runtime::new()?;

    let changes = match rt.block_on(engine.refresh()) {
        Ok(changes) => changes,
        Err(SyncError::AuthAbsent) => {
            anyhow::bail!("not logged in: run `cultiva login --email <email>` to log in first")
        }
        Err(e) => return Err(e).context("failed to fetch actuator state"),
    };

    let state = engine.state();
    if json {
        print_json(&serde_json::json!({
            "state": state,
            "changes": changes,
        }))?;
    } else {
        print_state(&state);
    }
    Ok(())
}
