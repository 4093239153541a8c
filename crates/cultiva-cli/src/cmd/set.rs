use crate::context::Context;
use crate::output::{print_json, print_state};
use actuator_sync::{FailureKind, SyncError, SyncEvent, WriteOutcome, WriteReport};
use anyhow::Context as _;
use cultiva_core::Assignment;
use futures::{Stream, StreamExt};

/// Apply `assignments` on top of the greenhouse's current modes and send them as one write.
///
/// Remote state is always pulled first: the auto payload covers every
/// actuator, so writing from local defaults would reset manual actuators the
/// user never named.
pub fn run(ctx: &Context, assignments: &[Assignment], json: bool) -> anyhow::Result<()> {
    let engine = ctx.engine()?;
    let rt = tokio::runtime::Runtime::new()?;

    let report = rt.block_on(async {
        match engine.refresh().await {
            Ok(_) => {}
            Err(SyncError::AuthAbsent) => {
                anyhow::bail!("not logged in: run `cultiva login --email <email>` to log in first")
            }
            Err(e) => {
                return Err(e).context("failed to fetch actuator state, nothing was sent")
            }
        }

        let events = engine.events();
        for a in assignments {
            engine.set_mode(a.actuator, a.mode);
        }
        wait_for_flush(events).await
    })?;

    if json {
        print_json(&report)?;
    } else {
        print_state(&report.state);
        println!();
        println!("auto:   {}", outcome_display(&report.auto_outcome));
        println!("active: {}", outcome_display(&report.active_outcome));
    }

    if !report.is_success() {
        let auth_missing = [&report.auto_outcome, &report.active_outcome]
            .iter()
            .any(|o| matches!(o, WriteOutcome::Failed(f) if f.kind == FailureKind::AuthAbsent));
        if auth_missing {
            anyhow::bail!("no auth token: changes were not sent, log in with `cultiva login` first");
        }
        anyhow::bail!("greenhouse did not accept every change");
    }
    Ok(())
}

async fn wait_for_flush(events: impl Stream<Item = SyncEvent>) -> anyhow::Result<WriteReport> {
    let mut events = Box::pin(events);
    while let Some(event) = events.next().await {
        if let SyncEvent::Flushed(report) = event {
            return Ok(report);
        }
    }
    anyhow::bail!("sync engine stopped before sending")
}

fn outcome_display(outcome: &WriteOutcome) -> String {
    match outcome {
        WriteOutcome::Sent => "sent".to_string(),
        WriteOutcome::Skipped => "skipped (every actuator on auto)".to_string(),
        WriteOutcome::Failed(f) => format!("failed: {}", f.message),
    }
}
