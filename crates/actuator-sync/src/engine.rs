use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use cultiva_core::{
    active_payload, auto_payload, reconcile, ActuatorFlags, ActuatorMode, ActuatorName,
    ModeChange, SystemsState, TokenProvider,
};
use futures::Stream;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ActuatorApi, ApiMode};
use crate::event::{Diagnostics, Failure, SyncEvent, WriteOutcome, WriteReport};
use crate::{Result, SyncError};

// ─── EnginePhase ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    /// No write scheduled.
    Idle,
    /// A debounce timer is running.
    Pending,
}

// ─── SyncEngine ───────────────────────────────────────────────────────────

/// Keeps a local [`SystemsState`] in step with the control API.
///
/// Mode changes land in local state immediately and restart one shared
/// debounce timer; when the timer runs out the whole state is sent as an
/// auto payload plus (if any actuator is manual) an active payload. Write
/// outcomes never touch local state: only [`SyncEngine::refresh`] pulls
/// remote values back in.
///
/// Cloning is cheap; all clones drive the same engine. Dropping the last
/// clone cancels a timer that has not fired yet.
///
/// ```rust,ignore
/// let engine = SyncEngine::new(HttpActuatorApi::new(url), Arc::new(store), cfg.debounce());
/// engine.refresh().await?;
/// engine.set_mode(ActuatorName::Heater, ActuatorMode::On);
/// engine.set_mode(ActuatorName::Lighting, ActuatorMode::Auto); // same write
/// ```
pub struct SyncEngine<A: ActuatorApi> {
    inner: Arc<Inner<A>>,
}

impl<A: ActuatorApi> Clone for SyncEngine<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<A> {
    api: A,
    tokens: Arc<dyn TokenProvider>,
    debounce: Duration,
    shared: Mutex<Shared>,
    events: broadcast::Sender<SyncEvent>,
}

/// Everything guarded by the single engine mutex.
struct Shared {
    state: SystemsState,
    pending: Option<PendingWrite>,
    /// Bumped by every `set_mode`; identifies the live timer.
    generation: u64,
    /// Generation of the last `set_mode` per actuator.
    touched: [u64; ActuatorName::COUNT],
    /// Highest generation whose state has been handed to a write.
    flushed: u64,
    diagnostics: Diagnostics,
}

struct PendingWrite {
    generation: u64,
    handle: JoinHandle<()>,
}

impl<A: ActuatorApi> SyncEngine<A> {
    pub fn new(api: A, tokens: Arc<dyn TokenProvider>, debounce: Duration) -> Self {
        Self::with_state(api, tokens, debounce, SystemsState::default())
    }

    pub fn with_state(
        api: A,
        tokens: Arc<dyn TokenProvider>,
        debounce: Duration,
        state: SystemsState,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        let inner = Inner {
            api,
            tokens,
            debounce,
            shared: Mutex::new(Shared {
                state,
                pending: None,
                generation: 0,
                touched: [0; ActuatorName::COUNT],
                flushed: 0,
                diagnostics: Diagnostics::default(),
            }),
            events,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    // ─── Read side ────────────────────────────────────────────────────────

    /// Copy of the current local state, for rendering.
    pub fn state(&self) -> SystemsState {
        self.inner.lock().state
    }

    pub fn mode(&self, actuator: ActuatorName) -> ActuatorMode {
        self.inner.lock().state.get(actuator)
    }

    pub fn phase(&self) -> EnginePhase {
        if self.inner.lock().pending.is_some() {
            EnginePhase::Pending
        } else {
            EnginePhase::Idle
        }
    }

    pub fn is_pending(&self) -> bool {
        self.phase() == EnginePhase::Pending
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.inner.lock().diagnostics.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.events.subscribe()
    }

    /// [`subscribe`](Self::subscribe) as a stream. Subscribes immediately, so
    /// events from calls made after this returns are never missed. A slow
    /// consumer skips what it lagged behind on. Ends when the engine drops.
    pub fn events(&self) -> impl Stream<Item = SyncEvent> + Send + 'static {
        futures::stream::unfold(self.subscribe(), |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(event) => return Some((event, rx)),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "event subscriber lagged");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
    }

    // ─── Mutation ─────────────────────────────────────────────────────────

    /// Apply `mode` to `actuator` locally and (re)start the debounce timer.
    ///
    /// Never waits on the network. Must be called from within a Tokio
    /// runtime; outside one the state still changes but nothing is sent.
    pub fn set_mode(&self, actuator: ActuatorName, mode: ActuatorMode) {
        let runtime = tokio::runtime::Handle::try_current();

        let mut shared = self.inner.lock();
        let prev = shared.state.set(actuator, mode);
        shared.generation += 1;
        let generation = shared.generation;
        shared.touched[actuator.index()] = generation;
        debug!(actuator = %actuator, from = %prev, to = %mode, generation, "mode changed");

        if let Some(old) = shared.pending.take() {
            old.handle.abort();
            debug!(generation = old.generation, "superseded pending write");
        }

        let Ok(runtime) = runtime else {
            warn!(actuator = %actuator, "no async runtime: mode change will not be sent");
            return;
        };

        let weak = Arc::downgrade(&self.inner);
        let delay = self.inner.debounce;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            fire(weak, generation).await;
        });
        shared.pending = Some(PendingWrite { generation, handle });

        // Sent under the lock: `fire` needs it too, so `Flushed` cannot overtake.
        let _ = self.inner.events.send(SyncEvent::Scheduled { generation });
    }

    /// Fetch both flag sets with `token` and reconcile them into local state.
    ///
    /// Both reads run concurrently; if either fails nothing is applied.
    /// Actuators with a change that has not been handed to a write yet keep
    /// their local mode, so a refresh never undoes pending intent.
    pub async fn initialize(&self, token: &str) -> Result<Vec<ModeChange>> {
        let inner = &self.inner;
        let fetched = tokio::try_join!(
            inner.api.fetch(token, ApiMode::Auto),
            inner.api.fetch(token, ApiMode::Active),
        );

        let (auto, active) = match fetched {
            Ok(flags) => flags,
            Err(err) => {
                inner.refresh_failed(&err);
                return Err(err);
            }
        };

        let changes = {
            let mut shared = inner.lock();
            let unsent = |name: ActuatorName| shared.touched[name.index()] > shared.flushed;
            let keep = |flags: &ActuatorFlags| -> ActuatorFlags {
                flags.iter().filter(|(n, _)| !unsent(*n)).collect()
            };
            let (auto, active) = (keep(&auto), keep(&active));
            let changes = reconcile(&mut shared.state, &auto, &active);
            shared.diagnostics.refreshes += 1;
            shared.diagnostics.last_refresh_at = Some(Utc::now());
            changes
        };

        for c in &changes {
            info!(actuator = %c.actuator, from = %c.from, to = %c.to, "reconciled from server");
        }
        let _ = inner.events.send(SyncEvent::Refreshed {
            changes: changes.clone(),
        });
        Ok(changes)
    }

    /// [`initialize`](Self::initialize) with the token from the provider.
    ///
    /// With no token nothing is requested and state is left alone.
    pub async fn refresh(&self) -> Result<Vec<ModeChange>> {
        let Some(token) = self.inner.tokens.token() else {
            let err = SyncError::AuthAbsent;
            self.inner.refresh_failed(&err);
            return Err(err);
        };
        self.initialize(&token).await
    }
}

// ─── Timer ────────────────────────────────────────────────────────────────

/// Debounce timer body. A timer that lost the race to a newer `set_mode`
/// finds a different generation in `pending` and does nothing.
async fn fire<A: ActuatorApi>(weak: Weak<Inner<A>>, generation: u64) {
    let Some(inner) = weak.upgrade() else {
        return;
    };

    let snapshot = {
        let mut shared = inner.lock();
        match &shared.pending {
            Some(p) if p.generation == generation => {}
            _ => return,
        }
        // Detach: from here on later `set_mode` calls cannot abort this write.
        shared.pending = None;
        shared.flushed = generation;
        shared.state
    };

    let report = inner.write(generation, snapshot).await;

    {
        let mut shared = inner.lock();
        shared.diagnostics.record_outcome(&report.auto_outcome);
        shared.diagnostics.record_outcome(&report.active_outcome);
        shared.diagnostics.last_flush_at = Some(Utc::now());
    }

    let _ = inner.events.send(SyncEvent::Flushed(report));
}

impl<A: ActuatorApi> Inner<A> {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn write(&self, generation: u64, state: SystemsState) -> WriteReport {
        let auto = auto_payload(&state);
        let active = active_payload(&state);

        let (auto_outcome, active_outcome) = match self.tokens.token() {
            None => {
                let failure = Failure::from_error(&SyncError::AuthAbsent);
                warn!(generation, "no auth token: dropping write");
                let active_outcome = if active.is_empty() {
                    WriteOutcome::Skipped
                } else {
                    WriteOutcome::Failed(failure.clone())
                };
                (WriteOutcome::Failed(failure), active_outcome)
            }
            Some(token) => {
                let auto_outcome = self.patch(&token, ApiMode::Auto, &auto).await;
                let active_outcome = if active.is_empty() {
                    debug!(generation, "every actuator on auto: skipping active write");
                    WriteOutcome::Skipped
                } else {
                    self.patch(&token, ApiMode::Active, &active).await
                };
                (auto_outcome, active_outcome)
            }
        };

        WriteReport {
            generation,
            state,
            auto,
            active,
            auto_outcome,
            active_outcome,
        }
    }

    async fn patch(&self, token: &str, mode: ApiMode, flags: &ActuatorFlags) -> WriteOutcome {
        match self.api.update(token, mode, flags).await {
            Ok(()) => {
                info!(mode = %mode, actuators = flags.len(), "activation updated");
                WriteOutcome::Sent
            }
            Err(err) => {
                warn!(mode = %mode, error = %err, "activation update failed");
                WriteOutcome::Failed(Failure::from_error(&err))
            }
        }
    }

    fn refresh_failed(&self, err: &SyncError) {
        warn!(error = %err, "failed to fetch activation state");
        let failure = Failure::from_error(err);
        self.lock().diagnostics.record_refresh_failure(&failure);
        let _ = self.events.send(SyncEvent::RefreshFailed(failure));
    }
}

impl<A> Drop for Inner<A> {
    fn drop(&mut self) {
        let shared = self
            .shared
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(p) = shared.pending.take() {
            p.handle.abort();
        }
    }
}
