//! `actuator-sync` — keeps the greenhouse actuator switches in step with the
//! control API.
//!
//! # Architecture
//!
//! ```text
//! set_mode(name, mode)
//!     │   local SystemsState updated at once
//!     ▼
//! debounce timer  ← one per engine, restarted by every set_mode
//!     │
//!     ▼
//! PATCH /activation?mode=auto    (every actuator)
//! PATCH /activation?mode=active  (manual actuators only, skipped if none)
//!
//! refresh() ─► GET mode=auto ┐
//!              GET mode=active ┴─► reconcile into SystemsState
//! ```
//!
//! The HTTP side sits behind [`ActuatorApi`]; [`HttpActuatorApi`] is the
//! reqwest implementation.

pub mod api;
pub mod auth;
pub mod engine;
pub mod error;
pub mod event;


pub use api::{ActuatorApi, ApiMode, HttpActuatorApi};
pub use auth::{login, register};
pub use engine::{EnginePhase, SyncEngine};
pub use error::{FailureKind, SyncError};
pub use event::{Diagnostics, Failure, SyncEvent, WriteOutcome, WriteReport};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, SyncError>;
