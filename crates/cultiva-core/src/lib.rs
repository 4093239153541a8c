pub mod config;
pub mod error;
pub mod io;
pub mod paths;
pub mod payload;
pub mod state;
pub mod token;
pub mod types;

pub use error::{CoreError, Result};
pub use payload::{active_payload, auto_payload, reconcile, ActuatorFlags, ModeChange};
pub use state::SystemsState;
pub use token::{StaticToken, TokenProvider, TokenStore};
pub use types::{ActuatorMode, ActuatorName, Assignment};
