use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::types::{ActuatorMode, ActuatorName};

// ---------------------------------------------------------------------------
// SystemsState
// ---------------------------------------------------------------------------

/// Mode of every actuator in the greenhouse.
///
/// Total by construction: backed by one slot per [`ActuatorName`], so there is
/// no way to represent a missing actuator. On the wire it is a plain
/// `{name: mode}` map; decoding rejects unknown names and requires all five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<ActuatorName, ActuatorMode>",
    into = "BTreeMap<ActuatorName, ActuatorMode>"
)]
pub struct SystemsState {
    modes: [ActuatorMode; ActuatorName::COUNT],
}

impl Default for SystemsState {
    /// Every actuator starts under automatic control.
    fn default() -> Self {
        Self::uniform(ActuatorMode::Auto)
    }
}

impl SystemsState {
    pub fn uniform(mode: ActuatorMode) -> Self {
        Self {
            modes: [mode; ActuatorName::COUNT],
        }
    }

    pub fn get(&self, name: ActuatorName) -> ActuatorMode {
        self.modes[name.index()]
    }

    /// Overwrite the mode for `name`, returning the previous one.
    pub fn set(&mut self, name: ActuatorName, mode: ActuatorMode) -> ActuatorMode {
        std::mem::replace(&mut self.modes[name.index()], mode)
    }

    pub fn with(mut self, name: ActuatorName, mode: ActuatorMode) -> Self {
        self.set(name, mode);
        self
    }

    /// `(name, mode)` pairs in [`ActuatorName::all`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ActuatorName, ActuatorMode)> + '_ {
        ActuatorName::all().iter().map(|&n| (n, self.get(n)))
    }

    pub fn all_auto(&self) -> bool {
        self.modes.iter().all(|m| m.is_auto())
    }
}

impl From<SystemsState> for BTreeMap<ActuatorName, ActuatorMode> {
    fn from(state: SystemsState) -> Self {
        state.iter().collect()
    }
}

impl TryFrom<BTreeMap<ActuatorName, ActuatorMode>> for SystemsState {
    type Error = CoreError;

    fn try_from(map: BTreeMap<ActuatorName, ActuatorMode>) -> Result<Self, Self::Error> {
        let mut state = SystemsState::default();
        for &name in ActuatorName::all() {
            let mode = map
                .get(&name)
                .copied()
                .ok_or_else(|| CoreError::MissingActuator(name.to_string()))?;
            state.set(name, mode);
        }
        Ok(state)
    }
}
