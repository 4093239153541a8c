//! Wire payloads for the `/activation` endpoints.
//!
//! The control API models every actuator with two independent flags:
//! `mode=auto` (is the greenhouse controller in charge?) and `mode=active`
//! (manual on/off, only meaningful while auto is off). This module derives
//! both payloads from a [`SystemsState`] and folds fetched flags back into it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::SystemsState;
use crate::types::{ActuatorMode, ActuatorName};

// ---------------------------------------------------------------------------
// ActuatorFlags
// ---------------------------------------------------------------------------

/// `{ <actuatorName>: bool, ... }` as sent and received by the control API.
///
/// An absent key means "not applicable / unknown". Unknown keys fail to
/// decode because [`ActuatorName`] is a closed enum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActuatorFlags(BTreeMap<ActuatorName, bool>);

impl ActuatorFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: ActuatorName) -> Option<bool> {
        self.0.get(&name).copied()
    }

    pub fn insert(&mut self, name: ActuatorName, flag: bool) {
        self.0.insert(name, flag);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActuatorName, bool)> + '_ {
        self.0.iter().map(|(&n, &f)| (n, f))
    }
}

impl FromIterator<(ActuatorName, bool)> for ActuatorFlags {
    fn from_iter<I: IntoIterator<Item = (ActuatorName, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Auto flag for every actuator: `true` iff its mode is [`ActuatorMode::Auto`].
pub fn auto_payload(state: &SystemsState) -> ActuatorFlags {
    state.iter().map(|(n, m)| (n, m.is_auto())).collect()
}

/// On/off flag for manual actuators only. Empty when everything is on auto.
pub fn active_payload(state: &SystemsState) -> ActuatorFlags {
    state
        .iter()
        .filter_map(|(n, m)| m.active_flag().map(|f| (n, f)))
        .collect()
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// One actuator whose mode changed during [`reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeChange {
    pub actuator: ActuatorName,
    pub from: ActuatorMode,
    pub to: ActuatorMode,
}

/// Fold fetched remote flags into `state`.
///
/// Per actuator: a `true` auto flag wins; otherwise an explicit active flag
/// selects on/off; otherwise the local mode is kept. Returns the modes that
/// actually changed.
pub fn reconcile(
    state: &mut SystemsState,
    auto: &ActuatorFlags,
    active: &ActuatorFlags,
) -> Vec<ModeChange> {
    let mut changes = Vec::new();
    for &name in ActuatorName::all() {
        let next = if auto.get(name) == Some(true) {
            ActuatorMode::Auto
        } else {
            match active.get(name) {
                Some(true) => ActuatorMode::On,
                Some(false) => ActuatorMode::Off,
                None => continue,
            }
        };
        let prev = state.set(name, next);
        if prev != next {
            changes.push(ModeChange {
                actuator: name,
                from: prev,
                to: next,
            });
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActuatorMode::{Auto, Off, On};
    use crate::types::ActuatorName::{Heater, Irrigator, Lighting, Shading, Uv};

    fn flags(pairs: &[(ActuatorName, bool)]) -> ActuatorFlags {
        pairs.iter().copied().collect()
    }

    #[test]
    fn auto_payload_is_total() {
        let state = SystemsState::default().with(Irrigator, On);
        let auto = auto_payload(&state);
        assert_eq!(auto.len(), ActuatorName::COUNT);
        assert_eq!(auto.get(Irrigator), Some(false));
        assert_eq!(auto.get(Heater), Some(true));
    }

    #[test]
    fn active_payload_omits_auto_actuators() {
        let state = SystemsState::default().with(Heater, On).with(Uv, Off);
        let active = active_payload(&state);
        assert_eq!(active, flags(&[(Heater, true), (Uv, false)]));
    }

    #[test]
    fn active_payload_empty_when_all_auto() {
        assert!(active_payload(&SystemsState::default()).is_empty());
    }

    #[test]
    fn payload_json_shape() {
        let state = SystemsState::default().with(Irrigator, On);
        assert_eq!(
            serde_json::to_value(auto_payload(&state)).unwrap(),
            serde_json::json!({
                "irrigator": false,
                "heater": true,
                "lighting": true,
                "uv": true,
                "shading": true,
            })
        );
        assert_eq!(
            serde_json::to_value(active_payload(&state)).unwrap(),
            serde_json::json!({ "irrigator": true })
        );
    }

    #[test]
    fn flags_reject_unknown_keys() {
        let err = serde_json::from_str::<ActuatorFlags>(r#"{"heater":true,"fan":false}"#);
        assert!(err.is_err());
    }

    #[test]
    fn flags_allow_missing_keys() {
        let f: ActuatorFlags = serde_json::from_str(r#"{"heater":true}"#).unwrap();
        assert_eq!(f.get(Heater), Some(true));
        assert_eq!(f.get(Shading), None);
    }

    #[test]
    fn reconcile_auto_wins_over_active() {
        let mut state = SystemsState::uniform(Off);
        reconcile(&mut state, &flags(&[(Heater, true)]), &flags(&[(Heater, false)]));
        assert_eq!(state.get(Heater), Auto);
    }

    #[test]
    fn reconcile_uses_active_when_not_auto() {
        let mut state = SystemsState::default();
        let changes = reconcile(
            &mut state,
            &flags(&[(Heater, false), (Lighting, false)]),
            &flags(&[(Heater, true), (Lighting, false)]),
        );
        assert_eq!(state.get(Heater), On);
        assert_eq!(state.get(Lighting), Off);
        assert_eq!(changes.len(), 2);
        assert_eq!(
            changes[0],
            ModeChange {
                actuator: Heater,
                from: Auto,
                to: On
            }
        );
    }

    #[test]
    fn reconcile_keeps_local_value_when_unknown() {
        let mut state = SystemsState::default().with(Shading, On);
        let changes = reconcile(
            &mut state,
            &flags(&[(Shading, false)]),
            &ActuatorFlags::new(),
        );
        assert_eq!(state.get(Shading), On);
        assert!(changes.is_empty());
    }

    #[test]
    fn reconcile_reports_only_real_changes() {
        let mut state = SystemsState::default();
        let auto = auto_payload(&state);
        let changes = reconcile(&mut state, &auto, &ActuatorFlags::new());
        assert!(changes.is_empty());
        assert_eq!(state, SystemsState::default());
    }
}
