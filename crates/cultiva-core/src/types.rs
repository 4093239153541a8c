use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// ActuatorName
// ---------------------------------------------------------------------------

/// The closed set of greenhouse actuators the control API knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorName {
    Irrigator,
    Heater,
    Lighting,
    Uv,
    Shading,
}

impl ActuatorName {
    pub const COUNT: usize = 5;

    pub fn all() -> &'static [ActuatorName] {
        &[
            ActuatorName::Irrigator,
            ActuatorName::Heater,
            ActuatorName::Lighting,
            ActuatorName::Uv,
            ActuatorName::Shading,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActuatorName::Irrigator => "irrigator",
            ActuatorName::Heater => "heater",
            ActuatorName::Lighting => "lighting",
            ActuatorName::Uv => "uv",
            ActuatorName::Shading => "shading",
        }
    }

    /// Human-facing label for tables.
    pub fn label(self) -> &'static str {
        match self {
            ActuatorName::Irrigator => "Irrigation",
            ActuatorName::Heater => "Heating",
            ActuatorName::Lighting => "Lighting",
            ActuatorName::Uv => "UV",
            ActuatorName::Shading => "Shading",
        }
    }
}

impl fmt::Display for ActuatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActuatorName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "irrigator" => Ok(ActuatorName::Irrigator),
            "heater" => Ok(ActuatorName::Heater),
            "lighting" => Ok(ActuatorName::Lighting),
            "uv" => Ok(ActuatorName::Uv),
            "shading" => Ok(ActuatorName::Shading),
            _ => Err(CoreError::UnknownActuator(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ActuatorMode
// ---------------------------------------------------------------------------

/// Three-way switch position. Declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorMode {
    Off,
    Auto,
    On,
}

impl ActuatorMode {
    pub fn all() -> &'static [ActuatorMode] {
        &[ActuatorMode::Off, ActuatorMode::Auto, ActuatorMode::On]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActuatorMode::Off => "off",
            ActuatorMode::Auto => "auto",
            ActuatorMode::On => "on",
        }
    }

    pub fn is_auto(self) -> bool {
        self == ActuatorMode::Auto
    }

    /// Manual on/off flag, or `None` when the actuator is under automatic control.
    pub fn active_flag(self) -> Option<bool> {
        match self {
            ActuatorMode::Off => Some(false),
            ActuatorMode::Auto => None,
            ActuatorMode::On => Some(true),
        }
    }
}

impl fmt::Display for ActuatorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActuatorMode {
    type Err = CoreError;

    /// Accepts the canonical names plus the dashboard's switch labels
    /// (`Apagado` / `Automático` / `Encendido`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" | "apagado" => Ok(ActuatorMode::Off),
            "auto" | "automatico" | "automático" => Ok(ActuatorMode::Auto),
            "on" | "encendido" => Ok(ActuatorMode::On),
            _ => Err(CoreError::InvalidMode(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// A single `<actuator>=<mode>` request, as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub actuator: ActuatorName,
    pub mode: ActuatorMode,
}

impl std::str::FromStr for Assignment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((name, mode)) = s.split_once('=') else {
            return Err(CoreError::InvalidAssignment(s.to_string()));
        };
        Ok(Assignment {
            actuator: name.trim().parse()?,
            mode: mode.parse()?,
        })
    }
}
