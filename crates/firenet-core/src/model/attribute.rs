// ── Attribute types ──

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The semantic attributes a stove exposes to a host framework.
///
/// Names follow the HomeKit heater/cooler service so hosts can map them
/// one-to-one.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Attribute {
    /// Whether the stove is switched on. Read/write.
    Active,
    /// What the stove is doing right now. Read-only.
    CurrentHeaterCoolerState,
    /// Requested mode. Always `Auto`; writes are accepted and ignored.
    TargetHeaterCoolerState,
    /// Room temperature measured by the stove. Read-only.
    CurrentTemperature,
    /// Target room temperature. Read/write.
    HeatingThresholdTemperature,
}

impl Attribute {
    pub fn is_writable(self) -> bool {
        matches!(
            self,
            Self::Active | Self::TargetHeaterCoolerState | Self::HeatingThresholdTemperature
        )
    }
}

/// Current operating state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum HeaterCoolerState {
    Inactive,
    Idle,
    Heating,
}

impl HeaterCoolerState {
    /// HomeKit characteristic value.
    pub fn code(self) -> u8 {
        match self {
            Self::Inactive => 0,
            Self::Idle => 1,
            Self::Heating => 2,
        }
    }
}

/// Requested operating mode. Cooling does not exist for this device class.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum TargetHeaterCoolerState {
    #[default]
    Auto,
}

impl TargetHeaterCoolerState {
    /// HomeKit characteristic value.
    pub fn code(self) -> u8 {
        0
    }
}

/// A value read from or written to an [`Attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    State(HeaterCoolerState),
    Target(TargetHeaterCoolerState),
    Number(f64),
}

impl AttributeValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::State(s) => write!(f, "{s}"),
            Self::Target(t) => write!(f, "{t}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// A single field change in the Firenet `controls` object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlChange {
    /// `onOff`: main power switch.
    OnOff(bool),
    /// `targetTemperature`: room temperature set point, forwarded verbatim.
    TargetTemperature(f64),
}

impl ControlChange {
    /// Remote field name inside `controls`.
    pub fn field(&self) -> &'static str {
        match self {
            Self::OnOff(_) => "onOff",
            Self::TargetTemperature(_) => "targetTemperature",
        }
    }

    /// JSON value written into `controls`.
    ///
    /// Whole temperatures are sent as integers (`22`, not `22.0`) to match
    /// what the Firenet web UI submits.
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn value(&self) -> Value {
        match *self {
            Self::OnOff(on) => Value::Bool(on),
            Self::TargetTemperature(t) => {
                if t.fract() == 0.0 && t.abs() < 1e15 {
                    Value::from(t as i64)
                } else {
                    serde_json::Number::from_f64(t).map_or(Value::Null, Value::Number)
                }
            }
        }
    }
}
