// ── Toggle planning ──
//
// A toggle is binary: only an exact "on" turns a light off; every other
// state (including "unavailable") turns it on.

use std::fmt;

use crate::model::Device;

/// Desired power state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerTarget {
    On,
    Off,
}

impl PowerTarget {
    /// `Off` iff `state` is exactly `"on"`, `On` otherwise.
    pub fn for_state(state: &str) -> Self {
        if state == "on" { Self::Off } else { Self::On }
    }

    /// State string the hub reports once the target is reached.
    pub fn as_state(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    /// Light service name (`turn_on` / `turn_off`).
    pub fn service(self) -> &'static str {
        match self {
            Self::On => "turn_on",
            Self::Off => "turn_off",
        }
    }

    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for PowerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_state())
    }
}

/// An in-flight toggle: what was asked, and what to restore if it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleRequest {
    pub entity_id: String,
    pub previous_state: String,
    pub target: PowerTarget,
}

impl ToggleRequest {
    pub fn for_device(device: &Device) -> Self {
        Self {
            entity_id: device.entity_id.clone(),
            previous_state: device.state.clone(),
            target: PowerTarget::for_state(&device.state),
        }
    }
}
