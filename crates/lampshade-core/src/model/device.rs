// ── Device domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the dashboard reads a device's free-form `state` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerState {
    On,
    Off,
    /// Anything other than exactly `"on"` / `"off"` (e.g. `"unavailable"`).
    Other,
}

impl PowerState {
    /// Exact, case-sensitive match: `"On"` or `" on"` are `Other`.
    pub fn from_state(state: &str) -> Self {
        match state {
            "on" => Self::On,
            "off" => Self::Off,
            _ => Self::Other,
        }
    }

    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Display attributes reported by the hub. None of these drive logic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAttributes {
    pub manufacturer: Option<String>,
    pub friendly_name: Option<String>,
    pub device_model: Option<String>,
    pub model_name: Option<String>,
    /// Feature bitmask, display-only.
    pub supported_features: u32,
}

/// A hub entity as shown in the lights table.
///
/// Identity is `entity_id`. `state` is the only field the dashboard ever
/// mutates locally; everything else is replaced wholesale on each poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub entity_id: String,
    pub state: String,
    pub last_changed: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub attributes: DeviceAttributes,
}

impl Device {
    /// Minimal device with no attributes. Mostly useful in tests.
    pub fn new(entity_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            last_changed: None,
            last_updated: None,
            attributes: DeviceAttributes::default(),
        }
    }

    pub fn power(&self) -> PowerState {
        PowerState::from_state(&self.state)
    }

    /// Friendly name, falling back to the entity id.
    pub fn display_name(&self) -> &str {
        self.attributes
            .friendly_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.entity_id)
    }

    /// Entity-id prefix before the first `.` (`"light"` for `light.kitchen`).
    pub fn domain(&self) -> Option<&str> {
        self.entity_id.split_once('.').map(|(domain, _)| domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_state_is_case_sensitive() {
        assert_eq!(PowerState::from_state("on"), PowerState::On);
        assert_eq!(PowerState::from_state("off"), PowerState::Off);
        assert_eq!(PowerState::from_state("On"), PowerState::Other);
        assert_eq!(PowerState::from_state("on "), PowerState::Other);
        assert_eq!(PowerState::from_state("unavailable"), PowerState::Other);
    }

    #[test]
    fn display_name_falls_back_to_entity_id() {
        let mut device = Device::new("light.porch", "off");
        assert_eq!(device.display_name(), "light.porch");

        device.attributes.friendly_name = Some(String::new());
        assert_eq!(device.display_name(), "light.porch");

        device.attributes.friendly_name = Some("Porch".into());
        assert_eq!(device.display_name(), "Porch");
    }

    #[test]
    fn domain_splits_on_first_dot() {
        assert_eq!(Device::new("light.living.room", "on").domain(), Some("light"));
        assert_eq!(Device::new("nodomain", "on").domain(), None);
    }
}
