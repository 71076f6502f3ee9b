// ── Wire → domain conversion ──
//
// Translates `lampshade_api` response types into canonical domain types.
// Timestamps that fail to parse become `None`; they are display-only.

use chrono::{DateTime, Utc};
use lampshade_api::{StateAttributes, StateResponse};

use crate::model::{Device, DeviceAttributes};

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

impl From<StateAttributes> for DeviceAttributes {
    fn from(attrs: StateAttributes) -> Self {
        Self {
            manufacturer: attrs.manufacturer,
            friendly_name: attrs.friendly_name,
            device_model: attrs.device_model,
            model_name: attrs.model_name,
            supported_features: attrs.supported_features.unwrap_or(0),
        }
    }
}

impl From<StateResponse> for Device {
    fn from(state: StateResponse) -> Self {
        Self {
            last_changed: parse_timestamp(state.last_changed.as_deref()),
            last_updated: parse_timestamp(state.last_updated.as_deref()),
            entity_id: state.entity_id,
            state: state.state,
            attributes: state.attributes.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn response(last_changed: Option<&str>) -> StateResponse {
        StateResponse {
            entity_id: "light.kitchen".into(),
            state: "on".into(),
            last_changed: last_changed.map(str::to_owned),
            last_updated: None,
            attributes: StateAttributes {
                manufacturer: Some("IKEA".into()),
                friendly_name: Some("Kitchen".into()),
                device_model: Some("LED1545G12".into()),
                model_name: Some("TRADFRI bulb".into()),
                supported_features: None,
            },
        }
    }

    #[test]
    fn converts_attributes_and_defaults_features() {
        let device = Device::from(response(None));
        assert_eq!(device.entity_id, "light.kitchen");
        assert_eq!(device.attributes.manufacturer.as_deref(), Some("IKEA"));
        assert_eq!(device.attributes.model_name.as_deref(), Some("TRADFRI bulb"));
        assert_eq!(device.attributes.supported_features, 0);
    }

    #[test]
    fn parses_offset_timestamps_into_utc() {
        let device = Device::from(response(Some("2024-06-15T12:30:00.5+02:00")));
        let ts = device.last_changed.expect("timestamp parsed");
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 6, 15));
        assert_eq!((ts.hour(), ts.minute()), (10, 30));
    }

    #[test]
    fn unparseable_timestamp_is_none() {
        let device = Device::from(response(Some("yesterday-ish")));
        assert!(device.last_changed.is_none());
    }
}
