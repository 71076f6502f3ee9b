// Wire types for the hub REST API.
//
// Field names match the JSON exactly. Everything the hub may omit is
// optional so a half-configured device never breaks the whole poll.

use serde::{Deserialize, Serialize};

/// One entry of the `GET /api/states` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StateResponse {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub last_changed: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub attributes: StateAttributes,
}

/// The subset of `attributes` the dashboard displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StateAttributes {
    #[serde(default, rename = "device_manufacturer")]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default, rename = "manufacturer_device_model")]
    pub device_model: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub supported_features: Option<u32>,
}

/// Body of a `light.turn_on` / `light.turn_off` service call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCall<'a> {
    pub entity_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn service_call_has_only_entity_id() {
        let body = serde_json::to_string(&ServiceCall {
            entity_id: "light.kitchen",
        })
        .expect("serialize");
        assert_eq!(body, r#"{"entity_id":"light.kitchen"}"#);
    }

    #[test]
    fn state_parses_full_payload() {
        let raw = r#"{
            "entity_id": "light.hallway",
            "state": "on",
            "last_changed": "2024-06-15T10:30:00.123456+00:00",
            "last_updated": "2024-06-15T10:31:00+00:00",
            "context": { "id": "01HX", "parent_id": null },
            "attributes": {
                "device_manufacturer": "Signify",
                "friendly_name": "Hallway",
                "manufacturer_device_model": "LCT015",
                "model_name": "Hue color lamp",
                "supported_features": 63,
                "brightness": 180
            }
        }"#;

        let state: StateResponse = serde_json::from_str(raw).expect("parse");

        assert_eq!(state.entity_id, "light.hallway");
        assert_eq!(state.state, "on");
        assert_eq!(state.attributes.manufacturer.as_deref(), Some("Signify"));
        assert_eq!(state.attributes.friendly_name.as_deref(), Some("Hallway"));
        assert_eq!(state.attributes.device_model.as_deref(), Some("LCT015"));
        assert_eq!(state.attributes.model_name.as_deref(), Some("Hue color lamp"));
        assert_eq!(state.attributes.supported_features, Some(63));
    }

    #[test]
    fn state_tolerates_missing_attributes() {
        let raw = r#"{ "entity_id": "sun.sun", "state": "above_horizon" }"#;
        let state: StateResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(state.attributes, StateAttributes::default());
        assert!(state.last_changed.is_none());
    }
}
