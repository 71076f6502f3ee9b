// ── Light classification ──
//
// The hub exposes no usable device-type field here, so a device is a
// "light" purely because its state is exactly "on" or "off". Any other
// binary entity (switches, input booleans) in one of those states is
// classified as a light too.

use crate::model::{Device, PowerState};

/// `true` iff `device.state` is exactly `"on"` or `"off"`.
pub fn is_light(device: &Device) -> bool {
    !matches!(device.power(), PowerState::Other)
}

/// Keep only lights, preserving the hub's order.
pub fn filter_lights<I>(devices: I) -> Vec<Device>
where
    I: IntoIterator<Item = Device>,
{
    devices.into_iter().filter(is_light).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Device> {
        vec![
            Device::new("light.a", "on"),
            Device::new("sensor.temp", "21.5"),
            Device::new("light.b", "off"),
            Device::new("switch.x", "unavailable"),
            Device::new("light.c", "ON"),
            Device::new("light.d", "off"),
        ]
    }

    fn ids(devices: &[Device]) -> Vec<&str> {
        devices.iter().map(|d| d.entity_id.as_str()).collect()
    }

    #[test]
    fn keeps_only_exact_on_off_in_order() {
        let lights = filter_lights(sample());
        assert_eq!(ids(&lights), ["light.a", "light.b", "light.d"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let once = filter_lights(sample());
        let twice = filter_lights(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn unavailable_entity_is_excluded() {
        assert!(filter_lights(vec![Device::new("switch.x", "unavailable")]).is_empty());
    }

    #[test]
    fn non_light_entity_in_on_state_is_treated_as_light() {
        // Classification is state-only; the entity domain is never consulted.
        assert!(is_light(&Device::new("switch.coffee_maker", "on")));
        assert!(is_light(&Device::new("input_boolean.guest_mode", "off")));
    }
}
