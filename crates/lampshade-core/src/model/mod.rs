// ── Domain model ──
//
// Canonical types consumed by the view layer. Wire types live in
// `lampshade-api`; `crate::convert` bridges the two.

pub mod device;

pub use device::{Device, DeviceAttributes, PowerState};
