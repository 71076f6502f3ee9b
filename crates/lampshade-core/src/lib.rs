//! Light model and view state between `lampshade-api` and the terminal UI.
//!
//! - **[`Hub`]** — Cheaply cloneable facade over the hub's REST API. Fetches
//!   entity states, converts them into domain [`Device`]s, filters the
//!   lights, and issues power service calls.
//!
//! - **[`ViewState`]** — The ordered list of displayed lights plus the
//!   selected row. Owned by exactly one task (the UI loop); everything that
//!   wants to change it sends a message to that owner instead.
//!
//! - **Toggle planning** ([`PowerTarget`], [`ToggleRequest`]) — binary
//!   on/off decision and the optimistic write-through it implies.
//!
//! - **Errors** ([`CoreError`]) — connection / hub / decode taxonomy that the
//!   UI turns into a status line instead of crashing.

pub mod config;
pub mod convert;
pub mod error;
pub mod filter;
pub mod hub;
pub mod model;
pub mod toggle;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{HubConfig, TlsVerification};
pub use error::{CoreError, ErrorKind};
pub use filter::{filter_lights, is_light};
pub use hub::Hub;
pub use model::{Device, DeviceAttributes, PowerState};
pub use toggle::{PowerTarget, ToggleRequest};
pub use view::ViewState;
