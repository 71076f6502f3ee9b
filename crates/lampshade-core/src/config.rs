// ── Runtime hub configuration ──
//
// Describes *how* to reach the hub and how often to poll it. Never touches
// disk: `lampshade-config` (or a test) builds a `HubConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Bundled web PKI roots (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed hub certificates).
    DangerAcceptInvalid,
}

/// Configuration for talking to a single hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Hub root URL (e.g. `http://homeassistant.local:8123`).
    pub base_url: Url,
    /// How often the dashboard re-fetches states.
    pub poll_interval: Duration,
    /// Upper bound for every HTTP request.
    pub timeout: Duration,
    pub tls: TlsVerification,
}

impl HubConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            tls: TlsVerification::default(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_tls(mut self, tls: TlsVerification) -> Self {
        self.tls = tls;
        self
    }
}
