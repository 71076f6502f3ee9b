// ── Hub facade ──
//
// The single entry point the UI uses for network I/O. Cheaply cloneable so
// background tasks can each hold one; it keeps no view state of its own.

use std::sync::Arc;

use tracing::{debug, warn};

use lampshade_api::transport::{TlsMode, TransportConfig};
use lampshade_api::HubClient;

use crate::config::{HubConfig, TlsVerification};
use crate::error::CoreError;
use crate::filter::filter_lights;
use crate::model::Device;
use crate::toggle::ToggleRequest;

#[derive(Debug, Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

#[derive(Debug)]
struct HubInner {
    config: HubConfig,
    client: HubClient,
}

impl Hub {
    /// Build the HTTP client from `config`. Does no I/O.
    pub fn new(config: HubConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: match &config.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: config.timeout,
        };
        let client = HubClient::new(config.base_url.clone(), &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Wrap a pre-built client (tests, custom transports).
    pub fn with_client(config: HubConfig, client: HubClient) -> Self {
        Self {
            inner: Arc::new(HubInner { config, client }),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Every entity the hub reports, in hub order.
    pub async fn fetch_devices(&self) -> Result<Vec<Device>, CoreError> {
        let states = self
            .inner
            .client
            .fetch_states()
            .await
            .map_err(|e| self.classify(e))?;
        Ok(states.into_iter().map(Device::from).collect())
    }

    /// Only the lights, in hub order.
    pub async fn fetch_lights(&self) -> Result<Vec<Device>, CoreError> {
        match self.fetch_devices().await {
            Ok(devices) => {
                let total = devices.len();
                let lights = filter_lights(devices);
                debug!(total, lights = lights.len(), "refreshed lights");
                Ok(lights)
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch states");
                Err(e)
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Ask the hub to switch `req.entity_id` to `req.target`.
    pub async fn set_power(&self, req: &ToggleRequest) -> Result<(), CoreError> {
        debug!(
            entity_id = %req.entity_id,
            from = %req.previous_state,
            target = %req.target,
            "toggling light"
        );
        self.inner
            .client
            .call_light_service(&req.entity_id, req.target.is_on())
            .await
            .map_err(|e| {
                let err = self.classify(e);
                warn!(entity_id = %req.entity_id, error = %err, "light service call failed");
                err
            })
    }

    /// Map an API error, filling in context only the facade knows.
    fn classify(&self, err: lampshade_api::Error) -> CoreError {
        if err.is_timeout() {
            return CoreError::Timeout {
                timeout: Some(self.inner.config.timeout),
            };
        }
        match CoreError::from(err) {
            CoreError::Connection { url, reason } if url.is_empty() => CoreError::Connection {
                url: self.inner.config.base_url.to_string(),
                reason,
            },
            other => other,
        }
    }
}
