// Hub REST API client
//
// Wraps `reqwest::Client` with hub-specific URL construction, status
// checking, and JSON decoding. The two endpoints the dashboard needs are
// inherent methods here; transport mechanics stay in `transport.rs`.

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{ServiceCall, StateResponse};
use crate::transport::TransportConfig;

/// Raw HTTP client for the hub's REST API.
///
/// Every non-2xx response becomes [`Error::Hub`]; every undecodable body
/// becomes [`Error::Deserialization`]. Response bodies are always read to
/// the end so the pooled connection can be reused.
#[derive(Debug, Clone)]
pub struct HubClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HubClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// The `base_url` is the hub root (e.g. `http://homeassistant.local:8123`),
    /// optionally with a path prefix when the hub sits behind a proxy.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The hub base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the state of every entity the hub knows about.
    ///
    /// `GET {base}/api/states` — the body is a bare JSON array, returned in
    /// the hub's order.
    pub async fn fetch_states(&self) -> Result<Vec<StateResponse>, Error> {
        let url = self.api_url("states")?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        let body = Self::read_body(resp).await?;

        let states: Vec<StateResponse> = Self::decode(&body)?;
        debug!(count = states.len(), "fetched entity states");
        Ok(states)
    }

    /// Turn a light on or off.
    ///
    /// `POST {base}/api/services/light/turn_on` (or `turn_off`) with
    /// `{"entity_id": "..."}`. The response body is drained and discarded.
    pub async fn call_light_service(&self, entity_id: &str, turn_on: bool) -> Result<(), Error> {
        let service = if turn_on { "turn_on" } else { "turn_off" };
        let url = self.api_url(&format!("services/light/{service}"))?;
        debug!(entity_id, service, "POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(&ServiceCall { entity_id })
            .send()
            .await?;

        let body = Self::read_body(resp).await?;
        trace!(entity_id, bytes = body.len(), "light service response drained");
        Ok(())
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Build `{base}/api/{path}`, keeping any path prefix on the base URL.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/api/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        );
        Ok(Url::parse(&full)?)
    }

    /// Read the full body, turning a non-2xx status into `Error::Hub`.
    async fn read_body(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Hub {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
        serde_json::from_str(body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.to_owned(),
        })
    }
}
