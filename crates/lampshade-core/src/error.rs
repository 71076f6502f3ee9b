// ── Core error types ──
//
// User-facing errors from lampshade-core. Consumers never see reqwest or
// serde_json errors directly; the `From<lampshade_api::Error>` impl folds
// them into three recoverable kinds: connection, hub, and decode.

use std::time::Duration;

use thiserror::Error;

/// Coarse classification used by the UI for status-line styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Hub unreachable, TLS failure, or timeout.
    Connection,
    /// Hub answered with a non-2xx status.
    Hub,
    /// Hub answered 2xx but the body was not what we expected.
    Decode,
    /// Local configuration problem.
    Config,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach hub at {url}: {reason}")]
    Connection { url: String, reason: String },

    /// `timeout` is `None` when the error was converted without access to
    /// the configured limit.
    #[error("Hub did not answer {}", within(.timeout.as_ref()))]
    Timeout { timeout: Option<Duration> },

    // ── Hub errors ───────────────────────────────────────────────────
    #[error("Hub returned HTTP {status}: {message}")]
    Hub { status: u16, message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Unexpected response from hub: {message}")]
    Decode { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } | Self::Timeout { .. } => ErrorKind::Connection,
            Self::Hub { .. } => ErrorKind::Hub,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Whether the next poll might succeed without user intervention.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection { .. } | Self::Timeout { .. } => true,
            Self::Hub { status, .. } => *status >= 500,
            Self::Decode { .. } | Self::Config { .. } => false,
        }
    }
}

fn within(timeout: Option<&Duration>) -> String {
    match timeout {
        None => "in time".into(),
        Some(t) if t.subsec_millis() == 0 => format!("within {}s", t.as_secs()),
        Some(t) => format!("within {}ms", t.as_millis()),
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

/// Hub error bodies can be whole HTML pages; keep the status line short.
fn summarize_body(body: &str) -> String {
    const MAX: usize = 120;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no details".into();
    }
    match trimmed.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_owned(),
    }
}

impl From<lampshade_api::Error> for CoreError {
    fn from(err: lampshade_api::Error) -> Self {
        match err {
            lampshade_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout: None }
                } else if e.is_decode() {
                    CoreError::Decode {
                        message: e.to_string(),
                    }
                } else {
                    CoreError::Connection {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            lampshade_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            lampshade_api::Error::Tls(msg) => CoreError::Connection {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            lampshade_api::Error::Hub { status, body } => CoreError::Hub {
                status,
                message: summarize_body(&body),
            },
            lampshade_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
        }
    }
}
