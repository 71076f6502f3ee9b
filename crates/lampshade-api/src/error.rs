use thiserror::Error;

/// Top-level error type for the `lampshade-api` crate.
///
/// Covers every failure mode of the two REST surfaces we talk to
/// (`/api/states` and `/api/services/light/*`). `lampshade-core` maps
/// these into the user-facing connection / hub / decode taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Hub ─────────────────────────────────────────────────────────
    /// The hub answered with a non-2xx status.
    #[error("Hub returned HTTP {status}: {body}")]
    Hub { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Hub { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the request hit the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// HTTP status reported by the hub, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Hub { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Hub {
            status: 503,
            body: "unavailable".into(),
        };
        assert!(err.is_transient());
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn client_errors_are_not_transient() {
        let err = Error::Hub {
            status: 404,
            body: String::new(),
        };
        assert!(!err.is_transient());
        assert!(!err.is_timeout());
    }

    #[test]
    fn decode_errors_carry_no_status() {
        let err = Error::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        };
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Deserialization error: expected value");
    }
}
