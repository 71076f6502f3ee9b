//! Configuration for the lampshade dashboard.
//!
//! TOML file + `LAMPSHADE_*` environment layered with figment, validated
//! and translated into `lampshade_core::HubConfig`. The binary applies its
//! own CLI flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lampshade_core::{HubConfig, TlsVerification};

pub const DEFAULT_BASE_URL: &str = "http://homeassistant.local:8123";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub hub: HubSection,
}

/// The `[hub]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HubSection {
    /// Hub root URL (e.g. "http://homeassistant.local:8123").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Seconds between automatic refreshes.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Accept self-signed certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate (PEM).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_secs: default_poll_interval(),
            timeout_secs: default_timeout(),
            insecure: false,
            ca_cert: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_poll_interval() -> u64 {
    10
}
fn default_timeout() -> u64 {
    10
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("rs", "lampshade", "lampshade").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lampshade");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults < TOML file at `path` < `LAMPSHADE_*` environment.
///
/// Nested keys use a double underscore: `LAMPSHADE_HUB__BASE_URL`.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LAMPSHADE_").split("__"))
}

/// Extract a `Config` from any figment (tests pass in-memory TOML).
pub fn load_from(figment: &Figment) -> Result<Config, ConfigError> {
    Ok(figment.extract()?)
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_from(&figment_for(&config_path()))
}

/// Load from an explicit file path + environment.
pub fn load_config_at(path: &Path) -> Result<Config, ConfigError> {
    load_from(&figment_for(path))
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_at(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write it to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_at(cfg, &config_path())
}

// ── Translation ─────────────────────────────────────────────────────

/// Validate a hub URL: must parse and use http or https.
pub fn parse_base_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("expected http or https, got '{other}'"),
        }),
    }
}

impl HubSection {
    /// Build the runtime `HubConfig`, validating every field.
    pub fn to_hub_config(&self) -> Result<HubConfig, ConfigError> {
        let base_url = parse_base_url(&self.base_url)?;

        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: "poll_interval_secs".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "timeout_secs".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        let tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        Ok(HubConfig::new(base_url)
            .with_poll_interval(Duration::from_secs(self.poll_interval_secs))
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_tls(tls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn from_toml(raw: &str) -> Config {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(raw));
        load_from(&figment).expect("config parses")
    }

    #[test]
    fn defaults_apply_without_file() {
        let cfg = from_toml("");
        assert_eq!(cfg, Config::default());

        let hub = cfg.hub.to_hub_config().expect("defaults are valid");
        assert_eq!(hub.base_url.as_str(), "http://homeassistant.local:8123/");
        assert_eq!(hub.poll_interval, Duration::from_secs(10));
        assert_eq!(hub.timeout, Duration::from_secs(10));
        assert_eq!(hub.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn file_values_override_defaults() {
        let cfg = from_toml(
            r#"
            [hub]
            base_url = "https://hub.example.net"
            poll_interval_secs = 30
            insecure = true
            "#,
        );

        assert_eq!(cfg.hub.timeout_secs, 10);
        let hub = cfg.hub.to_hub_config().expect("valid");
        assert_eq!(hub.base_url.host_str(), Some("hub.example.net"));
        assert_eq!(hub.poll_interval, Duration::from_secs(30));
        assert_eq!(hub.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn ca_cert_selects_custom_ca() {
        let cfg = from_toml(
            r#"
            [hub]
            ca_cert = "/etc/lampshade/ca.pem"
            "#,
        );
        let hub = cfg.hub.to_hub_config().expect("valid");
        assert_eq!(
            hub.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/lampshade/ca.pem"))
        );
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let section = HubSection {
            poll_interval_secs: 0,
            ..HubSection::default()
        };
        let err = section.to_hub_config().expect_err("zero interval");
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "poll_interval_secs"),
            "got {err:?}"
        );
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let err = parse_base_url("ftp://hub.local").expect_err("ftp is not a hub");
        assert_eq!(
            err.to_string(),
            "invalid base_url: expected http or https, got 'ftp'"
        );
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn save_then_load_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.hub.base_url = "http://10.0.0.2:8123".into();
        cfg.hub.poll_interval_secs = 5;

        save_config_at(&cfg, &path).expect("save");
        let loaded = load_from(
            &Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(&path)),
        )
        .expect("load");

        assert_eq!(loaded, cfg);
    }
}
