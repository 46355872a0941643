//! Provider configuration.
//!
//! Settings come from command-line flags or their environment variables
//! (see [`crate::cli::ConnectionArgs`]) and are validated once at startup.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::cli::ConnectionArgs;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting {0} (set the environment variable or pass the flag)")]
    MissingValue(&'static str),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Validated settings for both provider clients
#[derive(Debug, Clone)]
pub struct Settings {
    pub huis_base_url: Url,
    pub osu_base_url: Url,
    /// Only the osu! client needs it; Huis commands run without one
    pub osu_api_key: Option<String>,
    /// Grants access to onion-level reworks on Huis when present
    pub huis_onion_key: Option<String>,
    pub request_timeout: Duration,
}

impl Settings {
    pub fn from_args(args: &ConnectionArgs) -> Result<Self, ConfigError> {
        let osu_api_key = args
            .osu_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        let huis_onion_key = args
            .huis_onion_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        if args.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: "must be > 0".to_string(),
            });
        }

        Ok(Self {
            huis_base_url: parse_base_url("huis_url", &args.huis_url)?,
            osu_base_url: parse_base_url("osu_url", &args.osu_url)?,
            osu_api_key,
            huis_onion_key,
            request_timeout: Duration::from_secs(args.timeout_secs),
        })
    }
}

/// Parses a base URL, making sure relative paths resolve beneath it
fn parse_base_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
