//! Process configuration, read once at startup.
//!
//! [`Settings`] is built from a key lookup so business logic never reads the
//! environment; `main` passes `std::env::var`, tests pass a map.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::consts::{
    DEFAULT_MODEL, DEFAULT_PORT, DEFAULT_QUEUE_CAPACITY, DEFAULT_SEARCH_PAUSE,
    DEFAULT_SEARCH_URL, DEFAULT_WORKERS,
};

/// Immutable runtime configuration shared by every component.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Credential used when a caller does not send one (`TELEX_API_KEY`).
    pub default_api_key: Option<String>,
    /// Model gateway endpoint (`TELEX_AI_URL`).
    pub ai_url: String,
    /// Model name sent to the gateway (`TELEX_AI_MODEL`).
    pub ai_model: String,
    pub google_api_key: String,
    pub search_engine_id: String,
    pub search_url: String,
    /// Pause after each successful search (`SEARCH_PAUSE_MS`).
    pub search_pause: Duration,
    /// Listening port (`PORT`); `--port` overrides it.
    pub port: u16,
    pub workers: usize,
    pub queue_capacity: usize,
    /// `tracing` filter string, e.g. `"info"` or `"prospector=debug"`.
    pub log_level: String,
    pub log_json: bool,
}

impl Settings {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).with_context(|| format!("missing required setting {key}"))
        };

        let port: u16 = parse_or(&get, "PORT", DEFAULT_PORT)?;
        let workers: usize = parse_or(&get, "PROSPECTOR_WORKERS", DEFAULT_WORKERS)?;
        if workers == 0 {
            bail!("PROSPECTOR_WORKERS must be at least 1");
        }
        let queue_capacity: usize =
            parse_or(&get, "PROSPECTOR_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY)?;
        if queue_capacity == 0 {
            bail!("PROSPECTOR_QUEUE_CAPACITY must be at least 1");
        }
        let pause_ms: u64 = parse_or(
            &get,
            "SEARCH_PAUSE_MS",
            DEFAULT_SEARCH_PAUSE.as_millis() as u64,
        )?;

        Ok(Self {
            default_api_key: get("TELEX_API_KEY"),
            ai_url: required("TELEX_AI_URL")?,
            ai_model: get("TELEX_AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            google_api_key: required("GOOGLE_API_KEY")?,
            search_engine_id: required("GOOGLE_SEARCH_ENGINE_ID")?,
            search_url: get("GOOGLE_SEARCH_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            search_pause: Duration::from_millis(pause_ms),
            port,
            workers,
            queue_capacity,
            log_level: get("PROSPECTOR_LOG").unwrap_or_else(|| "info".to_string()),
            log_json: get("PROSPECTOR_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid value for {key} ({raw:?}): {e}")),
        None => Ok(default),
    }
}
