use crate::errors::ConfigError;
use reqwest::Url;
use std::{env, time::Duration};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_BANNER_HIDE: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_url: Url,
    pub banner_hide_after: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves settings through `lookup` so tests need not touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().unwrap_or_else(|_| {
                warn!("ignoring invalid PORT {value:?}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let raw_url = lookup("ACTIVITIES_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = parse_api_url(&raw_url)?;

        let banner_hide_after = match lookup("BANNER_HIDE_MS") {
            Some(value) => value.parse::<u64>().map(Duration::from_millis).unwrap_or_else(|_| {
                warn!("ignoring invalid BANNER_HIDE_MS {value:?}");
                DEFAULT_BANNER_HIDE
            }),
            None => DEFAULT_BANNER_HIDE,
        };

        Ok(Self {
            port,
            api_url,
            banner_hide_after,
        })
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim_end_matches('/')).map_err(|err| ConfigError::Invalid {
        var: "ACTIVITIES_API_URL",
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            var: "ACTIVITIES_API_URL",
            reason: format!("{raw} is not a base URL"),
        });
    }
    Ok(url)
}
