//! Client configuration, read from the environment.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_EXPIRY_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is not valid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings for the CURA API plus view defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL, without trailing slash.
    pub api_url: String,
    /// Bearer token, if the session has one.
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
    /// Days ahead an item counts as "expiring soon".
    pub expiry_window_days: u32,
    pub language: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            auth_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            expiry_window_days: DEFAULT_EXPIRY_WINDOW_DAYS,
            language: "en".to_string(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Read `CURA_*` variables, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let mut config = match get("CURA_API_URL") {
            Some(url) => Self::new(url.trim()),
            None => Self::default(),
        };
        config.auth_token = get("CURA_AUTH_TOKEN");

        if let Some(raw) = get("CURA_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse("CURA_REQUEST_TIMEOUT_SECS", &raw)?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: "CURA_REQUEST_TIMEOUT_SECS",
                    value: raw,
                    reason: "must be at least 1".to_string(),
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = get("CURA_EXPIRY_WINDOW_DAYS") {
            config.expiry_window_days = parse("CURA_EXPIRY_WINDOW_DAYS", &raw)?;
        }
        if let Some(language) = get("CURA_LANGUAGE") {
            config.language = language.trim().to_string();
        }

        Ok(config)
    }
}

fn parse<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.expiry_window_days, 30);
        assert_eq!(config.language, "en");
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn variables_override_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("CURA_API_URL", "https://api.cura.test/v1/"),
            ("CURA_AUTH_TOKEN", "secret"),
            ("CURA_REQUEST_TIMEOUT_SECS", " 5 "),
            ("CURA_EXPIRY_WINDOW_DAYS", "60"),
            ("CURA_LANGUAGE", "ar"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://api.cura.test/v1");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.expiry_window_days, 60);
        assert_eq!(config.language, "ar");
    }

    #[test]
    fn malformed_numbers_are_errors() {
        let err =
            ClientConfig::from_lookup(lookup(&[("CURA_EXPIRY_WINDOW_DAYS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "CURA_EXPIRY_WINDOW_DAYS", .. }));

        let err =
            ClientConfig::from_lookup(lookup(&[("CURA_REQUEST_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "CURA_REQUEST_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn blank_token_counts_as_unset() {
        let config = ClientConfig::from_lookup(lookup(&[("CURA_AUTH_TOKEN", "  ")])).unwrap();
        assert!(config.auth_token.is_none());
    }
}
