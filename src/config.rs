//! Server configuration from the environment.
//!
//! HOST (default 0.0.0.0), PORT (default 8080), ADMIN_TOKEN (password for the admin role;
//! unset means nobody can become admin), SESSION_SECRET (cookie signing key, at least 64
//! bytes; unset means a random key per process).

use std::fmt;

/// Minimum length of SESSION_SECRET accepted by the cookie key.
pub const MIN_SESSION_SECRET_LEN: usize = 64;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub admin_token: Option<String>,
    pub session_secret: Option<Vec<u8>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    InvalidPort(String),
    SessionSecretTooShort(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort(value) => write!(f, "PORT is not a valid port: {}", value),
            ConfigError::SessionSecretTooShort(len) => write!(
                f,
                "SESSION_SECRET must be at least {} bytes (got {})",
                MIN_SESSION_SECRET_LEN, len
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_empty("HOST").unwrap_or_else(default_host);
        let port = match non_empty("PORT") {
            Some(p) => p.trim().parse().map_err(|_| ConfigError::InvalidPort(p))?,
            None => default_port(),
        };
        let session_secret = match non_empty("SESSION_SECRET") {
            Some(s) if s.len() < MIN_SESSION_SECRET_LEN => {
                return Err(ConfigError::SessionSecretTooShort(s.len()))
            }
            Some(s) => Some(s.into_bytes()),
            None => None,
        };

        Ok(Self {
            host,
            port,
            admin_token: non_empty("ADMIN_TOKEN"),
            session_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.admin_token, None);
        assert_eq!(config.session_secret, None);
    }

    #[test]
    fn rejects_bad_port_and_short_secret() {
        assert_eq!(
            Config::from_lookup(lookup(&[("PORT", "http")])),
            Err(ConfigError::InvalidPort("http".to_string()))
        );
        assert_eq!(
            Config::from_lookup(lookup(&[("SESSION_SECRET", "short")])),
            Err(ConfigError::SessionSecretTooShort(5))
        );
    }

    #[test]
    fn reads_admin_token() {
        let vars = [("ADMIN_TOKEN", "hunter2"), ("PORT", "9000")];
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.admin_token.as_deref(), Some("hunter2"));
        assert_eq!(config.port, 9000);
    }
}
