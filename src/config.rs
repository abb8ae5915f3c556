// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment at startup by
//! [`AppConfig::from_env`]. Failures are returned, not panicked on; `main`
//! decides to abort.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AUTH_PUBLIC_KEY` | RSA public key (PEM text) | Required unless `_FILE` set |
//! | `AUTH_PUBLIC_KEY_FILE` | Path to the RSA public key PEM | |
//! | `AUTH_PRIVATE_KEY` | RSA private key (PEM text) | Required unless `_FILE` set |
//! | `AUTH_PRIVATE_KEY_FILE` | Path to the RSA private key PEM | |
//! | `ACCESS_TOKEN_TTL_SECS` | Access token lifetime | `86400` |
//! | `REFRESH_TOKEN_TTL_SECS` | Refresh token lifetime | `172800` |
//! | `REQUEST_TIMEOUT_SECS` | Per-request deadline | `30` |
//! | `SEED_USER_EMAIL` | Identity created at startup | Optional |
//! | `SEED_USER_PASSWORD` | Password for the seed identity | Required with email |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::auth::codec::{
    TokenLifetimes, DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS, MAX_TTL_SECS,
};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const PUBLIC_KEY_ENV: &str = "AUTH_PUBLIC_KEY";
pub const PUBLIC_KEY_FILE_ENV: &str = "AUTH_PUBLIC_KEY_FILE";
pub const PRIVATE_KEY_ENV: &str = "AUTH_PRIVATE_KEY";
pub const PRIVATE_KEY_FILE_ENV: &str = "AUTH_PRIVATE_KEY_FILE";
pub const ACCESS_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
pub const REFRESH_TTL_ENV: &str = "REFRESH_TOKEN_TTL_SECS";
pub const REQUEST_TIMEOUT_ENV: &str = "REQUEST_TIMEOUT_SECS";
pub const SEED_USER_EMAIL_ENV: &str = "SEED_USER_EMAIL";
pub const SEED_USER_PASSWORD_ENV: &str = "SEED_USER_PASSWORD";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REQUEST_TIMEOUT_SECS: i64 = 30;
const MAX_REQUEST_TIMEOUT_SECS: i64 = 3600;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(String),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("failed to read {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Identity registered at startup.
#[derive(Debug)]
pub struct SeedUser {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub public_key_pem: String,
    pub private_key_pem: SecretString,
    pub lifetimes: TokenLifetimes,
    pub request_timeout: Duration,
    pub seed_user: Option<SeedUser>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let public_key_pem = read_pem(&lookup, PUBLIC_KEY_ENV, PUBLIC_KEY_FILE_ENV)?;
        let private_key_pem = read_pem(&lookup, PRIVATE_KEY_ENV, PRIVATE_KEY_FILE_ENV)?;

        let lifetimes = TokenLifetimes {
            access_secs: bounded(&lookup, ACCESS_TTL_ENV, DEFAULT_ACCESS_TTL_SECS, MAX_TTL_SECS)?,
            refresh_secs: bounded(&lookup, REFRESH_TTL_ENV, DEFAULT_REFRESH_TTL_SECS, MAX_TTL_SECS)?,
        };
        let timeout_secs = bounded(
            &lookup,
            REQUEST_TIMEOUT_ENV,
            DEFAULT_REQUEST_TIMEOUT_SECS,
            MAX_REQUEST_TIMEOUT_SECS,
        )?;

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let seed_user = match (lookup(SEED_USER_EMAIL_ENV), lookup(SEED_USER_PASSWORD_ENV)) {
            (Some(email), Some(password)) => Some(SeedUser {
                email,
                password: SecretString::from(password),
            }),
            (Some(_), None) => return Err(ConfigError::Missing(SEED_USER_PASSWORD_ENV.to_string())),
            (None, _) => None,
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            host: lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            public_key_pem,
            private_key_pem: SecretString::from(private_key_pem),
            lifetimes,
            request_timeout: Duration::from_secs(timeout_secs as u64),
            seed_user,
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Inline PEM wins over a file path.
fn read_pem<F>(lookup: &F, inline: &'static str, file: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(pem) = lookup(inline).filter(|value| !value.trim().is_empty()) {
        return Ok(pem);
    }
    let path = lookup(file)
        .map(PathBuf::from)
        .ok_or_else(|| ConfigError::Missing(format!("{inline} or {file}")))?;
    std::fs::read_to_string(&path).map_err(|source| ConfigError::KeyFile { path, source })
}

/// Parse a whole number of seconds in `1..=max`.
fn bounded<F>(lookup: &F, name: &'static str, default: i64, max: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    let value: i64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
        name,
        reason: format!("{e}"),
    })?;
    if !(1..=max).contains(&value) {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("must be between 1 and {max}"),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use std::io::Write;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    const KEYS: [(&str, &str); 2] = [(PUBLIC_KEY_ENV, "public-pem"), (PRIVATE_KEY_ENV, "private-pem")];

    #[test]
    fn defaults_apply() {
        let config = load(&KEYS).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.lifetimes, TokenLifetimes::default());
        assert_eq!(config.lifetimes.access_secs, 86_400);
        assert_eq!(config.lifetimes.refresh_secs, 172_800);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.seed_user.is_none());
        assert_eq!(config.private_key_pem.expose_secret(), "private-pem");
    }

    #[test]
    fn missing_keys_are_reported() {
        let err = load(&[(PUBLIC_KEY_ENV, "public-pem")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref name) if name.contains(PRIVATE_KEY_ENV)));
    }

    #[test]
    fn keys_can_come_from_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"public-from-file").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = load(&[
            (PUBLIC_KEY_FILE_ENV, path.as_str()),
            (PRIVATE_KEY_ENV, "private-pem"),
        ])
        .unwrap();
        assert_eq!(config.public_key_pem, "public-from-file");
    }

    #[test]
    fn unreadable_key_file_is_reported() {
        let err = load(&[
            (PUBLIC_KEY_FILE_ENV, "/nonexistent/key.pem"),
            (PRIVATE_KEY_ENV, "private-pem"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::KeyFile { .. }));
    }

    #[test]
    fn ttls_are_parsed_and_validated() {
        let mut vars = KEYS.to_vec();
        vars.push((ACCESS_TTL_ENV, "60"));
        vars.push((REFRESH_TTL_ENV, "120"));
        let config = load(&vars).unwrap();
        assert_eq!(config.lifetimes.access_secs, 60);
        assert_eq!(config.lifetimes.refresh_secs, 120);

        let mut vars = KEYS.to_vec();
        vars.push((ACCESS_TTL_ENV, "0"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { name: ACCESS_TTL_ENV, .. })
        ));

        let mut vars = KEYS.to_vec();
        vars.push((REFRESH_TTL_ENV, "two days"));
        assert!(load(&vars).is_err());
    }

    #[test]
    fn oversized_ttls_are_rejected() {
        let max = i64::MAX.to_string();
        let mut vars = KEYS.to_vec();
        vars.push((ACCESS_TTL_ENV, max.as_str()));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { name: ACCESS_TTL_ENV, .. })
        ));

        let just_over = (MAX_TTL_SECS + 1).to_string();
        let mut vars = KEYS.to_vec();
        vars.push((REFRESH_TTL_ENV, just_over.as_str()));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { name: REFRESH_TTL_ENV, .. })
        ));

        let limit = MAX_TTL_SECS.to_string();
        let mut vars = KEYS.to_vec();
        vars.push((ACCESS_TTL_ENV, limit.as_str()));
        assert_eq!(load(&vars).unwrap().lifetimes.access_secs, MAX_TTL_SECS);
    }

    #[test]
    fn oversized_timeout_is_rejected() {
        let mut vars = KEYS.to_vec();
        vars.push((REQUEST_TIMEOUT_ENV, "86400"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { name: REQUEST_TIMEOUT_ENV, .. })
        ));
    }

    #[test]
    fn seed_user_needs_password() {
        let mut vars = KEYS.to_vec();
        vars.push((SEED_USER_EMAIL_ENV, "a@b.com"));
        assert!(matches!(load(&vars), Err(ConfigError::Missing(_))));

        vars.push((SEED_USER_PASSWORD_ENV, "secret"));
        let seed = load(&vars).unwrap().seed_user.unwrap();
        assert_eq!(seed.email, "a@b.com");
        assert_eq!(seed.password.expose_secret(), "secret");
    }

    #[test]
    fn json_log_format() {
        let mut vars = KEYS.to_vec();
        vars.push((LOG_FORMAT_ENV, "JSON"));
        assert_eq!(load(&vars).unwrap().log_format, LogFormat::Json);
    }
}
