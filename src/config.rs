//! Client configuration
//!
//! Loads settings from environment variables, or from any key lookup for
//! tests and embedding applications.
//!
//! ## Environment Variables
//! - `GUPSHUP_PARTNER_EMAIL`, `GUPSHUP_PARTNER_PASSWORD`: partner credentials
//! - `GUPSHUP_PARTNER_BASE_URL`: API base URL
//! - `GUPSHUP_PARTNER_TOKEN_EXPIRY`: partner token lifetime in hours
//! - `GUPSHUP_DEFAULT_APP_ID`, `GUPSHUP_DEFAULT_APP_NAME`: optional default app
//! - `GUPSHUP_CACHE_ENABLED`, `GUPSHUP_CACHE_PREFIX`, `GUPSHUP_CACHE_TTL` (seconds)
//! - `GUPSHUP_LOGGING_ENABLED`, `GUPSHUP_LOG_LEVEL`
//! - `GUPSHUP_RETRY_ENABLED`, `GUPSHUP_RETRY_TIMES`, `GUPSHUP_RETRY_SLEEP` (milliseconds)
//! - `GUPSHUP_CONNECTION_TIMEOUT`, `GUPSHUP_REQUEST_TIMEOUT` (seconds)
//!
//! Unset or blank variables fall back to their defaults.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;

use crate::client::http_client::{
    DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
};
use crate::error::GupshupError;
use crate::token::{DEFAULT_CACHE_PREFIX, DEFAULT_TOKEN_EXPIRY_HOURS};

#[derive(Clone)]
pub struct PartnerSettings {
    pub email: Option<String>,
    pub password: Option<String>,
    pub base_url: String,
    pub token_expiry_hours: u64,
}

impl fmt::Debug for PartnerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartnerSettings")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("token_expiry_hours", &self.token_expiry_hours)
            .finish()
    }
}

impl Default for PartnerSettings {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            token_expiry_hours: DEFAULT_TOKEN_EXPIRY_HOURS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefaultAppSettings {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub prefix: String,
    /// General-purpose cache lifetime. Token entries keep their own lifetimes.
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: DEFAULT_CACHE_PREFIX.to_string(),
            ttl: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub enabled: bool,
    pub level: LevelFilter,
}

impl LoggingSettings {
    /// Debug and trace levels switch the logging middleware to verbose output.
    pub fn is_verbose(&self) -> bool {
        self.level >= LevelFilter::Debug
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: LevelFilter::Info,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetrySettings {
    pub enabled: bool,
    /// Total attempts per request, including the first.
    pub times: u32,
    pub sleep: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            times: 3,
            sleep: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimeoutSettings {
    pub connection: Duration,
    pub request: Duration,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            connection: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Full client configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub partner: PartnerSettings,
    pub default_app: DefaultAppSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
    pub retry: RetrySettings,
    pub timeout: TimeoutSettings,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`GupshupError::Config`] when a variable is set to a value
    /// that cannot be parsed.
    pub fn from_env() -> Result<Self, GupshupError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GupshupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Lookup(lookup);
        let defaults = Config::default();

        Ok(Self {
            partner: PartnerSettings {
                email: vars.string("GUPSHUP_PARTNER_EMAIL"),
                password: vars.string("GUPSHUP_PARTNER_PASSWORD"),
                base_url: vars
                    .string("GUPSHUP_PARTNER_BASE_URL")
                    .unwrap_or(defaults.partner.base_url),
                token_expiry_hours: vars
                    .parse("GUPSHUP_PARTNER_TOKEN_EXPIRY")?
                    .unwrap_or(defaults.partner.token_expiry_hours),
            },
            default_app: DefaultAppSettings {
                id: vars.string("GUPSHUP_DEFAULT_APP_ID"),
                name: vars.string("GUPSHUP_DEFAULT_APP_NAME"),
            },
            cache: CacheSettings {
                enabled: vars
                    .boolean("GUPSHUP_CACHE_ENABLED")?
                    .unwrap_or(defaults.cache.enabled),
                prefix: vars
                    .string("GUPSHUP_CACHE_PREFIX")
                    .unwrap_or(defaults.cache.prefix),
                ttl: vars
                    .parse("GUPSHUP_CACHE_TTL")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.cache.ttl),
            },
            logging: LoggingSettings {
                enabled: vars
                    .boolean("GUPSHUP_LOGGING_ENABLED")?
                    .unwrap_or(defaults.logging.enabled),
                level: vars
                    .parse("GUPSHUP_LOG_LEVEL")?
                    .unwrap_or(defaults.logging.level),
            },
            retry: RetrySettings {
                enabled: vars
                    .boolean("GUPSHUP_RETRY_ENABLED")?
                    .unwrap_or(defaults.retry.enabled),
                times: vars
                    .parse("GUPSHUP_RETRY_TIMES")?
                    .unwrap_or(defaults.retry.times),
                sleep: vars
                    .parse("GUPSHUP_RETRY_SLEEP")?
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry.sleep),
            },
            timeout: TimeoutSettings {
                connection: vars
                    .parse("GUPSHUP_CONNECTION_TIMEOUT")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.timeout.connection),
                request: vars
                    .parse("GUPSHUP_REQUEST_TIMEOUT")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.timeout.request),
            },
        })
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>, GupshupError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.string(key)
            .map(|value| {
                value.parse::<T>().map_err(|e| {
                    GupshupError::Config(format!("invalid value for {}: {:?} ({})", key, value, e))
                })
            })
            .transpose()
    }

    fn boolean(&self, key: &str) -> Result<Option<bool>, GupshupError> {
        self.string(key)
            .map(|value| match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(GupshupError::Config(format!(
                    "invalid boolean for {}: {:?}",
                    key, value
                ))),
            })
            .transpose()
    }
}
