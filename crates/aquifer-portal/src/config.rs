#![forbid(unsafe_code)]

//! Deployment configuration.
//!
//! All knobs arrive through `AQUIFER_*` environment variables. Parsing is
//! factored through [`PortalConfig::from_lookup`] so tests hand in a plain
//! closure instead of mutating the process environment.

/// Errors from configuration parsing.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// A required variable was not set.
    Missing(&'static str),
    /// A variable was set to something unparseable.
    Invalid { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing required variable {key}"),
            Self::Invalid { key, value } => {
                write!(f, "variable {key} has invalid value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

const API_BASE_URL: &str = "AQUIFER_API_BASE_URL";
const API_KEY: &str = "AQUIFER_API_KEY";
const ASSIST_ENABLED: &str = "AQUIFER_ASSIST_ENABLED";
const LOG_FILTER: &str = "AQUIFER_LOG_FILTER";

/// Resolved portal configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Base URL of the hosted database's REST surface.
    pub api_base_url: String,
    /// Service key presented to the host.
    pub api_key: String,
    /// Whether the AI assist flows are offered at all.
    pub assist_enabled: bool,
    /// Log filter directive, `tracing` env-filter syntax.
    pub log_filter: String,
}

impl PortalConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, the testable core of
    /// [`from_env`](Self::from_env).
    ///
    /// Required: `AQUIFER_API_BASE_URL`, `AQUIFER_API_KEY`. Optional:
    /// `AQUIFER_ASSIST_ENABLED` (`true`/`false`/`1`/`0`, default `true`),
    /// `AQUIFER_LOG_FILTER` (default `info`).
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_base_url = lookup(API_BASE_URL).ok_or(ConfigError::Missing(API_BASE_URL))?;
        let api_key = lookup(API_KEY).ok_or(ConfigError::Missing(API_KEY))?;
        let assist_enabled = match lookup(ASSIST_ENABLED).as_deref() {
            None => true,
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: ASSIST_ENABLED,
                    value: other.to_owned(),
                });
            }
        };
        let log_filter = lookup(LOG_FILTER).unwrap_or_else(|| "info".to_owned());
        Ok(Self {
            api_base_url,
            api_key,
            assist_enabled,
            log_filter,
        })
    }
}
