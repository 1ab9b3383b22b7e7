use thiserror::Error;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Required environment variable '{0}' is not set. \
        Add it to your environment or a .env file before starting the assistant."
    )]
    Missing(&'static str),

    #[error("Environment variable '{key}' is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Application configuration loaded from environment variables.
/// Startup is refused if the Gemini credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub request_timeout_secs: u64,
    /// Sessions untouched for this long are discarded.
    pub session_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let gemini_api_base = match lookup("GEMINI_API_BASE") {
            Some(raw) => {
                let base = raw.trim().trim_end_matches('/');
                if base.is_empty() {
                    return Err(ConfigError::Invalid {
                        key: "GEMINI_API_BASE",
                        reason: "must not be blank".to_string(),
                    });
                }
                base.to_string()
            }
            None => DEFAULT_API_BASE.to_string(),
        };

        Ok(Config {
            gemini_api_key,
            gemini_api_base,
            request_timeout_secs: parse_nonzero_or_default(&lookup, "REQUEST_TIMEOUT_SECS", 120)?,
            session_ttl_secs: parse_nonzero_or_default(&lookup, "SESSION_TTL_SECS", 3600)?,
            port: parse_or_default(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_nonzero_or_default<F>(
    lookup: &F,
    key: &'static str,
    default: u64,
) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or_default(lookup, key, default)? {
        0 => Err(ConfigError::Invalid {
            key,
            reason: "must be greater than zero".to_string(),
        }),
        value => Ok(value),
    }
}
