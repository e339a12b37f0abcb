//! Environment-backed settings for the distribution cache.

use leveldist_domain::DistributionFlags;

pub const LEVEL_CACHING_VAR: &str = "LEVELDIST_LEVEL_CACHING";
pub const ONLY_LEVEL_SCALED_VAR: &str = "LEVELDIST_ONLY_LEVEL_SCALED";
pub const LOG_FILTER_VAR: &str = "LEVELDIST_LOG_FILTER";

const DEFAULT_LOG_FILTER: &str = "leveldist_engine=info";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{var} must be a boolean, got {value:?}")]
    InvalidBool { var: &'static str, value: String },
}

/// Operational settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Master switch. When off every distribution attempt runs with
    /// `suppress_level_caching` set.
    pub level_caching: bool,
    /// Default for `DistributionFlags::only_level_scaled_entries`.
    pub only_level_scaled_entries: bool,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            level_caching: true,
            only_level_scaled_entries: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl CacheSettings {
    /// Load settings from the process environment (after reading `.env`, if any).
    pub fn from_env() -> Result<Self, SettingsError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            level_caching: parse_bool(LEVEL_CACHING_VAR, lookup(LEVEL_CACHING_VAR))?
                .unwrap_or(defaults.level_caching),
            only_level_scaled_entries: parse_bool(
                ONLY_LEVEL_SCALED_VAR,
                lookup(ONLY_LEVEL_SCALED_VAR),
            )?
            .unwrap_or(defaults.only_level_scaled_entries),
            log_filter: lookup(LOG_FILTER_VAR)
                .filter(|filter| !filter.trim().is_empty())
                .unwrap_or(defaults.log_filter),
        })
    }

    /// Default flags for a distribution attempt.
    pub fn distribution_flags(&self) -> DistributionFlags {
        DistributionFlags {
            only_level_scaled_entries: self.only_level_scaled_entries,
            suppress_level_caching: !self.level_caching,
        }
    }
}

fn parse_bool(var: &'static str, value: Option<String>) -> Result<Option<bool>, SettingsError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(SettingsError::InvalidBool { var, value }),
    }
}
