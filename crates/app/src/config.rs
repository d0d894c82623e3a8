use std::time::Duration;

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

/// Application configuration loaded from environment variables.
///
/// Without `SUPABASE_URL` the application runs in demo mode against the
/// in-memory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowcaseConfig {
    /// Hosted backend, or `None` for demo mode.
    pub backend: Option<BackendConfig>,
    /// Storage bucket for model files (default: `models`).
    pub models_bucket: String,
    /// Storage bucket for preview images (default: `images`).
    pub images_bucket: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Number of cards fetched for the gallery (default: `24`).
    pub gallery_page_size: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("SUPABASE_ANON_KEY must be set when SUPABASE_URL is set")]
    MissingAnonKey,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            backend: None,
            models_bucket: "models".into(),
            images_bucket: "images".into(),
            request_timeout_secs: 30,
            gallery_page_size: 24,
        }
    }
}

impl ShowcaseConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default     |
    /// |------------------------|-------------|
    /// | `SUPABASE_URL`         | (demo mode) |
    /// | `SUPABASE_ANON_KEY`    | --          |
    /// | `MODELS_BUCKET`        | `models`    |
    /// | `IMAGES_BUCKET`        | `images`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`        |
    /// | `GALLERY_PAGE_SIZE`    | `24`        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match var("SUPABASE_URL") {
            Some(url) => {
                let anon_key = var("SUPABASE_ANON_KEY").ok_or(ConfigError::MissingAnonKey)?;
                Some(BackendConfig { url, anon_key })
            }
            None => None,
        };

        let request_timeout_secs = match var("REQUEST_TIMEOUT_SECS") {
            Some(value) => parse_number("REQUEST_TIMEOUT_SECS", "u64", value)?,
            None => defaults.request_timeout_secs,
        };
        let gallery_page_size = match var("GALLERY_PAGE_SIZE") {
            Some(value) => parse_number("GALLERY_PAGE_SIZE", "usize", value)?,
            None => defaults.gallery_page_size,
        };

        Ok(Self {
            backend,
            models_bucket: var("MODELS_BUCKET").unwrap_or(defaults.models_bucket),
            images_bucket: var("IMAGES_BUCKET").unwrap_or(defaults.images_bucket),
            request_timeout_secs,
            gallery_page_size,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_number<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        var,
        expected,
        value,
    })
}
