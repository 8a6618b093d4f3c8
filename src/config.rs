/// Configuration management for the image localizer
use crate::error::{LocalizerError, LocalizerResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Component, Path};

/// Longest random suffix a candidate name may carry
pub const MAX_SUFFIX_LENGTH: usize = 8;

/// Main localizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizerConfig {
    pub media: MediaConfig,
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
}

/// Where downloaded images go and how they are named
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Media directory, relative to the storage root. Also the prefix of
    /// rewritten references.
    pub directory: String,
    /// Base name used when neither the anchor nor the URL yields one
    pub filename_template: String,
    /// Length of the random suffix appended to colliding names
    pub suffix_length: usize,
    /// Candidate names tried before giving up on a base name
    pub max_name_attempts: usize,
    /// How often a lost write race is retried with a fresh resolution
    pub max_write_attempts: usize,
}

/// HTTP download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Maximum accepted body size in bytes (default: 20MB)
    pub max_image_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            directory: "media".to_string(),
            filename_template: "image".to_string(),
            suffix_length: 6,
            max_name_attempts: 64,
            max_write_attempts: 5,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("image-localizer/{}", env!("CARGO_PKG_VERSION")),
            max_image_size: 20 * 1024 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            media: MediaConfig::default(),
            fetch: FetchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl LocalizerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> LocalizerResult<Self> {
        dotenv::dotenv().ok();

        let defaults = Self::default();

        let directory =
            env::var("LOCALIZER_MEDIA_DIR").unwrap_or_else(|_| defaults.media.directory.clone());
        let filename_template = env::var("LOCALIZER_FILENAME_TEMPLATE")
            .unwrap_or_else(|_| defaults.media.filename_template.clone());
        let suffix_length = parse_var("LOCALIZER_SUFFIX_LENGTH", defaults.media.suffix_length)?;
        let max_name_attempts =
            parse_var("LOCALIZER_MAX_NAME_ATTEMPTS", defaults.media.max_name_attempts)?;
        let max_write_attempts =
            parse_var("LOCALIZER_MAX_WRITE_ATTEMPTS", defaults.media.max_write_attempts)?;

        let timeout_secs = parse_var("LOCALIZER_FETCH_TIMEOUT_SECS", defaults.fetch.timeout_secs)?;
        let user_agent =
            env::var("LOCALIZER_USER_AGENT").unwrap_or_else(|_| defaults.fetch.user_agent.clone());
        let max_image_size = parse_var("LOCALIZER_MAX_IMAGE_SIZE", defaults.fetch.max_image_size)?;

        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let json = env::var("LOCALIZER_LOG_FORMAT")
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = LocalizerConfig {
            media: MediaConfig {
                directory,
                filename_template,
                suffix_length,
                max_name_attempts,
                max_write_attempts,
            },
            fetch: FetchConfig {
                timeout_secs,
                user_agent,
                max_image_size,
            },
            logging: LoggingConfig { level, json },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> LocalizerResult<()> {
        let dir = self.media.directory.trim();
        if dir.is_empty() {
            return Err(LocalizerError::Validation(
                "Media directory cannot be empty".to_string(),
            ));
        }

        let escapes_root = Path::new(dir)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes_root {
            return Err(LocalizerError::Validation(format!(
                "Media directory must be relative and stay inside the root: {}",
                dir
            )));
        }

        if self.media.filename_template.trim().is_empty() {
            return Err(LocalizerError::Validation(
                "Filename template cannot be empty".to_string(),
            ));
        }

        if self.media.suffix_length == 0 || self.media.suffix_length > MAX_SUFFIX_LENGTH {
            return Err(LocalizerError::Validation(format!(
                "Suffix length must be between 1 and {}",
                MAX_SUFFIX_LENGTH
            )));
        }

        if self.media.max_name_attempts == 0 || self.media.max_write_attempts == 0 {
            return Err(LocalizerError::Validation(
                "Attempt limits must be at least 1".to_string(),
            ));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(LocalizerError::Validation(
                "Fetch timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> LocalizerResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| LocalizerError::Validation(format!("Invalid value for {}: {}", key, raw))),
        Err(_) => Ok(default),
    }
}
