use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub github: GithubConfig,
    pub rate_limit: RateLimitConfig,
}

/// GitHub API client configuration
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Personal access token. Absence is not a startup failure: endpoints
    /// that need it answer with a configuration error instead.
    pub token: Option<String>,
    /// API base URL, overridable for tests
    pub api_base: String,
    /// Timeout applied to every upstream request
    pub request_timeout: Duration,
}

/// Local (advisory) rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Max upstream search calls allowed per rolling window
    pub max_requests: usize,
    /// Rolling window length in seconds
    pub window_secs: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            github: GithubConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
        })
    }
}

impl GithubConfig {
    /// Load GitHub client configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            token: env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            api_base: env::var("GITHUB_API_BASE")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            request_timeout: Duration::from_secs(
                env::var("GITHUB_REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            ),
        }
    }
}

impl RateLimitConfig {
    /// Load rate limit configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            max_requests: env::var("MAX_REQUESTS_PER_HOUR")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            window_secs: env::var("RATE_WINDOW_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "PORT must be a valid number"),
        }
    }
}

impl std::error::Error for ConfigError {}
