//! Configuration module
//!
//! Server, database and Google AI settings read from the process environment
//! (after loading `.env`). The Google credential and store name are optional
//! here: their absence is reported by the request that first needs them.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const GOOGLE_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const GOOGLE_REQUEST_TIMEOUT_SECS: u64 = 60;
const CHAT_MAX_DURATION_SECS: u64 = 30;
const POLL_INITIAL_INTERVAL_MS: u64 = 5_000;
const POLL_MAX_INTERVAL_MS: u64 = 30_000;
const POLL_BACKOFF_MULTIPLIER: f64 = 2.0;
const POLL_TIMEOUT_SECS: u64 = 300;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    pub log_format: String,
}

/// Hosted Google AI settings shared by the search store, vision and chat clients.
#[derive(Clone, Debug)]
pub struct GoogleAiConfig {
    pub api_key: Option<String>,
    pub file_search_store_name: Option<String>,
    pub base_url: String,
    pub vision_model: String,
    pub chat_model: String,
    pub request_timeout_secs: u64,
}

impl GoogleAiConfig {
    /// Settings pointing at `base_url`, with every optional value unset.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            file_search_store_name: None,
            base_url: base_url.into(),
            vision_model: DEFAULT_MODEL.to_string(),
            chat_model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: GOOGLE_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for GoogleAiConfig {
    fn default() -> Self {
        Self::with_base_url(GOOGLE_API_BASE_URL)
    }
}

/// Bounds for the upload completion wait.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollSettings {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(POLL_INITIAL_INTERVAL_MS),
            max_interval: Duration::from_millis(POLL_MAX_INTERVAL_MS),
            multiplier: POLL_BACKOFF_MULTIPLIER,
            timeout: Duration::from_secs(POLL_TIMEOUT_SECS),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RagdeskConfig {
    pub base: BaseConfig,
    pub database_url: String,
    pub google: GoogleAiConfig,
    pub poll: PollSettings,
    pub scratch_dir: PathBuf,
    pub chat_max_duration_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<RagdeskConfig>);

impl Config {
    fn inner(&self) -> &RagdeskConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.inner().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = RagdeskConfig::from_lookup(lookup)?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.inner().base.log_format
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn google(&self) -> &GoogleAiConfig {
        &self.inner().google
    }

    pub fn poll_settings(&self) -> PollSettings {
        self.inner().poll
    }

    pub fn scratch_dir(&self) -> &std::path::Path {
        &self.inner().scratch_dir
    }

    pub fn chat_max_duration(&self) -> Duration {
        Duration::from_secs(self.inner().chat_max_duration_secs)
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl RagdeskConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let base = BaseConfig {
            server_port,
            cors_origins,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: parse_or(&lookup, "DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            environment,
            log_format: lookup("LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
        };

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let google = GoogleAiConfig {
            api_key: non_empty(&lookup, "GOOGLE_GENERATIVE_AI_API_KEY"),
            file_search_store_name: non_empty(&lookup, "FILE_SEARCH_STORE_NAME"),
            base_url: non_empty(&lookup, "GOOGLE_API_BASE_URL")
                .unwrap_or_else(|| GOOGLE_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            vision_model: non_empty(&lookup, "GOOGLE_VISION_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            chat_model: non_empty(&lookup, "GOOGLE_CHAT_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            request_timeout_secs: parse_or(
                &lookup,
                "GOOGLE_REQUEST_TIMEOUT_SECS",
                GOOGLE_REQUEST_TIMEOUT_SECS,
            ),
        };

        let poll = PollSettings {
            initial_interval: Duration::from_millis(parse_or(
                &lookup,
                "UPLOAD_POLL_INITIAL_INTERVAL_MS",
                POLL_INITIAL_INTERVAL_MS,
            )),
            max_interval: Duration::from_millis(parse_or(
                &lookup,
                "UPLOAD_POLL_MAX_INTERVAL_MS",
                POLL_MAX_INTERVAL_MS,
            )),
            multiplier: parse_or(
                &lookup,
                "UPLOAD_POLL_BACKOFF_MULTIPLIER",
                POLL_BACKOFF_MULTIPLIER,
            ),
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "UPLOAD_POLL_TIMEOUT_SECS",
                POLL_TIMEOUT_SECS,
            )),
        };

        let scratch_dir = non_empty(&lookup, "UPLOAD_SCRATCH_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        Ok(Self {
            base,
            database_url,
            google,
            poll,
            scratch_dir,
            chat_max_duration_secs: parse_or(
                &lookup,
                "CHAT_MAX_DURATION_SECS",
                CHAT_MAX_DURATION_SECS,
            ),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        let environment = self.base.environment.to_lowercase();
        let is_production = environment == "production" || environment == "prod";
        if is_production && self.base.cors_origins.iter().any(|origin| origin == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if !matches!(self.base.log_format.as_str(), "text" | "json") {
            return Err(anyhow::anyhow!("LOG_FORMAT must be either 'text' or 'json'"));
        }

        if self.poll.initial_interval.is_zero() {
            return Err(anyhow::anyhow!(
                "UPLOAD_POLL_INITIAL_INTERVAL_MS must be greater than zero"
            ));
        }

        if self.poll.max_interval < self.poll.initial_interval {
            return Err(anyhow::anyhow!(
                "UPLOAD_POLL_MAX_INTERVAL_MS must not be smaller than UPLOAD_POLL_INITIAL_INTERVAL_MS"
            ));
        }

        if !self.poll.multiplier.is_finite() || self.poll.multiplier < 1.0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_POLL_BACKOFF_MULTIPLIER must be at least 1.0"
            ));
        }

        if self.poll.timeout.is_zero() {
            return Err(anyhow::anyhow!(
                "UPLOAD_POLL_TIMEOUT_SECS must be greater than zero"
            ));
        }

        Ok(())
    }
}
