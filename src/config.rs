use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings for the generative language API.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// `None` leaves the server usable; AI routes then fail with an upstream error.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: DEFAULT_GEMINI_TIMEOUT,
        }
    }
}

/// Seconds from `GEMINI_TIMEOUT_SECS`. Zero, negative or unparsable values
/// fall back to the default.
fn parse_timeout(raw: Option<&str>) -> Duration {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_GEMINI_TIMEOUT)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub migrations_path: PathBuf,
    pub static_path: PathBuf,
    pub session_ttl_days: i64,
    pub ai: AiConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set, AI endpoints will return errors");
        }

        let ai = AiConfig {
            api_key,
            base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.into()),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into()),
            timeout: parse_timeout(env::var("GEMINI_TIMEOUT_SECS").ok().as_deref()),
        };

        Self {
            host: env::var("FINSIGHT_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("FINSIGHT_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            database_path: env::var("FINSIGHT_DATABASE_URL")
                .map(|v| {
                    PathBuf::from(
                        v.strip_prefix("sqlite://")
                            .or_else(|| v.strip_prefix("sqlite:"))
                            .unwrap_or(&v),
                    )
                })
                .unwrap_or_else(|_| PathBuf::from("data/finsight.db")),
            migrations_path: env::var("FINSIGHT_MIGRATIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("migrations")),
            static_path: env::var("FINSIGHT_STATIC_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
            session_ttl_days: env::var("FINSIGHT_SESSION_TTL_DAYS")
                .ok()
                .and_then(|d| d.parse().ok())
                .filter(|d: &i64| *d > 0)
                .unwrap_or(30),
            ai,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
