use std::num::{NonZeroU32, NonZeroU64};
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_AWS_REGION: &str = "us-east-1";
const DEFAULT_UPLOAD_PREFIX: &str = "resumes/";
const DEFAULT_COURSE_SEARCH_URL: &str = "https://api.coursera.org/api/courses.v1";
const DEFAULT_AWS_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub s3_bucket: String,
    /// S3-compatible endpoint override (MinIO locally). `None` targets AWS.
    pub s3_endpoint: Option<String>,
    pub upload_prefix: String,
    pub resume_lambda: String,
    pub mongo_uri: String,
    pub mongo_db: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_region: String,
    /// Total attempts per AWS call, first try included. Never zero.
    pub aws_max_attempts: u32,
    /// Job-refresh feature is disabled, not failing, when this is `None`.
    pub job_refresh_endpoint: Option<String>,
    pub course_search_url: String,
    /// Sessions untouched for longer than this are dropped.
    pub session_ttl: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: optional_env("S3_ENDPOINT"),
            upload_prefix: optional_env("UPLOAD_PREFIX")
                .unwrap_or_else(|| DEFAULT_UPLOAD_PREFIX.to_string()),
            resume_lambda: require_env("RESUME_LAMBDA")?,
            mongo_uri: require_env("MONGO_URI")?,
            mongo_db: require_env("MONGO_DB")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            aws_region: optional_env("AWS_REGION")
                .unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            aws_max_attempts: parse_max_attempts(optional_env("AWS_MAX_ATTEMPTS"))?,
            job_refresh_endpoint: optional_env("JOB_REFRESH_ENDPOINT"),
            course_search_url: optional_env("COURSE_SEARCH_URL")
                .unwrap_or_else(|| DEFAULT_COURSE_SEARCH_URL.to_string()),
            session_ttl: parse_session_ttl(optional_env("SESSION_TTL_SECS"))?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_max_attempts(raw: Option<String>) -> Result<u32> {
    match raw {
        Some(v) => Ok(v
            .trim()
            .parse::<NonZeroU32>()
            .context("AWS_MAX_ATTEMPTS must be a positive integer")?
            .get()),
        None => Ok(DEFAULT_AWS_MAX_ATTEMPTS),
    }
}

fn parse_session_ttl(raw: Option<String>) -> Result<Duration> {
    let secs = match raw {
        Some(v) => v
            .trim()
            .parse::<NonZeroU64>()
            .context("SESSION_TTL_SECS must be a positive number of seconds")?
            .get(),
        None => DEFAULT_SESSION_TTL_SECS,
    };
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
impl Config {
    /// Fixed configuration for tests; points at nothing reachable.
    pub fn for_tests() -> Self {
        Config {
            s3_bucket: "test-bucket".to_string(),
            s3_endpoint: None,
            upload_prefix: DEFAULT_UPLOAD_PREFIX.to_string(),
            resume_lambda: "resume-parser".to_string(),
            mongo_uri: "mongodb://localhost:27017".to_string(),
            mongo_db: "jobs".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            aws_region: DEFAULT_AWS_REGION.to_string(),
            aws_max_attempts: DEFAULT_AWS_MAX_ATTEMPTS,
            job_refresh_endpoint: None,
            course_search_url: DEFAULT_COURSE_SEARCH_URL.to_string(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}
