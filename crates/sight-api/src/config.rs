//! API configuration.

use std::time::Duration;

use sight_models::AccumulationPolicy;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size (frames arrive base64-encoded)
    pub max_body_size: usize,
    /// Rate limit requests per second (non-frame routes)
    pub rate_limit_rps: u32,
    /// Default announcement cooldown window
    pub cooldown_window: Duration,
    /// Default accumulation policy for new sessions
    pub accumulation: AccumulationPolicy,
    /// Idle TTL before a session is reaped
    pub session_idle_ttl: Duration,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 10 * 1024 * 1024, // 10MB
            rate_limit_rps: 10,
            cooldown_window: Duration::from_millis(5000),
            accumulation: AccumulationPolicy::Lifetime,
            session_idle_ttl: Duration::from_secs(600),
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            cooldown_window: Duration::from_millis(
                std::env::var("COOLDOWN_WINDOW_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5000),
            ),
            accumulation: std::env::var("ACCUMULATION_POLICY")
                .ok()
                .and_then(|s| match s.as_str() {
                    "lifetime" => Some(AccumulationPolicy::Lifetime),
                    "per_frame" => Some(AccumulationPolicy::PerFrame),
                    _ => None,
                })
                .unwrap_or_default(),
            session_idle_ttl: Duration::from_secs(
                std::env::var("SESSION_IDLE_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}
