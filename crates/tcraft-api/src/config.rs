//! API configuration.

use tcraft_engine::AnalysisMode;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second
    pub rate_limit_rps: u32,
    /// Max request body size (uploads are large)
    pub max_body_size: usize,
    /// Frames sampled per uploaded video
    pub frame_count: usize,
    /// Thumbnails produced per generation
    pub thumbnail_count: usize,
    /// How video uploads are analyzed
    pub analysis_mode: AnalysisMode,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            max_body_size: 100 * 1024 * 1024, // 100MB
            frame_count: 5,
            thumbnail_count: 4,
            analysis_mode: AnalysisMode::Frames,
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
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100 * 1024 * 1024),
            frame_count: std::env::var("FRAME_SAMPLE_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n >= 1)
                .unwrap_or(5),
            thumbnail_count: std::env::var("THUMBNAIL_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n >= 1)
                .unwrap_or(4),
            analysis_mode: match std::env::var("ANALYSIS_MODE").as_deref() {
                Ok("upload") => AnalysisMode::Upload,
                _ => AnalysisMode::Frames,
            },
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.frame_count, 5);
        assert_eq!(config.thumbnail_count, 4);
        assert_eq!(config.analysis_mode, AnalysisMode::Frames);
        assert!(!config.is_production());
    }
}
