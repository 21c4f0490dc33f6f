use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub vision_model: String,
    pub analysis_max_retries: u32,
    pub analysis_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            openai_base_url: env::var("OPENAI_BASE_URL").ok(),
            vision_model: env::var("VISION_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            analysis_max_retries: env::var("ANALYSIS_MAX_RETRIES")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .context("ANALYSIS_MAX_RETRIES must be a valid number")?,
            analysis_timeout_secs: env::var("ANALYSIS_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("ANALYSIS_TIMEOUT_SECS must be a valid number")?,
        })
    }

    /// The API key, required only for image analysis.
    pub fn require_api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .context("OPENAI_API_KEY must be set to analyze images")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_required_only_on_demand() {
        let config = Config {
            openai_api_key: None,
            openai_base_url: None,
            vision_model: "gpt-4o".to_string(),
            analysis_max_retries: 2,
            analysis_timeout_secs: 60,
        };
        assert!(config.require_api_key().is_err());

        let config = Config {
            openai_api_key: Some("sk-test".to_string()),
            ..config
        };
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
    }
}
