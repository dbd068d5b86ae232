//! Configuration management for Wayfarer.
//!
//! Configuration can be set via environment variables:
//! - `LLM_PROVIDER` - Optional. `gemini` (default) or `groq`.
//! - `LLM_MODEL` - Optional. Model identifier. Defaults to `gemini-2.0-flash`.
//! - `GEMINI_API_KEY` / `GOOGLE_API_KEY` - Required for the Gemini provider
//!   and for the image-analysis tool.
//! - `GROQ_API_KEY` - Required for the Groq provider.
//! - `SERPER_API_KEY` - Optional. Enables web/image search and scraping.
//! - `APIFY_API_TOKEN` - Optional. Enables hotel and activity search.
//! - `WEATHER_AGENT_API_URL` - Optional. Weather backend endpoint.
//! - `HOST` - Optional. Server host. Defaults to `0.0.0.0`.
//! - `PORT` - Optional. Server port. Defaults to `5000`.
//! - `MAX_ROUNDS` - Optional. Maximum agent loop rounds. Defaults to `20`.
//!
//! The config is constructed once at startup and passed explicitly into the
//! model client and tool constructors; nothing reads the environment after
//! that point.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Default endpoint for the weather backend.
const DEFAULT_WEATHER_API_URL: &str = "https://weather-agent-xhzk.onrender.com/weather";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// The chat-completion backend to drive the agent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Google Gemini (`generateContent` API).
    Gemini,
    /// Groq (OpenAI-compatible chat completions).
    Groq,
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "groq" => Ok(Provider::Groq),
            other => Err(format!("expected 'gemini' or 'groq', got: {}", other)),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => write!(f, "gemini"),
            Provider::Groq => write!(f, "groq"),
        }
    }
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which chat-completion backend to use
    pub provider: Provider,

    /// Model identifier for the selected provider
    pub model: String,

    /// Google API key (Gemini model calls and the vision tool)
    pub google_api_key: Option<String>,

    /// Groq API key
    pub groq_api_key: Option<String>,

    /// Serper API key (web search, image search, scraping)
    pub serper_api_key: Option<String>,

    /// Apify API token (hotel and activity search)
    pub apify_api_token: Option<String>,

    /// Weather backend endpoint
    pub weather_api_url: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Maximum rounds for the agent loop
    pub max_rounds: usize,

    /// Timeout for outbound HTTP calls (model and tools), in seconds
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if the selected provider's API
    /// key is not set, and `ConfigError::InvalidValue` for unparsable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = std::env::var("LLM_PROVIDER")
            .ok()
            .map(|v| {
                Provider::from_str(&v)
                    .map_err(|e| ConfigError::InvalidValue("LLM_PROVIDER".to_string(), e))
            })
            .transpose()?
            .unwrap_or(Provider::Gemini);

        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| match provider {
            Provider::Gemini => "gemini-2.0-flash".to_string(),
            Provider::Groq => "llama-3.3-70b-versatile".to_string(),
        });

        let google_api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok();
        let groq_api_key = std::env::var("GROQ_API_KEY").ok();

        // The selected provider must have its key available.
        match provider {
            Provider::Gemini if google_api_key.is_none() => {
                return Err(ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()));
            }
            Provider::Groq if groq_api_key.is_none() => {
                return Err(ConfigError::MissingEnvVar("GROQ_API_KEY".to_string()));
            }
            _ => {}
        }

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let max_rounds = std::env::var("MAX_ROUNDS")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("MAX_ROUNDS".to_string(), format!("{}", e)))?;

        let http_timeout_secs = std::env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("HTTP_TIMEOUT_SECS".to_string(), format!("{}", e))
            })?;

        Ok(Self {
            provider,
            model,
            google_api_key,
            groq_api_key,
            serper_api_key: std::env::var("SERPER_API_KEY").ok(),
            apify_api_token: std::env::var("APIFY_API_TOKEN").ok(),
            weather_api_url: std::env::var("WEATHER_AGENT_API_URL")
                .unwrap_or_else(|_| DEFAULT_WEATHER_API_URL.to_string()),
            host,
            port,
            max_rounds,
            http_timeout_secs,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(provider: Provider, model: String) -> Self {
        Self {
            provider,
            model,
            google_api_key: None,
            groq_api_key: None,
            serper_api_key: None,
            apify_api_token: None,
            weather_api_url: DEFAULT_WEATHER_API_URL.to_string(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_rounds: 20,
            http_timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_known_names() {
        assert_eq!(Provider::from_str("gemini").unwrap(), Provider::Gemini);
        assert_eq!(Provider::from_str("Google").unwrap(), Provider::Gemini);
        assert_eq!(Provider::from_str(" groq ").unwrap(), Provider::Groq);
        assert!(Provider::from_str("openai").is_err());
    }

    #[test]
    fn provider_displays_lowercase() {
        assert_eq!(Provider::Gemini.to_string(), "gemini");
        assert_eq!(Provider::Groq.to_string(), "groq");
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::new(Provider::Gemini, "gemini-2.0-flash".to_string());
        assert_eq!(config.max_rounds, 20);
        assert_eq!(config.port, 5000);
        assert!(config.serper_api_key.is_none());
    }
}
