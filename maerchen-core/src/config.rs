//! Application configuration.
//!
//! One AI provider is selected at startup and determines the endpoint,
//! credential and model defaults. `Limits` carries the admission ceilings.
//! Both are plain values; the embedding process decides where they come
//! from, `from_env` covers the common deployment.

use std::time::Duration;

/// Which OpenAI-compatible backend serves completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    OpenAi,
    Mistral,
    OllamaLocal,
    OllamaCloud,
}

impl AiProvider {
    /// The provider identifier as it appears in configuration and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::OpenAi => "openai",
            AiProvider::Mistral => "mistral",
            AiProvider::OllamaLocal => "ollama-local",
            AiProvider::OllamaCloud => "ollama-cloud",
        }
    }

    /// Parse a provider identifier. Unknown values fall back to Mistral.
    pub fn parse(s: &str) -> Self {
        match s {
            "openai" => AiProvider::OpenAi,
            "ollama-local" => AiProvider::OllamaLocal,
            "ollama-cloud" => AiProvider::OllamaCloud,
            _ => AiProvider::Mistral,
        }
    }

    /// Actual cost of a completed request, derived from total token usage.
    pub fn cost_for_tokens(&self, total_tokens: usize) -> f64 {
        match self {
            AiProvider::OllamaCloud => total_tokens as f64 / 1000.0 * 0.0005,
            AiProvider::OllamaLocal => 0.0,
            _ => total_tokens as f64 / 1000.0 * 0.001,
        }
    }
}

/// Completion backend configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: AiProvider,
    pub api_key: String,
    pub base_url: String,
    pub default_model: String,
    /// Whether to run the best-effort spelling-correction pass.
    pub spelling_correction: bool,
}

impl Config {
    /// Build a configuration with explicit values.
    pub fn new(provider: AiProvider, api_key: impl Into<String>) -> Self {
        let (base_url, default_model) = provider_defaults(provider);
        Self {
            provider,
            api_key: api_key.into(),
            base_url,
            default_model,
            spelling_correction: true,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let provider = AiProvider::parse(&env_or("AI_PROVIDER", "openai"));

        let (api_key, base_url, default_model) = match provider {
            AiProvider::OllamaCloud => (
                env_or("OLLAMA_API_KEY", "dummy-key"),
                "https://ollama.com/v1".to_string(),
                env_or("OLLAMA_MODEL", "ministral-3:8b-cloud"),
            ),
            AiProvider::OllamaLocal => (
                "dummy-key".to_string(),
                env_or("OLLAMA_BASE_URL", "http://localhost:11434/v1"),
                env_or("OLLAMA_MODEL", "mistral:7b"),
            ),
            AiProvider::OpenAi => (
                env_or("OPENAI_API_KEY", ""),
                "https://api.openai.com/v1".to_string(),
                env_or("OPENAI_MODEL", "gpt-4"),
            ),
            AiProvider::Mistral => (
                env_or("OPENAI_API_KEY", ""),
                env_or("OPENAI_BASE_URL", "https://api.mistral.ai/v1"),
                env_or("OPENAI_MODEL", "mistral-large-latest"),
            ),
        };

        Self {
            provider,
            api_key,
            base_url,
            default_model,
            spelling_correction: true,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_spelling_correction(mut self, enabled: bool) -> Self {
        self.spelling_correction = enabled;
        self
    }
}

fn provider_defaults(provider: AiProvider) -> (String, String) {
    match provider {
        AiProvider::OllamaCloud => (
            "https://ollama.com/v1".to_string(),
            "ministral-3:8b-cloud".to_string(),
        ),
        AiProvider::OllamaLocal => (
            "http://localhost:11434/v1".to_string(),
            "mistral:7b".to_string(),
        ),
        AiProvider::OpenAi => ("https://api.openai.com/v1".to_string(), "gpt-4".to_string()),
        AiProvider::Mistral => (
            "https://api.mistral.ai/v1".to_string(),
            "mistral-large-latest".to_string(),
        ),
    }
}

/// Admission ceilings and request bounds.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Requests allowed per caller within the sliding window.
    pub per_caller_limit: usize,
    /// Length of the per-caller sliding window.
    pub window: Duration,
    /// Requests allowed globally per day.
    pub global_daily_limit: usize,
    /// Daily monetary budget.
    pub max_daily_cost: f64,
    /// Estimated cost charged optimistically at admission.
    pub cost_per_request: f64,
    /// Maximum requested reading time in minutes.
    pub max_story_length: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            per_caller_limit: 10,
            window: Duration::from_secs(60 * 60),
            global_daily_limit: 1000,
            max_daily_cost: 5.0,
            cost_per_request: 0.0015,
            max_story_length: 15,
        }
    }
}

impl Limits {
    /// Load limits from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Limits::default();
        Self {
            per_caller_limit: env_parsed("RATE_LIMIT_PER_IP", defaults.per_caller_limit),
            window: defaults.window,
            global_daily_limit: env_parsed("GLOBAL_DAILY_LIMIT", defaults.global_daily_limit),
            max_daily_cost: env_parsed("MAX_DAILY_COST", defaults.max_daily_cost),
            cost_per_request: defaults.cost_per_request,
            max_story_length: env_parsed("MAX_STORY_LENGTH", defaults.max_story_length),
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
