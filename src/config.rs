use anyhow::{anyhow, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub model: String,
    pub fallback_model: Option<String>,
    pub embedding_model: String,
    pub api_url: String,
    pub temperature: f32,
}

impl ProviderSettings {
    pub fn from_env(provider: &str) -> Self {
        let prefix = provider.to_uppercase();

        let model = env::var(format!("{}_MODEL", prefix)).unwrap_or_else(|_| {
            match provider {
                "gemini" => "gemini-1.5-pro",
                "openai" => "gpt-4-turbo-preview",
                _ => "",
            }
            .to_string()
        });

        // Cheaper variant used for the one-shot rate-limit retry.
        let fallback_model = env::var(format!("{}_FALLBACK_MODEL", prefix))
            .ok()
            .or_else(|| match provider {
                "gemini" => Some("gemini-1.5-flash".to_string()),
                "openai" => Some("gpt-3.5-turbo".to_string()),
                _ => None,
            });

        let embedding_model = env::var(format!("{}_EMBEDDING_MODEL", prefix)).unwrap_or_else(|_| {
            match provider {
                "gemini" => "text-embedding-004",
                "openai" => "text-embedding-3-small",
                _ => "",
            }
            .to_string()
        });

        let api_url = env::var(format!("{}_API_URL", prefix)).unwrap_or_else(|_| {
            match provider {
                "gemini" => "https://generativelanguage.googleapis.com/v1beta".to_string(),
                "openai" => "https://api.openai.com/v1".to_string(),
                _ => String::new(),
            }
        });

        let temperature = env::var(format!("{}_TEMPERATURE", prefix))
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0.2);

        Self {
            model,
            fallback_model,
            embedding_model,
            api_url,
            temperature,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: String,
    pub qdrant_url: String,
    pub db_path: String,
    pub reports_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            provider: env::var("CLASSPILOT_PROVIDER").unwrap_or_else(|_| "gemini".to_string()),
            qdrant_url: env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6333".to_string()),
            db_path: env::var("CLASSPILOT_DB").unwrap_or_else(|_| "data/classpilot.db".to_string()),
            reports_dir: env::var("CLASSPILOT_REPORTS").unwrap_or_else(|_| "reports".to_string()),
        }
    }
}

/// A missing provider credential is a fatal startup condition.
pub fn require_api_key(provider: &str) -> Result<String> {
    let var = format!("{}_API_KEY", provider.to_uppercase());
    env::var(&var).map_err(|_| anyhow!("{} not found in environment (.env)", var))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_defaults() {
        let settings = ProviderSettings::from_env("gemini");
        assert_eq!(settings.embedding_model, "text-embedding-004");
        assert_eq!(settings.fallback_model.as_deref(), Some("gemini-1.5-flash"));
        assert!(settings.api_url.contains("generativelanguage"));
    }

    #[test]
    fn unknown_provider_has_empty_defaults() {
        let settings = ProviderSettings::from_env("nosuch");
        assert!(settings.model.is_empty());
        assert!(settings.fallback_model.is_none());
    }

    #[test]
    fn missing_key_is_an_error() {
        std::env::remove_var("NOSUCH_API_KEY");
        assert!(require_api_key("nosuch").is_err());
    }
}
