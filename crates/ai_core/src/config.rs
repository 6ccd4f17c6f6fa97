//! Configuration for inference engine

use serde::{Deserialize, Serialize};

/// Configuration for the inference engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of the chat-completion API (without the `/chat/completions` suffix)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default model to use
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

const fn default_timeout_ms() -> u64 {
    60000 // 60 seconds
}

const fn default_max_tokens() -> u32 {
    1024
}

const fn default_temperature() -> f32 {
    0.7
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            default_model: default_model(),
            timeout_ms: default_timeout_ms(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl InferenceConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            return Err("Inference API key is required".to_string());
        }

        if self.base_url.trim().is_empty() {
            return Err("Inference base URL cannot be empty".to_string());
        }

        if self.timeout_ms == 0 {
            return Err("Inference timeout must be greater than 0".to_string());
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> InferenceConfig {
        InferenceConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn default_config_has_sensible_values() {
        let config = InferenceConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.default_model, "gpt-3.5-turbo");
        assert_eq!(config.timeout_ms, 60000);
        assert_eq!(config.max_tokens, 1024);
        assert!((config.temperature - 0.7).abs() < 0.01);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn config_deserialization_with_defaults() {
        let json = r#"{}"#;
        let config: InferenceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.timeout_ms, 60000);
    }

    #[test]
    fn config_deserialization() {
        let json = r#"{"base_url":"http://custom:8080/v1","default_model":"my-model"}"#;
        let config: InferenceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.base_url, "http://custom:8080/v1");
        assert_eq!(config.default_model, "my-model");
    }

    #[test]
    fn validate_requires_api_key() {
        assert!(InferenceConfig::default().validate().is_err());
        let config = InferenceConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = InferenceConfig {
            timeout_ms: 0,
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_temperature() {
        let config = InferenceConfig {
            temperature: 2.5,
            ..valid()
        };
        assert!(config.validate().is_err());
    }
}
