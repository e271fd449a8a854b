use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::deck::DeckConfig;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub anki: AnkiConfig,
    pub ai_model: AiModelConfig,
    pub input: InputConfig,
    pub prompt: PromptConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnkiConfig {
    pub endpoint: String,
    pub deck_name: String,
    pub front_field: String,
    pub back_field: String,
}

impl Default for AnkiConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8765".to_string(),
            deck_name: "GreatestEstateDeveloper".to_string(),
            front_field: "Front".to_string(),
            back_field: "Back".to_string(),
        }
    }
}

impl AnkiConfig {
    pub fn deck(&self) -> DeckConfig {
        DeckConfig {
            deck_name: self.deck_name.clone(),
            front_field: self.front_field.clone(),
            back_field: self.back_field.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AiModelConfig {
    pub endpoint: String,
    pub model: String,
}

impl Default for AiModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "mistral-small3.1".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub images_dir: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            images_dir: "./InputImages".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PromptConfig {
    /// Language of the text the model is asked to transcribe.
    pub language: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            language: "Korean".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .context("Failed to parse config file")?;

        config.apply_env();
        Ok(config)
    }

    /// Load the config file, or fall back to defaults when it is absent and
    /// was not explicitly requested.
    pub fn load<P: AsRef<Path>>(path: P, explicit: bool) -> Result<Self> {
        let path = path.as_ref();
        if !explicit && !path.exists() {
            let mut config = Config::default();
            config.apply_env();
            return Ok(config);
        }
        Self::from_file(path)
    }

    /// Override endpoints with environment variables if set
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("ANKI_CONNECT_URL") {
            self.anki.endpoint = url;
        }
        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            self.ai_model.endpoint = with_scheme(&host);
        }
    }
}

/// `OLLAMA_HOST` may be a bare `host:port`; reqwest needs a full URL.
fn with_scheme(host: &str) -> String {
    if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parsing() {
        let toml_str = r#"
            [anki]
            endpoint = "http://localhost:9999"
            deck_name = "Vocab"
            front_field = "Word"
            back_field = "Meaning"

            [ai_model]
            endpoint = "http://localhost:11434"
            model = "llava"

            [input]
            images_dir = "./scans"

            [prompt]
            language = "Japanese"

            [logging]
            level = "debug"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.anki.deck_name, "Vocab");
        assert_eq!(config.ai_model.model, "llava");
        assert_eq!(config.input.images_dir, "./scans");
        assert_eq!(config.prompt.language, "Japanese");

        let deck = config.anki.deck();
        assert_eq!(deck.front_field, "Word");
        assert_eq!(deck.back_field, "Meaning");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.anki.endpoint, "http://127.0.0.1:8765");
        assert_eq!(config.anki.deck_name, "GreatestEstateDeveloper");
        assert_eq!(config.anki.front_field, "Front");
        assert_eq!(config.ai_model.model, "mistral-small3.1");
        assert_eq!(config.prompt.language, "Korean");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str("[anki]\ndeck_name = \"Other\"\n").unwrap();
        assert_eq!(config.anki.deck_name, "Other");
        assert_eq!(config.anki.back_field, "Back");
    }

    #[test]
    fn test_bare_ollama_host_gets_http_scheme() {
        assert_eq!(with_scheme("0.0.0.0:11434"), "http://0.0.0.0:11434");
        assert_eq!(with_scheme("gpu-box:11434"), "http://gpu-box:11434");
        assert_eq!(with_scheme("https://ollama.lan"), "https://ollama.lan");
        assert_eq!(with_scheme("http://localhost:11434"), "http://localhost:11434");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load(&missing, true).is_err());
        assert!(Config::load(&missing, false).is_ok());
    }
}
