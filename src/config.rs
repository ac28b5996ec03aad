use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::fetcher::DEFAULT_LANGUAGES;
use crate::llm::ModelSettings;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Caption languages to try, most preferred first
    pub languages: Option<Vec<String>>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub max_attempts: Option<u32>,
}

impl Config {
    /// Load config from ~/.config/vidchat/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn languages(&self) -> Vec<String> {
        let langs = normalize_languages(self.languages.iter().flatten());
        if langs.is_empty() {
            DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect()
        } else {
            langs
        }
    }

    pub fn model_settings(&self) -> ModelSettings {
        let defaults = ModelSettings::default();
        ModelSettings {
            model: self.model.clone().unwrap_or(defaults.model),
            system_prompt: self.system_prompt.clone().unwrap_or(defaults.system_prompt),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
        }
    }
}

/// Trim language codes and drop blank ones, keeping order
pub fn normalize_languages<S: AsRef<str>>(codes: impl IntoIterator<Item = S>) -> Vec<String> {
    codes
        .into_iter()
        .map(|c| c.as_ref().trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("vidchat")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
languages = ["en", "de"]
model = "gpt-4o"
system_prompt = "Be brief."
max_tokens = 1024
temperature = 0.5
max_attempts = 3
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.languages(), vec!["en".to_string(), "de".to_string()]);

        let settings = config.model_settings();
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.system_prompt, "Be brief.");
        assert_eq!(settings.max_tokens, 1024);
        assert_eq!(settings.temperature, 0.5);
        assert_eq!(settings.max_attempts, 3);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.languages(), vec!["de", "fr", "en", "es"]);

        let settings = config.model_settings();
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_empty_language_list_uses_defaults() {
        let config: Config = toml::from_str("languages = []").unwrap();
        assert_eq!(config.languages().len(), 4);
    }

    #[test]
    fn test_normalize_languages() {
        assert_eq!(normalize_languages(["de", " en", "", "  "]), vec!["de", "en"]);
        assert!(normalize_languages(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_config_languages_are_trimmed() {
        let config: Config = toml::from_str(r#"languages = [" fr ", ""]"#).unwrap();
        assert_eq!(config.languages(), vec!["fr"]);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(r#"model = "claude-3-opus-20240229""#).unwrap();
        assert_eq!(config.model_settings().model, "claude-3-opus-20240229");
        assert!(config.languages.is_none());
        assert!(config.max_tokens.is_none());
    }
}
