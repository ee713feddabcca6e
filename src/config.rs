// src/config.rs
use crate::error::ChatbotError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_PRIMARY_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BACKUP_MODEL: &str = "gpt-4o-mini-2024-08";
pub const DEFAULT_DATA_DIR: &str = "user_data";

pub const USER_MEMORY_LIMIT: usize = 50;
pub const GLOBAL_MEMORY_LIMIT: usize = 20;

#[derive(Clone, Debug)]
pub struct ChatbotConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub primary_model: String,
    pub backup_model: String,
    pub data_dir: PathBuf,
    pub timeout: Duration,
    pub max_retries: u32,
    pub user_memory_limit: usize,
    pub global_memory_limit: usize,
    pub force_llm_failure: bool,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            backup_model: DEFAULT_BACKUP_MODEL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            user_memory_limit: USER_MEMORY_LIMIT,
            global_memory_limit: GLOBAL_MEMORY_LIMIT,
            force_llm_failure: false,
        }
    }
}

impl ChatbotConfig {
    /// Reads the process environment. Call `dotenv().ok()` first so `.env` values are visible.
    pub fn from_env() -> Result<Self, ChatbotError> {
        let defaults = Self::default();

        let api_key = match env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Some(validate_api_key(&key)?),
            _ => None,
        };

        Ok(Self {
            api_key,
            base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            primary_model: env::var("OPENAI_MODEL").unwrap_or(defaults.primary_model),
            backup_model: env::var("OPENAI_BACKUP_MODEL").unwrap_or(defaults.backup_model),
            data_dir: env::var("USER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            max_retries: env::var("MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &u32| *n > 0)
                .unwrap_or(defaults.max_retries),
            user_memory_limit: defaults.user_memory_limit,
            global_memory_limit: defaults.global_memory_limit,
            force_llm_failure: env::var("DEBUG_FORCE_OPENAI_FAIL")
                .map(|v| v == "1")
                .unwrap_or(false),
        })
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_api_key(mut self, key: &str) -> Result<Self, ChatbotError> {
        self.api_key = Some(validate_api_key(key)?);
        Ok(self)
    }

    pub fn require_api_key(&self) -> Result<&str, ChatbotError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ChatbotError::Config("OPENAI_API_KEY is not set".into()))
    }
}

/// Trims the key and rejects the usual copy-paste mistakes.
pub fn validate_api_key(raw: &str) -> Result<String, ChatbotError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(ChatbotError::Config(
            "No key given. Set OPENAI_API_KEY in .env or the environment.".into(),
        ));
    }
    if key.starts_with("sk-sk-") || key.starts_with("sk-proj-sk-proj-") {
        return Err(ChatbotError::Config(
            "The key seems to have a doubled prefix ('sk-sk-' or 'sk-proj-sk-proj-'). Copy it again.".into(),
        ));
    }
    if !key.starts_with("sk-") {
        let prefix: String = key.chars().take(8).collect();
        log::warn!("⚠️ API key looks unusual: {}...", prefix);
    }
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_doubled_prefix() {
        assert!(validate_api_key("sk-sk-abc").is_err());
        assert!(validate_api_key("sk-proj-sk-proj-abc").is_err());
        assert!(validate_api_key("   ").is_err());
    }

    #[test]
    fn trims_valid_key() {
        assert_eq!(validate_api_key("  sk-proj-abc \n").unwrap(), "sk-proj-abc");
    }
}
