// src/services/json_store.rs
use crate::error::ChatbotError;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const GLOBAL_MEMORY_FILE: &str = "chat_memory_global.json";
pub const FEEDBACK_FILE: &str = "chat_feedback.json";
pub const DEBUG_LOG_FILE: &str = "debug.log";

/// Flat-file JSON storage rooted at the user data directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn user_memory_path(&self, user_id: &str) -> PathBuf {
        self.root
            .join(format!("chat_memory_{}.json", sanitize_user_id(user_id)))
    }

    pub fn profile_path(&self, user_id: &str) -> PathBuf {
        self.root
            .join(format!("profile_{}.json", sanitize_user_id(user_id)))
    }

    pub fn global_memory_path(&self) -> PathBuf {
        self.root.join(GLOBAL_MEMORY_FILE)
    }

    pub fn feedback_path(&self) -> PathBuf {
        self.root.join(FEEDBACK_FILE)
    }

    pub async fn ensure_dir(&self) -> Result<(), ChatbotError> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).await?;
        }
        Ok(())
    }

    /// Loads a JSON array. Missing, unreadable or malformed files read as empty.
    pub async fn load_list<T: DeserializeOwned>(&self, path: &Path) -> Vec<T> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(_) => {
                debug!("💾 No list file at {}", path.display());
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<T>>(&content) {
            Ok(items) => items,
            Err(e) => {
                warn!("Ignoring malformed list file {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    pub async fn save_list<T: Serialize>(&self, path: &Path, items: &[T]) -> Result<(), ChatbotError> {
        self.write_pretty(path, &items).await
    }

    /// Loads a JSON object, `None` when missing or malformed.
    pub async fn load_object<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        let content = fs::read_to_string(path).await.ok()?;
        match serde_json::from_str::<T>(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring malformed object file {}: {}", path.display(), e);
                None
            }
        }
    }

    pub async fn save_object<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), ChatbotError> {
        self.write_pretty(path, value).await
    }

    async fn write_pretty<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<(), ChatbotError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }
        let pretty_json = serde_json::to_string_pretty(value)?;
        fs::write(path, pretty_json).await?;
        Ok(())
    }
}

/// Keeps user ids safe to embed in file names.
pub fn sanitize_user_id(user_id: &str) -> String {
    let cleaned: String = user_id
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "anonymous".to_string()
    } else {
        cleaned
    }
}
