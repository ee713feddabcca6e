// src/services/profile.rs
use crate::error::ChatbotError;
use crate::helpers::language::Language;
use crate::services::json_store::JsonStore;
use crate::types::Profile;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bjag heter\s+([A-ZÅÄÖ][a-zA-ZÅÄÖåäö\-]+)\b",
        r"(?i)\bmitt namn är\s+([A-ZÅÄÖ][a-zA-ZÅÄÖåäö\-]+)\b",
        r"(?i)\bmy name is\s+([A-Z][a-zA-Z\-]+)\b",
        r"(?i)\bi am\s+([A-Z][a-zA-Z\-]+)\b",
        r"(?i)\bI'm\s+([A-Z][a-zA-Z\-]+)\b",
        r"اسمي\s+(\S+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid name pattern"))
    .collect()
});

/// First name introduced in `text` ("my name is X", "jag heter X", ...).
pub fn extract_name(text: &str) -> Option<String> {
    NAME_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Clone)]
pub struct ProfileStore {
    store: JsonStore,
}

impl ProfileStore {
    pub fn new(store: JsonStore) -> Self {
        Self { store }
    }

    pub async fn load_profile(&self, user_id: &str) -> Profile {
        self.store
            .load_object(&self.store.profile_path(user_id))
            .await
            .unwrap_or_default()
    }

    pub async fn save_profile(&self, user_id: &str, profile: &Profile) -> Result<(), ChatbotError> {
        self.store
            .save_object(&self.store.profile_path(user_id), profile)
            .await
    }

    /// Records a preferred language the first time one is seen and picks up a
    /// name when the user introduces themselves. Returns the stored profile.
    pub async fn maybe_update_profile_from_text(
        &self,
        user_id: &str,
        text: &str,
        lang_hint: Option<Language>,
    ) -> Result<Profile, ChatbotError> {
        let mut profile = self.load_profile(user_id).await;

        if profile.preferred_language.is_none() {
            let lang = lang_hint.unwrap_or_default();
            debug!("[profile] preferred_language={} for {}", lang, user_id);
            profile.preferred_language = Some(lang.code().to_string());
        }
        if let Some(name) = extract_name(text) {
            info!("[profile] name '{}' recorded for {}", name, user_id);
            profile.name = Some(name);
        }

        self.save_profile(user_id, &profile).await?;
        Ok(profile)
    }

    pub fn preferred_language(profile: &Profile) -> Option<Language> {
        profile
            .preferred_language
            .as_deref()
            .and_then(Language::from_code)
    }
}
