// src/services/memory.rs
use crate::client::{LlmClient, CHAT_SAMPLING, SUMMARY_SAMPLING};
use crate::config::{GLOBAL_MEMORY_LIMIT, USER_MEMORY_LIMIT};
use crate::error::ChatbotError;
use crate::helpers::language::{detect_lang_or, Language};
use crate::prompts::{build_system_prompt, fallback_message, summary_failed_message, summary_template};
use crate::services::json_store::JsonStore;
use crate::services::profile::ProfileStore;
use crate::types::{ChatMessage, Role, StoredMessage};
use log::{debug, error, info, warn};

/// Histories longer than this many user/assistant rounds trigger a warning.
const HISTORY_WARN_ROUNDS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatAnswer {
    pub answer: String,
    pub lang: Language,
}

/// Context window sent to the model: the tail of the global history followed
/// by the tail of the user's own history.
pub fn build_context(
    global_history: &[StoredMessage],
    user_history: &[StoredMessage],
    global_limit: usize,
    user_limit: usize,
) -> Vec<ChatMessage> {
    let global_tail = &global_history[global_history.len().saturating_sub(global_limit)..];
    let user_tail = &user_history[user_history.len().saturating_sub(user_limit)..];
    global_tail
        .iter()
        .chain(user_tail.iter())
        .map(StoredMessage::to_chat_message)
        .collect()
}

/// `[ts] You: ...` lines, one per message.
pub fn render_transcript(history: &[StoredMessage]) -> String {
    history
        .iter()
        .map(|msg| {
            if msg.ts.is_empty() {
                format!("{}: {}", msg.speaker(), msg.content)
            } else {
                format!("[{}] {}: {}", msg.ts, msg.speaker(), msg.content)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn check_history_length(history: &[StoredMessage], max_rounds: usize) -> bool {
    if history.len() > max_rounds * 2 {
        warn!(
            "⚠️ History is long ({} messages). Consider summarizing or trimming.",
            history.len()
        );
        return false;
    }
    true
}

/// Per-user and global conversation memory backed by JSON files.
#[derive(Clone)]
pub struct ConversationMemory {
    store: JsonStore,
    profiles: ProfileStore,
    llm: LlmClient,
    user_limit: usize,
    global_limit: usize,
}

impl ConversationMemory {
    pub fn new(store: JsonStore, llm: LlmClient) -> Self {
        Self {
            profiles: ProfileStore::new(store.clone()),
            store,
            llm,
            user_limit: USER_MEMORY_LIMIT,
            global_limit: GLOBAL_MEMORY_LIMIT,
        }
    }

    pub fn with_limits(mut self, user_limit: usize, global_limit: usize) -> Self {
        self.user_limit = user_limit;
        self.global_limit = global_limit;
        self
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub async fn history(&self, user_id: &str) -> Vec<StoredMessage> {
        self.store.load_list(&self.store.user_memory_path(user_id)).await
    }

    /// Answers `question` with the model, recording both sides in the user and
    /// global histories. Model failures produce a localized fallback answer.
    pub async fn ask(&self, question: &str, user_id: &str) -> ChatAnswer {
        let question = question.trim();
        if question.is_empty() {
            return ChatAnswer {
                answer: "Please type something.".to_string(),
                lang: Language::English,
            };
        }

        let preview: String = question.chars().take(60).collect();
        debug!("[ask] user_id={} input_preview='{}'", user_id, preview);

        let stored_profile = self.profiles.load_profile(user_id).await;
        let fallback_lang = ProfileStore::preferred_language(&stored_profile).unwrap_or_default();
        let lang = detect_lang_or(question, fallback_lang);
        info!("[ask] detected_language={}", lang);

        let profile = match self
            .profiles
            .maybe_update_profile_from_text(user_id, question, Some(lang))
            .await
        {
            Ok(profile) => profile,
            Err(e) => {
                error!("[ask] failed to update profile: {}", e);
                stored_profile
            }
        };

        let user_path = self.store.user_memory_path(user_id);
        let global_path = self.store.global_memory_path();
        let mut user_history: Vec<StoredMessage> = self.store.load_list(&user_path).await;
        let mut global_history: Vec<StoredMessage> = self.store.load_list(&global_path).await;
        debug!(
            "[ask] user_history_len={} global_history_len={}",
            user_history.len(),
            global_history.len()
        );
        check_history_length(&user_history, HISTORY_WARN_ROUNDS);

        let user_msg = StoredMessage::now(Role::User, question);
        user_history.push(user_msg.clone());
        global_history.push(user_msg);

        let system_prompt = build_system_prompt(lang, profile.name.as_deref());
        let context = build_context(&global_history, &user_history, self.global_limit, self.user_limit);
        debug!(
            "[ask] context_size={} (global_limit={}, user_limit={})",
            context.len(),
            self.global_limit,
            self.user_limit
        );

        let answer = match self.llm.complete(&system_prompt, &context, CHAT_SAMPLING).await {
            Ok(answer) => answer,
            Err(e) => {
                error!("[ask] chat completion failed: {}", e);
                fallback_message(lang).to_string()
            }
        };

        let assistant_msg = StoredMessage::now(Role::Assistant, &answer);
        user_history.push(assistant_msg.clone());
        global_history.push(assistant_msg);

        if let Err(e) = self.save_histories(&user_history, &global_history, user_id).await {
            error!("[ask] failed to save histories: {}", e);
        }

        ChatAnswer { answer, lang }
    }

    async fn save_histories(
        &self,
        user_history: &[StoredMessage],
        global_history: &[StoredMessage],
        user_id: &str,
    ) -> Result<(), ChatbotError> {
        self.store
            .save_list(&self.store.user_memory_path(user_id), user_history)
            .await?;
        self.store
            .save_list(&self.store.global_memory_path(), global_history)
            .await?;
        debug!("[ask] histories saved");
        Ok(())
    }

    /// Summary of the user's conversation, framed by a localized header and footer.
    /// The language is the hint, else that of the last user message, else the profile's.
    pub async fn summarize(&self, user_id: &str, lang_hint: Option<Language>) -> String {
        let history = self.history(user_id).await;
        if history.is_empty() {
            info!("[summarize] no history found");
            return "No history to summarize.".to_string();
        }

        let conversation_text = history
            .iter()
            .map(|msg| format!("{}: {}", msg.speaker(), msg.content))
            .collect::<Vec<_>>()
            .join("\n");
        debug!(
            "[summarize] total_messages={} text_chars={}",
            history.len(),
            conversation_text.chars().count()
        );

        let lang = match lang_hint {
            Some(lang) => lang,
            None => {
                let profile = self.profiles.load_profile(user_id).await;
                let profile_lang = ProfileStore::preferred_language(&profile).unwrap_or_default();
                history
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| detect_lang_or(&m.content, profile_lang))
                    .unwrap_or(profile_lang)
            }
        };
        info!("[summarize] summary_language={}", lang);

        let template = summary_template(lang);
        let request = [ChatMessage::user(&format!("Conversation:\n{}", conversation_text))];
        match self.llm.complete(template.system, &request, SUMMARY_SAMPLING).await {
            Ok(summary) => format!("{}\n{}\n{}", template.header, summary, template.footer),
            Err(e) => {
                error!("[summarize] summary failed: {}", e);
                summary_failed_message(lang).to_string()
            }
        }
    }

    pub async fn clear_user_memory(&self, user_id: &str) -> Result<String, ChatbotError> {
        self.store
            .save_list::<StoredMessage>(&self.store.user_memory_path(user_id), &[])
            .await?;
        info!("[memory] cleared history for {}", user_id);
        Ok("User memory cleared!".to_string())
    }

    /// Greeting shown at startup: welcome-back line plus the previous conversation.
    pub async fn show_previous_conversation(&self, user_id: &str) -> String {
        let history = self.history(user_id).await;
        let profile = self.profiles.load_profile(user_id).await;

        let mut out = Vec::new();
        if let Some(name) = profile.name {
            out.push(format!("Welcome back, {}!", name));
        }
        if history.is_empty() {
            out.push("No previous conversation found.".to_string());
        } else {
            out.push("Previous conversation:".to_string());
            out.push("-".repeat(60));
            out.push(render_transcript(&history));
            out.push("-".repeat(60));
        }
        out.join("\n")
    }

    pub async fn show_full_history(&self, user_id: &str) -> String {
        let history = self.history(user_id).await;
        if history.is_empty() {
            return "No history found.".to_string();
        }
        format!(
            "Full conversation history:\n{}\n{}\n{}",
            "-".repeat(60),
            render_transcript(&history),
            "-".repeat(60)
        )
    }
}
