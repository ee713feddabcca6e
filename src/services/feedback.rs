// src/services/feedback.rs
use crate::error::ChatbotError;
use crate::helpers::commands::FeedbackAnswer;
use crate::helpers::language::Language;
use crate::services::json_store::JsonStore;
use crate::types::FeedbackRecord;
use chrono::Utc;
use log::info;

/// Answers at least this long get a "was this helpful?" follow-up.
pub const FEEDBACK_MIN_ANSWER_CHARS: usize = 200;

pub fn feedback_prompt(lang: Language) -> &'static str {
    match lang {
        Language::Swedish => "Var detta hjälpsamt? (ja/nej)",
        Language::Arabic => "هل كان هذا مفيداً؟ (نعم/لا)",
        Language::English => "Was this helpful? (yes/no)",
    }
}

pub fn feedback_thanks(lang: Language) -> &'static str {
    match lang {
        Language::Swedish => "Tack för din återkoppling! (sparad)",
        Language::Arabic => "شكرًا على ملاحظاتك! (تم الحفظ)",
        Language::English => "Thanks for your feedback! (saved)",
    }
}

pub fn wants_feedback(answer: &str) -> bool {
    answer.chars().count() >= FEEDBACK_MIN_ANSWER_CHARS
}

#[derive(Debug, Clone)]
pub struct FeedbackStore {
    store: JsonStore,
}

impl FeedbackStore {
    pub fn new(store: JsonStore) -> Self {
        Self { store }
    }

    pub async fn save_feedback(
        &self,
        user_id: &str,
        question: &str,
        answer: &str,
        helpful: FeedbackAnswer,
    ) -> Result<(), ChatbotError> {
        let path = self.store.feedback_path();
        let mut records: Vec<FeedbackRecord> = self.store.load_list(&path).await;
        records.push(FeedbackRecord {
            user_id: user_id.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            helpful: helpful.as_stored().to_string(),
            ts: Utc::now().to_rfc3339(),
        });
        self.store.save_list(&path, &records).await?;
        info!("[feedback] saved '{}' from {} ({} records)", helpful.as_stored(), user_id, records.len());
        Ok(())
    }

    pub async fn records(&self) -> Vec<FeedbackRecord> {
        self.store.load_list(&self.store.feedback_path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_records() {
        let dir = tempfile::tempdir().unwrap();
        let feedback = FeedbackStore::new(JsonStore::new(dir.path()));
        feedback.save_feedback("u1", "q1", "a1", FeedbackAnswer::Yes).await.unwrap();
        feedback.save_feedback("u2", "q2", "a2", FeedbackAnswer::No).await.unwrap();

        let records = feedback.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].helpful, "ja");
        assert_eq!(records[1].helpful, "nej");
        assert_eq!(records[1].user_id, "u2");
    }

    #[test]
    fn localized_prompts() {
        assert_eq!(feedback_prompt(Language::English), "Was this helpful? (yes/no)");
        assert!(feedback_thanks(Language::Swedish).starts_with("Tack"));
        assert!(!wants_feedback("short"));
        assert!(wants_feedback(&"x".repeat(200)));
    }
}
