// src/chat.rs
use crate::client::{ChatBackend, LlmClient};
use crate::config::ChatbotConfig;
use crate::helpers::commands::{
    detect_command, has_stock_keyword, parse_feedback_answer, parse_stock_command,
    parse_stock_list, Command, FeedbackAnswer,
};
use crate::helpers::language::{detect_lang, detect_lang_hint, Language};
use crate::services::feedback::{feedback_prompt, feedback_thanks, wants_feedback, FeedbackStore};
use crate::services::json_store::JsonStore;
use crate::services::memory::ConversationMemory;
use crate::services::yahoo_finance::PriceSource;
use crate::symbols::{TickerResolver, DEFAULT_LIMIT};
use crate::tool::ToolResolver;
use crate::tools::stock::StockReporter;
use log::{debug, error, info};
use serde_json::{json, Value};
use std::sync::Arc;

pub const STOCK_USAGE: &str = "Usage: /stock TICKER [TICKER ...]";
pub const STOCK_LIST_USAGE: &str = "Give at least one ticker, e.g. 'stocks: AAPL MSFT TSLA'";

/// What the REPL should print (or do) for one line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Exit,
    /// Blank input.
    Nothing,
    /// Printed as `Bot: ...`.
    Bot(String),
    /// Multi-line report printed below `Bot:`.
    Report(String),
    /// Printed as-is.
    Plain(String),
    /// Model answer, optionally followed by a feedback question.
    Answer {
        text: String,
        feedback_prompt: Option<&'static str>,
    },
}

impl Reply {
    pub fn render(&self) -> Option<String> {
        match self {
            Reply::Exit | Reply::Nothing => None,
            Reply::Bot(text) => Some(format!("Bot: {}\n", text)),
            Reply::Report(text) => Some(format!("Bot:\n{}\n", text)),
            Reply::Plain(text) => Some(format!("{}\n", text)),
            Reply::Answer { text, feedback_prompt } => Some(match feedback_prompt {
                Some(prompt) => format!("Bot: {}\n\n{}", text, prompt),
                None => format!("Bot: {}\n", text),
            }),
        }
    }
}

#[derive(Debug, Clone)]
struct PendingFeedback {
    question: String,
    answer: String,
    lang: Language,
}

/// One user's chat session.
pub struct ChatApp {
    user_id: String,
    memory: ConversationMemory,
    feedback: FeedbackStore,
    resolver: TickerResolver,
    tools: ToolResolver,
    pending_feedback: Option<PendingFeedback>,
}

impl ChatApp {
    pub fn new(
        user_id: &str,
        memory: ConversationMemory,
        feedback: FeedbackStore,
        reporter: StockReporter,
    ) -> Self {
        let tools = ToolResolver::new(reporter.clone());
        debug!(
            "[chat] tools: {}",
            tools
                .list_tools()
                .iter()
                .filter_map(|t| t["name"].as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Self {
            user_id: user_id.to_string(),
            memory,
            feedback,
            resolver: reporter.resolver().clone(),
            tools,
            pending_feedback: None,
        }
    }

    pub fn from_config(
        user_id: &str,
        config: &ChatbotConfig,
        backend: Arc<dyn ChatBackend>,
        prices: Arc<dyn PriceSource>,
    ) -> Self {
        let store = JsonStore::new(config.data_dir.clone());
        let llm = LlmClient::from_config(backend, config);
        let memory = ConversationMemory::new(store.clone(), llm)
            .with_limits(config.user_memory_limit, config.global_memory_limit);
        let reporter = StockReporter::new(prices, TickerResolver::builtin());
        Self::new(user_id, memory, FeedbackStore::new(store), reporter)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn has_pending_feedback(&self) -> bool {
        self.pending_feedback.is_some()
    }

    pub async fn greeting(&self) -> String {
        self.memory.show_previous_conversation(&self.user_id).await
    }

    pub async fn handle(&mut self, input: &str) -> Reply {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Reply::Nothing;
        }
        let low = trimmed.to_lowercase();
        if low == "exit" {
            return Reply::Exit;
        }

        // detect_command covers the slash forms too; only natural phrases carry a language hint,
        // and a bare command word leaves it to history and profile
        if let Some(command) = detect_command(trimmed) {
            let lang_hint = if low.starts_with('/') { None } else { detect_lang_hint(trimmed) };
            return self.run_command(command, lang_hint).await;
        }

        if let Some(tickers) = parse_stock_command(trimmed) {
            if tickers.is_empty() {
                return Reply::Bot(STOCK_USAGE.to_string());
            }
            return self.run_tool("get_stock_report", json!({ "tickers": tickers })).await;
        }

        if let Some(tickers) = parse_stock_list(trimmed) {
            if tickers.is_empty() {
                return Reply::Bot(STOCK_LIST_USAGE.to_string());
            }
            return self.run_tool("get_stock_report", json!({ "tickers": tickers })).await;
        }

        if self.pending_feedback.is_some() {
            if let Some(answer) = parse_feedback_answer(trimmed) {
                return self.record_feedback(answer).await;
            }
        }

        if self.is_stock_question(trimmed) {
            debug!("[chat] stock intent for '{}'", trimmed);
            return self
                .run_tool("get_freeform_stock_report", json!({ "query": trimmed }))
                .await;
        }

        self.answer_question(trimmed).await
    }

    fn is_stock_question(&self, text: &str) -> bool {
        has_stock_keyword(text) || !self.resolver.alias_tickers(text, DEFAULT_LIMIT).is_empty()
    }

    async fn run_tool(&self, name: &str, parameters: Value) -> Reply {
        let Some(tool) = self.tools.resolve(name) else {
            error!("[chat] no tool named {}", name);
            return Reply::Bot(format!("Unknown tool: {}", name));
        };
        match tool.execute(parameters).await {
            Ok(result) => {
                if let Some(raw) = &result.raw_value {
                    debug!("[chat] {} -> {}", name, raw);
                }
                Reply::Report(result.text())
            }
            Err(e) => {
                error!("[chat] {} failed: {}", name, e);
                Reply::Bot(format!("Stock lookup failed: {}", e))
            }
        }
    }

    async fn run_command(&mut self, command: Command, lang_hint: Option<Language>) -> Reply {
        info!("[chat] command {:?} for {}", command, self.user_id);
        match command {
            Command::Clear => match self.memory.clear_user_memory(&self.user_id).await {
                Ok(message) => Reply::Plain(message),
                Err(e) => {
                    error!("[chat] clear failed: {}", e);
                    Reply::Plain(format!("Could not clear memory: {}", e))
                }
            },
            Command::History => Reply::Plain(self.memory.show_full_history(&self.user_id).await),
            Command::Summary => {
                Reply::Plain(self.memory.summarize(&self.user_id, lang_hint).await)
            }
        }
    }

    async fn record_feedback(&mut self, answer: FeedbackAnswer) -> Reply {
        let Some(pending) = self.pending_feedback.take() else {
            return Reply::Nothing;
        };
        if let Err(e) = self
            .feedback
            .save_feedback(&self.user_id, &pending.question, &pending.answer, answer)
            .await
        {
            error!("[chat] failed to save feedback: {}", e);
        }
        Reply::Plain(feedback_thanks(pending.lang).to_string())
    }

    async fn answer_question(&mut self, question: &str) -> Reply {
        let result = self.memory.ask(question, &self.user_id).await;
        let lang = detect_lang(question);

        if wants_feedback(&result.answer) {
            self.pending_feedback = Some(PendingFeedback {
                question: question.to_string(),
                answer: result.answer.clone(),
                lang,
            });
            Reply::Answer {
                text: result.answer,
                feedback_prompt: Some(feedback_prompt(lang)),
            }
        } else {
            self.pending_feedback = None;
            Reply::Answer { text: result.answer, feedback_prompt: None }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_render_like_the_repl() {
        assert_eq!(Reply::Bot("hi".into()).render().unwrap(), "Bot: hi\n");
        assert_eq!(Reply::Report("A\nB".into()).render().unwrap(), "Bot:\nA\nB\n");
        assert_eq!(Reply::Exit.render(), None);
        let answer = Reply::Answer { text: "x".into(), feedback_prompt: Some("Was this helpful? (yes/no)") };
        assert_eq!(answer.render().unwrap(), "Bot: x\n\nWas this helpful? (yes/no)");
    }
}
