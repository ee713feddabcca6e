// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use snm_chatbot::client::{ChatBackend, CompletionRequest};
use snm_chatbot::config::ChatbotConfig;
use snm_chatbot::error::ChatbotError;
use snm_chatbot::services::yahoo_finance::{DailyBar, PriceHistory, PriceSource};
use snm_chatbot::ChatApp;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Answers every request with a fixed reply and remembers what it was sent.
pub struct ScriptedBackend {
    reply: String,
    fail: bool,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: String::new(),
            fail: true,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn last_request(&self) -> CompletionRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("backend was called")
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ChatbotError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(ChatbotError::Api("scripted failure".into()));
        }
        Ok(self.reply.clone())
    }
}

/// Serves canned histories; unknown tickers fail like a delisted symbol.
pub struct StaticPrices {
    histories: HashMap<String, PriceHistory>,
    pub requested: Mutex<Vec<String>>,
}

impl StaticPrices {
    pub fn with(histories: Vec<PriceHistory>) -> Arc<Self> {
        Arc::new(Self {
            histories: histories.into_iter().map(|h| (h.ticker.clone(), h)).collect(),
            requested: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl PriceSource for StaticPrices {
    async fn history(&self, ticker: &str) -> Result<PriceHistory, ChatbotError> {
        self.requested.lock().unwrap().push(ticker.to_string());
        self.histories
            .get(ticker)
            .cloned()
            .ok_or_else(|| ChatbotError::MarketData(format!("no history for {}", ticker)))
    }
}

/// 120 rising daily closes ending at `last`.
pub fn rising_history(ticker: &str, name: &str, last: f64) -> PriceHistory {
    let closes: Vec<f64> = (0..120).map(|i| last - 119.0 + i as f64).collect();
    PriceHistory {
        ticker: ticker.to_string(),
        name: name.to_string(),
        currency: "USD".to_string(),
        bars: closes
            .iter()
            .enumerate()
            .map(|(i, c)| DailyBar {
                timestamp: 1_700_000_000 + i as i64 * 86_400,
                open: Some(c - 0.5),
                high: Some(c + 1.0),
                low: Some(c - 1.0),
                close: *c,
                volume: Some(2_500_000.0),
            })
            .collect(),
        ..PriceHistory::default()
    }
}

pub fn test_config(data_dir: &Path) -> ChatbotConfig {
    let mut config = ChatbotConfig::default().with_data_dir(data_dir);
    config.max_retries = 1;
    config
}

pub fn app(
    data_dir: &Path,
    backend: Arc<ScriptedBackend>,
    prices: Arc<StaticPrices>,
) -> ChatApp {
    ChatApp::from_config("tester", &test_config(data_dir), backend, prices)
}
