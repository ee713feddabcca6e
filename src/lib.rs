// src/lib.rs
pub mod config;
pub mod error;
pub mod types;
pub mod client;
pub mod prompts;
pub mod helpers;
pub mod services;
pub mod symbols;
pub mod tool;
pub mod tools;
pub mod chat;

// Optional re-exports
pub use chat::{ChatApp, Reply};
pub use client::{ChatBackend, LlmClient, OpenAiClient};
pub use config::ChatbotConfig;
pub use error::ChatbotError;
pub use services::yahoo_finance::{PriceSource, YahooFinanceClient};
pub use symbols::{resolve_tickers_from_text, AliasTable, TickerResolver};
