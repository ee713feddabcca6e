// src/services/mod.rs
pub mod feedback;
pub mod json_store;
pub mod memory;
pub mod profile;
pub mod yahoo_finance;

pub use feedback::FeedbackStore;
pub use json_store::JsonStore;
pub use memory::{ChatAnswer, ConversationMemory};
pub use profile::ProfileStore;
pub use yahoo_finance::{PriceHistory, PriceSource, YahooFinanceClient};
