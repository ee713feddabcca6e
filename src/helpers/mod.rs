// src/helpers/mod.rs
pub mod commands;
pub mod indicators;
pub mod language;

pub use commands::{detect_command, Command, FeedbackAnswer};
pub use language::{detect_lang, detect_lang_or, Language};
