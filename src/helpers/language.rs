// src/helpers/language.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static ARABIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{0600}-\u{06FF}]").expect("valid arabic range"));

const SV_HINTS: &[&str] = &[
    "hej", "tack", "snälla", "förlåt", "jag", "heter", "hur", "mår", "bra", "då", "nej", "ja",
];

const SV_STOPWORDS: &[&str] = &[
    "och", "att", "det", "som", "en", "ett", "är", "på", "vad", "med", "för", "inte", "kan", "du",
    "vi", "om", "har", "till", "av", "den", "var", "min", "mig", "kostar", "idag", "vill",
];

const EN_STOPWORDS: &[&str] = &[
    "the", "and", "is", "are", "what", "how", "you", "of", "to", "in", "it", "for", "can", "with",
    "this", "that", "do", "does", "my", "me", "please", "today", "about", "tell", "was", "be",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[serde(rename = "sv")]
    Swedish,
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ar")]
    Arabic,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Swedish => "sv",
            Language::English => "en",
            Language::Arabic => "ar",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "sv" => Some(Language::Swedish),
            "en" => Some(Language::English),
            "ar" => Some(Language::Arabic),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Guesses sv/en/ar for a single chat message. Clear script and letter hints
/// win, then a stop-word vote, then greeting prefixes. `None` when nothing fires.
pub fn detect_lang_hint(text: &str) -> Option<Language> {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        return None;
    }

    if ARABIC_REGEX.is_match(&t) {
        return Some(Language::Arabic);
    }
    if t.chars().any(|c| matches!(c, 'å' | 'ä' | 'ö')) {
        return Some(Language::Swedish);
    }

    let words: Vec<&str> = t
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect();

    if words.iter().any(|w| SV_HINTS.contains(w)) {
        return Some(Language::Swedish);
    }

    let sv_votes = words.iter().filter(|w| SV_STOPWORDS.contains(*w)).count();
    let en_votes = words.iter().filter(|w| EN_STOPWORDS.contains(*w)).count();
    if sv_votes > en_votes {
        return Some(Language::Swedish);
    }
    if en_votes > sv_votes {
        return Some(Language::English);
    }

    if ["hej", "tja", "tjena"].iter().any(|p| t.starts_with(p)) {
        return Some(Language::Swedish);
    }
    if ["hello", "hi", "hey"].iter().any(|p| t.starts_with(p)) {
        return Some(Language::English);
    }

    None
}

pub fn detect_lang_or(text: &str, fallback: Language) -> Language {
    detect_lang_hint(text).unwrap_or(fallback)
}

pub fn detect_lang(text: &str) -> Language {
    detect_lang_or(text, Language::English)
}
