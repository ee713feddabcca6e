// src/symbols/tokens.rs
use once_cell::sync::Lazy;
use regex::Regex;

static WORDS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-zÅÄÖåäö.\-]+").expect("valid word regex"));

static TICKER_SHAPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{1,5}(?:-[A-Z])?(?:\.[A-Z]{2,4})?$").expect("valid ticker regex")
});

const RAW_WORD_TRIM: &[char] = &[',', '.', '?', '!', ':', ';', '"', '\'', '(', ')'];

/// Lower-cases `text` and keeps only runs of letters (incl. å/ä/ö), hyphens and
/// periods, joined by single spaces. Digits and punctuation act as separators.
pub fn normalize_company_text(text: &str) -> String {
    let lower = text.to_lowercase();
    WORDS_REGEX
        .find_iter(&lower)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when the upper-cased token has the shape of an exchange symbol:
/// 1-5 letters, optional `-X` share class, optional `.XX`-`.XXXX` market suffix.
pub fn looks_like_ticker(token: &str) -> bool {
    TICKER_SHAPE_REGEX.is_match(&token.to_uppercase())
}

/// Upper-cased tokens of already normalized text that look like tickers, in order.
pub fn ticker_like_tokens(normalized: &str) -> Vec<String> {
    normalized
        .split_whitespace()
        .map(str::to_uppercase)
        .filter(|t| TICKER_SHAPE_REGEX.is_match(t))
        .collect()
}

/// Swedish genitive after a symbol name: `h&m:s` -> `h&m`.
fn strip_genitive(word: &str) -> &str {
    word.strip_suffix(":s").filter(|w| !w.is_empty()).unwrap_or(word)
}

/// Whitespace words of the lower-cased raw input with surrounding punctuation
/// stripped. Keeps symbols like `&` that normalization drops.
pub fn raw_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(RAW_WORD_TRIM))
        .map(strip_genitive)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
