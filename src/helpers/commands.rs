// src/helpers/commands.rs

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Summary,
    Clear,
    History,
}

const SUMMARY_PHRASES: &[&str] = &[
    // sv
    "sammanfatta", "summera", "kan du sammanfatta", "kan du summera", "ge en sammanfattning",
    // en
    "summary", "summarize", "give a summary", "show summary",
    // ar
    "لخص", "ملخص", "أعطني ملخص", "الخلاصة",
];

const CLEAR_PHRASES: &[&str] = &[
    "rensa", "radera chatten", "ta bort chatten", "ta bort konversationen", "nollställ",
    "clear", "clear chat", "delete chat", "reset conversation", "remove conversation",
    "امسح", "احذف المحادثة", "حذف المحادثة", "إعادة تعيين",
];

const HISTORY_PHRASES: &[&str] = &[
    "visa historiken", "hela historiken", "visa hela historiken", "visa konversationen",
    "history", "show history", "full history",
    "اعرض السجل", "السجل", "اعرض التاريخ",
];

const STOCK_KEYWORDS_SV: &[&str] = &[
    "pris", "kurs", "aktie", "idag", "igår", "överpris", "överprisad", "rsi", "trend", "52w",
    "52 veckor", "volatilitet", "jämför", "jämförelse",
];

const STOCK_KEYWORDS_EN: &[&str] = &[
    "price", "stock", "today", "yesterday", "overpriced", "rsi", "trend", "52w", "volatility",
    "compare", "comparison",
];

const STOCK_KEYWORDS_AR: &[&str] = &[
    "سعر", "سهم", "اليوم", "أمس", "مبالغ", "مبالغ فيه", "rsi", "اتجاه", "تقلب", "مقارنة", "52",
];

const STOCK_LIST_PREFIXES: &[&str] = &["aktier:", "stocks:"];
const AR_STOCK_LIST_PREFIXES: &[&str] = &["أسهم:", "اسهم:"];

/// Maps slash commands and natural phrases (sv/en/ar) to a chat command.
/// Phrases match as substrings; summary is checked before clear and history.
pub fn detect_command(text: &str) -> Option<Command> {
    let t = text.trim().to_lowercase();
    match t.as_str() {
        "/summary" => return Some(Command::Summary),
        "/clear" => return Some(Command::Clear),
        "/history" => return Some(Command::History),
        _ => {}
    }

    let matches_any = |phrases: &[&str]| phrases.iter().any(|p| t.contains(p));
    if matches_any(SUMMARY_PHRASES) {
        Some(Command::Summary)
    } else if matches_any(CLEAR_PHRASES) {
        Some(Command::Clear)
    } else if matches_any(HISTORY_PHRASES) {
        Some(Command::History)
    } else {
        None
    }
}

/// True when the message mentions a price/trend style keyword in any supported language.
pub fn has_stock_keyword(text: &str) -> bool {
    let low = text.to_lowercase();
    STOCK_KEYWORDS_SV.iter().any(|k| low.contains(k))
        || STOCK_KEYWORDS_EN.iter().any(|k| low.contains(k))
        // arabic keywords are matched against the unlowered text
        || STOCK_KEYWORDS_AR.iter().any(|k| text.contains(k))
}

/// Parses `/stock AAPL MSFT` style input. Returns `None` when the input is not a
/// `/stock` command and `Some(vec![])` when it is one without tickers.
pub fn parse_stock_command(text: &str) -> Option<Vec<String>> {
    let trimmed = text.trim();
    if !trimmed.to_lowercase().starts_with("/stock") {
        return None;
    }
    Some(
        trimmed
            .split_whitespace()
            .skip(1)
            .map(|p| p.trim().to_uppercase())
            .filter(|p| !p.is_empty())
            .collect(),
    )
}

/// Parses `aktier: AAPL, MSFT` / `stocks: ...` / `أسهم: ...` lists.
pub fn parse_stock_list(text: &str) -> Option<Vec<String>> {
    let trimmed = text.trim();
    let low = trimmed.to_lowercase();
    let prefixed = STOCK_LIST_PREFIXES.iter().any(|p| low.starts_with(p))
        || AR_STOCK_LIST_PREFIXES.iter().any(|p| trimmed.starts_with(p));
    if !prefixed {
        return None;
    }

    let tickers_part = trimmed.split_once(':').map(|(_, rest)| rest).unwrap_or("");
    Some(
        tickers_part
            .split_whitespace()
            .map(|t| t.trim().trim_matches(',').to_uppercase())
            .filter(|t| !t.is_empty())
            .collect(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackAnswer {
    Yes,
    No,
}

impl FeedbackAnswer {
    /// Stored form, kept in Swedish for compatibility with existing feedback files.
    pub fn as_stored(self) -> &'static str {
        match self {
            FeedbackAnswer::Yes => "ja",
            FeedbackAnswer::No => "nej",
        }
    }
}

pub fn parse_feedback_answer(text: &str) -> Option<FeedbackAnswer> {
    match text.trim().to_lowercase().as_str() {
        "ja" | "yes" | "y" | "نعم" => Some(FeedbackAnswer::Yes),
        "nej" | "no" | "n" | "لا" => Some(FeedbackAnswer::No),
        _ => None,
    }
}
