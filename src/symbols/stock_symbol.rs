// src/symbols/stock_symbol.rs

use crate::symbols::alias_table::AliasTable;
use crate::symbols::market_suffix::normalize_market_suffix;
use crate::symbols::similarity::weighted_ratio;
use crate::symbols::tokens::{normalize_company_text, raw_words, ticker_like_tokens};
use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

pub const DEFAULT_LIMIT: usize = 3;

/// Minimum weighted-ratio score for an alias to count as a fuzzy hit.
pub const FUZZY_SCORE_CUTOFF: f64 = 80.0;

static BUILTIN_RESOLVER: Lazy<TickerResolver> = Lazy::new(TickerResolver::builtin);

#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub alias: String,
    pub ticker: String,
    pub score: f64,
}

/// Free-text to ticker resolution over a shared, immutable alias table.
#[derive(Debug, Clone)]
pub struct TickerResolver {
    aliases: Arc<AliasTable>,
}

impl Default for TickerResolver {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TickerResolver {
    pub fn new(aliases: Arc<AliasTable>) -> Self {
        Self { aliases }
    }

    pub fn builtin() -> Self {
        Self::new(Arc::new(AliasTable::builtin()))
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Top `limit` aliases scoring at least [`FUZZY_SCORE_CUTOFF`] against the
    /// whole normalized text, best first. Equal scores keep table order.
    pub fn fuzzy_matches(&self, normalized: &str, limit: usize) -> Vec<FuzzyMatch> {
        if normalized.is_empty() || self.aliases.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<FuzzyMatch> = self
            .aliases
            .entries()
            .iter()
            .filter_map(|entry| {
                let score = weighted_ratio(normalized, &entry.alias);
                (score >= FUZZY_SCORE_CUTOFF).then(|| FuzzyMatch {
                    alias: entry.alias.clone(),
                    ticker: entry.ticker.clone(),
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(limit);
        scored
    }

    /// Tickers of aliases that appear verbatim as a word, either among the
    /// normalized tokens or among the raw words (`h&m` only survives there).
    pub fn exact_matches(&self, normalized: &str, raw_text: &str) -> Vec<String> {
        normalized
            .split_whitespace()
            .map(str::to_string)
            .chain(raw_words(raw_text))
            .filter_map(|word| self.aliases.ticker_for(&word).map(str::to_string))
            .collect()
    }

    /// Candidates backed by the alias table only (fuzzy, then exact), suffix
    /// normalized and deduplicated. Ticker-shaped words are not included.
    pub fn alias_tickers(&self, text: &str, limit: usize) -> Vec<String> {
        let normalized = normalize_company_text(text);
        let mut found = OrderedSet::default();
        self.collect_alias_candidates(&normalized, text, limit.max(1), &mut found);
        found.into_vec()
    }

    /// Resolves up to `limit` unique tickers from free text. Alias-backed hits
    /// come first, then ticker-shaped words; first occurrence wins. Never fails:
    /// garbage in gives an empty list.
    pub fn resolve(&self, text: &str, limit: usize) -> Vec<String> {
        let limit = limit.max(1);
        let normalized = normalize_company_text(text);

        let mut found = OrderedSet::default();
        self.collect_alias_candidates(&normalized, text, limit, &mut found);
        for token in ticker_like_tokens(&normalized) {
            found.insert(normalize_market_suffix(&token));
        }

        let mut tickers = found.into_vec();
        tickers.truncate(limit);
        log::debug!("[resolve] text='{}' -> {:?}", normalized, tickers);
        tickers
    }

    fn collect_alias_candidates(
        &self,
        normalized: &str,
        raw_text: &str,
        limit: usize,
        found: &mut OrderedSet,
    ) {
        for hit in self.fuzzy_matches(normalized, limit) {
            found.insert(normalize_market_suffix(&hit.ticker));
        }
        for ticker in self.exact_matches(normalized, raw_text) {
            found.insert(normalize_market_suffix(&ticker));
        }
    }
}

/// Resolves tickers with the built-in alias table.
pub fn resolve_tickers_from_text(text: &str, limit: usize) -> Vec<String> {
    BUILTIN_RESOLVER.resolve(text, limit)
}

#[derive(Default)]
struct OrderedSet {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl OrderedSet {
    fn insert(&mut self, item: String) {
        if self.seen.insert(item.clone()) {
            self.items.push(item);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}
