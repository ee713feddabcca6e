// src/symbols/mod.rs
pub mod alias_table;
pub mod market_suffix;
pub mod similarity;
pub mod stock_symbol;
pub mod tokens;

pub use alias_table::{AliasEntry, AliasTable};
pub use market_suffix::normalize_market_suffix;
pub use stock_symbol::{resolve_tickers_from_text, FuzzyMatch, TickerResolver, DEFAULT_LIMIT, FUZZY_SCORE_CUTOFF};
pub use tokens::normalize_company_text;
