// src/symbols/alias_table.rs

use std::collections::HashMap;

/// Company names and nicknames mapped to Yahoo Finance compatible tickers.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    // US
    ("tesla", "TSLA"),
    ("apple", "AAPL"),
    ("microsoft", "MSFT"),
    ("nvidia", "NVDA"),
    ("google", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("amazon", "AMZN"),
    ("meta", "META"),
    ("facebook", "META"),
    ("netflix", "NFLX"),
    ("oracle", "ORCL"),
    ("adobe", "ADBE"),
    // Stockholm, mostly B shares
    ("volvo", "VOLV-B.ST"),
    ("volvob", "VOLV-B.ST"),
    ("ericsson", "ERIC-B.ST"),
    ("ericson", "ERIC-B.ST"),
    ("eric-b", "ERIC-B.ST"),
    ("astra", "AZN"),
    ("astrazeneca", "AZN"),
    ("h&m", "HM-B.ST"),
    ("hm", "HM-B.ST"),
    ("sandvik", "SAND.ST"),
    ("atlas copco", "ATCO-B.ST"),
    ("atlas", "ATCO-B.ST"),
    ("evolution", "EVO.ST"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub alias: String,
    pub ticker: String,
}

/// Read-only alias lookup. Iteration order is insertion order, which the fuzzy
/// matcher relies on to break score ties.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
    index: HashMap<String, usize>,
}

impl AliasTable {
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN_ALIASES.iter().copied())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table from `(alias, ticker)` pairs. Aliases are lower-cased and
    /// tickers upper-cased; when an alias repeats, the later ticker replaces the
    /// earlier one but keeps the original position.
    pub fn from_pairs<I, A, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, T)>,
        A: AsRef<str>,
        T: AsRef<str>,
    {
        let mut table = Self::default();
        for (alias, ticker) in pairs {
            let alias = alias.as_ref().trim().to_lowercase();
            let ticker = ticker.as_ref().trim().to_uppercase();
            if alias.is_empty() || ticker.is_empty() {
                continue;
            }
            match table.index.get(&alias) {
                Some(&pos) => table.entries[pos].ticker = ticker,
                None => {
                    table.index.insert(alias.clone(), table.entries.len());
                    table.entries.push(AliasEntry { alias, ticker });
                }
            }
        }
        table
    }

    pub fn ticker_for(&self, alias: &str) -> Option<&str> {
        self.index
            .get(alias)
            .map(|&pos| self.entries[pos].ticker.as_str())
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_unique_keys_and_shared_tickers() {
        let table = AliasTable::builtin();
        assert_eq!(table.len(), BUILTIN_ALIASES.len());
        assert_eq!(table.ticker_for("h&m"), Some("HM-B.ST"));
        assert_eq!(table.ticker_for("hm"), Some("HM-B.ST"));
        assert_eq!(table.ticker_for("unknown"), None);
    }

    #[test]
    fn duplicate_alias_keeps_first_position() {
        let table = AliasTable::from_pairs([("Foo", "aaa"), ("bar", "BBB"), ("foo", "ccc")]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[0].alias, "foo");
        assert_eq!(table.entries()[0].ticker, "CCC");
    }
}
