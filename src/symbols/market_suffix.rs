// src/symbols/market_suffix.rs

pub const STOCKHOLM_SUFFIX: &str = ".ST";

/// Bare symbols that users type without the exchange qualifier but that only
/// resolve on Nasdaq Stockholm.
const STOCKHOLM_CANDIDATES: &[&str] = &[
    "VOLV-A", "VOLV-B", "ERIC-A", "ERIC-B", "HM-B", "SAND", "ATCO-A", "ATCO-B", "EVO",
];

/// Upper-cases `ticker` and appends `.ST` to known Stockholm symbols that lack
/// a market suffix. Idempotent.
pub fn normalize_market_suffix(ticker: &str) -> String {
    let upper = ticker.trim().to_uppercase();
    if upper.contains('.') {
        return upper;
    }
    if STOCKHOLM_CANDIDATES.contains(&upper.as_str()) {
        return format!("{}{}", upper, STOCKHOLM_SUFFIX);
    }
    upper
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_stockholm_suffix() {
        assert_eq!(normalize_market_suffix("eric-b"), "ERIC-B.ST");
        assert_eq!(normalize_market_suffix("SAND"), "SAND.ST");
        assert_eq!(normalize_market_suffix("AAPL"), "AAPL");
        assert_eq!(normalize_market_suffix("ERIC-B.ST"), "ERIC-B.ST");
    }

    #[test]
    fn idempotent() {
        for t in ["eric-b", "VOLV-A", "evo", "HM-B.ST", "AAPL", "X", "SAND.ST", ""] {
            let once = normalize_market_suffix(t);
            assert_eq!(normalize_market_suffix(&once), once);
        }
    }
}
