// src/tools/stock.rs
use crate::error::ChatbotError;
use crate::helpers::indicators::{
    annualized_volatility, recent_crossover, rolling_extremes, rsi, sma, Crossover,
};
use crate::services::yahoo_finance::{PriceHistory, PriceSource};
use crate::symbols::{TickerResolver, DEFAULT_LIMIT};
use crate::tool::{McpContent, Tool, ToolResult};
use async_trait::async_trait;
use log::{info, warn};
use serde_json::{json, Value};
use std::sync::Arc;

const WEEK52_WINDOW: usize = 252;
const WEEK52_MIN_PERIODS: usize = 60;

pub const NO_COMPANIES_HINT: &str =
    "Found no companies in your question. Try e.g. 'price of tesla today' or 'apple yesterday vs today'.";

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub ticker: String,
    pub name: String,
    pub currency: String,
    pub price: Option<f64>,
    pub prev_close: Option<f64>,
    pub open: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
    pub change_abs: Option<f64>,
    pub change_pct: Option<f64>,
    pub wk52_high: Option<f64>,
    pub wk52_low: Option<f64>,
    pub wk52_from_high_pct: Option<f64>,
    pub wk52_from_low_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub ticker: String,
    pub rsi14: Option<f64>,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub sma_trend: String,
    pub volatility_30d_pct: Option<f64>,
    pub gap_vs_open_pct: Option<f64>,
    pub notes: Vec<String>,
}

fn pct_from(price: Option<f64>, level: Option<f64>) -> Option<f64> {
    match (price, level) {
        (Some(p), Some(l)) if l != 0.0 => Some((p - l) / l * 100.0),
        _ => None,
    }
}

pub fn build_quote(history: &PriceHistory) -> Quote {
    let closes = history.closes();
    let (wk52_high, wk52_low) = match rolling_extremes(&closes, WEEK52_WINDOW, WEEK52_MIN_PERIODS) {
        Some((high, low)) => (Some(high), Some(low)),
        None => (None, None),
    };

    let price = history.last_price.or_else(|| closes.last().copied());
    let prev_close = history
        .previous_close
        .or_else(|| closes.len().checked_sub(2).map(|i| closes[i]));
    let change_abs = match (price, prev_close) {
        (Some(p), Some(prev)) => Some(p - prev),
        _ => None,
    };
    let change_pct = pct_from(price, prev_close);

    Quote {
        ticker: history.ticker.to_uppercase(),
        name: history.name.clone(),
        currency: history.currency.clone(),
        price,
        prev_close,
        open: history.day_open,
        day_high: history.day_high,
        day_low: history.day_low,
        volume: history.volume,
        market_cap: history.market_cap,
        change_abs,
        change_pct,
        wk52_high,
        wk52_low,
        wk52_from_high_pct: pct_from(price, wk52_high),
        wk52_from_low_pct: pct_from(price, wk52_low),
    }
}

pub fn build_insight(history: &PriceHistory) -> Insight {
    let closes = history.closes();
    let rsi14 = rsi(&closes, 14);
    let sma20 = sma(&closes, 20);
    let sma50 = sma(&closes, 50);
    let sma200 = sma(&closes, 200);

    let gap_vs_open_pct = history
        .last_bar()
        .and_then(|bar| pct_from(Some(bar.close), bar.open));

    let mut notes = Vec::new();
    if let Some(value) = rsi14 {
        if value > 70.0 {
            notes.push("RSI>70 (overbought)".to_string());
        } else if value < 30.0 {
            notes.push("RSI<30 (oversold)".to_string());
        }
    }

    let mut sma_trend = "-".to_string();
    if let (Some(s20), Some(s50), Some(s200)) = (sma20, sma50, sma200) {
        sma_trend = if s20 > s50 && s50 > s200 {
            "Strong uptrend (20>50>200)"
        } else if s20 < s50 && s50 < s200 {
            "Downtrend (20<50<200)"
        } else {
            "Mixed trend"
        }
        .to_string();

        match recent_crossover(&closes, 20, 50) {
            Some(Crossover::Golden) => notes.push("Golden cross (20 over 50) recently".to_string()),
            Some(Crossover::Death) => notes.push("Death cross (20 under 50) recently".to_string()),
            None => {}
        }
    }

    Insight {
        ticker: history.ticker.to_uppercase(),
        rsi14,
        sma20,
        sma50,
        sma200,
        sma_trend,
        volatility_30d_pct: annualized_volatility(&closes, 30),
        gap_vs_open_pct,
        notes,
    }
}

/// `1234567.0` -> `1.23M`; missing values render as `-`.
pub fn human_number(value: Option<f64>) -> String {
    let Some(mut n) = value else {
        return "-".to_string();
    };
    if !n.is_finite() {
        return "-".to_string();
    }
    for unit in ["", "K", "M", "B", "T"] {
        if n.abs() < 1000.0 {
            return format!("{:.2}{}", n, unit);
        }
        n /= 1000.0;
    }
    format!("{:.2}P", n)
}

fn fixed(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_else(|| "-".to_string())
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}%", v))
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_quote(q: &Quote) -> String {
    format!(
        "{} ({})\n  Price: {} {}   Change: {:+.2} ({:.2}%)\n  Open: {}   High/Low: {}/{}\n  Volume: {}   Market Cap: {}\n  52w High/Low: {}/{}   From High: {}   From Low: {}",
        q.name,
        q.ticker,
        fixed(q.price, 2),
        q.currency,
        q.change_abs.unwrap_or(0.0),
        q.change_pct.unwrap_or(0.0),
        fixed(q.open, 2),
        fixed(q.day_high, 2),
        fixed(q.day_low, 2),
        human_number(q.volume),
        human_number(q.market_cap),
        fixed(q.wk52_high, 2),
        fixed(q.wk52_low, 2),
        percent(q.wk52_from_high_pct),
        percent(q.wk52_from_low_pct),
    )
}

pub fn format_insight(ins: &Insight) -> String {
    let notes = if ins.notes.is_empty() {
        "-".to_string()
    } else {
        ins.notes.join("; ")
    };
    format!(
        "Insights for {}\n  RSI(14): {}   SMA20/50/200: {} / {} / {}\n  Trend: {}   Volatility (30d, annualized): {}\n  Gap vs Open (today): {}\n  Notes: {}",
        ins.ticker,
        fixed(ins.rsi14, 1),
        fixed(ins.sma20, 2),
        fixed(ins.sma50, 2),
        fixed(ins.sma200, 2),
        ins.sma_trend,
        percent(ins.volatility_30d_pct),
        percent(ins.gap_vs_open_pct),
        notes
    )
}

/// Today's price against the previous close.
pub fn format_quick_compare(q: &Quote) -> String {
    match (q.price, q.prev_close) {
        (Some(price), Some(prev)) => {
            let diff = price - prev;
            let pct = if prev != 0.0 { diff / prev * 100.0 } else { 0.0 };
            format!("Today {:.2} vs yesterday {:.2} ({:+.2}, {:+.2}%)", price, prev, diff, pct)
        }
        _ => "Today vs yesterday: -".to_string(),
    }
}

/// Short human-readable signals from a quote and its insight.
pub fn analyze_signals(q: &Quote, ins: &Insight) -> Vec<String> {
    let mut signals = Vec::new();

    if let Some(value) = ins.rsi14 {
        if value > 70.0 {
            signals.push("OVERBOUGHT (RSI>70)".to_string());
        } else if value < 30.0 {
            signals.push("OVERSOLD (RSI<30)".to_string());
        } else {
            signals.push(format!("RSI neutral ({:.0})", value));
        }
    }

    if let Some(dist) = pct_from(q.price, q.wk52_high) {
        signals.push(format!("{:.1}% from 52w high", dist));
    }
    if let Some(dist) = pct_from(q.price, q.wk52_low) {
        signals.push(format!("{:.1}% above 52w low", dist));
    }

    if ins.sma_trend != "-" {
        signals.push(ins.sma_trend.clone());
    }
    if let Some(vol) = ins.volatility_30d_pct {
        signals.push(format!("Vol 30d: {:.1}% (annualized)", vol));
    }
    if let Some(gap) = ins.gap_vs_open_pct {
        signals.push(format!("Gap vs open: {:+.2}%", gap));
    }

    signals
}

/// Outcome for one ticker; a failure never stops the others.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerReport {
    Success { ticker: String, block: String },
    Failure { ticker: String, reason: String },
}

impl TickerReport {
    pub fn ticker(&self) -> &str {
        match self {
            TickerReport::Success { ticker, .. } | TickerReport::Failure { ticker, .. } => ticker,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TickerReport::Success { .. })
    }

    pub fn render(&self) -> String {
        match self {
            TickerReport::Success { block, .. } => block.clone(),
            TickerReport::Failure { ticker, reason } => {
                format!("{}: could not fetch data ({})", ticker, reason)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStyle {
    /// Quote and insight blocks.
    Basic,
    /// Quote, day-over-day comparison, signals and insight.
    Detailed,
}

pub fn render_block(history: &PriceHistory, style: ReportStyle) -> String {
    let quote = build_quote(history);
    let insight = build_insight(history);
    match style {
        ReportStyle::Basic => format!("{}\n{}", format_quote(&quote), format_insight(&insight)),
        ReportStyle::Detailed => {
            let signals = analyze_signals(&quote, &insight);
            let signals = if signals.is_empty() {
                "-".to_string()
            } else {
                signals.join("; ")
            };
            format!(
                "{}\n  {}\n  Signals: {}\n{}",
                format_quote(&quote),
                format_quick_compare(&quote),
                signals,
                format_insight(&insight)
            )
        }
    }
}

/// Fetches price histories and renders per-ticker reports.
#[derive(Clone)]
pub struct StockReporter {
    source: Arc<dyn PriceSource>,
    resolver: TickerResolver,
}

impl StockReporter {
    pub fn new(source: Arc<dyn PriceSource>, resolver: TickerResolver) -> Self {
        Self { source, resolver }
    }

    pub fn resolver(&self) -> &TickerResolver {
        &self.resolver
    }

    pub async fn render(&self, ticker: &str, style: ReportStyle) -> TickerReport {
        let ticker = ticker.trim().to_uppercase();
        match self.source.history(&ticker).await {
            Ok(history) => TickerReport::Success {
                block: render_block(&history, style),
                ticker,
            },
            Err(e) => {
                warn!("⚠️ [stock] {} failed: {}", ticker, e);
                TickerReport::Failure { reason: e.to_string(), ticker }
            }
        }
    }

    pub async fn reports(&self, tickers: &[String], style: ReportStyle) -> Vec<TickerReport> {
        let mut reports = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            reports.push(self.render(ticker, style).await);
        }
        let ok = reports.iter().filter(|r| r.is_success()).count();
        info!("📈 [stock] {}/{} tickers rendered", ok, reports.len());
        reports
    }

    pub async fn get_stock_report(&self, tickers: &[String]) -> String {
        join_reports(&self.reports(tickers, ReportStyle::Basic).await)
    }

    /// Resolves tickers from free text and renders a detailed report.
    pub async fn get_freeform_stock_report(&self, text: &str) -> String {
        let tickers = self.resolver.resolve(text, DEFAULT_LIMIT);
        if tickers.is_empty() {
            return NO_COMPANIES_HINT.to_string();
        }
        join_reports(&self.reports(&tickers, ReportStyle::Detailed).await)
    }
}

fn join_reports(reports: &[TickerReport]) -> String {
    reports
        .iter()
        .map(TickerReport::render)
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}

fn required_str<'a>(parameters: &'a Value, key: &str) -> Result<&'a str, ChatbotError> {
    parameters
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ChatbotError::ToolError(format!("Missing '{}' parameter", key)))
}

pub struct StockReportTool {
    reporter: StockReporter,
}

impl StockReportTool {
    pub fn new(reporter: StockReporter) -> Self {
        Self { reporter }
    }
}

#[async_trait]
impl Tool for StockReportTool {
    fn name(&self) -> &str {
        "get_stock_report"
    }

    fn description(&self) -> &str {
        "Quote and technical insights (RSI, SMA 20/50/200, volatility) for explicit tickers"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "tickers": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Ticker symbols, e.g. AAPL or VOLV-B.ST"
                }
            },
            "required": ["tickers"]
        })
    }

    async fn execute(&self, parameters: Value) -> Result<ToolResult, ChatbotError> {
        let tickers: Vec<String> = parameters
            .get("tickers")
            .and_then(|v| v.as_array())
            .ok_or_else(|| ChatbotError::ToolError("Missing 'tickers' parameter".into()))?
            .iter()
            .filter_map(|v| v.as_str())
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect();

        if tickers.is_empty() {
            return Ok(ToolResult::error("No tickers given".to_string()));
        }

        let reports = self.reporter.reports(&tickers, ReportStyle::Basic).await;
        let raw = json!({
            "tickers": tickers,
            "failed": reports.iter().filter(|r| !r.is_success()).map(|r| r.ticker()).collect::<Vec<_>>(),
        });
        Ok(ToolResult::success_with_raw(
            vec![McpContent::text(join_reports(&reports))],
            raw,
        ))
    }
}

pub struct FreeformStockTool {
    reporter: StockReporter,
}

impl FreeformStockTool {
    pub fn new(reporter: StockReporter) -> Self {
        Self { reporter }
    }
}

#[async_trait]
impl Tool for FreeformStockTool {
    fn name(&self) -> &str {
        "get_freeform_stock_report"
    }

    fn description(&self) -> &str {
        "Resolve companies mentioned in free text (Swedish or English) and report price, comparison and signals"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Free text such as 'pris på tesla idag' or 'vad kostar H&M och Ericsson'"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, parameters: Value) -> Result<ToolResult, ChatbotError> {
        let query = required_str(&parameters, "query")?;
        let tickers = self.reporter.resolver().resolve(query, DEFAULT_LIMIT);
        let text = self.reporter.get_freeform_stock_report(query).await;
        Ok(ToolResult::success_with_raw(
            vec![McpContent::text(text)],
            json!({ "query": query, "tickers": tickers }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::yahoo_finance::DailyBar;

    fn history_from(ticker: &str, closes: &[f64]) -> PriceHistory {
        PriceHistory {
            ticker: ticker.to_string(),
            name: format!("{} Inc", ticker),
            currency: "USD".to_string(),
            bars: closes
                .iter()
                .enumerate()
                .map(|(i, c)| DailyBar {
                    timestamp: i as i64,
                    open: Some(c - 1.0),
                    high: Some(c + 1.0),
                    low: Some(c - 2.0),
                    close: *c,
                    volume: Some(1_000_000.0),
                })
                .collect(),
            ..PriceHistory::default()
        }
    }

    #[test]
    fn human_number_scales_units() {
        assert_eq!(human_number(None), "-");
        assert_eq!(human_number(Some(999.0)), "999.00");
        assert_eq!(human_number(Some(1_234_567.0)), "1.23M");
        assert_eq!(human_number(Some(2.5e12)), "2.50T");
        assert_eq!(human_number(Some(3.0e15)), "3.00P");
    }

    #[test]
    fn quote_falls_back_to_closes() {
        let closes: Vec<f64> = (1..=100).map(f64::from).collect();
        let quote = build_quote(&history_from("ACME", &closes));
        assert_eq!(quote.price, Some(100.0));
        assert_eq!(quote.prev_close, Some(99.0));
        assert_eq!(quote.change_abs, Some(1.0));
        assert_eq!(quote.wk52_high, Some(100.0));
        assert_eq!(quote.wk52_low, Some(1.0));
        assert_eq!(quote.wk52_from_high_pct, Some(0.0));
    }

    #[test]
    fn short_history_has_no_52w_levels() {
        let quote = build_quote(&history_from("NEW", &[10.0, 11.0, 12.0]));
        assert_eq!(quote.wk52_high, None);
        assert!(format_quote(&quote).contains("52w High/Low: -/-"));
    }

    #[test]
    fn rising_series_is_overbought_uptrend() {
        let closes: Vec<f64> = (1..=250).map(f64::from).collect();
        let history = history_from("UP", &closes);
        let insight = build_insight(&history);
        assert_eq!(insight.rsi14, Some(100.0));
        assert_eq!(insight.sma_trend, "Strong uptrend (20>50>200)");
        assert!(insight.notes.iter().any(|n| n.contains("overbought")));

        let signals = analyze_signals(&build_quote(&history), &insight);
        assert_eq!(signals[0], "OVERBOUGHT (RSI>70)");
        assert!(signals.iter().any(|s| s == "Strong uptrend (20>50>200)"));
    }

    #[test]
    fn quick_compare_formats_signs() {
        let closes = [100.0, 95.0];
        let quote = build_quote(&history_from("DIP", &closes));
        assert_eq!(
            format_quick_compare(&quote),
            "Today 95.00 vs yesterday 100.00 (-5.00, -5.00%)"
        );
    }

    #[test]
    fn failure_renders_reason() {
        let failure = TickerReport::Failure {
            ticker: "XYZ".into(),
            reason: "Market data error: no history for XYZ".into(),
        };
        assert_eq!(
            failure.render(),
            "XYZ: could not fetch data (Market data error: no history for XYZ)"
        );
    }
}
