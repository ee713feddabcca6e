// src/services/yahoo_finance.rs
use crate::error::ChatbotError;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;

pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const YAHOO_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const YAHOO_COOKIE_URL: &str = "https://fc.yahoo.com";
const YAHOO_CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) snm-chatbot/0.1";

#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub timestamp: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
}

/// One year of daily bars plus the quote metadata the provider reports.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceHistory {
    pub ticker: String,
    pub name: String,
    pub currency: String,
    pub bars: Vec<DailyBar>,
    pub last_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub day_open: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
}

impl PriceHistory {
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last_bar(&self) -> Option<&DailyBar> {
        self.bars.last()
    }
}

/// Source of daily price history for a ticker.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn history(&self, ticker: &str) -> Result<PriceHistory, ChatbotError>;
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
    #[serde(default)]
    regular_market_day_high: Option<f64>,
    #[serde(default)]
    regular_market_day_low: Option<f64>,
    #[serde(default)]
    regular_market_volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn at(series: &[Option<f64>], i: usize) -> Option<f64> {
    series.get(i).copied().flatten()
}

/// Turns a chart API payload into a `PriceHistory`. Rows without a close are dropped.
pub fn parse_chart(ticker: &str, body: &str) -> Result<PriceHistory, ChatbotError> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(err) = response.chart.error {
        return Err(ChatbotError::MarketData(format!(
            "{}: {} {}",
            ticker, err.code, err.description
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ChatbotError::MarketData(format!("no chart data for {}", ticker)))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let bars: Vec<DailyBar> = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            Some(DailyBar {
                timestamp: *ts,
                open: at(&quote.open, i),
                high: at(&quote.high, i),
                low: at(&quote.low, i),
                close: at(&quote.close, i)?,
                volume: at(&quote.volume, i),
            })
        })
        .collect();

    if bars.is_empty() {
        return Err(ChatbotError::MarketData(format!("no history for {}", ticker)));
    }

    let meta = result.meta;
    let symbol = meta.symbol.clone().unwrap_or_else(|| ticker.to_uppercase());
    let last = bars.last();

    Ok(PriceHistory {
        ticker: symbol.to_uppercase(),
        name: meta
            .short_name
            .or(meta.long_name)
            .unwrap_or_else(|| symbol.to_uppercase()),
        currency: meta.currency.unwrap_or_else(|| "USD".to_string()),
        last_price: meta.regular_market_price,
        previous_close: meta.previous_close,
        day_open: last.and_then(|b| b.open),
        day_high: meta.regular_market_day_high.or_else(|| last.and_then(|b| b.high)),
        day_low: meta.regular_market_day_low.or_else(|| last.and_then(|b| b.low)),
        volume: meta.regular_market_volume.or_else(|| last.and_then(|b| b.volume)),
        market_cap: None,
        bars,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    quote_summary: SummaryBody,
}

#[derive(Debug, Deserialize)]
struct SummaryBody {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    #[serde(default)]
    summary_detail: Option<SummaryFields>,
    #[serde(default)]
    price: Option<SummaryFields>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryFields {
    #[serde(default)]
    market_cap: Option<RawValue>,
}

/// Yahoo wraps numbers as `{"raw": 123.0, "fmt": "123"}`; empty objects happen.
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

/// Market cap from a quoteSummary payload: `summaryDetail` first, then `price`.
pub fn parse_market_cap(body: &str) -> Result<Option<f64>, ChatbotError> {
    let response: SummaryResponse = serde_json::from_str(body)?;
    let Some(result) = response.quote_summary.result.and_then(|r| r.into_iter().next()) else {
        return Ok(None);
    };
    let field = |fields: Option<SummaryFields>| fields.and_then(|f| f.market_cap).and_then(|m| m.raw);
    Ok(field(result.summary_detail)
        .or_else(|| field(result.price))
        .filter(|cap| *cap > 0.0))
}

#[derive(Debug, Clone)]
struct YahooCrumb {
    cookie: String,
    crumb: String,
}

/// Yahoo Finance chart API client (1y range, daily interval).
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
    crumb: Mutex<Option<YahooCrumb>>,
}

impl YahooFinanceClient {
    pub fn new(timeout: Duration) -> Result<Self, ChatbotError> {
        Self::with_base_url(YAHOO_CHART_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ChatbotError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            crumb: Mutex::new(None),
        })
    }

    /// Cookie + crumb pair quoteSummary insists on; cached until a 401.
    async fn ensure_crumb(&self) -> Result<YahooCrumb, ChatbotError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        let response = self.client.get(YAHOO_COOKIE_URL).send().await?;
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| ChatbotError::MarketData("Yahoo sent no session cookie".into()))?;

        let crumb = self
            .client
            .get(YAHOO_CRUMB_URL)
            .header(header::COOKIE, &cookie)
            .send()
            .await?
            .text()
            .await?;
        if crumb.trim().is_empty() {
            return Err(ChatbotError::MarketData("Yahoo returned an empty crumb".into()));
        }

        let fresh = YahooCrumb { cookie, crumb: crumb.trim().to_string() };
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    async fn fetch_market_cap(&self, ticker: &str) -> Result<Option<f64>, ChatbotError> {
        let crumb = self.ensure_crumb().await?;
        let url = format!(
            "{}/{}?modules=price,summaryDetail&crumb={}",
            YAHOO_SUMMARY_URL,
            urlencoding::encode(ticker),
            urlencoding::encode(&crumb.crumb)
        );

        let response = self
            .client
            .get(&url)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            *self.crumb.lock().await = None;
            return Err(ChatbotError::MarketData(format!("{}: Yahoo crumb expired", ticker)));
        }
        if !status.is_success() {
            return Err(ChatbotError::MarketData(format!("{}: quoteSummary HTTP {}", ticker, status)));
        }
        parse_market_cap(&response.text().await?)
    }

    /// Best effort: a failed lookup only costs the report its market cap line.
    async fn market_cap(&self, ticker: &str) -> Option<f64> {
        match self.fetch_market_cap(ticker).await {
            Ok(cap) => cap,
            Err(e) => {
                warn!("⚠️ market cap unavailable for {}: {}", ticker, e);
                None
            }
        }
    }
}

#[async_trait]
impl PriceSource for YahooFinanceClient {
    async fn history(&self, ticker: &str) -> Result<PriceHistory, ChatbotError> {
        let url = format!(
            "{}/{}?range=1y&interval=1d",
            self.base_url,
            urlencoding::encode(ticker)
        );
        debug!("📈 Fetching chart for {} from {}", ticker, url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Yahoo Finance returned {} for {}", status, ticker);
            // Error payloads share the chart shape; prefer their description.
            return match parse_chart(ticker, &body) {
                Err(e @ ChatbotError::MarketData(_)) => Err(e),
                _ => Err(ChatbotError::MarketData(format!("{}: HTTP {}", ticker, status))),
            };
        }

        let mut history = parse_chart(ticker, &body)?;
        if history.market_cap.is_none() {
            history.market_cap = self.market_cap(&history.ticker).await;
        }
        info!("📈 {} bars for {}", history.bars.len(), history.ticker);
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {
                    "currency": "SEK",
                    "symbol": "VOLV-B.ST",
                    "shortName": "Volvo B",
                    "regularMarketPrice": 251.4,
                    "chartPreviousClose": 180.0,
                    "previousClose": 241.0,
                    "regularMarketDayHigh": 252.0,
                    "regularMarketDayLow": 247.5,
                    "regularMarketVolume": 3100000
                },
                "timestamp": [1700000000, 1700086400, 1700172800],
                "indicators": {
                    "quote": [{
                        "open": [240.0, null, 249.0],
                        "high": [242.0, null, 252.0],
                        "low": [239.0, null, 247.5],
                        "close": [241.0, null, 251.4],
                        "volume": [1000, null, 3100000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_chart_and_skips_null_rows() {
        let history = parse_chart("volv-b.st", SAMPLE).unwrap();
        assert_eq!(history.ticker, "VOLV-B.ST");
        assert_eq!(history.name, "Volvo B");
        assert_eq!(history.currency, "SEK");
        assert_eq!(history.closes(), vec![241.0, 251.4]);
        assert_eq!(history.day_open, Some(249.0));
        assert_eq!(history.previous_close, Some(241.0));
        assert_eq!(history.market_cap, None);
    }

    #[test]
    fn market_cap_comes_from_summary_detail_then_price() {
        let body = r#"{"quoteSummary":{"result":[{
            "summaryDetail":{"marketCap":{"raw":512000000000,"fmt":"512B"}},
            "price":{"marketCap":{"raw":1.0,"fmt":"1"}}
        }],"error":null}}"#;
        assert_eq!(parse_market_cap(body).unwrap(), Some(512_000_000_000.0));

        let price_only = r#"{"quoteSummary":{"result":[{
            "summaryDetail":{"marketCap":{}},
            "price":{"marketCap":{"raw":2800000000000,"fmt":"2.8T"}}
        }],"error":null}}"#;
        assert_eq!(parse_market_cap(price_only).unwrap(), Some(2_800_000_000_000.0));
    }

    #[test]
    fn missing_market_cap_is_none() {
        let empty = r#"{"quoteSummary":{"result":[],"error":null}}"#;
        assert_eq!(parse_market_cap(empty).unwrap(), None);
        let null_result = r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found"}}}"#;
        assert_eq!(parse_market_cap(null_result).unwrap(), None);
        assert!(parse_market_cap("not json").is_err());
    }

    #[test]
    fn chart_error_is_market_data_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        match parse_chart("NOPE", body) {
            Err(ChatbotError::MarketData(msg)) => assert!(msg.contains("delisted")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
