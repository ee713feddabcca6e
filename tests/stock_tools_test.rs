// tests/stock_tools_test.rs
mod common;

use common::{rising_history, StaticPrices};
use serde_json::json;
use snm_chatbot::symbols::TickerResolver;
use snm_chatbot::tool::ToolResolver;
use snm_chatbot::tools::stock::{StockReporter, NO_COMPANIES_HINT};

fn reporter() -> StockReporter {
    let prices = StaticPrices::with(vec![
        rising_history("TSLA", "Tesla, Inc.", 250.0),
        rising_history("ERIC-B.ST", "Telefonaktiebolaget LM Ericsson", 60.0),
    ]);
    StockReporter::new(prices, TickerResolver::builtin())
}

#[tokio::test]
async fn test_report_continues_past_failing_ticker() {
    let report = reporter()
        .get_stock_report(&["BROKEN".to_string(), "TSLA".to_string()])
        .await;
    let broken = report.find("BROKEN: could not fetch data").expect("failure line");
    let tesla = report.find("Tesla, Inc. (TSLA)").expect("tesla block");
    assert!(broken < tesla);
    assert!(report.contains("Insights for TSLA"));
}

#[tokio::test]
async fn test_freeform_without_companies_gives_hint() {
    assert_eq!(reporter().get_freeform_stock_report("???").await, NO_COMPANIES_HINT);
}

#[tokio::test]
async fn test_freeform_tool_resolves_text() {
    let tools = ToolResolver::new(reporter());
    assert_eq!(tools.list_tools().len(), 2);

    let tool = tools.resolve("get_freeform_stock_report").expect("tool exists");
    let result = tool
        .execute(json!({"query": "ERIC-B"}))
        .await
        .expect("Tool should succeed");

    assert_eq!(result.is_error, Some(false));
    assert!(result.text().contains("(ERIC-B.ST)"));
    assert_eq!(result.raw_value.unwrap()["tickers"], json!(["ERIC-B.ST"]));
}

#[tokio::test]
async fn test_report_tool_requires_tickers() {
    let tools = ToolResolver::new(reporter());
    let tool = tools.resolve("get_stock_report").expect("tool exists");

    assert!(tool.execute(json!({})).await.is_err());

    let result = tool.execute(json!({"tickers": ["tsla", "zzz"]})).await.unwrap();
    assert!(result.text().contains("Insights for TSLA"));
    assert_eq!(result.raw_value.unwrap()["failed"], json!(["ZZZ"]));
    assert!(tools.resolve("scrape_website").is_none());
}

#[tokio::test]
async fn test_report_shows_market_cap_when_known() {
    let mut tesla = rising_history("TSLA", "Tesla, Inc.", 250.0);
    tesla.market_cap = Some(2.5e12);
    let reporter = StockReporter::new(StaticPrices::with(vec![tesla]), TickerResolver::builtin());

    let report = reporter.get_stock_report(&["TSLA".to_string()]).await;
    assert!(report.contains("Market Cap: 2.50T"), "{}", report);
}
