// tests/chat_test.rs
mod common;

use common::{app, rising_history, ScriptedBackend, StaticPrices};
use snm_chatbot::chat::{Reply, STOCK_USAGE};
use snm_chatbot::services::feedback::FeedbackStore;
use snm_chatbot::services::json_store::JsonStore;
use snm_chatbot::tools::stock::NO_COMPANIES_HINT;
use snm_chatbot::types::{Role, StoredMessage};

fn long_answer() -> String {
    "Ownership means every value has a single owner. ".repeat(6)
}

#[tokio::test]
async fn test_exit_and_blank_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut chat = app(dir.path(), ScriptedBackend::replying("hi"), StaticPrices::with(vec![]));
    assert_eq!(chat.handle("   ").await, Reply::Nothing);
    assert_eq!(chat.handle(" EXIT ").await, Reply::Exit);
}

#[tokio::test]
async fn test_plain_question_goes_to_model_and_is_stored() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::replying("Why did the crab cross the road?");
    let mut chat = app(dir.path(), backend.clone(), StaticPrices::with(vec![]));

    let reply = chat.handle("tell me a joke").await;
    assert_eq!(
        reply,
        Reply::Answer {
            text: "Why did the crab cross the road?".to_string(),
            feedback_prompt: None,
        }
    );

    let request = backend.last_request();
    assert_eq!(request.model, "gpt-4o-mini");
    assert_eq!(request.messages[0].role, Role::System);
    assert!(request.messages[0].content.contains("Always reply in English."));
    assert_eq!(request.messages.last().unwrap().content, "tell me a joke");

    let history = chat.memory().history("tester").await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[1].content, "Why did the crab cross the road?");
}

#[tokio::test]
async fn test_context_is_global_tail_then_user_tail() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());
    let seed = |tag: &str, n: usize| -> Vec<StoredMessage> {
        (0..n)
            .map(|i| StoredMessage { role: Role::User, content: format!("{}{}", tag, i), ts: String::new() })
            .collect()
    };
    store.save_list(&store.global_memory_path(), &seed("g", 30)).await.unwrap();
    store.save_list(&store.user_memory_path("tester"), &seed("u", 60)).await.unwrap();

    let backend = ScriptedBackend::replying("ok");
    let mut chat = app(dir.path(), backend.clone(), StaticPrices::with(vec![]));
    chat.handle("explain borrowing").await;

    let messages = backend.last_request().messages;
    assert_eq!(messages.len(), 1 + 20 + 50);
    assert_eq!(messages[1].content, "g11");
    assert_eq!(messages[20].content, "explain borrowing");
    assert_eq!(messages[21].content, "u11");
    assert_eq!(messages[70].content, "explain borrowing");

    assert_eq!(chat.memory().history("tester").await.len(), 62);
    let global: Vec<StoredMessage> = store.load_list(&store.global_memory_path()).await;
    assert_eq!(global.len(), 32);
}

#[tokio::test]
async fn test_model_failure_returns_fallback_message() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::failing();
    let mut chat = app(dir.path(), backend.clone(), StaticPrices::with(vec![]));

    match chat.handle("tell me a joke").await {
        Reply::Answer { text, feedback_prompt } => {
            assert!(text.starts_with("Oops, something went wrong"));
            assert!(feedback_prompt.is_none());
        }
        other => panic!("unexpected reply: {:?}", other),
    }
    // primary then backup, one attempt each
    assert_eq!(backend.call_count(), 2);
    assert_eq!(backend.last_request().model, "gpt-4o-mini-2024-08");
}

#[tokio::test]
async fn test_long_answer_asks_for_feedback() {
    let dir = tempfile::tempdir().unwrap();
    let answer = long_answer();
    let mut chat = app(dir.path(), ScriptedBackend::replying(&answer), StaticPrices::with(vec![]));

    let reply = chat.handle("explain ownership in rust please").await;
    assert_eq!(
        reply,
        Reply::Answer { text: answer.clone(), feedback_prompt: Some("Was this helpful? (yes/no)") }
    );
    assert!(chat.has_pending_feedback());

    let thanks = chat.handle("yes").await;
    assert_eq!(thanks, Reply::Plain("Thanks for your feedback! (saved)".to_string()));
    assert!(!chat.has_pending_feedback());

    let records = FeedbackStore::new(JsonStore::new(dir.path())).records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].helpful, "ja");
    assert_eq!(records[0].question, "explain ownership in rust please");
}

#[tokio::test]
async fn test_stock_question_reports_and_skips_model() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::replying("should not be used");
    let prices = StaticPrices::with(vec![rising_history("TSLA", "Tesla, Inc.", 250.0)]);
    let mut chat = app(dir.path(), backend.clone(), prices.clone());

    let Reply::Report(report) = chat.handle("pris på tesla idag").await else {
        panic!("expected a report");
    };
    assert!(report.contains("Tesla, Inc. (TSLA)"), "{}", report);
    assert!(report.contains("Signals: "));
    assert!(report.contains("Insights for TSLA"));
    assert!(report.contains("PRIS: could not fetch data"));
    assert!(report.contains("TESLA: could not fetch data"));
    assert_eq!(*prices.requested.lock().unwrap(), vec!["TSLA", "PRIS", "TESLA"]);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_company_name_without_keyword_is_stock_intent() {
    let dir = tempfile::tempdir().unwrap();
    let prices = StaticPrices::with(vec![]);
    let mut chat = app(dir.path(), ScriptedBackend::replying("no"), prices.clone());

    assert!(matches!(chat.handle("köp volvo").await, Reply::Report(_)));
    assert_eq!(prices.requested.lock().unwrap()[0], "VOLV-B.ST");
}

#[tokio::test]
async fn test_stock_commands() {
    let dir = tempfile::tempdir().unwrap();
    let prices = StaticPrices::with(vec![
        rising_history("AAPL", "Apple Inc.", 190.0),
        rising_history("MSFT", "Microsoft Corporation", 410.0),
    ]);
    let mut chat = app(dir.path(), ScriptedBackend::replying("no"), prices);

    assert_eq!(chat.handle("/stock").await, Reply::Bot(STOCK_USAGE.to_string()));

    let Reply::Report(report) = chat.handle("stocks: AAPL, MSFT").await else {
        panic!("expected a report");
    };
    assert!(report.contains("Apple Inc. (AAPL)"));
    assert!(report.contains("Insights for MSFT"));

    let Reply::Report(report) = chat.handle("/stock aapl nope").await else {
        panic!("expected a report");
    };
    assert!(report.contains("Insights for AAPL"));
    assert!(report.contains("NOPE: could not fetch data"));
}

#[tokio::test]
async fn test_clear_and_history_commands() {
    let dir = tempfile::tempdir().unwrap();
    let mut chat = app(dir.path(), ScriptedBackend::replying("sure"), StaticPrices::with(vec![]));

    chat.handle("tell me a joke").await;
    let Reply::Plain(history) = chat.handle("/history").await else {
        panic!("expected history");
    };
    assert!(history.contains("You: tell me a joke"));
    assert!(history.contains("Bot: sure"));

    assert_eq!(chat.handle("/clear").await, Reply::Plain("User memory cleared!".to_string()));
    assert_eq!(chat.handle("show history").await, Reply::Plain("No history found.".to_string()));
}

#[tokio::test]
async fn test_summary_uses_language_of_request() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::replying("- you asked for a joke");
    let mut chat = app(dir.path(), backend.clone(), StaticPrices::with(vec![]));

    assert_eq!(
        chat.handle("/summary").await,
        Reply::Plain("No history to summarize.".to_string())
    );

    chat.handle("tell me a joke").await;
    let Reply::Plain(summary) = chat.handle("/summary").await else {
        panic!("expected summary");
    };
    assert!(summary.starts_with("--- Conversation Summary ---"));
    assert!(summary.contains("- you asked for a joke"));
    assert_eq!(backend.last_request().temperature, 0.4);
    assert_eq!(backend.last_request().max_tokens, 400);

    let Reply::Plain(summary) = chat.handle("kan du sammanfatta").await else {
        panic!("expected summary");
    };
    assert!(summary.starts_with("--- Sammanfattning av er konversation ---"));
}

#[tokio::test]
async fn test_profile_name_is_remembered() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::replying("Nice to meet you!");
    let mut chat = app(dir.path(), backend.clone(), StaticPrices::with(vec![]));

    chat.handle("my name is Sam").await;
    assert!(backend.last_request().messages[0].content.contains("The user's name is Sam."));

    let again = app(dir.path(), backend, StaticPrices::with(vec![]));
    let greeting = again.greeting().await;
    assert!(greeting.starts_with("Welcome back, Sam!"));
    assert!(greeting.contains("You: my name is Sam"));
}

#[tokio::test]
async fn test_bare_swedish_summary_word_follows_history_language() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());
    let seeded = vec![
        StoredMessage { role: Role::User, content: "Hej, vad är ägarskap i Rust?".to_string(), ts: String::new() },
        StoredMessage { role: Role::Assistant, content: "Varje värde har en ägare.".to_string(), ts: String::new() },
    ];
    store.save_list(&store.user_memory_path("tester"), &seeded).await.unwrap();

    let backend = ScriptedBackend::replying("- ägarskap");
    let mut chat = app(dir.path(), backend.clone(), StaticPrices::with(vec![]));

    let Reply::Plain(summary) = chat.handle("sammanfatta").await else {
        panic!("expected summary");
    };
    assert!(summary.starts_with("--- Sammanfattning av er konversation ---"));
    assert!(!backend.last_request().messages[0].content.starts_with("Summarize"));
}

#[tokio::test]
async fn test_stock_keyword_without_company_gives_hint() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::replying("unused");
    let prices = StaticPrices::with(vec![]);
    let mut chat = app(dir.path(), backend.clone(), prices.clone());

    assert_eq!(chat.handle("överprisad?").await, Reply::Report(NO_COMPANIES_HINT.to_string()));
    assert_eq!(backend.call_count(), 0);
    assert!(prices.requested.lock().unwrap().is_empty());
}
