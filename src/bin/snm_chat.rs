// src/bin/snm_chat.rs
use anyhow::{bail, Context, Result};
use clap::Parser;
use dotenv::dotenv;
use snm_chatbot::chat::{ChatApp, Reply};
use snm_chatbot::client::OpenAiClient;
use snm_chatbot::config::ChatbotConfig;
use snm_chatbot::services::json_store::{JsonStore, DEBUG_LOG_FILE};
use snm_chatbot::services::yahoo_finance::YahooFinanceClient;
use std::fs::OpenOptions;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "snm_chat")]
#[command(about = "Terminal chatbot with memory and stock lookups", long_about = None)]
struct Cli {
    /// User id; a random one is generated when omitted
    #[arg(long)]
    user: Option<String>,

    /// Log to the terminal at debug level instead of the debug log file
    #[arg(long)]
    debug: bool,

    /// Overrides USER_DATA_DIR
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn init_logging(data_dir: &Path, debug: bool) -> Result<()> {
    if debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .target(env_logger::Target::Stderr)
            .init();
        return Ok(());
    }

    let log_path = data_dir.join(DEBUG_LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("cannot open {}", log_path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn prompt_api_key(config: ChatbotConfig) -> Result<ChatbotConfig> {
    if config.api_key.is_some() {
        return Ok(config);
    }
    if !std::io::stdin().is_terminal() {
        bail!("OPENAI_API_KEY is not set. Put it in .env or the environment.");
    }

    println!("⚠️  OPENAI_API_KEY is missing from the environment/.env.");
    println!("Paste your OpenAI key (starts with 'sk-' or 'sk-proj-').");
    let entered: String = dialoguer::Password::new()
        .with_prompt("OPENAI_API_KEY")
        .interact()?;
    Ok(config.with_api_key(&entered)?)
}

fn default_user_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("user_{}", &hex[..6])
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let mut config = ChatbotConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    JsonStore::new(config.data_dir.clone()).ensure_dir().await?;
    init_logging(&config.data_dir, cli.debug)?;
    log::info!("🚀 snm_chat starting (data_dir={})", config.data_dir.display());

    let config = prompt_api_key(config)?;
    let backend = Arc::new(OpenAiClient::from_config(&config)?);
    let prices = Arc::new(YahooFinanceClient::new(config.timeout)?);

    let user_id = cli.user.unwrap_or_else(default_user_id);
    let mut app = ChatApp::from_config(&user_id, &config, backend, prices);

    println!("🤖 AI-chatbot started! (UserID: {})", user_id);
    println!("Welcome!");
    println!("Type 'exit' to quit.\n");
    println!("{}\n", app.greeting().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!("\nGoodbye!");
            break;
        };

        let reply = app.handle(&line).await;
        if reply == Reply::Exit {
            break;
        }
        if let Some(text) = reply.render() {
            println!("{}", text);
        }
    }

    log::info!("👋 session for {} ended", user_id);
    println!("Goodbye! 👋");
    Ok(())
}
