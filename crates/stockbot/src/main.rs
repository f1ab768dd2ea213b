//! stockbot: Tool-Using Stock/Currency Agent
//!
//! Sends a question to the model, executes the tool invocations it requests
//! (stock price lookup, currency conversion), feeds the results back, and
//! prints the model's final answer.
//!
//! Usage:
//!   stockbot                    - Ask the built-in example question
//!   stockbot --input "<text>"   - Ask a custom question
//!   stockbot --help             - Show help

use sb_core::{
    run_conversation, Config, ModelClient, ModelGateway, RetryPolicy, RunOutcome, ToolRegistry,
    SYSTEM_PROMPT,
};
use sb_tools::register_default_tools;
use tracing_subscriber::EnvFilter;

const DEFAULT_QUESTION: &str = "What is the current stock price of amazon stock in pounds?";

/// Run mode
enum RunMode {
    /// Ask the given question
    Ask(String),
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let input = match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("stockbot {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Ask(input) => input,
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting stockbot");
    tracing::info!("Model: {}", config.llm.model);
    tracing::info!("Input: {}", input);

    let client = ModelClient::new(&config.llm)
        .map_err(|e| anyhow::anyhow!("Failed to create model client: {}", e))?;

    let mut registry = ToolRegistry::new();
    register_default_tools(&mut registry, &config.quotes.base_url);
    tracing::info!(
        "Registered {} tools: {:?}",
        registry.len(),
        registry.tool_names()
    );

    let gateway = ModelGateway::new(client, SYSTEM_PROMPT, registry.definitions())
        .with_retry(RetryPolicy::from(&config.retry));

    match run_conversation(&gateway, &registry, &input, config.agent.max_turns).await? {
        RunOutcome::Answer(answer) => {
            println!("{}", answer);
        }
        RunOutcome::Aborted(reason) => {
            tracing::warn!("Run ended without an answer (stop reason: {})", reason);
        }
    }

    Ok(())
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    let mut args = std::env::args().skip(1);
    let mut input: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--input" | "-i" => input = args.next(),
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Ask(input.unwrap_or_else(|| DEFAULT_QUESTION.to_string()))
}

/// Print help message
fn print_help() {
    println!("stockbot - tool-using stock/currency agent");
    println!();
    println!("Usage:");
    println!("  stockbot                    Ask the built-in example question");
    println!("  stockbot --input \"<text>\"   Ask a custom question");
    println!("  stockbot --help             Show this help message");
    println!("  stockbot --version          Show version");
    println!();
    println!("Environment Variables:");
    println!("  LLM_API_KEY          API key (required)");
    println!("  LLM_MODEL            Model name (default: claude-sonnet-4-20250514)");
    println!("  LLM_BASE_URL         Custom model API endpoint");
    println!("  QUOTE_BASE_URL       Custom quote service endpoint");
    println!();
    println!("Configuration can also be provided via ./stockbot.toml.");
}
