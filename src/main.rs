//! # ServAI CLI (`servai`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `servai serve` | Start the HTTP server |
//! | `servai ask "<question>"` | Answer one question and print the JSON response |
//! | `servai match "<question>"` | Show the closest knowledge-base entry |
//! | `servai context` | Print the knowledge-base context sent to the LLM |
//!
//! `serve` and `ask` need `GROQ_API_KEY`; a `.env` file in the working
//! directory is loaded first.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use servai::assistant::Assistant;
use servai::config::{self, Config};
use servai::knowledge::{self, KnowledgeBase};
use servai::llm::ChatCompletionClient;
use servai::{logging, matcher, prompt, server};

const DEFAULT_CONFIG_PATH: &str = "./config/servai.toml";

/// ServAI: a knowledge-base grounded customer-support assistant.
#[derive(Parser)]
#[command(name = "servai", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/servai.toml` when that file exists, built-in
    /// defaults otherwise.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve,

    /// Answer a single question through the LLM and print the response.
    Ask {
        question: String,
    },

    /// Show the best knowledge-base match for a question (no LLM call).
    Match {
        question: String,
    },

    /// Print the serialized knowledge-base context.
    Context,
}

fn build_assistant(cfg: &Config, kb: Arc<KnowledgeBase>) -> anyhow::Result<Assistant> {
    let api_key = cfg.llm.api_key_from_env()?;
    let client = ChatCompletionClient::new(&cfg.llm, api_key, &kb)?;
    tracing::info!(model = client.model(), "LLM client ready");
    Ok(Assistant::new(kb, Arc::new(client)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    logging::init_tracing("info");

    let cli = Cli::parse();
    let cfg = config::resolve_config(cli.config.as_deref(), Path::new(DEFAULT_CONFIG_PATH))?;
    let kb = Arc::new(knowledge::load_knowledge_base(&cfg.knowledge)?);

    match cli.command {
        Commands::Serve => {
            let assistant = build_assistant(&cfg, kb)?;
            server::run_server(Arc::new(cfg), Arc::new(assistant)).await?;
        }
        Commands::Ask { question } => {
            let assistant = build_assistant(&cfg, kb)?;
            let response = assistant.answer(&question).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Match { question } => {
            let best = matcher::find_best_match(&kb, &question);
            if best.is_match() {
                println!("question: {}", best.question);
                println!("answer:   {}", best.answer);
            } else if !best.answer.is_empty() {
                println!("{}", best.answer);
            } else {
                println!("No match.");
            }
        }
        Commands::Context => {
            println!("{}", prompt::build_context(&kb));
        }
    }

    Ok(())
}
