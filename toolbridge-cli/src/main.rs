// ABOUTME: Interactive shell for toolbridge - connects a git tool server to a
// ABOUTME: local Ollama model and answers questions in a read-eval loop.

mod model_select;
mod spinner;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::DefaultEditor;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use toolbridge::prelude::*;

use model_select::pick_model;
use spinner::Spinner;

const GREETING: &str = "Welcome to Git assistant, what can I help you with?";

#[derive(Debug, Parser)]
#[command(name = "toolbridge", version, about = "Chat with a local model that can use MCP tools")]
struct Args {
    /// Config file (default: ./.toolbridge.json, then ~/.toolbridge.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chat model to use; prompts with the installed list when unset
    #[arg(short, long)]
    model: Option<String>,

    /// Name of the entry under mcpServers to launch
    #[arg(long)]
    server: Option<String>,

    /// Repository the tools operate on
    #[arg(long)]
    repo: Option<PathBuf>,

    /// Ollama base URL
    #[arg(long)]
    ollama_url: Option<String>,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn apply(&self, config: &mut BridgeConfig) {
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(server) = &self.server {
            config.server = Some(server.clone());
        }
        if let Some(repo) = &self.repo {
            config.repo_path = Some(repo.clone());
        }
        if let Some(url) = &self.ollama_url {
            config.ollama_url = Some(url.clone());
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn is_exit(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "quit" | "exit" | "q")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = BridgeConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    let backend = Arc::new(OllamaClient::new(config.ollama_url()));
    let model = match config.model.clone() {
        Some(model) => model,
        None => {
            let available = backend.list_models().await;
            match pick_model(available, &mut io::stdin().lock(), &mut io::stdout())? {
                Some(model) => model,
                None => return Ok(()),
            }
        }
    };
    info!(%model, url = backend.base_url(), "using chat model");

    let registry = config.registry()?;
    let client = connect(&config)
        .await
        .context("failed to start tool server")?;

    let agent = ConversationAgent::new(model, backend, registry).with_system_prompt(config.system_prompt());
    let result = run_session(client.clone(), agent).await;

    // Runs on every exit path once connected.
    if let Err(e) = client.close().await {
        warn!(error = %e, "failed to close tool server");
    }
    result
}

/// Launch and handshake with the configured tool server.
///
/// A failed handshake still closes whatever was spawned.
async fn connect(config: &BridgeConfig) -> Result<Arc<McpClient>, BridgeError> {
    let mut client = McpClient::new(config.server_config()?);
    if let Err(e) = client.connect().await {
        if let Err(close_err) = client.close().await {
            warn!(error = %close_err, "cleanup after failed connect");
        }
        return Err(e.into());
    }
    Ok(Arc::new(client))
}

async fn run_session(client: Arc<McpClient>, mut agent: ConversationAgent) -> Result<()> {
    let count = agent.registry().merge_mcp(client.clone()).await?;
    println!("Connected to {} ({count} tools)", client.name());

    let mut rl = DefaultEditor::new()?;
    println!("Type 'quit' to exit.");

    loop {
        println!("\n{GREETING}");
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(_) => break,
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            break;
        }
        let _ = rl.add_history_entry(line);

        let reply = {
            let _spinner = Spinner::start("Thinking");
            tokio::select! {
                reply = agent.submit(line) => reply,
                _ = tokio::signal::ctrl_c() => {
                    println!("\nExiting...");
                    break;
                }
            }
        };

        if let Some(text) = reply {
            println!("\nResponse:\n{text}");
        }
    }

    Ok(())
}
