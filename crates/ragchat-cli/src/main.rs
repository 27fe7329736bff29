//! ragchat CLI — entry point.
//!
//! # Commands
//!
//! - `ragchat chat [-s SESSION]` — interactive REPL over the session manager
//! - `ragchat ask -m MESSAGE [-s SESSION]` — single question, single answer
//! - `ragchat sessions` — list known sessions, most recent first
//! - `ragchat status` — show configuration and store reachability

mod helpers;
mod repl;
mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use ragchat_chat::ConversationController;
use ragchat_core::config::{load_config, Config};
use ragchat_store::HttpSessionStore;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// ragchat — terminal client for a RAG question-answering service
#[derive(Parser)]
#[command(name = "ragchat", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.ragchat/config.json)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively, with session browsing and guided buttons
    Chat {
        /// Session to open at start-up
        #[arg(short, long)]
        session: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question
        #[arg(short, long)]
        message: String,

        /// Session to ask in (a new one is opened if omitted)
        #[arg(short, long)]
        session: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// List sessions, most recent first
    Sessions,

    /// Show configuration and store status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.command.wants_logs());

    let config_path = cli.config.as_deref().map(helpers::expand_tilde);
    let config = load_config(config_path.as_deref());

    match cli.command {
        Commands::Chat { session, .. } => {
            let controller = build_controller(&config)?;
            repl::run(controller, session).await
        }
        Commands::Ask {
            message, session, ..
        } => run_ask(&config, message, session).await,
        Commands::Sessions => run_sessions(&config).await,
        Commands::Status => status::run(&config, config_path.as_deref()).await,
    }
}

impl Commands {
    fn wants_logs(&self) -> bool {
        match self {
            Commands::Chat { logs, .. } | Commands::Ask { logs, .. } => *logs,
            Commands::Sessions | Commands::Status => false,
        }
    }
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

async fn run_ask(config: &Config, message: String, session: Option<String>) -> Result<()> {
    let controller = build_controller(config)?;

    if let Some(id) = &session {
        controller
            .select_session(id)
            .await
            .with_context(|| format!("failed to open session {id}"))?;
    }

    info!(session = session.as_deref().unwrap_or("-"), "asking single question");
    helpers::print_thinking();
    let reply = controller.send_message(&message).await;
    helpers::clear_thinking();

    match reply {
        Some(reply) => helpers::print_message(&reply, false),
        None => helpers::print_notice("Nothing to send."),
    }
    if let Some(id) = controller.current_session().await {
        helpers::print_notice(&format!("session: {id}"));
    }

    controller.settle().await;
    Ok(())
}

async fn run_sessions(config: &Config) -> Result<()> {
    let controller = build_controller(config)?;
    controller
        .refresh_directory()
        .await
        .context("failed to load sessions")?;

    helpers::print_sessions(&controller, &controller.sessions().await, None);
    Ok(())
}

/// Build a `ConversationController` over the configured HTTP store.
fn build_controller(config: &Config) -> Result<ConversationController> {
    let store = HttpSessionStore::from_config(&config.store)
        .context("failed to create store client")?;
    info!(store = store.base_url(), locale = config.chat.locale.code(), "store client ready");

    Ok(ConversationController::new(
        Arc::new(store),
        config.chat.locale,
    ))
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("ragchat=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
