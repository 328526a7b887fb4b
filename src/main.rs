//! # Ask360 CLI
//!
//! ```text
//! ask360 [--config FILE] ask [QUESTION...] [--json]   one question, or a prompt
//! ask360 [--config FILE] serve [--addr HOST:PORT]     HTTP API + chat page
//! ```
//!
//! Logs go to stderr and follow `RUST_LOG` (default `info`):
//!
//! ```bash
//! RUST_LOG=debug ask360 ask "Show the last 12 months trend"
//! ```

use std::io::{BufRead, Write};
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ask360::{AnswerResponse, Settings};

/// Rows printed before the table is cut short.
const MAX_TABLE_ROWS: usize = 10;

#[derive(Parser, Debug)]
#[command(version, about = "Natural-language questions over yogurt sales data")]
struct Cli {
    /// TOML configuration file (defaults to ./ask360.toml when present).
    #[arg(long, global = true, value_name = "CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer a question, or start an interactive prompt without one.
    Ask {
        /// Print the raw JSON response.
        #[arg(long)]
        json: bool,

        /// The question; words are joined with spaces.
        question: Vec<String>,
    },
    /// Run the HTTP server.
    Serve {
        /// Listen address, overriding the configured one.
        #[arg(long, value_name = "HOST:PORT")]
        addr: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    settings
        .prepare_chart_dir()
        .context("failed to prepare chart directory")?;

    match cli.command {
        Command::Ask { json, question } => {
            ask360::init(&settings);
            if question.is_empty() {
                interactive(json)
            } else {
                print_answer(&ask360::answer(&question.join(" ")), json)
            }
        }
        Command::Serve { addr } => serve(settings, addr).await,
    }
}

async fn serve(settings: Settings, addr: Option<SocketAddr>) -> Result<()> {
    let addr = addr.unwrap_or(settings.bind_addr);

    // dataset generation is CPU work; keep it off the runtime threads
    let init_settings = settings.clone();
    tokio::task::spawn_blocking(move || ask360::init(&init_settings))
        .await
        .context("engine initialization panicked")?;

    let app = ask360::web::create_router(&settings.chart_dir);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Ask360 server running");

    axum::serve(listener, app).await?;
    Ok(())
}

fn interactive(json: bool) -> Result<()> {
    println!("Ask360: ask about yogurt sales (type 'exit' or 'quit' to leave).");
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("Ask360> ");
        std::io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }
        print_answer(&ask360::answer(question), json)?;
        println!();
    }
    Ok(())
}

fn print_answer(response: &AnswerResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    println!("[{}] {}", response.intent.as_str(), response.headline);

    if let Some(kpis) = &response.kpis {
        println!();
        for (label, value) in kpis {
            println!("  {label}: {}", plain(value));
        }
    }

    if let Some(rows) = &response.table {
        if let Some(first) = rows.first() {
            println!();
            let columns: Vec<&String> = first.keys().collect();
            println!(
                "  {}",
                columns.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(" | ")
            );
            for row in rows.iter().take(MAX_TABLE_ROWS) {
                let cells: Vec<String> = columns
                    .iter()
                    .map(|c| row.get(c.as_str()).map(plain).unwrap_or_default())
                    .collect();
                println!("  {}", cells.join(" | "));
            }
            if rows.len() > MAX_TABLE_ROWS {
                println!("  ... {} more rows", rows.len() - MAX_TABLE_ROWS);
            }
        }
    }

    if let Some(chart) = &response.chart {
        println!("\n  Chart: {chart}");
    }

    if let Some(details) = &response.details {
        println!("\n  Sources: {}", details.data_sources.join(", "));
        println!("  Time range: {}", details.time_range);
        println!("  Regions: {}", details.regions.join(", "));
        if !details.filters.is_empty() {
            println!("  Filters: {}", details.filters.join(", "));
        }
    }
    Ok(())
}

fn plain(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
