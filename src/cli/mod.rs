use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::application::{
    CompositionReport, Dispatcher, Inbound, LedgerService, Renderer, Reply, ReplyMode,
};
use crate::domain::{EntryKind, Vocabulary, format_cents};
use crate::storage::DEFAULT_DATA_FILE;

/// Subledger - recurring expense and income tracker
#[derive(Parser)]
#[command(name = "subledger")]
#[command(about = "Track monthly subscriptions and income streams from chat-style messages")]
#[command(version)]
pub struct Cli {
    /// Ledger file path
    #[arg(short, long, env = "SUBLEDGER_DATA", default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// JSON file overriding income prefixes and period aliases
    #[arg(long, env = "SUBLEDGER_VOCABULARY")]
    pub vocabulary: Option<PathBuf>,

    /// Currency symbol shown in replies
    #[arg(long, default_value = "₽")]
    pub currency: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive session: each stdin line is a message, "!data" presses a button
    Chat {
        /// User identifier
        #[arg(short, long)]
        user: String,
    },

    /// Send a single message (e.g. "Netflix 699", "+Salary 80000", "/total")
    Send {
        /// User identifier
        #[arg(short, long)]
        user: String,

        /// Message text
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        message: Vec<String>,
    },

    /// Press a button by its callback data (e.g. "del:expense:0", "refresh")
    Press {
        /// User identifier
        #[arg(short, long)]
        user: String,

        /// Callback data
        data: String,
    },

    /// Show how each entry contributes to the monthly totals
    Report {
        /// User identifier
        #[arg(short, long)]
        user: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export all ledgers to CSV or JSON
    Export {
        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the default vocabulary as JSON
    Vocabulary,
}

impl Cli {
    /// Install the log subscriber. Logs go to stderr so replies on stdout stay clean.
    pub fn init_tracing(&self) {
        let default_level = if self.verbose { "debug" } else { "info" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("subledger={}", default_level)));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    fn load_vocabulary(&self) -> Result<Vocabulary> {
        match &self.vocabulary {
            Some(path) => Vocabulary::from_json_file(path),
            None => Ok(Vocabulary::default()),
        }
    }

    async fn open_service(&self) -> Result<LedgerService> {
        let vocabulary = self.load_vocabulary()?;
        LedgerService::open(&self.data, vocabulary)
            .await
            .with_context(|| format!("Failed to open ledger: {}", self.data.display()))
    }

    pub async fn run(self) -> Result<()> {
        if let Commands::Vocabulary = self.command {
            println!("{}", serde_json::to_string_pretty(&Vocabulary::default())?);
            return Ok(());
        }

        let service = self.open_service().await?;
        let renderer = Renderer::new(self.currency.clone());

        match self.command {
            Commands::Chat { user } => {
                let dispatcher = Dispatcher::new(&service, renderer);
                run_chat(&dispatcher, &user).await?;
            }

            Commands::Send { user, message } => {
                let dispatcher = Dispatcher::new(&service, renderer);
                let reply = dispatcher
                    .handle(&user, Inbound::Message(message.join(" ")))
                    .await;
                print_reply(&reply);
            }

            Commands::Press { user, data } => {
                let dispatcher = Dispatcher::new(&service, renderer);
                let reply = dispatcher.handle(&user, Inbound::Callback(data)).await;
                print_reply(&reply);
            }

            Commands::Report { user, format } => {
                run_report_command(&service, &renderer, &user, &format).await?;
            }

            Commands::Export { format, output } => {
                run_export_command(&service, &format, output.as_deref()).await?;
            }

            Commands::Vocabulary => unreachable!("handled before opening the ledger"),
        }

        Ok(())
    }
}

async fn run_chat(dispatcher: &Dispatcher<'_>, user: &str) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let inbound = match line.strip_prefix('!') {
            Some(data) => Inbound::Callback(data.trim().to_string()),
            None => Inbound::Message(line.to_string()),
        };

        let reply = dispatcher.handle(user, inbound).await;
        print_reply(&reply);
        println!();
    }

    Ok(())
}

fn print_reply(reply: &Reply) {
    if reply.mode == ReplyMode::Edit {
        println!("[updated]");
    }
    println!("{}", reply.text);
    for button in &reply.buttons {
        println!("  [{}] !{}", button.label, button.data);
    }
}

async fn run_report_command(
    service: &LedgerService,
    renderer: &Renderer,
    user: &str,
    format: &str,
) -> Result<()> {
    let report = CompositionReport::build(&service.ledger(user).await);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "table" => {
            println!("{:<10} {:<30} {:>15} {:>8}", "KIND", "NAME", "MONTHLY", "SHARE");
            println!("{}", "-".repeat(66));
            for kind in EntryKind::ALL {
                for slice in report.slices(kind) {
                    println!(
                        "{:<10} {:<30} {:>15} {:>7.1}%",
                        kind.as_str(),
                        slice.name,
                        format_cents(slice.amount),
                        slice.percentage
                    );
                }
            }
            println!("{}", "-".repeat(66));
            println!("{}", renderer.summary(&report.totals));
        }
        _ => {
            anyhow::bail!("Invalid format '{}'. Valid formats: table, json", format);
        }
    }

    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    format: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match format {
        "csv" => {
            let count = exporter.export_entries_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} entries", count);
            }
        }
        "json" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} users", snapshot.users.len());
            }
        }
        _ => {
            anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format);
        }
    }

    Ok(())
}
