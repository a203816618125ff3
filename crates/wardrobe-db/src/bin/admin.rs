//! wardrobe-admin: operator tool for the wardrobe database.
//!
//! Checks connectivity, applies migrations, seeds the master vocabulary and
//! prints a user's merged option list.

use std::process::ExitCode;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uuid::Uuid;

use wardrobe_db::{
    log_pool_metrics, open_pool, seed_master_data, verify_label_key, AttributeKind,
    AttributeRepository, Database, WardrobeConfig,
};

#[derive(Parser)]
#[command(name = "wardrobe-admin")]
#[command(author, version, about = "Operator tool for the wardrobe attribute database")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check database connectivity and the label key locale
    Ping,

    /// Apply pending migrations, then check the label key locale
    Migrate,

    /// Insert the master colors, materials, occasions and seasons
    Seed,

    /// Print the merged option list for a user as JSON
    Options {
        /// Attribute kind: color, material or occasion
        #[arg(short, long)]
        kind: AttributeKind,

        /// User whose entries are merged with the master list
        #[arg(short, long)]
        user: Uuid,

        /// Include inactive entries
        #[arg(long)]
        all: bool,
    },
}

/// Initialize tracing on stderr (stdout carries command output).
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, daily rotation)
///   RUST_LOG    - standard env filter (default: "wardrobe_db=info,wardrobe_core=info")
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "wardrobe_db=info,wardrobe_core=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let file_dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("wardrobe-admin.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        None
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _file_guard = init_tracing();
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(subsystem = "admin", error = %format!("{e:#}"), "Command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let config = WardrobeConfig::from_env().context("Failed to read configuration")?;
    let pool = open_pool(&config.database_url, &config.pool)
        .await
        .context("Failed to connect to database")?;

    match command {
        Commands::Ping => {
            let now: DateTime<Utc> = sqlx::query_scalar("SELECT now()")
                .fetch_one(&pool)
                .await
                .context("Connectivity check failed")?;
            log_pool_metrics(&pool);
            verify_label_key(&pool)
                .await
                .context("Label key check failed")?;
            info!(subsystem = "admin", op = "ping", server_time = %now, "Database reachable");
            println!("ok {}", now.to_rfc3339());
        }
        Commands::Migrate => {
            wardrobe_db::run_migrations(&pool)
                .await
                .context("Failed to apply migrations")?;
            verify_label_key(&pool)
                .await
                .context("Label key check failed")?;
            println!("migrations applied");
        }
        Commands::Seed => {
            let report = seed_master_data(&pool)
                .await
                .context("Failed to seed master data")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Options { kind, user, all } => {
            let db = Database::from_pool(pool)
                .await
                .context("Failed to load season catalog")?;
            let options = db
                .catalog(kind)
                .options(user, !all)
                .await
                .with_context(|| format!("Failed to load {kind} options"))?;
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
    }
    Ok(())
}
