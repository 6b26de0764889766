//! Agn CLI entry point.

use agn::cli::{commands, Cli, Commands};
use agn::config::Settings;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("agn={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure the data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Agent { task, model } => {
            commands::run_agent(task, model.clone(), settings).await?;
        }

        Commands::Chat { model } => {
            commands::run_chat(model.clone(), settings).await?;
        }

        Commands::Search { query, limit } => {
            commands::run_search(query.clone(), *limit, settings).await?;
        }

        Commands::Show { id } => {
            commands::run_show(id).await?;
        }

        Commands::Send { to, subject, body } => {
            commands::run_send(to, subject, body, false).await?;
        }

        Commands::Draft { to, subject, body } => {
            commands::run_send(to, subject, body, true).await?;
        }

        Commands::Export {
            query,
            limit,
            output_dir,
        } => {
            commands::run_export(query.clone(), *limit, output_dir.clone(), settings).await?;
        }

        Commands::Classify {
            text,
            message_id,
            compare,
        } => {
            commands::run_classify(text.clone(), message_id.clone(), *compare, settings).await?;
        }

        Commands::Translate { text } => {
            commands::run_translate(text, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
