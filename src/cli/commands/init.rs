//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Agn Setup");
    println!();
    println!("Welcome to Agn! Let's make sure everything is configured correctly.\n");

    // Step 1: Check API credentials
    println!("{}", style("Step 1: Checking API credentials").bold().cyan());
    println!();

    let mut missing = Vec::new();

    if std::env::var("OPENAI_API_KEY").is_err() {
        missing.push((
            "OPENAI_API_KEY",
            "export OPENAI_API_KEY='sk-...'",
            "Required for the triage agent. Get a key from https://platform.openai.com/api-keys",
        ));
    }

    if std::env::var("GMAIL_ACCESS_TOKEN").is_err() {
        missing.push((
            "GMAIL_ACCESS_TOKEN",
            "export GMAIL_ACCESS_TOKEN='ya29...'",
            "Required for mailbox access. Obtain an OAuth access token for the Gmail API",
        ));
    }

    if missing.is_empty() {
        Output::success("All required credentials are configured!");
    } else {
        Output::warning("Some credentials are missing:");
        println!();
        for (name, example, hint) in &missing {
            println!("  {} {}", style("x").red(), style(name).bold());
            println!("    {} {}", style("->").dim(), style(hint).dim());
            println!("    {} {}", style("->").dim(), style(example).green());
        }
        println!();

        if !prompt_continue("Continue anyway?")? {
            println!();
            Output::info("Setup cancelled. Configure the credentials and run 'agn init' again.");
            return Ok(());
        }
    }

    if std::env::var("HF_API_TOKEN").is_err() {
        println!();
        Output::info("HF_API_TOKEN is not set. Classification still works, but anonymous inference calls are rate-limited.");
    }

    println!();

    // Step 2: Create directories
    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    let data_dir = settings.data_dir();
    let export_dir = settings.export_dir();

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    if !export_dir.exists() {
        std::fs::create_dir_all(&export_dir)?;
        Output::success(&format!("Created export directory: {}", export_dir.display()));
    } else {
        Output::info(&format!("Export directory exists: {}", export_dir.display()));
    }

    println!();

    // Step 3: Create config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("agn config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("agn doctor").cyan());
    println!("  {} Search your mailbox", style("agn search \"in:inbox\"").cyan());
    println!(
        "  {} Triage a message",
        style("agn agent \"check my last email for phishing\"").cyan()
    );
    println!();
    println!("For more help: {}", style("agn --help").cyan());

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}
