//! campass CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use campass_client::cli::{Cli, Command, ConfigAction, PaymentAction};
use campass_client::config::ClientConfig;
use campass_client::error::{ClientError, ClientResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_env("CAMPASS_LOG")
            .unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string())),
        1 => EnvFilter::new(Level::INFO.to_string()),
        _ => EnvFilter::new(Level::DEBUG.to_string()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Run the command
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    // Load configuration
    let config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };

    // Handle subcommands
    match cli.command {
        Command::Login {
            username,
            password,
            sms,
            phone,
            code,
        } => campass_client::commands::login::run(username, password, sms, phone, code, &config)
            .await,
        Command::Schedule { week, all, export } => {
            campass_client::commands::schedule::run(week, all, export, &config).await
        }
        Command::Exams { semester, export } => {
            campass_client::commands::exams::run(semester, export, &config).await
        }
        Command::Students { query } => {
            campass_client::commands::students::run(&query, &config).await
        }
        Command::Payment { action } => match action {
            PaymentAction::Info => campass_client::commands::payment::info(&config).await,
            PaymentAction::Projects => campass_client::commands::payment::projects(&config).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Dump => campass_client::commands::config::dump(&config),
            ConfigAction::Path => campass_client::commands::config::path(&config),
        },
    }
}
