//! feedback - customer feedback desk client

mod cli;
mod logging;
mod output;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use feedback_core::{AdminToken, ApiClient, Config, FeedbackApi, Session};

use crate::cli::commands::{run_analytics, run_login, run_reviews, run_submit};
use crate::cli::{Cli, Commands};
use crate::logging::LogTarget;
use crate::output::Formatter;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_target = match &cli.command {
        Commands::Ui { log_file } => log_file.as_deref().map_or(LogTarget::Discard, LogTarget::File),
        _ => LogTarget::Stderr,
    };
    logging::init(log_target)?;

    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url);
    }
    if let Some(token) = &cli.token {
        config = config.with_admin_token(token);
    }

    let formatter = Formatter::new(cli.output_format());
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    match cli.command {
        Commands::Ui { .. } => feedback_tui::run(&config, runtime.handle().clone()),
        command => runtime.block_on(run_command(command, &config, &formatter)),
    }
}

async fn run_command(command: Commands, config: &Config, formatter: &Formatter) -> Result<()> {
    let session = Arc::new(Session::new(
        config.admin_token.as_deref().and_then(AdminToken::parse),
    ));
    let client = ApiClient::new(config, Arc::clone(&session)).context("Failed to build HTTP client")?;
    let api: &dyn FeedbackApi = &client;

    match command {
        Commands::Submit { rating, review } => run_submit(api, rating, review, formatter).await,

        Commands::Reviews {
            rating,
            search,
            limit,
            page,
        } => {
            require_token(&session)?;
            run_reviews(api, rating, search, limit, page, formatter).await
        }

        Commands::Analytics => {
            require_token(&session)?;
            run_analytics(api, formatter).await
        }

        Commands::Login { token } => {
            let token = token.or_else(|| config.admin_token.clone()).unwrap_or_default();
            run_login(api, &token, formatter).await
        }

        Commands::Ui { .. } => bail!("The interactive UI cannot run inside the async runtime"),
    }
}

fn require_token(session: &Session) -> Result<()> {
    if !session.is_authenticated() {
        bail!("An admin token is required: pass --token or set FEEDBACK_ADMIN_TOKEN");
    }
    Ok(())
}
