//! CLI command definitions and handlers.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

pub mod commands;

/// Customer feedback desk: submit reviews, browse them as an admin
#[derive(Parser, Debug)]
#[command(name = "feedback")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shorthand for `--format json`
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Backend base URL (default: $FEEDBACK_API_URL or http://localhost:8000)
    #[arg(long, global = true, env = "FEEDBACK_API_URL")]
    pub api_url: Option<String>,

    /// Admin token (default: $FEEDBACK_ADMIN_TOKEN)
    #[arg(long, global = true, env = "FEEDBACK_ADMIN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective output format, with `--json` taking precedence.
    #[must_use]
    pub const fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a review and print the AI response
    Submit {
        /// Star rating, 1 to 5
        #[arg(long)]
        rating: u8,

        /// Review text (10 to 2000 characters)
        #[arg(long)]
        review: String,
    },

    /// List one page of reviews (admin)
    Reviews {
        /// Only reviews with this rating
        #[arg(long)]
        rating: Option<u8>,

        /// Free-text search
        #[arg(long)]
        search: Option<String>,

        /// Page size: 10, 25, 50 or 100
        #[arg(long, default_value_t = feedback_core::filter::DEFAULT_LIMIT)]
        limit: u32,

        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Show submission counts by rating (admin)
    Analytics,

    /// Check that an admin token is accepted
    Login {
        /// Token to verify (default: the global --token)
        token: Option<String>,
    },

    /// Interactive UI: admin dashboard and feedback form
    Ui {
        /// Write logs to this file (the terminal belongs to the UI)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
}
