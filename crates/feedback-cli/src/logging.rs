//! Tracing subscriber setup.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "feedback=info,feedback_core=info,feedback_tui=info";

/// Where log lines go.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    Stderr,
    /// Append to a file; used while the TUI owns the terminal.
    File(&'a Path),
    Discard,
}

impl LogTarget<'_> {
    fn writer(self) -> Result<BoxMakeWriter> {
        Ok(match self {
            Self::Stderr => BoxMakeWriter::new(io::stderr),
            Self::Discard => BoxMakeWriter::new(io::sink),
            Self::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file {}", path.display()))?;
                BoxMakeWriter::new(Mutex::new(file))
            }
        })
    }

    const fn ansi(self) -> bool {
        matches!(self, Self::Stderr)
    }
}

/// Install the global subscriber.
pub fn init(target: LogTarget<'_>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(target.writer()?)
                .with_ansi(target.ansi()),
        )
        .try_init()
        .context("Failed to install tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_appends_log_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("feedback.log");

        for round in 0..2 {
            let target = LogTarget::File(&path);
            let subscriber = tracing_subscriber::registry().with(
                tracing_subscriber::fmt::layer()
                    .with_writer(target.writer().unwrap())
                    .with_ansi(target.ansi()),
            );
            tracing::subscriber::with_default(subscriber, || {
                tracing::info!(round, "dashboard refreshed");
            });
        }

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("dashboard refreshed").count(), 2);
        assert!(contents.contains("round=1"));
        assert!(!contents.contains('\u{1b}'));
    }
}
