//! Tracing setup. The TUI owns the terminal, so interactive runs log to a file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, prelude::*, EnvFilter};

const FILTER_ENV: &str = "LABELDESK_LOG";

pub enum LogSink<'a> {
    File(&'a Path),
    Stderr,
}

fn filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(FILTER_ENV)
        .from_env_lossy()
}

pub fn init(sink: LogSink<'_>) -> Result<()> {
    match sink {
        LogSink::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create log dir {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file))
                .with_filter(filter());
            tracing_subscriber::registry().with(layer).try_init()?;
        }
        LogSink::Stderr => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter());
            tracing_subscriber::registry().with(layer).try_init()?;
        }
    }
    Ok(())
}
