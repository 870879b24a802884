//! Log output of the amvim binary.
//!
//! The library crates emit `log` records. This module routes them through a
//! `tracing` registry so that `RUST_LOG` and the `[logging]` section of the
//! config both apply.

use std::fs::File;
use std::io;
use std::sync::Mutex;

use amvim_dispatch::config::LoggingConfig;
use anyhow::Result;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default line format, minus lines mentioning a muted pattern.
struct MutingFormat {
    inner: fmt::format::Format,
    muted: Vec<String>,
}

impl MutingFormat {
    fn new(muted: Vec<String>) -> Self {
        Self {
            inner: fmt::format::Format::default(),
            muted,
        }
    }

    fn is_muted(&self, line: &str) -> bool {
        self.muted.iter().any(|pattern| line.contains(pattern.as_str()))
    }
}

impl<S, N> FormatEvent<S, N> for MutingFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut line = String::new();
        self.inner.format_event(ctx, Writer::new(&mut line), event)?;

        if self.is_muted(&line) {
            return Ok(());
        }
        write!(writer, "{line}")
    }
}

/// Where log lines go: the configured file, or stderr when there is none or
/// it cannot be created.
fn log_target(config: &LoggingConfig) -> (BoxMakeWriter, bool) {
    let Some(path) = &config.log_file else {
        return (BoxMakeWriter::new(io::stderr), true);
    };

    match File::create(path) {
        Ok(file) => {
            eprintln!("Logging to {}", path.display());
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        Err(err) => {
            eprintln!("Cannot create log file {}: {err}", path.display());
            (BoxMakeWriter::new(io::stderr), true)
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let (writer, ansi) = log_target(config);

    let layer = fmt::layer()
        .with_ansi(ansi)
        .with_writer(writer)
        .event_format(MutingFormat::new(config.suppressed_patterns.clone()));

    tracing_subscriber::registry().with(filter).with(layer).try_init()?;
    Ok(())
}
