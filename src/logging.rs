//! Log output for the CLI.
//!
//! All user-facing progress goes through `tracing`. Events are rendered as the
//! bare message followed by a newline, except when the event carries
//! `continued = true`: then the terminator is left off so the next event
//! continues the same line.
//!
//! ```no_run
//! use tracing::info;
//!
//! info!(continued = true, " * Install prebuilt Bun (1.1.0) ");
//! info!(continued = true, ".");
//! info!(" done.");
//! // " * Install prebuilt Bun (1.1.0) . done."
//! ```

use colored::Colorize;
use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;

/// Field marking an event as a line fragment.
pub const CONTINUED: &str = "continued";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    /// `--verbose` wins over `--quiet`.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (_, true) => Self::Verbose,
            (true, false) => Self::Quiet,
            (false, false) => Self::Normal,
        }
    }

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "warn,bunenv=warn",
            Self::Normal => "warn,bunenv=info",
            Self::Verbose => "warn,bunenv=debug",
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity flags.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .event_format(ProgressFormat)
        .init();
}

/// Event formatter printing bare messages with optional line continuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressFormat;

impl<S, N> FormatEvent<S, N> for ProgressFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if writer.has_ansi_escapes() {
            match *event.metadata().level() {
                Level::ERROR => write!(writer, "{}", visitor.message.red())?,
                Level::WARN => write!(writer, "{}", visitor.message.yellow())?,
                _ => write!(writer, "{}", visitor.message)?,
            }
        } else {
            write!(writer, "{}", visitor.message)?;
        }

        if !visitor.continued {
            writeln!(writer)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    continued: bool,
}

impl Visit for MessageVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == CONTINUED {
            self.continued = value;
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

/// In-memory log sink, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CaptureWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buffer).to_string()
    }

    /// Subscriber writing `ProgressFormat` output into this buffer.
    pub fn subscriber(&self) -> impl Subscriber + Send + Sync + 'static {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .event_format(ProgressFormat)
            .finish()
    }
}

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CaptureWriter {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
