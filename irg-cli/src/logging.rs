use anyhow::{Context, Result};
use chrono::Local;
use std::{
    fs::File,
    io::{self, IsTerminal},
    path::Path,
    sync::Mutex,
};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// One line per event: local timestamp, level, `file:line`, fields.
struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
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
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        if ansi {
            write!(writer, "\x1b[2m")?
        }
        write!(
            writer,
            "{} ",
            Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )?;
        if ansi {
            write!(writer, "\x1b[0m")?
        }

        let (pre, post) = if ansi {
            match *meta.level() {
                Level::ERROR => ("\x1b[1;31m", "\x1b[0m"),
                Level::WARN => ("\x1b[1;33m", "\x1b[0m"),
                Level::INFO => ("\x1b[1;32m", "\x1b[0m"),
                Level::DEBUG => ("\x1b[1;34m", "\x1b[0m"),
                Level::TRACE => ("\x1b[1;35m", "\x1b[0m"),
            }
        } else {
            ("", "")
        };
        write!(writer, "{}{:>5}{} ", pre, meta.level(), post)?;

        if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
            let file = file
                .rsplit_once("src/")
                .or_else(|| file.rsplit_once("src\\"))
                .map_or(file, |(_, rest)| rest);
            if ansi {
                write!(writer, "\x1b[36m{file}:{line}\x1b[0m ")?;
            } else {
                write!(writer, "{file}:{line} ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Directive used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

fn make_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Builds the subscriber without installing it.
///
/// Events go to stderr, colored when it is a terminal, and are also appended
/// to `log_file` when one is given. Stdout is left to the report.
pub fn build_subscriber(
    filter: EnvFilter,
    log_file: Option<&Path>,
) -> Result<impl Subscriber + Send + Sync + 'static> {
    let file_layer = match log_file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .event_format(LocalFmt)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer))
}

/// Initializes logging. Call once at startup.
///
/// - Level: `warn`, or `debug` with `verbose`; `RUST_LOG` overrides both.
/// - File: appended to when `log_file` is set. The directory must exist.
pub fn init_logging(
    verbose: bool,
    log_file: Option<&Path>,
) -> Result<()> {
    build_subscriber(make_filter(verbose), log_file)?
        .try_init()
        .context("failed to install tracing subscriber")
}
