use std::fmt::{self as stdfmt, Write as _};
use std::path::Path;

use anyhow::Result;
use qb_config::{LogFormat, LoggingConfig};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::{LookupSpan, Registry};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

// ---------------------------------------------------------------------------
// DomainFormat
// ---------------------------------------------------------------------------

/// Plain formatter that prints the `domain` field as a `[domain]` prefix:
///
/// ```text
/// 2026-10-16T09:12:03Z DEBUG [build] join deferred to runtime location=q:3
/// ```
struct DomainFormat {
    timer: SystemTime,
}

impl<S, N> FormatEvent<S, N> for DomainFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> fmt::FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let ansi = writer.has_ansi_escapes();
        let paint = |code: &str, text: &str| {
            if ansi {
                format!("\x1b[{code}m{text}\x1b[0m")
            } else {
                text.to_string()
            }
        };

        let mut ts = String::new();
        if self
            .timer
            .format_time(&mut fmt::format::Writer::new(&mut ts))
            .is_err()
        {
            ts.push_str("<unknown time>");
        }
        let level = *event.metadata().level();
        let color = match level {
            Level::ERROR => "31",
            Level::WARN => "33",
            Level::INFO => "32",
            Level::DEBUG => "34",
            Level::TRACE => "35",
        };
        write!(
            writer,
            "{} {} ",
            paint("2", &ts),
            paint(color, &format!("{level:>5}"))
        )?;

        let mut fields = DomainFields::default();
        event.record(&mut fields);
        if let Some(domain) = &fields.domain {
            write!(writer, "{} ", paint("1;36", &format!("[{domain}]")))?;
        }
        write!(writer, "{}", fields.message)?;
        if !fields.rest.is_empty() {
            write!(writer, " {}", paint("3", &fields.rest))?;
        }
        writeln!(writer)
    }
}

/// Splits `domain` and `message` out of an event's fields.
#[derive(Default)]
struct DomainFields {
    domain: Option<String>,
    message: String,
    rest: String,
}

impl DomainFields {
    fn push(&mut self, name: &str, value: stdfmt::Arguments<'_>) {
        if !self.rest.is_empty() {
            self.rest.push(' ');
        }
        write!(&mut self.rest, "{name}={value}").ok();
    }
}

impl Visit for DomainFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "domain" => self.domain = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            name => self.push(name, format_args!("{value:?}")),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn stdfmt::Debug) {
        match field.name() {
            "domain" => self.domain = Some(format!("{value:?}").trim_matches('"').to_string()),
            "message" => self.message = format!("{value:?}"),
            name => self.push(name, format_args!("{value:?}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

fn output_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .boxed(),
        LogFormat::Plain => fmt::layer()
            .event_format(DomainFormat { timer: SystemTime })
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
    }
}

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG`, when set, replaces the configured filter. The returned guard
/// flushes the file writer on drop and must be held until exit.
pub fn init_tracing(config: &LoggingConfig, base_dir: &Path) -> Result<Option<WorkerGuard>> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let directives = config.filter_directives();
        EnvFilter::try_new(&directives)
            .map_err(|e| anyhow::anyhow!("invalid log filter '{directives}': {e}"))?
    };

    let mut layers: Vec<BoxedLayer> = vec![output_layer(config.format, std::io::stderr, true)];
    let mut guard = None;

    if let Some(file_path) = &config.file {
        let resolved = base_dir.join(file_path);
        let dir = resolved
            .parent()
            .ok_or_else(|| anyhow::anyhow!("log file path has no parent directory"))?;
        let file_name = resolved
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("log file path has no file name"))?;
        std::fs::create_dir_all(dir)?;

        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, file_guard) = tracing_appender::non_blocking(appender);
        layers.push(output_layer(config.format, non_blocking, false));
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}
