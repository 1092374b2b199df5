use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
    Layer,
};

/// Log target for one line per submitted batch.
pub const BATCH_RESULT_TARGET: &str = "batch_result";

/// Installs the console + hourly file logger.
///
/// Batch results always reach both sinks at INFO. Everything else goes to the
/// console at `console_level` and to the file at INFO.
/// The returned guard flushes the file writer and MUST be kept alive.
pub fn setup_logger(log_dir: &str, console_level: Level) -> Option<WorkerGuard> {
    if std::fs::create_dir_all(log_dir).is_err() {
        eprintln!("Could not create log directory '{}', file logging disabled", log_dir);
        return setup_console_only(console_level);
    }

    let file_appender = tracing_appender::rolling::hourly(log_dir, "disperse");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_filter = tracing_subscriber::filter::Targets::new()
        .with_target(BATCH_RESULT_TARGET, Level::INFO)
        .with_default(Level::INFO);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    let console_layer = console_layer(console_level);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .ok();

    Some(guard)
}

fn setup_console_only(console_level: Level) -> Option<WorkerGuard> {
    tracing_subscriber::registry()
        .with(console_layer(console_level))
        .try_init()
        .ok();
    None
}

fn console_layer<S>(console_level: Level) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let console_filter = tracing_subscriber::filter::Targets::new()
        .with_target(BATCH_RESULT_TARGET, Level::INFO)
        .with_default(console_level);

    tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(console_filter)
}

// --- Formatters ---

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

fn event_message(event: &Event<'_>) -> String {
    let mut visitor = MessageVisitor {
        message: String::new(),
    };
    event.record(&mut visitor);
    visitor.message
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
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
        let msg = event_message(event);
        let level = *event.metadata().level();

        let colored_msg = if msg.contains("SUCCESS") {
            let green_text = Style::new().fg(Color::LightGreen).bold();
            msg.replace("SUCCESS", &format!("{}", green_text.paint("SUCCESS")))
        } else if msg.contains("FAILED") {
            let red_text = Style::new().fg(Color::LightRed).bold();
            msg.replace("FAILED", &format!("{}", red_text.paint("FAILED")))
        } else {
            msg
        };

        match level {
            Level::ERROR => write!(writer, "{} ", Color::LightRed.bold().paint("error:"))?,
            Level::WARN => write!(writer, "{} ", Color::Yellow.bold().paint("warn:"))?,
            _ => {}
        }

        write!(writer, "{}", colored_msg)?;
        writeln!(writer)
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
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
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let level = event.metadata().level();
        let target = event.metadata().target();

        write!(writer, "{} [{}] {}: ", timestamp, level, target)?;
        writeln!(writer, "{}", event_message(event))
    }
}
