//! Logging setup for formulactl
//!
//! Events go to stderr so that stdout carries only command output (plain or
//! JSON). Lines read `12:04:05.123 [DEBUG] formula_core::formula: message`;
//! the target is omitted for events from formulactl itself.

use colored::{Color, Colorize};
use tracing::Level;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
    EnvFilter,
};

/// Bracketed tag and color for a level
fn level_tag(level: Level) -> (&'static str, Color) {
    match level {
        Level::ERROR => ("[ERROR]", Color::Red),
        Level::WARN => ("[WARN]", Color::Yellow),
        Level::INFO => ("[INFO]", Color::Green),
        Level::DEBUG => ("[DEBUG]", Color::Blue),
        Level::TRACE => ("[TRACE]", Color::Magenta),
    }
}

/// Short local-time event format for an interactive tool
struct CliEventFormat;

impl<S, N> FormatEvent<S, N> for CliEventFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let (tag, color) = level_tag(*metadata.level());
        let time = chrono::Local::now().format("%H:%M:%S%.3f");

        if writer.has_ansi_escapes() {
            write!(writer, "{} {} ", time.to_string().dimmed(), tag.color(color))?;
        } else {
            write!(writer, "{} {} ", time, tag)?;
        }

        if !metadata.target().starts_with(env!("CARGO_CRATE_NAME")) {
            write!(writer, "{}: ", metadata.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Directive used when `RUST_LOG` is not set
///
/// `--verbose` forces `debug`; otherwise the configured level applies.
pub fn default_directive(verbose: bool, configured: &str) -> String {
    if verbose {
        "debug".to_string()
    } else {
        configured.to_string()
    }
}

/// Install the global subscriber
///
/// Returns `false` when a subscriber was already installed.
pub fn init(directive: &str, ansi: bool) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_writer(std::io::stderr)
        .event_format(CliEventFormat)
        .try_init()
        .is_ok()
}
