//! Structured logging configuration.
//!
//! Log output is produced with `tracing-subscriber` on stderr, either as JSON
//! objects (one per line) or as pretty text for development:
//!
//! ```json
//! {"timestamp":"2026-01-15T10:30:00.000Z","level":"DEBUG","target":"fedmerge_core::merge::merger","fields":{"message":"merged representations batch","inputs":3,"groups":2}}
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use fedmerge_server::observability::{init_logging, LoggingConfig};
//!
//! init_logging(LoggingConfig::from_settings(&config.logging))?;
//! ```

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer,
};

use crate::config::LoggingSettings;

/// Configuration for structured logging.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// JSON lines (true) or pretty text (false)
    pub json_format: bool,
    /// Level used when RUST_LOG is not set
    pub default_level: Level,
    /// Emit span enter/exit events
    pub include_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json_format: false,
            default_level: Level::INFO,
            include_spans: false,
        }
    }
}

impl LoggingConfig {
    /// Builds the logging configuration from the `logging` config section.
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        Self {
            json_format: settings.json,
            default_level: parse_log_level(&settings.level),
            ..Default::default()
        }
    }

    pub fn with_spans(mut self) -> Self {
        self.include_spans = true;
        self
    }

    fn span_events(&self) -> FmtSpan {
        if self.include_spans {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        }
    }

    /// Formatting layer for this configuration, writing to `writer`.
    fn layer<S, W>(&self, writer: W) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'span> LookupSpan<'span> + 'static,
        W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
    {
        let layer = fmt::layer::<S>()
            .with_writer(writer)
            .with_span_events(self.span_events())
            .with_target(true);

        if self.json_format {
            layer
                .json()
                .with_current_span(true)
                .with_file(false)
                .with_line_number(false)
                .boxed()
        } else {
            layer.pretty().boxed()
        }
    }
}

/// Parses a configured level name, falling back to INFO.
pub fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides the configured level. Fails if a global subscriber
/// is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level.to_string()));

    tracing_subscriber::registry()
        .with(config.layer(std::io::stderr))
        .with(filter)
        .try_init()
}

/// Subscriber that writes every event as JSON to `writer`, for capturing logs in tests.
pub fn create_json_layer<W>(writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let config = LoggingConfig {
        json_format: true,
        default_level: Level::TRACE,
        include_spans: false,
    };
    tracing_subscriber::registry()
        .with(config.layer(writer))
        .with(EnvFilter::new("trace"))
}
