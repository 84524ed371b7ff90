//! Logger builder implementation

use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::{Config, Format};
use crate::error::{LogError, LogResult};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Guard returned by a successful [`LoggerBuilder::build`].
///
/// The global subscriber stays installed for the rest of the process; the
/// guard records what was installed.
#[derive(Debug)]
#[must_use = "keep the guard to inspect the installed logger"]
pub struct LoggerGuard {
    filter: Option<String>,
    format: Option<Format>,
}

/// Build the fmt layer for a text format, applying the display options.
/// Timestamps change the layer type, hence the two boxed branches.
macro_rules! text_layer {
    ($kind:ident, $display:expr, $filter:expr) => {{
        let layer = tracing_subscriber::fmt::layer()
            .$kind()
            .with_writer(std::io::stderr)
            .with_ansi($display.colors)
            .with_target($display.target)
            .with_file($display.source)
            .with_line_number($display.source)
            .with_thread_ids($display.thread_ids);
        if $display.time {
            layer.with_filter($filter).boxed()
        } else {
            layer.without_time().with_filter($filter).boxed()
        }
    }};
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Build and install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Filter string cannot be parsed
    /// - A global subscriber is already installed
    pub fn build(self) -> LogResult<LoggerGuard> {
        let filter = EnvFilter::try_new(&self.config.level)
            .map_err(|e| LogError::Filter(format!("{}: {}", &self.config.level, e)))?;

        let display = &self.config.display;
        let layer: BoxedLayer = match self.config.format {
            Format::Pretty => text_layer!(pretty, display, filter),
            Format::Compact => text_layer!(compact, display, filter),
            Format::Json => {
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(display.span_list)
                    .flatten_event(display.flatten)
                    .with_target(display.target)
                    .with_file(display.source)
                    .with_line_number(display.source)
                    .with_thread_ids(display.thread_ids);
                if display.time {
                    layer.with_filter(filter).boxed()
                } else {
                    layer.without_time().with_filter(filter).boxed()
                }
            }
        };

        Registry::default()
            .with(layer)
            .try_init()
            .map_err(|e| LogError::AlreadyInitialized(e.to_string()))?;

        tracing::debug!(
            level = %self.config.level,
            format = %self.config.format,
            "Logger initialized"
        );

        Ok(LoggerGuard {
            filter: Some(self.config.level),
            format: Some(self.config.format),
        })
    }
}

impl LoggerGuard {
    /// Guard for a logger that was already in place.
    pub(crate) fn noop() -> Self {
        Self {
            filter: None,
            format: None,
        }
    }

    /// Filter installed by this guard, `None` for a no-op guard.
    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Format installed by this guard, `None` for a no-op guard.
    #[must_use]
    pub fn format(&self) -> Option<Format> {
        self.format
    }
}
