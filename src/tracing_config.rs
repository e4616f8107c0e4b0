//! Tracing subscriber setup for the command-line tool
//!
//! The library only emits events. The binary installs a subscriber that
//! writes to stderr so stdout stays reserved for the tool's own messages.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Output style for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingFormat {
    /// Coloured compact output (default for terminals)
    #[default]
    Console,
    /// Compact output without ANSI colours, for CI logs
    Compact,
}

impl TracingFormat {
    /// Colours only when diagnostics go to a terminal
    #[must_use]
    pub fn for_stream(is_terminal: bool) -> Self {
        if is_terminal {
            Self::Console
        } else {
            Self::Compact
        }
    }
}

/// Tracing configuration builder
#[derive(Debug, Default)]
pub struct TracingConfig {
    /// Verbosity level from repeated `-v` flags
    pub verbosity: u8,
    pub format: TracingFormat,
    /// Explicit filter directive; overrides `verbosity` when set
    pub env_filter: Option<String>,
}

impl TracingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Convert verbosity level to a filter directive
    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Install the global subscriber
    ///
    /// # Errors
    /// - Invalid filter directive
    /// - A global subscriber is already installed
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = match &self.env_filter {
            Some(directive) => EnvFilter::try_new(directive)?,
            None => EnvFilter::try_new(self.verbosity_to_filter())?,
        };

        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(self.format == TracingFormat::Console)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact();

        Registry::default().with(filter).with(fmt_layer).try_init()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_mapping() {
        let levels: Vec<&str> = (0..=4)
            .map(|v| TracingConfig::new().with_verbosity(v).verbosity_to_filter())
            .collect();
        assert_eq!(levels, ["warn", "info", "debug", "trace", "trace"]);
    }

    #[test]
    fn test_format_follows_terminal() {
        assert_eq!(TracingFormat::for_stream(true), TracingFormat::Console);
        assert_eq!(TracingFormat::for_stream(false), TracingFormat::Compact);
    }

    #[test]
    fn test_builder() {
        let config = TracingConfig::new()
            .with_format(TracingFormat::Compact)
            .with_env_filter("bgstrip=debug");
        assert_eq!(config.format, TracingFormat::Compact);
        assert_eq!(config.env_filter.as_deref(), Some("bgstrip=debug"));
    }
}
