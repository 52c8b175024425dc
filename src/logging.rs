//! Logging configuration for hierarchy-di
//!
//! Every event the crate emits uses the `hierarchy_di` target: registrations
//! and scope creation at `DEBUG`, cache hits and responsibility decisions at
//! `TRACE`.
//!
//! # Features
//!
//! - `logging` - Emit events through `tracing` (default)
//! - `logging-json` - Install a JSON subscriber (recommended for production)
//! - `logging-pretty` - Install a pretty subscriber (recommended for development)
//!
//! Without either subscriber feature the `init*` functions are no-ops and
//! events go to whatever subscriber the application installs.
//!
//! # Example
//!
//! ```rust,ignore
//! use hierarchy_di::logging;
//!
//! // JSON if logging-json, pretty if logging-pretty
//! logging::init();
//!
//! // Honour RUST_LOG, falling back to the builder's level
//! logging::LoggingBuilder::from_env().compact().init();
//!
//! // Only this crate, at TRACE
//! logging::builder()
//!     .trace()
//!     .di_only()
//!     .pretty()
//!     .init();
//! ```

use tracing::Level;

/// Target used by every event this crate emits
pub const TARGET: &str = "hierarchy_di";

/// Logging format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON structured logging (production default)
    #[default]
    Json,
    /// Pretty colorful output (development)
    Pretty,
    /// Compact single-line output
    Compact,
}

/// Builder for logging configuration
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
    use_env: bool,
    with_file: bool,
    with_line_number: bool,
    with_thread_ids: bool,
    with_thread_names: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Json,
            target: None,
            use_env: false,
            with_file: false,
            with_line_number: false,
            with_thread_ids: false,
            with_thread_names: false,
        }
    }
}

impl LoggingBuilder {
    /// Create a new logging builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set log level to TRACE (shows every resolution step)
    pub fn trace(self) -> Self {
        self.with_level(Level::TRACE)
    }

    /// Set log level to DEBUG
    pub fn debug(self) -> Self {
        self.with_level(Level::DEBUG)
    }

    /// Set log level to INFO
    pub fn info(self) -> Self {
        self.with_level(Level::INFO)
    }

    /// Filter to only show logs from a specific target
    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    /// Only show hierarchy-di logs
    pub fn di_only(self) -> Self {
        self.with_target_filter(TARGET)
    }

    /// Create a builder that prefers the `RUST_LOG` environment variable
    /// over the configured level and target
    pub fn from_env() -> Self {
        Self {
            use_env: true,
            ..Self::default()
        }
    }

    /// Include file names in log output
    pub fn with_file(mut self) -> Self {
        self.with_file = true;
        self
    }

    /// Include line numbers in log output
    pub fn with_line_number(mut self) -> Self {
        self.with_line_number = true;
        self
    }

    /// Include thread IDs in log output
    pub fn with_thread_ids(mut self) -> Self {
        self.with_thread_ids = true;
        self
    }

    /// Include thread names in log output
    pub fn with_thread_names(mut self) -> Self {
        self.with_thread_names = true;
        self
    }

    /// Use JSON structured logging format
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    /// Use pretty colorful logging format
    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    /// Use compact single-line logging format
    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// Filter directive derived from level and target, e.g. `hierarchy_di=trace`
    pub fn directive(&self) -> String {
        let level = self.level.to_string().to_lowercase();
        match self.target {
            Some(target) => format!("{target}={level}"),
            None => level,
        }
    }

    /// Initialize the global subscriber with the configured settings.
    ///
    /// Panics if a global subscriber is already installed.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) {
        use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

        let filter = if self.use_env {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directive()))
        } else {
            EnvFilter::new(self.directive())
        };

        let layer = fmt::layer()
            .with_file(self.with_file)
            .with_line_number(self.with_line_number)
            .with_thread_ids(self.with_thread_ids)
            .with_thread_names(self.with_thread_names)
            .with_target(true);

        let layer = match self.format {
            #[cfg(feature = "logging-json")]
            LogFormat::Json => layer.json().boxed(),
            // JSON needs the logging-json feature; pretty is the closest fallback
            #[cfg(not(feature = "logging-json"))]
            LogFormat::Json => layer.pretty().boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Compact => layer.compact().boxed(),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .init();
    }

    /// Initialize (no-op when subscriber features not available)
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) {}
}

/// Create a new logging builder
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Initialize logging with default settings
///
/// Uses JSON format if `logging-json` feature is enabled,
/// otherwise uses pretty format if `logging-pretty` is enabled.
pub fn init() {
    #[cfg(feature = "logging-json")]
    init_json();
    #[cfg(all(feature = "logging-pretty", not(feature = "logging-json")))]
    init_pretty();
}

/// Initialize JSON structured logging at DEBUG
///
/// # Example output
/// ```json
/// {"timestamp":"2024-01-01T00:00:00.000Z","level":"DEBUG","target":"hierarchy_di","fields":{"message":"Creating new root registry","depth":0}}
/// ```
pub fn init_json() {
    builder().json().debug().init();
}

/// Initialize pretty colorful logging at DEBUG
///
/// # Example output
/// ```text
///   2024-01-01T00:00:00.000Z DEBUG hierarchy_di: Registering service, service: "greeting", lifetime: "singleton"
/// ```
pub fn init_pretty() {
    builder().pretty().debug().init();
}

/// Initialize logging for hierarchy-di only (filters other crates)
pub fn init_di_only() {
    builder().di_only().debug().init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = LoggingBuilder::default();
        assert_eq!(builder.level, Level::DEBUG);
        assert_eq!(builder.format, LogFormat::Json);
        assert!(builder.target.is_none());
        assert!(!builder.use_env);
        assert_eq!(builder.directive(), "debug");
    }

    #[test]
    fn test_builder_chain() {
        let builder = LoggingBuilder::from_env()
            .trace()
            .pretty()
            .with_file()
            .with_line_number()
            .di_only();

        assert_eq!(builder.level, Level::TRACE);
        assert_eq!(builder.format, LogFormat::Pretty);
        assert!(builder.with_file);
        assert!(builder.with_line_number);
        assert!(builder.use_env);
        assert_eq!(builder.target, Some("hierarchy_di"));
        assert_eq!(builder.directive(), "hierarchy_di=trace");
    }
}
