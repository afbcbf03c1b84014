//! Tracing subscriber setup for the CLI.
//!
//! Output is JSON in production and pretty-printed elsewhere. Logs default
//! to stderr so that validation output on stdout stays machine-readable;
//! they can also go to a daily-rotated file.
//!
//! Environment variables: `LOG_FORMAT` (`json`|`pretty`), `LOG_OUTPUT`
//! (`stdout`|`stderr`|`file`), `LOG_DIR`, `LOG_ROTATION` (`daily`|`never`),
//! `ENVIRONMENT` or `ENV`, and `RUST_LOG` for filtering.

use anyhow::{Context, Result};
use std::env;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use strum::{Display, EnumString};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const SERVICE_NAME: &str = "bgp-guard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogDestination {
    Stdout,
    Stderr,
    /// Files under `log_dir`
    File,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub destination: LogDestination,
    pub log_dir: PathBuf,
    pub file_prefix: String,
    /// Deployment environment, e.g. "development" or "production"
    pub environment: String,
    /// Roll log files daily; only applies to [`LogDestination::File`]
    pub rotate: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("ENV"))
            .unwrap_or_else(|_| "development".to_string());
        let format = if is_production(&environment) {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };

        Self {
            format,
            destination: LogDestination::Stderr,
            log_dir: PathBuf::from("logs"),
            file_prefix: SERVICE_NAME.to_string(),
            environment,
            rotate: true,
        }
    }
}

fn is_production(environment: &str) -> bool {
    matches!(environment, "production" | "prod")
}

/// Parse an environment variable, ignoring unset or unparseable values.
fn env_value<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(format) = env_value("LOG_FORMAT") {
            config.format = format;
        }
        if let Some(destination) = env_value("LOG_OUTPUT") {
            config.destination = destination;
        }
        if let Ok(dir) = env::var("LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        if let Ok(rotation) = env::var("LOG_ROTATION") {
            config.rotate = !matches!(rotation.to_lowercase().as_str(), "never" | "off");
        }

        config
    }

    fn default_directive(&self) -> String {
        let level = if is_production(&self.environment) {
            "info"
        } else {
            "debug"
        };
        format!("{},hyper=info,reqwest=info", level)
    }

    fn writer(&self) -> Result<(NonBlocking, WorkerGuard)> {
        Ok(match self.destination {
            LogDestination::Stdout => tracing_appender::non_blocking(io::stdout()),
            LogDestination::Stderr => tracing_appender::non_blocking(io::stderr()),
            LogDestination::File => {
                std::fs::create_dir_all(&self.log_dir).with_context(|| {
                    format!("failed to create log directory {:?}", self.log_dir)
                })?;
                let appender = if self.rotate {
                    tracing_appender::rolling::daily(&self.log_dir, &self.file_prefix)
                } else {
                    tracing_appender::rolling::never(&self.log_dir, &self.file_prefix)
                };
                tracing_appender::non_blocking(appender)
            }
        })
    }
}

/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered lines are flushed.
pub fn init_logging(config: LoggingConfig) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));
    let (writer, guard) = config.writer()?;

    let layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_current_span(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(writer)
            .with_ansi(config.destination != LogDestination::File)
            .with_span_events(FmtSpan::CLOSE)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    tracing::info!(
        service = SERVICE_NAME,
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        format = %config.format,
        destination = %config.destination,
        "logging initialized"
    );

    Ok(guard)
}

/// Warn when `$elapsed` exceeds `$budget_ms`, otherwise log at debug.
#[macro_export]
macro_rules! log_slow_operation {
    ($elapsed:expr, $budget_ms:expr, $($arg:tt)*) => {{
        let elapsed_ms = $elapsed.as_millis() as u64;
        if elapsed_ms > $budget_ms {
            tracing::warn!(elapsed_ms, budget_ms = $budget_ms, $($arg)*);
        } else {
            tracing::debug!(elapsed_ms, $($arg)*);
        }
    }};
}

/// Debug-log a cache lookup as `hit` or `miss`.
#[macro_export]
macro_rules! log_cache_operation {
    ($result:ident, $key:expr, $($arg:tt)*) => {
        tracing::debug!(
            cache_key = %$key,
            cache_result = stringify!($result),
            $($arg)*
        )
    };
}
