//! Tracing subscriber setup for the `fitlog` binary
//!
//! Library code only emits events; the binary calls `LoggingConfig::init`
//! once at startup. Output goes to stderr so `--json` output stays clean.

use std::env;
use std::io;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
  Json,
  #[default]
  Pretty,
  Compact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
  /// Filter directive used when `RUST_LOG` is unset
  pub level: String,
  pub format: LogFormat,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".into(),
      format: LogFormat::Pretty,
    }
  }
}

impl LoggingConfig {
  /// Read `RUST_LOG` and `LOG_FORMAT` (json, pretty, compact)
  pub fn from_env() -> Self {
    let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());

    let format = match env::var("LOG_FORMAT").as_deref() {
      Ok("json") => LogFormat::Json,
      Ok("compact") => LogFormat::Compact,
      _ => LogFormat::Pretty,
    };

    Self { level, format }
  }

  /// Install the global subscriber
  pub fn init(&self) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_new(&self.level)
      .unwrap_or_else(|_| EnvFilter::new("info"))
      .add_directive(
        "sqlx::query=warn"
          .parse()
          .unwrap_or_else(|_| tracing::Level::WARN.into()),
      );

    let registry = tracing_subscriber::registry().with(env_filter);

    match self.format {
      LogFormat::Json => registry
        .with(fmt::layer().json().with_writer(io::stderr))
        .try_init()?,
      LogFormat::Pretty => registry
        .with(fmt::layer().pretty().with_writer(io::stderr))
        .try_init()?,
      LogFormat::Compact => registry
        .with(fmt::layer().compact().with_writer(io::stderr))
        .try_init()?,
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn test_from_env_defaults() {
    temp_env::with_vars_unset(["RUST_LOG", "LOG_FORMAT"], || {
      let config = LoggingConfig::from_env();
      assert_eq!(config, LoggingConfig::default());
    });
  }

  #[test]
  #[serial]
  fn test_from_env_reads_format_and_level() {
    temp_env::with_vars(
      [("RUST_LOG", Some("debug")), ("LOG_FORMAT", Some("json"))],
      || {
        let config = LoggingConfig::from_env();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
      },
    );

    temp_env::with_var("LOG_FORMAT", Some("yaml"), || {
      assert_eq!(LoggingConfig::from_env().format, LogFormat::Pretty);
    });
  }
}
