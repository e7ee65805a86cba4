//! Runtime configuration from the environment (and `.env`, loaded by the binary)

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::store::DEFAULT_FETCH_LIMIT;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
  #[error("Invalid value for {var}: {value:?}")]
  InvalidValue { var: &'static str, value: String },

  #[error("Could not determine a data directory; set FITLOG_DATABASE_URL")]
  NoDataDir,

  #[error("No user id; set FITLOG_USER_ID or pass --user")]
  MissingUserId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub database_url: String,
  pub user_id: Option<String>,
  /// Maximum documents fetched per collection
  pub fetch_limit: u32,
  pub max_connections: u32,
  /// Drop unreadable records (with a warning) instead of failing
  pub skip_malformed: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let database_url = match non_empty_var("FITLOG_DATABASE_URL") {
      Some(url) => url,
      None => default_database_url()?,
    };

    Ok(Self {
      database_url,
      user_id: non_empty_var("FITLOG_USER_ID"),
      fetch_limit: parse_var("FITLOG_FETCH_LIMIT", DEFAULT_FETCH_LIMIT)?,
      max_connections: parse_var("FITLOG_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
      skip_malformed: parse_bool_var("FITLOG_SKIP_MALFORMED", false)?,
    })
  }

  /// The user to act for: an explicit override, else the configured one
  pub fn resolve_user(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
    explicit
      .map(str::to_string)
      .or_else(|| self.user_id.clone())
      .ok_or(ConfigError::MissingUserId)
  }
}

/// Data dir file, e.g. ~/.local/share/fitlog/fitlog.db on Linux
fn default_database_path() -> Result<PathBuf, ConfigError> {
  let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
  Ok(data_dir.join("fitlog").join("fitlog.db"))
}

fn default_database_url() -> Result<String, ConfigError> {
  Ok(format!("sqlite://{}?mode=rwc", default_database_path()?.display()))
}

fn non_empty_var(var: &str) -> Option<String> {
  env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
  match non_empty_var(var) {
    None => Ok(default),
    Some(value) => value
      .trim()
      .parse()
      .map_err(|_| ConfigError::InvalidValue { var, value }),
  }
}

fn parse_bool_var(var: &'static str, default: bool) -> Result<bool, ConfigError> {
  match non_empty_var(var) {
    None => Ok(default),
    Some(value) => match value.trim().to_ascii_lowercase().as_str() {
      "true" | "1" | "yes" => Ok(true),
      "false" | "0" | "no" => Ok(false),
      _ => Err(ConfigError::InvalidValue { var, value }),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const VARS: [&str; 5] = [
    "FITLOG_DATABASE_URL",
    "FITLOG_USER_ID",
    "FITLOG_FETCH_LIMIT",
    "FITLOG_MAX_CONNECTIONS",
    "FITLOG_SKIP_MALFORMED",
  ];

  #[test]
  #[serial]
  fn test_defaults() {
    temp_env::with_vars_unset(VARS, || {
      let config = AppConfig::from_env().expect("Defaults should load");
      assert!(config.database_url.starts_with("sqlite://"));
      assert!(config.database_url.ends_with("fitlog.db?mode=rwc"));
      assert_eq!(config.user_id, None);
      assert_eq!(config.fetch_limit, 100);
      assert_eq!(config.max_connections, 5);
      assert!(!config.skip_malformed);
    });
  }

  #[test]
  #[serial]
  fn test_reads_overrides() {
    temp_env::with_vars(
      [
        ("FITLOG_DATABASE_URL", Some("sqlite::memory:")),
        ("FITLOG_USER_ID", Some("alice")),
        ("FITLOG_FETCH_LIMIT", Some("25")),
        ("FITLOG_MAX_CONNECTIONS", Some("2")),
        ("FITLOG_SKIP_MALFORMED", Some("TRUE")),
      ],
      || {
        let config = AppConfig::from_env().expect("Should load");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.user_id.as_deref(), Some("alice"));
        assert_eq!(config.fetch_limit, 25);
        assert_eq!(config.max_connections, 2);
        assert!(config.skip_malformed);
      },
    );
  }

  #[test]
  #[serial]
  fn test_rejects_invalid_values() {
    temp_env::with_var("FITLOG_FETCH_LIMIT", Some("lots"), || {
      assert_eq!(
        AppConfig::from_env(),
        Err(ConfigError::InvalidValue {
          var: "FITLOG_FETCH_LIMIT",
          value: "lots".to_string()
        })
      );
    });

    temp_env::with_var("FITLOG_SKIP_MALFORMED", Some("maybe"), || {
      assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::InvalidValue { var: "FITLOG_SKIP_MALFORMED", .. })
      ));
    });
  }

  #[test]
  #[serial]
  fn test_resolve_user() {
    temp_env::with_vars_unset(VARS, || {
      let mut config = AppConfig::from_env().expect("Defaults should load");
      assert_eq!(config.resolve_user(None), Err(ConfigError::MissingUserId));

      config.user_id = Some("alice".to_string());
      assert_eq!(config.resolve_user(None), Ok("alice".to_string()));
      assert_eq!(config.resolve_user(Some("bob")), Ok("bob".to_string()));
    });
  }
}
