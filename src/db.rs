use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::AppConfig;

pub type DbPool = SqlitePool;

/// Shared state handed to every command
pub struct AppState {
  pub db: DbPool,
  pub fetch_limit: u32,
  pub skip_malformed: bool,
}

impl AppState {
  pub fn new(db: DbPool, config: &AppConfig) -> Self {
    Self {
      db,
      fetch_limit: config.fetch_limit,
      skip_malformed: config.skip_malformed,
    }
  }
}

/// Make sure the parent directory of a file-backed SQLite URL exists
fn ensure_parent_dir(database_url: &str) -> Result<(), Box<dyn std::error::Error>> {
  let Some(path) = database_url.strip_prefix("sqlite://") else {
    return Ok(());
  };
  let path = path.split('?').next().unwrap_or(path);

  if let Some(parent) = Path::new(path).parent() {
    if !parent.as_os_str().is_empty() {
      fs::create_dir_all(parent)?;
    }
  }
  Ok(())
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(config: &AppConfig) -> Result<DbPool, Box<dyn std::error::Error>> {
  ensure_parent_dir(&config.database_url)?;

  info!(url = %config.database_url, "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(config.max_connections)
    .connect(&config.database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn memory_config() -> AppConfig {
    AppConfig {
      database_url: "sqlite::memory:".to_string(),
      user_id: None,
      fetch_limit: 10,
      max_connections: 1,
      skip_malformed: true,
    }
  }

  #[tokio::test]
  async fn test_initialize_db_runs_migrations() {
    let config = memory_config();
    let pool = initialize_db(&config).await.expect("Should open database");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM strength_sessions")
      .fetch_one(&pool)
      .await
      .expect("Table should exist");
    assert_eq!(count, 0);

    let state = AppState::new(pool, &config);
    assert_eq!(state.fetch_limit, 10);
    assert!(state.skip_malformed);
    state.db.close().await;
  }

  #[test]
  fn test_ensure_parent_dir_ignores_memory_urls() {
    assert!(ensure_parent_dir("sqlite::memory:").is_ok());
  }
}
