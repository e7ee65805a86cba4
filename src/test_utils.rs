//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Document and record factories
//! - A fixed clock
//! - Helper assertions

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::models::{Feeling, Pace, RpeValue, RunDetails, RunRecord, StrengthRecord, StrengthSet};
use crate::store::{format_date, insert_document};

pub const TEST_USER: &str = "test-user";

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Insert documents for a user, returning their ids in order
pub async fn seed_documents(pool: &SqlitePool, user_id: &str, docs: Vec<Value>) -> Vec<String> {
  let mut ids = Vec::new();
  for doc in docs {
    let (_, id) = insert_document(pool, user_id, doc)
      .await
      .expect("Failed to seed document");
    ids.push(id);
  }
  ids
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// The clock every test runs against: 2025-06-15T12:00:00Z
pub fn fixed_now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

/// `days` (fractional allowed) before `now`, to the millisecond
pub fn days_before(now: DateTime<Utc>, days: f64) -> DateTime<Utc> {
  now - Duration::milliseconds((days * 86_400_000.0).round() as i64)
}

/// ---------------------------------------------------------------------------
/// Raw Document Factories
/// ---------------------------------------------------------------------------

/// A run log document as the dashboard writes it
pub fn run_doc(now: DateTime<Utc>, days_ago: f64, distance_km: f64, pace: &str) -> Value {
  json!({
    "date": format_date(days_before(now, days_ago)),
    "distance_km": distance_km,
    "pace_min_per_km": pace,
    "duration": "00:30:00",
    "calories_total": 350,
  })
}

/// A strength session document; `sets` is a JSON array
pub fn strength_doc(now: DateTime<Utc>, days_ago: f64, sets: Value) -> Value {
  json!({
    "date": format_date(days_before(now, days_ago)),
    "category": ["chest"],
    "sets": sets,
    "duration": 45,
  })
}

/// ---------------------------------------------------------------------------
/// Record Factories
/// ---------------------------------------------------------------------------

/// Normalized run with a clock-string pace (or none)
pub fn mock_run(now: DateTime<Utc>, days_ago: f64, distance_km: f64, pace: Option<&str>) -> RunRecord {
  RunRecord {
    id: None,
    date: days_before(now, days_ago),
    distance_km: Some(distance_km),
    pace: pace.map(|p| Pace::Clock(p.to_string())),
    calories_total: None,
    duration_minutes: None,
    feeling: Feeling::Good,
    details: RunDetails::default(),
  }
}

/// Normalized strength session without a logged feeling
pub fn mock_strength(now: DateTime<Utc>, days_ago: f64, sets: Vec<StrengthSet>) -> StrengthRecord {
  StrengthRecord {
    id: None,
    session_id: None,
    date: days_before(now, days_ago),
    category: Vec::new(),
    sets,
    feeling: None,
    total_volume: None,
    duration_minutes: None,
    workout_type: None,
    bodyweight_kg: None,
    notes: None,
  }
}

pub fn mock_set(exercise: &str, reps: u32, weight_kg: f64, rpe: Option<f64>) -> StrengthSet {
  StrengthSet {
    exercise: exercise.to_string(),
    reps,
    weight_kg,
    rpe: rpe.map(RpeValue::Value),
    muscle_group: None,
  }
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {{
    let (left, right): (f64, f64) = ($left, $right);
    let diff = (left - right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      left,
      right,
      diff,
      $tolerance
    );
  }};
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('run_logs', 'strength_sessions')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 2, "Expected 2 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_documents_returns_ids() {
    let pool = setup_test_db().await;
    let now = fixed_now();

    let ids = seed_documents(
      &pool,
      TEST_USER,
      vec![
        run_doc(now, 1.0, 5.0, "5:30"),
        strength_doc(now, 2.0, json!([{"exercise": "Squat", "reps": 5, "weight_kg": 100}])),
      ],
    )
    .await;
    assert_eq!(ids.len(), 2);

    let runs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM run_logs")
      .fetch_one(&pool)
      .await
      .expect("Failed to count runs");
    assert_eq!(runs, 1);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_days_before() {
    let now = fixed_now();
    assert_eq!(now - days_before(now, 7.0), Duration::days(7));
    assert_eq!(now - days_before(now, 0.5), Duration::hours(12));
  }
}
