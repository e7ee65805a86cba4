use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::load_records;
use crate::analysis::{
  compute_insights, compute_stats_cards, daily_workout_trend, run_trend, strength_trend,
  DailyWorkoutCount, InsightsResult, RunTrendPoint, StatsCardsResult, StrengthTrendPoint,
};
use crate::db::AppState;
use crate::models::WorkoutKind;
use crate::store::LogFilter;

/// ---------------------------------------------------------------------------
/// Dashboard Panels
/// ---------------------------------------------------------------------------

/// 30-day insights panel over the user's most recent logs
pub async fn get_insights(
  state: &AppState,
  user_id: &str,
  now: DateTime<Utc>,
) -> Result<InsightsResult, String> {
  let (runs, sessions) = load_records(state, user_id, &LogFilter::default()).await?;
  let insights = compute_insights(&runs, &sessions, now);

  info!(
    user_id,
    total_workouts = insights.total_workouts,
    recommendations = insights.recommendations.len(),
    "Computed insights"
  );
  Ok(insights)
}

pub async fn get_stats_cards(
  state: &AppState,
  user_id: &str,
  now: DateTime<Utc>,
) -> Result<StatsCardsResult, String> {
  let (runs, sessions) = load_records(state, user_id, &LogFilter::default()).await?;
  let stats = compute_stats_cards(&runs, &sessions, now);

  info!(
    user_id,
    workouts_7d = stats.total_workouts_7d,
    trend = stats.workout_trend,
    "Computed stats cards"
  );
  Ok(stats)
}

/// ---------------------------------------------------------------------------
/// Trends
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "points", rename_all = "snake_case")]
pub enum SessionTrend {
  Run(Vec<RunTrendPoint>),
  Strength(Vec<StrengthTrendPoint>),
}

/// Chart points for the `count` most recent sessions of one kind, oldest first
pub async fn get_session_trend(
  state: &AppState,
  user_id: &str,
  kind: WorkoutKind,
  count: usize,
) -> Result<SessionTrend, String> {
  let (mut runs, mut sessions) = load_records(state, user_id, &LogFilter::default()).await?;

  // Fetched newest first; charts read left to right
  runs.reverse();
  sessions.reverse();

  let trend = match kind {
    WorkoutKind::Run => SessionTrend::Run(run_trend(&runs, count)),
    WorkoutKind::Strength => SessionTrend::Strength(strength_trend(&sessions, count)),
  };

  info!(user_id, %kind, "Computed session trend");
  Ok(trend)
}

/// Workouts per day for the last `days` days
pub async fn get_workout_trend(
  state: &AppState,
  user_id: &str,
  now: DateTime<Utc>,
  days: u32,
) -> Result<Vec<DailyWorkoutCount>, String> {
  let (runs, sessions) = load_records(state, user_id, &LogFilter::default()).await?;
  Ok(daily_workout_trend(&runs, &sessions, now, days))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::analysis::Recommendation;
  use crate::commands::tests::test_state;
  use crate::models::Feeling;
  use crate::test_utils::*;
  use serde_json::json;

  #[tokio::test]
  async fn test_get_insights_from_stored_documents() {
    let pool = setup_test_db().await;
    let now = fixed_now();

    let mut legacy = json!({
      "date": {"seconds": days_before(now, 4.0).timestamp(), "nanoseconds": 0},
      "distance": 10.0,
      "pace": 6.0,
      "calories": 700,
      "feeling": "excellent",
    });
    legacy["run_type"] = json!("long");

    let mut easy = run_doc(now, 1.0, 5.0, "5:00");
    easy["feeling"] = json!("excellent");

    seed_documents(
      &pool,
      TEST_USER,
      vec![
        easy,
        legacy,
        strength_doc(
          now,
          2.0,
          json!([
            {"exercise": "Bench Press", "reps": 5, "weight_kg": 80, "rpe": 8},
            {"exercise": "Push-up", "reps": 20, "weight_kg": 0, "rpe": "x"}
          ]),
        ),
      ],
    )
    .await;
    let state = test_state(pool);

    let insights = get_insights(&state, TEST_USER, now)
      .await
      .expect("Should compute insights");

    assert_eq!(insights.total_workouts, 3);
    crate::assert_approx_eq!(insights.total_distance_km, 15.0, 1e-9);
    crate::assert_approx_eq!(insights.average_pace_min_per_km, 5.5, 1e-9);
    crate::assert_approx_eq!(insights.total_volume_kg, 400.0, 1e-9);
    assert_eq!(insights.most_common_feeling, Feeling::Excellent);
    assert_eq!(insights.longest_run.and_then(|r| r.distance_km), Some(10.0));
    assert_eq!(insights.best_run.and_then(|r| r.distance_km), Some(5.0));
    assert_eq!(
      insights.recommendations,
      vec![Recommendation::IncreaseFrequency, Recommendation::IncreaseIntensity]
    );

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_get_insights_for_new_user() {
    let pool = setup_test_db().await;
    let state = test_state(pool);

    let insights = get_insights(&state, TEST_USER, fixed_now())
      .await
      .expect("Should compute insights");
    assert_eq!(insights.total_workouts, 0);
    assert_eq!(insights.recommendations.len(), 3);

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_get_stats_cards() {
    let pool = setup_test_db().await;
    let now = fixed_now();
    seed_documents(
      &pool,
      TEST_USER,
      vec![
        run_doc(now, 1.0, 5.0, "5:30"),
        strength_doc(now, 2.0, json!([])),
        run_doc(now, 10.0, 8.0, "5:30"),
      ],
    )
    .await;
    let state = test_state(pool);

    let stats = get_stats_cards(&state, TEST_USER, now)
      .await
      .expect("Should compute stats");
    assert_eq!(stats.total_workouts_7d, 2);
    assert_eq!(stats.total_workouts_30d, 3);
    // 350 kcal run + 45 min * 8
    crate::assert_approx_eq!(stats.total_calories_7d, 710.0, 1e-9);
    assert_eq!(stats.workout_trend, 1);

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_get_session_trend_is_chronological() {
    let pool = setup_test_db().await;
    let now = fixed_now();
    let docs = (0..9)
      .map(|i| run_doc(now, i as f64, 1.0 + i as f64, "5:30"))
      .collect();
    seed_documents(&pool, TEST_USER, docs).await;
    let state = test_state(pool);

    let trend = get_session_trend(&state, TEST_USER, WorkoutKind::Run, 7)
      .await
      .expect("Should compute trend");
    let SessionTrend::Run(points) = trend else {
      panic!("Expected run trend");
    };
    assert_eq!(points.len(), 7);
    // Most recent seven, oldest (6 days ago, 7 km) first
    assert_eq!(points[0].distance_km, 7.0);
    assert_eq!(points[6].distance_km, 1.0);

    let strength = get_session_trend(&state, TEST_USER, WorkoutKind::Strength, 7)
      .await
      .expect("Should compute trend");
    assert_eq!(strength, SessionTrend::Strength(vec![]));

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_get_workout_trend() {
    let pool = setup_test_db().await;
    let now = fixed_now();
    seed_documents(
      &pool,
      TEST_USER,
      vec![run_doc(now, 0.0, 5.0, "5:30"), strength_doc(now, 1.0, json!([]))],
    )
    .await;
    let state = test_state(pool);

    let trend = get_workout_trend(&state, TEST_USER, now, 7)
      .await
      .expect("Should compute trend");
    assert_eq!(trend.len(), 7);
    assert_eq!(trend[6].runs, 1);
    assert_eq!(trend[5].strength, 1);

    teardown_test_db(state.db).await;
  }
}
