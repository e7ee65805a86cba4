//! Deterministic metrics layer for the dashboard
//!
//! This module turns normalized run and strength records into the numbers the
//! dashboard shows. Every function is pure: records and `now` in, results
//! out. Nothing here reads the clock or touches the store.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Feeling, Pace, RunRecord, StrengthRecord, StrengthSet, WorkoutKind};
use crate::window::{filter_window, TimeWindow};

/// ---------------------------------------------------------------------------
/// Constants
/// ---------------------------------------------------------------------------

/// Exercises that never contribute to volume (exact, case-sensitive match)
pub const BODYWEIGHT_EXERCISES: [&str; 3] = ["Push-up", "Pull-up", "Plank"];

/// Rough estimate of strength-session energy use. Not a measured value.
pub const STRENGTH_KCAL_PER_MINUTE: f64 = 8.0;

/// Weeks in the 30-day insights window, as the dashboard has always shown it
pub const WEEKS_PER_MONTH: f64 = 4.3;

/// RPE assumed for a failure marker (or a missing RPE) when deriving a feeling
pub const DEFAULT_DERIVED_RPE: f64 = 7.0;

pub const INSIGHTS_WINDOW_DAYS: i64 = 30;
pub const STATS_WINDOW_DAYS: i64 = 7;

/// Sessions shown in per-kind trend charts
pub const SESSION_TREND_COUNT: usize = 7;

/// Longest daily trend, one year
pub const MAX_TREND_DAYS: u32 = 366;

/// ---------------------------------------------------------------------------
/// Strength Metrics
/// ---------------------------------------------------------------------------

pub fn is_bodyweight(exercise: &str) -> bool {
  BODYWEIGHT_EXERCISES.contains(&exercise)
}

/// `reps * weight` over non-bodyweight sets
pub fn sets_volume(sets: &[StrengthSet]) -> f64 {
  sets
    .iter()
    .filter(|s| !is_bodyweight(&s.exercise))
    .map(|s| f64::from(s.reps) * s.weight_kg)
    .sum()
}

/// Session volume: the precomputed total when logged, otherwise from sets
pub fn session_volume(session: &StrengthRecord) -> f64 {
  session
    .total_volume
    .unwrap_or_else(|| sets_volume(&session.sets))
}

/// Mean RPE over numeric entries only; `0.0` when there are none
pub fn average_rpe(sets: &[StrengthSet]) -> f64 {
  let values: Vec<f64> = sets
    .iter()
    .filter_map(|s| s.rpe.as_ref().and_then(|r| r.numeric()))
    .collect();

  if values.is_empty() {
    0.0
  } else {
    values.iter().sum::<f64>() / values.len() as f64
  }
}

/// Feeling inferred from effort when a session was logged without one.
///
/// Unlike `average_rpe`, non-numeric entries count as `DEFAULT_DERIVED_RPE`
/// here, and an empty session averages to it as well.
pub fn derived_feeling(sets: &[StrengthSet]) -> Feeling {
  let avg_rpe = if sets.is_empty() {
    DEFAULT_DERIVED_RPE
  } else {
    let sum: f64 = sets
      .iter()
      .map(|s| s.rpe.as_ref().and_then(|r| r.numeric()).unwrap_or(DEFAULT_DERIVED_RPE))
      .sum();
    sum / sets.len() as f64
  };

  if avg_rpe >= 8.0 {
    Feeling::Great
  } else if avg_rpe >= 6.0 {
    Feeling::Good
  } else {
    Feeling::Okay
  }
}

/// Feeling shown on a session row: logged, or derived from the sets
pub fn display_feeling(session: &StrengthRecord) -> Feeling {
  session
    .feeling
    .unwrap_or_else(|| derived_feeling(&session.sets))
}

/// Per-session summary for tables and charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthSummary {
  pub volume_kg: f64,
  pub set_count: usize,
  pub exercise_count: usize,
  /// Rounded to one decimal
  pub avg_rpe: f64,
  pub feeling: Feeling,
}

impl StrengthSummary {
  pub fn from_session(session: &StrengthRecord) -> Self {
    let mut exercises: Vec<&str> = Vec::new();
    for s in &session.sets {
      if !exercises.contains(&s.exercise.as_str()) {
        exercises.push(&s.exercise);
      }
    }

    Self {
      volume_kg: session_volume(session).round(),
      set_count: session.sets.len(),
      exercise_count: exercises.len(),
      avg_rpe: round1(average_rpe(&session.sets)),
      feeling: display_feeling(session),
    }
  }
}

fn round1(value: f64) -> f64 {
  (value * 10.0).round() / 10.0
}

/// ---------------------------------------------------------------------------
/// Aggregates
/// ---------------------------------------------------------------------------

pub fn total_distance_km(runs: &[&RunRecord]) -> f64 {
  runs.iter().map(|r| r.distance_km.unwrap_or(0.0)).sum()
}

/// Mean of usable paces; `0.0` means "no data" and must be rendered as such
pub fn average_pace(runs: &[&RunRecord]) -> f64 {
  let paces: Vec<f64> = runs.iter().filter_map(|r| r.pace_minutes()).collect();
  if paces.is_empty() {
    0.0
  } else {
    paces.iter().sum::<f64>() / paces.len() as f64
  }
}

pub fn total_volume_kg(sessions: &[&StrengthRecord]) -> f64 {
  sessions.iter().map(|s| session_volume(s)).sum()
}

/// Run calories plus the per-minute estimate for strength sessions
pub fn total_calories(runs: &[&RunRecord], sessions: &[&StrengthRecord]) -> f64 {
  let run_kcal: f64 = runs.iter().map(|r| r.calories_total.unwrap_or(0.0)).sum();
  let strength_kcal: f64 = sessions
    .iter()
    .map(|s| s.duration_minutes.unwrap_or(0.0) * STRENGTH_KCAL_PER_MINUTE)
    .sum();
  run_kcal + strength_kcal
}

/// Most frequent feeling. Ties go to the feeling seen first; no input gives
/// `Good`.
pub fn most_common_feeling<I>(feelings: I) -> Feeling
where
  I: IntoIterator<Item = Feeling>,
{
  // First-seen order is kept so the tie-break is independent of enum order
  let mut counts: Vec<(Feeling, usize)> = Vec::new();
  for feeling in feelings {
    match counts.iter_mut().find(|(f, _)| *f == feeling) {
      Some((_, n)) => *n += 1,
      None => counts.push((feeling, 1)),
    }
  }

  let mut best: Option<(Feeling, usize)> = None;
  for (feeling, n) in counts {
    if best.map_or(true, |(_, top)| n > top) {
      best = Some((feeling, n));
    }
  }
  best.map(|(f, _)| f).unwrap_or_default()
}

/// Fastest usable pace; earlier record wins a tie
pub fn best_run<'a>(runs: &[&'a RunRecord]) -> Option<&'a RunRecord> {
  let mut best: Option<(&'a RunRecord, f64)> = None;
  for &run in runs {
    if let Some(pace) = run.pace_minutes() {
      if best.map_or(true, |(_, b)| pace < b) {
        best = Some((run, pace));
      }
    }
  }
  best.map(|(r, _)| r)
}

/// Longest usable distance; earlier record wins a tie
pub fn longest_run<'a>(runs: &[&'a RunRecord]) -> Option<&'a RunRecord> {
  let mut longest: Option<(&'a RunRecord, f64)> = None;
  for &run in runs {
    if let Some(distance) = run.usable_distance_km() {
      if longest.map_or(true, |(_, l)| distance > l) {
        longest = Some((run, distance));
      }
    }
  }
  longest.map(|(r, _)| r)
}

/// ---------------------------------------------------------------------------
/// Recommendations
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
  IncreaseFrequency,
  ReduceIntensity,
  IncreaseIntensity,
  AddCardio,
  AddStrength,
}

impl Recommendation {
  pub fn message(&self) -> &'static str {
    match self {
      Recommendation::IncreaseFrequency => {
        "Consider increasing your workout frequency to 3-4 times per week"
      }
      Recommendation::ReduceIntensity => {
        "You're feeling tired after workouts - consider reducing intensity or adding rest days"
      }
      Recommendation::IncreaseIntensity => {
        "Great energy levels! You might be ready to increase workout intensity"
      }
      Recommendation::AddCardio => {
        "Try adding some cardio workouts to improve cardiovascular health"
      }
      Recommendation::AddStrength => {
        "Consider adding strength training to build muscle and improve metabolism"
      }
    }
  }
}

/// Evaluate every rule in order; matches are not exclusive.
///
/// `has_runs` / `has_strength` describe the whole fetched history, not the
/// window.
pub fn recommendations(
  workouts_per_week: f64,
  total_workouts: usize,
  most_common_feeling: Feeling,
  has_runs: bool,
  has_strength: bool,
) -> Vec<Recommendation> {
  let rules = [
    (workouts_per_week < 3.0, Recommendation::IncreaseFrequency),
    (
      total_workouts > 0 && most_common_feeling == Feeling::Poor,
      Recommendation::ReduceIntensity,
    ),
    (
      total_workouts > 0 && most_common_feeling == Feeling::Excellent,
      Recommendation::IncreaseIntensity,
    ),
    (!has_runs, Recommendation::AddCardio),
    (!has_strength, Recommendation::AddStrength),
  ];

  rules
    .into_iter()
    .filter_map(|(hit, rec)| hit.then_some(rec))
    .collect()
}

/// ---------------------------------------------------------------------------
/// Insights (30-day)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsResult {
  pub window: TimeWindow,
  pub total_workouts: usize,
  pub total_distance_km: f64,
  /// `0.0` when no run in the window has a usable pace
  pub average_pace_min_per_km: f64,
  pub total_volume_kg: f64,
  pub workouts_per_week: f64,
  pub most_common_feeling: Feeling,
  pub best_run: Option<RunRecord>,
  pub longest_run: Option<RunRecord>,
  pub recommendations: Vec<Recommendation>,
}

/// Compute the insights panel over the trailing 30 days
pub fn compute_insights(
  runs: &[RunRecord],
  strength: &[StrengthRecord],
  now: DateTime<Utc>,
) -> InsightsResult {
  let window = TimeWindow::last_days(now, INSIGHTS_WINDOW_DAYS);
  let recent_runs = filter_window(runs, &window);
  let recent_strength = filter_window(strength, &window);

  let total_workouts = recent_runs.len() + recent_strength.len();
  let workouts_per_week = total_workouts as f64 / WEEKS_PER_MONTH;

  // Runs first, then sessions, each in fetch order; missing feeling is `good`
  let feelings = recent_runs
    .iter()
    .map(|r| r.feeling)
    .chain(recent_strength.iter().map(|s| s.feeling.unwrap_or_default()));
  let most_common_feeling = most_common_feeling(feelings);

  let recommendations = recommendations(
    workouts_per_week,
    total_workouts,
    most_common_feeling,
    !runs.is_empty(),
    !strength.is_empty(),
  );

  InsightsResult {
    window,
    total_workouts,
    total_distance_km: total_distance_km(&recent_runs),
    average_pace_min_per_km: average_pace(&recent_runs),
    total_volume_kg: total_volume_kg(&recent_strength),
    workouts_per_week,
    most_common_feeling,
    best_run: best_run(&recent_runs).cloned(),
    longest_run: longest_run(&recent_runs).cloned(),
    recommendations,
  }
}

/// ---------------------------------------------------------------------------
/// Stats Cards (7-day)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsCardsResult {
  pub total_workouts_7d: usize,
  pub total_workouts_30d: usize,
  pub total_distance_7d_km: f64,
  pub total_distance_30d_km: f64,
  /// Includes the strength per-minute estimate
  pub total_calories_7d: f64,
  pub total_volume_7d_kg: f64,
  /// Workouts this week minus workouts the week before
  pub workout_trend: i64,
}

pub fn compute_stats_cards(
  runs: &[RunRecord],
  strength: &[StrengthRecord],
  now: DateTime<Utc>,
) -> StatsCardsResult {
  let last_7 = TimeWindow::last_days(now, STATS_WINDOW_DAYS);
  let prev_7 = last_7.preceding(STATS_WINDOW_DAYS);
  let last_30 = TimeWindow::last_days(now, INSIGHTS_WINDOW_DAYS);

  let runs_7 = filter_window(runs, &last_7);
  let strength_7 = filter_window(strength, &last_7);
  let runs_30 = filter_window(runs, &last_30);
  let strength_30 = filter_window(strength, &last_30);

  let total_workouts_7d = runs_7.len() + strength_7.len();
  let previous_workouts =
    filter_window(runs, &prev_7).len() + filter_window(strength, &prev_7).len();

  StatsCardsResult {
    total_workouts_7d,
    total_workouts_30d: runs_30.len() + strength_30.len(),
    total_distance_7d_km: total_distance_km(&runs_7),
    total_distance_30d_km: total_distance_km(&runs_30),
    total_calories_7d: total_calories(&runs_7, &strength_7),
    total_volume_7d_kg: total_volume_kg(&strength_7),
    workout_trend: total_workouts_7d as i64 - previous_workouts as i64,
  }
}

/// ---------------------------------------------------------------------------
/// Workout Rows
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RowDetail {
  Run {
    distance_km: Option<f64>,
    pace: Option<Pace>,
    duration_minutes: Option<f64>,
    calories: Option<f64>,
  },
  Strength(StrengthSummary),
}

/// One line of the combined workout table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRow {
  pub kind: WorkoutKind,
  pub id: Option<String>,
  pub date: DateTime<Utc>,
  pub feeling: Feeling,
  pub detail: RowDetail,
}

/// Runs and sessions merged, newest first
pub fn workout_rows(runs: &[RunRecord], strength: &[StrengthRecord]) -> Vec<WorkoutRow> {
  let mut rows: Vec<WorkoutRow> = runs
    .iter()
    .map(|r| WorkoutRow {
      kind: WorkoutKind::Run,
      id: r.id.clone(),
      date: r.date,
      feeling: r.feeling,
      detail: RowDetail::Run {
        distance_km: r.distance_km,
        pace: r.pace.clone(),
        duration_minutes: r.duration_minutes,
        calories: r.calories_total,
      },
    })
    .chain(strength.iter().map(|s| {
      let summary = StrengthSummary::from_session(s);
      WorkoutRow {
        kind: WorkoutKind::Strength,
        id: s.id.clone(),
        date: s.date,
        feeling: summary.feeling,
        detail: RowDetail::Strength(summary),
      }
    }))
    .collect();

  rows.sort_by(|a, b| b.date.cmp(&a.date));
  rows
}

/// ---------------------------------------------------------------------------
/// Trends (chart data)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunTrendPoint {
  pub date: NaiveDate,
  pub distance_km: f64,
  /// `0.0` when the run has no usable pace
  pub pace_min_per_km: f64,
  pub calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthTrendPoint {
  pub date: NaiveDate,
  pub volume_kg: f64,
  pub sets: usize,
  pub avg_rpe: f64,
}

fn tail<T>(items: &[T], count: usize) -> &[T] {
  &items[items.len().saturating_sub(count)..]
}

/// Chart points for the last `count` runs, in the order given
pub fn run_trend(runs: &[RunRecord], count: usize) -> Vec<RunTrendPoint> {
  tail(runs, count)
    .iter()
    .map(|r| RunTrendPoint {
      date: r.date.date_naive(),
      distance_km: r.distance_km.unwrap_or(0.0),
      pace_min_per_km: r.pace_minutes().unwrap_or(0.0),
      calories: r.calories_total.unwrap_or(0.0),
    })
    .collect()
}

/// Chart points for the last `count` strength sessions, in the order given
pub fn strength_trend(sessions: &[StrengthRecord], count: usize) -> Vec<StrengthTrendPoint> {
  tail(sessions, count)
    .iter()
    .map(|s| {
      let summary = StrengthSummary::from_session(s);
      StrengthTrendPoint {
        date: s.date.date_naive(),
        volume_kg: summary.volume_kg,
        sets: summary.set_count,
        avg_rpe: summary.avg_rpe,
      }
    })
    .collect()
}

/// Workouts per calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWorkoutCount {
  pub date: NaiveDate,
  pub runs: usize,
  pub strength: usize,
  pub total_workouts: usize,
}

/// One entry per day for the last `days` days (at most `MAX_TREND_DAYS`),
/// oldest first, ending today
pub fn daily_workout_trend(
  runs: &[RunRecord],
  strength: &[StrengthRecord],
  now: DateTime<Utc>,
  days: u32,
) -> Vec<DailyWorkoutCount> {
  let today = now.date_naive();

  let mut counts: HashMap<NaiveDate, (usize, usize)> = HashMap::new();
  for run in runs {
    counts.entry(run.date.date_naive()).or_default().0 += 1;
  }
  for session in strength {
    counts.entry(session.date.date_naive()).or_default().1 += 1;
  }

  (0..i64::from(days.min(MAX_TREND_DAYS)))
    .rev()
    .filter_map(|offset| today.checked_sub_signed(Duration::days(offset)))
    .map(|date| {
      let (run_count, strength_count) = counts.get(&date).copied().unwrap_or_default();
      DailyWorkoutCount {
        date,
        runs: run_count,
        strength: strength_count,
        total_workouts: run_count + strength_count,
      }
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
