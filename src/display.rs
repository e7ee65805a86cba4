//! Text rendering of dashboard values
//!
//! Missing data renders as a label ("N/A", "No data") or a zero in the unit,
//! never as a made-up number.

use std::fmt::Write;

use crate::analysis::{
  DailyWorkoutCount, InsightsResult, RowDetail, RunTrendPoint, StatsCardsResult,
  StrengthTrendPoint, WorkoutRow,
};
use crate::commands::SessionTrend;
use crate::models::{Pace, RunRecord};

/// ---------------------------------------------------------------------------
/// Values
/// ---------------------------------------------------------------------------

/// `"5.2km"`, or metres below one kilometre
pub fn format_distance(km: Option<f64>) -> String {
  match km {
    Some(d) if d.is_finite() && d > 0.0 => {
      if d < 1.0 {
        format!("{}m", (d * 1000.0).round())
      } else {
        format!("{:.1}km", d)
      }
    }
    _ => "0km".to_string(),
  }
}

fn minutes_to_clock(minutes: f64) -> String {
  let total_seconds = (minutes * 60.0).round() as i64;
  format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Logged clock strings are shown as-is; decimal minutes become `M:SS`
pub fn format_pace(pace: Option<&Pace>) -> String {
  match pace {
    Some(Pace::Clock(s)) if s.contains(':') => format!("{}/km", s),
    Some(Pace::Minutes(m)) if m.is_finite() && *m > 0.0 => {
      format!("{}/km", minutes_to_clock(*m))
    }
    _ => "0:00/km".to_string(),
  }
}

/// Average pace; `0.0` is the no-data sentinel
pub fn format_average_pace(minutes: f64) -> String {
  if minutes > 0.0 {
    format!("{:.1} min/km", minutes)
  } else {
    "N/A".to_string()
  }
}

pub fn format_best_pace(run: Option<&RunRecord>) -> String {
  match run.and_then(|r| r.pace.as_ref()) {
    Some(Pace::Clock(s)) if !s.is_empty() => format!("{} min/km", s),
    Some(Pace::Minutes(m)) if *m > 0.0 => format!("{:.1} min/km", m),
    _ => "No data".to_string(),
  }
}

pub fn format_longest_run(run: Option<&RunRecord>) -> String {
  match run {
    Some(r) => format_distance(r.distance_km),
    None => "No data".to_string(),
  }
}

/// Minutes as `"45min"`, `"1h 30min"` or `"2h"`
pub fn format_duration(minutes: Option<f64>) -> String {
  let minutes = match minutes {
    Some(m) if m.is_finite() && m > 0.0 => m,
    _ => return "0min".to_string(),
  };

  if minutes < 60.0 {
    return format!("{}min", minutes.round());
  }
  let hours = (minutes / 60.0).floor();
  let remaining = (minutes % 60.0).round();
  if remaining > 0.0 {
    format!("{}h {}min", hours, remaining)
  } else {
    format!("{}h", hours)
  }
}

pub fn format_calories(calories: f64) -> String {
  if calories.is_finite() && calories > 0.0 {
    format!("{} cal", calories.round())
  } else {
    "0 cal".to_string()
  }
}

pub fn format_volume(kg: f64) -> String {
  format!("{}kg", kg.round())
}

/// Signed week-over-week change
pub fn format_trend(delta: i64) -> String {
  if delta >= 0 {
    format!("+{} from last week", delta)
  } else {
    format!("{} from last week", delta)
  }
}

/// ---------------------------------------------------------------------------
/// Panels
/// ---------------------------------------------------------------------------

pub fn render_insights(insights: &InsightsResult) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "Quick Insights (last 30 days)");
  let _ = writeln!(out, "  Workout Frequency    {:.1} per week", insights.workouts_per_week);
  let _ = writeln!(out, "  Most Common Feeling  {}", insights.most_common_feeling);
  let _ = writeln!(out, "  Best Pace            {}", format_best_pace(insights.best_run.as_ref()));
  let _ = writeln!(
    out,
    "  Longest Run          {}",
    format_longest_run(insights.longest_run.as_ref())
  );
  let _ = writeln!(out);
  let _ = writeln!(out, "Monthly Summary");
  let _ = writeln!(out, "  Total Workouts       {}", insights.total_workouts);
  let _ = writeln!(
    out,
    "  Total Distance       {}",
    format_distance(Some(insights.total_distance_km))
  );
  let _ = writeln!(
    out,
    "  Average Pace         {}",
    format_average_pace(insights.average_pace_min_per_km)
  );
  let _ = writeln!(out, "  Training Volume      {}", format_volume(insights.total_volume_kg));

  if !insights.recommendations.is_empty() {
    let _ = writeln!(out);
    let _ = writeln!(out, "Recommendations");
    for rec in &insights.recommendations {
      let _ = writeln!(out, "  • {}", rec.message());
    }
  }
  out
}

pub fn render_stats_cards(stats: &StatsCardsResult) -> String {
  let mut out = String::new();
  let _ = writeln!(
    out,
    "Total Workouts    {:<10} Last 7 days {}",
    stats.total_workouts_7d,
    format_trend(stats.workout_trend)
  );
  let _ = writeln!(
    out,
    "Distance Covered  {:<10} Last 7 days",
    format_distance(Some(stats.total_distance_7d_km))
  );
  let _ = writeln!(
    out,
    "Calories Burned   {:<10} Last 7 days",
    format_calories(stats.total_calories_7d)
  );
  let _ = writeln!(
    out,
    "Training Volume   {:<10} Last 7 days (kg)",
    format_volume(stats.total_volume_7d_kg)
  );
  let _ = writeln!(
    out,
    "Last 30 days      {} workouts, {}",
    stats.total_workouts_30d,
    format_distance(Some(stats.total_distance_30d_km))
  );
  out
}

pub fn render_workout_rows(rows: &[WorkoutRow]) -> String {
  if rows.is_empty() {
    return "No workouts\n".to_string();
  }

  let mut out = String::new();
  for row in rows {
    let summary = match &row.detail {
      RowDetail::Run {
        distance_km,
        pace,
        duration_minutes,
        ..
      } => format!(
        "{}  {}  {}",
        format_distance(*distance_km),
        format_pace(pace.as_ref()),
        format_duration(*duration_minutes)
      ),
      RowDetail::Strength(s) => format!(
        "{} sets  {} exercises  {}  RPE {:.1}",
        s.set_count,
        s.exercise_count,
        format_volume(s.volume_kg),
        s.avg_rpe
      ),
    };
    let _ = writeln!(
      out,
      "{}  {:<8}  {:<9}  {}  {}",
      row.date.format("%Y-%m-%d"),
      row.kind,
      row.feeling,
      summary,
      row.id.as_deref().unwrap_or("-")
    );
  }
  out
}

fn render_run_points(points: &[RunTrendPoint]) -> String {
  let mut out = String::new();
  for p in points {
    let pace = if p.pace_min_per_km > 0.0 {
      minutes_to_clock(p.pace_min_per_km)
    } else {
      "-".to_string()
    };
    let _ = writeln!(
      out,
      "{}  {:>7}  {:>6}/km  {}",
      p.date,
      format_distance(Some(p.distance_km)),
      pace,
      format_calories(p.calories)
    );
  }
  out
}

fn render_strength_points(points: &[StrengthTrendPoint]) -> String {
  let mut out = String::new();
  for p in points {
    let _ = writeln!(
      out,
      "{}  {:>8}  {:>2} sets  RPE {:.1}",
      p.date,
      format_volume(p.volume_kg),
      p.sets,
      p.avg_rpe
    );
  }
  out
}

pub fn render_session_trend(trend: &SessionTrend) -> String {
  let out = match trend {
    SessionTrend::Run(points) => render_run_points(points),
    SessionTrend::Strength(points) => render_strength_points(points),
  };
  if out.is_empty() {
    "No sessions\n".to_string()
  } else {
    out
  }
}

pub fn render_workout_trend(days: &[DailyWorkoutCount]) -> String {
  let mut out = String::new();
  for day in days {
    let _ = writeln!(
      out,
      "{}  {:<12} {} run, {} strength",
      day.date,
      "#".repeat(day.total_workouts),
      day.runs,
      day.strength
    );
  }
  out
}
