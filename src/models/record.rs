use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::workout::{Feeling, RpeValue};
use crate::normalize::parse_pace;

/// ---------------------------------------------------------------------------
/// Record Kind
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
  Run,
  Strength,
}

impl WorkoutKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      WorkoutKind::Run => "run",
      WorkoutKind::Strength => "strength",
    }
  }

  /// Collection (table) holding documents of this kind
  pub fn collection(&self) -> &'static str {
    match self {
      WorkoutKind::Run => "run_logs",
      WorkoutKind::Strength => "strength_sessions",
    }
  }
}

impl fmt::Display for WorkoutKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

impl FromStr for WorkoutKind {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "run" | "runs" => Ok(Self::Run),
      "strength" => Ok(Self::Strength),
      _ => Err(format!("Unknown workout kind: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Run Record
/// ---------------------------------------------------------------------------

/// Pace kept in the representation it was logged in, so it can be displayed
/// verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pace {
  Minutes(f64),
  Clock(String),
}

impl Pace {
  /// Minutes per km; `0.0` when the clock string does not parse
  pub fn minutes(&self) -> f64 {
    match self {
      Pace::Clock(s) => parse_pace(s),
      Pace::Minutes(m) if m.is_finite() => *m,
      Pace::Minutes(_) => 0.0,
    }
  }
}

/// Descriptive fields carried through for display only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunDetails {
  pub run_type: Option<String>,
  pub route_name: Option<String>,
  pub elevation_m: Option<f64>,
  pub temperature_c: Option<f64>,
  pub weather: Option<String>,
  pub avg_heartrate: Option<f64>,
  pub max_heartrate: Option<f64>,
  pub shoes: Option<String>,
  pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
  pub id: Option<String>,
  pub date: DateTime<Utc>,
  pub distance_km: Option<f64>,
  pub pace: Option<Pace>,
  pub calories_total: Option<f64>,
  pub duration_minutes: Option<f64>,
  pub feeling: Feeling,
  pub details: RunDetails,
}

impl RunRecord {
  /// Parsed pace when it is usable (> 0)
  pub fn pace_minutes(&self) -> Option<f64> {
    self.pace.as_ref().map(Pace::minutes).filter(|p| *p > 0.0)
  }

  /// Distance when it is usable (> 0)
  pub fn usable_distance_km(&self) -> Option<f64> {
    self.distance_km.filter(|d| d.is_finite() && *d > 0.0)
  }
}

/// ---------------------------------------------------------------------------
/// Strength Record
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthSet {
  pub exercise: String,
  pub reps: u32,
  pub weight_kg: f64,
  pub rpe: Option<RpeValue>,
  pub muscle_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthRecord {
  pub id: Option<String>,
  pub session_id: Option<String>,
  pub date: DateTime<Utc>,
  pub category: Vec<String>,
  pub sets: Vec<StrengthSet>,
  /// Explicitly logged feeling; see `analysis::display_feeling` for the derived one
  pub feeling: Option<Feeling>,
  /// Precomputed volume, takes precedence over the sets
  pub total_volume: Option<f64>,
  pub duration_minutes: Option<f64>,
  pub workout_type: Option<String>,
  pub bodyweight_kg: Option<f64>,
  pub notes: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Workout (either kind)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Workout {
  Run(RunRecord),
  Strength(StrengthRecord),
}

impl Workout {
  pub fn kind(&self) -> WorkoutKind {
    match self {
      Workout::Run(_) => WorkoutKind::Run,
      Workout::Strength(_) => WorkoutKind::Strength,
    }
  }

  pub fn id(&self) -> Option<&str> {
    match self {
      Workout::Run(r) => r.id.as_deref(),
      Workout::Strength(s) => s.id.as_deref(),
    }
  }
}
