//! Workout documents as they are stored
//!
//! These mirror the loosely-typed documents of the hosted store: dates may be
//! timestamp objects, strings or epoch numbers, paces may be `"MM:SS"` strings
//! or legacy decimal minutes, and several quantities have a legacy field name.
//! Nothing here is trusted until it goes through `crate::normalize`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ---------------------------------------------------------------------------
/// Field Values
/// ---------------------------------------------------------------------------

/// A date as it arrives from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
  /// Native timestamp object (`{seconds, nanoseconds}`)
  Timestamp {
    #[serde(alias = "_seconds")]
    seconds: i64,
    #[serde(alias = "_nanoseconds", default)]
    nanoseconds: u32,
  },
  /// Epoch milliseconds
  Millis(f64),
  /// ISO-like string
  Text(String),
}

/// Pace as `"MM:SS"` or legacy decimal minutes per km
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaceValue {
  Minutes(f64),
  Text(String),
}

/// Duration as `"HH:MM:SS"` or minutes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
  Minutes(f64),
  Clock(String),
}

/// RPE is numeric, or a marker such as `"x"` for a set taken to failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpeValue {
  Value(f64),
  Marker(String),
}

impl RpeValue {
  pub fn numeric(&self) -> Option<f64> {
    match self {
      RpeValue::Value(v) if v.is_finite() => Some(*v),
      _ => None,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Feeling
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Feeling {
  Poor,
  Okay,
  #[default]
  Good,
  Great,
  Excellent,
}

impl Feeling {
  pub fn as_str(&self) -> &'static str {
    match self {
      Feeling::Poor => "poor",
      Feeling::Okay => "okay",
      Feeling::Good => "good",
      Feeling::Great => "great",
      Feeling::Excellent => "excellent",
    }
  }
}

impl fmt::Display for Feeling {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

impl FromStr for Feeling {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "poor" => Ok(Self::Poor),
      "okay" => Ok(Self::Okay),
      "good" => Ok(Self::Good),
      "great" => Ok(Self::Great),
      "excellent" => Ok(Self::Excellent),
      _ => Err(format!("Unknown feeling: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Run Log Document
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
  pub name: Option<String>,
  pub elevation: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
  pub temperature: Option<f64>,
  pub conditions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartRateInfo {
  pub average: Option<f64>,
  pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRunLog {
  pub id: Option<String>,
  #[serde(rename = "userId")]
  pub user_id: Option<String>,
  pub date: Option<DateValue>,

  pub distance_km: Option<f64>,
  /// Legacy distance field (km)
  pub distance: Option<f64>,

  pub pace_min_per_km: Option<PaceValue>,
  /// Legacy pace field (decimal minutes)
  pub pace: Option<f64>,

  pub calories_total: Option<f64>,
  pub calories_active: Option<f64>,
  /// Legacy calories field
  pub calories: Option<f64>,

  pub duration: Option<DurationValue>,
  pub run_type: Option<String>,
  pub feeling: Option<Feeling>,

  pub hr_avg: Option<f64>,
  pub hr_max: Option<f64>,
  #[serde(rename = "heartRate")]
  pub heart_rate: Option<HeartRateInfo>,
  pub route: Option<RouteInfo>,
  pub weather: Option<WeatherInfo>,
  pub shoes: Option<String>,
  pub notes: Option<String>,
  pub remark: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Strength Session Document
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStrengthSet {
  pub exercise: String,
  pub set: Option<u32>,
  #[serde(default)]
  pub reps: u32,
  #[serde(default)]
  pub weight_kg: f64,
  pub rpe: Option<RpeValue>,
  /// Muscle group of this set
  pub category: Option<String>,
  pub remark: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStrengthSession {
  pub id: Option<String>,
  pub session_id: Option<String>,
  #[serde(rename = "userId")]
  pub user_id: Option<String>,
  pub date: Option<DateValue>,
  #[serde(default)]
  pub category: Vec<String>,
  #[serde(default)]
  pub sets: Vec<RawStrengthSet>,

  /// Minutes
  pub duration: Option<f64>,
  #[serde(rename = "totalVolume")]
  pub total_volume: Option<f64>,
  pub bodyweight: Option<f64>,
  pub feeling: Option<Feeling>,
  #[serde(rename = "workoutType")]
  pub workout_type: Option<String>,
  pub notes: Option<String>,
}
