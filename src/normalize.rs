//! Record normalization
//!
//! Turns stored documents into typed records once, up front: dates become
//! `DateTime<Utc>`, legacy field names are resolved through ordered candidate
//! lists, and the run/strength discrimination happens here and nowhere else.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::models::{
  DateValue, DurationValue, PaceValue, RawRunLog, RawStrengthSession, RunDetails, RunRecord,
  Pace, StrengthRecord, StrengthSet, Workout, WorkoutKind,
};

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizationError {
  #[error("Record has no date")]
  MissingDate,

  #[error("Invalid date: {0}")]
  InvalidDate(String),

  #[error("Timestamp out of range: {0}")]
  TimestampOutOfRange(i64),

  #[error("Record is neither a run (distance) nor a strength session (sets)")]
  UnknownKind,

  #[error("Malformed document: {0}")]
  Malformed(String),

  #[error("Document reads as a {found} but is stored as a {expected}")]
  KindMismatch {
    expected: WorkoutKind,
    found: WorkoutKind,
  },
}

/// ---------------------------------------------------------------------------
/// Dates
/// ---------------------------------------------------------------------------

/// Naive formats accepted after RFC 3339; read as UTC
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%d %H:%M",
];

/// Normalize any stored date representation to a single instant
pub fn normalize_date(value: &DateValue) -> Result<DateTime<Utc>, NormalizationError> {
  match value {
    DateValue::Timestamp { seconds, nanoseconds } => DateTime::from_timestamp(*seconds, *nanoseconds)
      .ok_or(NormalizationError::TimestampOutOfRange(*seconds)),
    DateValue::Millis(ms) => {
      if !ms.is_finite() {
        return Err(NormalizationError::InvalidDate(ms.to_string()));
      }
      let ms = ms.trunc() as i64;
      DateTime::from_timestamp_millis(ms).ok_or(NormalizationError::TimestampOutOfRange(ms))
    }
    DateValue::Text(s) => parse_date_text(s),
  }
}

fn parse_date_text(raw: &str) -> Result<DateTime<Utc>, NormalizationError> {
  let s = raw.trim();
  if s.is_empty() {
    return Err(NormalizationError::InvalidDate(raw.to_string()));
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }

  for fmt in NAIVE_DATETIME_FORMATS {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
      return Ok(naive.and_utc());
    }
  }

  if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Ok(date.and_time(NaiveTime::MIN).and_utc());
  }

  if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
    return Ok(dt.with_timezone(&Utc));
  }

  Err(NormalizationError::InvalidDate(raw.to_string()))
}

fn require_date(value: Option<&DateValue>) -> Result<DateTime<Utc>, NormalizationError> {
  value.ok_or(NormalizationError::MissingDate).and_then(normalize_date)
}

/// ---------------------------------------------------------------------------
/// Pace & Duration Strings
/// ---------------------------------------------------------------------------

/// `"MM:SS"` to decimal minutes. Anything else is `0.0`, the "no data" sentinel.
pub fn parse_pace(pace: &str) -> f64 {
  let parts: Vec<&str> = pace.trim().split(':').collect();
  if parts.len() != 2 {
    return 0.0;
  }

  match (parts[0].trim().parse::<f64>(), parts[1].trim().parse::<f64>()) {
    (Ok(min), Ok(sec)) if min.is_finite() && sec.is_finite() && min >= 0.0 && sec >= 0.0 => {
      min + sec / 60.0
    }
    _ => 0.0,
  }
}

/// `"HH:MM:SS"` to minutes. Each component counts its leading integer digits
/// (`"30.5"` is 30); a component without any counts as zero. Any other shape
/// is `0.0`.
pub fn parse_duration_to_minutes(duration: &str) -> f64 {
  let parts: Vec<&str> = duration.trim().split(':').collect();
  if parts.len() != 3 {
    return 0.0;
  }

  let component = |p: &str| leading_integer(p).unwrap_or(0.0);
  component(parts[0]) * 60.0 + component(parts[1]) + component(parts[2]) / 60.0
}

/// Optional sign followed by the leading run of ASCII digits
fn leading_integer(s: &str) -> Option<f64> {
  let s = s.trim_start();
  let (sign, rest) = match s.strip_prefix('-') {
    Some(rest) => (-1.0, rest),
    None => (1.0, s.strip_prefix('+').unwrap_or(s)),
  };

  let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
  rest[..end].parse::<f64>().ok().map(|n| sign * n)
}

/// ---------------------------------------------------------------------------
/// Candidate Resolution
/// ---------------------------------------------------------------------------

type Candidate<R> = fn(&R) -> Option<f64>;

const DISTANCE_CANDIDATES: [Candidate<RawRunLog>; 2] = [|r| r.distance_km, |r| r.distance];

const CALORIE_CANDIDATES: [Candidate<RawRunLog>; 2] = [|r| r.calories_total, |r| r.calories];

const HEARTRATE_AVG_CANDIDATES: [Candidate<RawRunLog>; 2] = [
  |r| r.hr_avg,
  |r| r.heart_rate.as_ref().and_then(|h| h.average),
];

const HEARTRATE_MAX_CANDIDATES: [Candidate<RawRunLog>; 2] = [
  |r| r.hr_max,
  |r| r.heart_rate.as_ref().and_then(|h| h.max),
];

/// First candidate that is present and non-zero
fn resolve<R>(raw: &R, candidates: &[Candidate<R>]) -> Option<f64> {
  candidates
    .iter()
    .filter_map(|c| c(raw))
    .find(|v| v.is_finite() && *v != 0.0)
}

fn non_zero(value: Option<f64>) -> Option<f64> {
  value.filter(|v| v.is_finite() && *v != 0.0)
}

fn resolve_pace(raw: &RawRunLog) -> Option<Pace> {
  let primary = match &raw.pace_min_per_km {
    Some(PaceValue::Text(s)) if !s.trim().is_empty() => Some(Pace::Clock(s.trim().to_string())),
    Some(PaceValue::Minutes(m)) if m.is_finite() && *m != 0.0 => Some(Pace::Minutes(*m)),
    _ => None,
  };
  primary.or_else(|| non_zero(raw.pace).map(Pace::Minutes))
}

fn resolve_duration(raw: &RawRunLog) -> Option<f64> {
  let minutes = match raw.duration.as_ref()? {
    DurationValue::Minutes(m) => *m,
    DurationValue::Clock(s) => parse_duration_to_minutes(s),
  };
  non_zero(Some(minutes))
}

/// ---------------------------------------------------------------------------
/// Record Conversion
/// ---------------------------------------------------------------------------

impl TryFrom<RawRunLog> for RunRecord {
  type Error = NormalizationError;

  fn try_from(raw: RawRunLog) -> Result<Self, Self::Error> {
    let date = require_date(raw.date.as_ref())?;
    let distance_km = resolve(&raw, &DISTANCE_CANDIDATES);
    let calories_total = resolve(&raw, &CALORIE_CANDIDATES);
    let pace = resolve_pace(&raw);
    let duration_minutes = resolve_duration(&raw);

    let details = RunDetails {
      avg_heartrate: resolve(&raw, &HEARTRATE_AVG_CANDIDATES),
      max_heartrate: resolve(&raw, &HEARTRATE_MAX_CANDIDATES),
      run_type: raw.run_type,
      route_name: raw.route.as_ref().and_then(|r| r.name.clone()),
      elevation_m: raw.route.as_ref().and_then(|r| r.elevation),
      temperature_c: raw.weather.as_ref().and_then(|w| w.temperature),
      weather: raw.weather.and_then(|w| w.conditions),
      shoes: raw.shoes,
      notes: raw.notes.or(raw.remark),
    };

    Ok(Self {
      id: raw.id,
      date,
      distance_km,
      pace,
      calories_total,
      duration_minutes,
      feeling: raw.feeling.unwrap_or_default(),
      details,
    })
  }
}

impl TryFrom<RawStrengthSession> for StrengthRecord {
  type Error = NormalizationError;

  fn try_from(raw: RawStrengthSession) -> Result<Self, Self::Error> {
    let date = require_date(raw.date.as_ref())?;

    let sets = raw
      .sets
      .into_iter()
      .map(|s| StrengthSet {
        exercise: s.exercise,
        reps: s.reps,
        weight_kg: if s.weight_kg.is_finite() { s.weight_kg.max(0.0) } else { 0.0 },
        rpe: s.rpe,
        muscle_group: s.category,
      })
      .collect();

    Ok(Self {
      id: raw.id,
      session_id: raw.session_id,
      date,
      category: raw.category,
      sets,
      feeling: raw.feeling,
      total_volume: non_zero(raw.total_volume),
      duration_minutes: non_zero(raw.duration),
      workout_type: raw.workout_type,
      bodyweight_kg: non_zero(raw.bodyweight),
      notes: raw.notes,
    })
  }
}

/// ---------------------------------------------------------------------------
/// Kind Discrimination
/// ---------------------------------------------------------------------------

/// Decide the kind of an untyped document. A distance-bearing field wins over
/// a sets field.
pub fn detect_kind(doc: &Value) -> Result<WorkoutKind, NormalizationError> {
  let obj = doc
    .as_object()
    .ok_or_else(|| NormalizationError::Malformed("document is not an object".to_string()))?;

  if obj.contains_key("distance_km") || obj.contains_key("distance") {
    Ok(WorkoutKind::Run)
  } else if obj.contains_key("sets") {
    Ok(WorkoutKind::Strength)
  } else {
    Err(NormalizationError::UnknownKind)
  }
}

/// ---------------------------------------------------------------------------
/// Documents
/// ---------------------------------------------------------------------------

fn from_value<R: DeserializeOwned>(doc: Value) -> Result<R, NormalizationError> {
  serde_json::from_value(doc).map_err(|e| NormalizationError::Malformed(e.to_string()))
}

/// A record read straight from a stored document of a known collection
pub trait FromDocument: Sized {
  fn from_document(doc: Value) -> Result<Self, NormalizationError>;
}

impl FromDocument for RunRecord {
  fn from_document(doc: Value) -> Result<Self, NormalizationError> {
    from_value::<RawRunLog>(doc)?.try_into()
  }
}

impl FromDocument for StrengthRecord {
  fn from_document(doc: Value) -> Result<Self, NormalizationError> {
    from_value::<RawStrengthSession>(doc)?.try_into()
  }
}

impl Workout {
  /// Normalize a document stored as `kind`. The collection decides the kind,
  /// not the fields.
  pub fn from_document(kind: WorkoutKind, doc: Value) -> Result<Self, NormalizationError> {
    match kind {
      WorkoutKind::Run => RunRecord::from_document(doc).map(Workout::Run),
      WorkoutKind::Strength => StrengthRecord::from_document(doc).map(Workout::Strength),
    }
  }
}

/// Normalize a fetched collection. With `skip_malformed` a bad document
/// (wrong field types included) is logged and dropped; otherwise the first
/// failure aborts.
pub fn normalize_records<T: FromDocument>(
  docs: Vec<Value>,
  skip_malformed: bool,
) -> Result<Vec<T>, NormalizationError> {
  let mut records = Vec::with_capacity(docs.len());
  for doc in docs {
    let id = doc.get("id").and_then(Value::as_str).map(str::to_string);
    match T::from_document(doc) {
      Ok(record) => records.push(record),
      Err(e) if skip_malformed => warn!(id = ?id, error = %e, "Skipping malformed record"),
      Err(e) => return Err(e),
    }
  }
  Ok(records)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
