//! Time windows relative to an injected `now`

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{RunRecord, StrengthRecord};

/// Anything with a normalized occurrence time
pub trait Dated {
  fn occurred_at(&self) -> DateTime<Utc>;
}

impl Dated for RunRecord {
  fn occurred_at(&self) -> DateTime<Utc> {
    self.date
  }
}

impl Dated for StrengthRecord {
  fn occurred_at(&self) -> DateTime<Utc> {
    self.date
  }
}

/// `[start, end)`, or `[start, ∞)` when `end` is `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
  pub start: DateTime<Utc>,
  pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
  /// Trailing window: everything from `days * 24h` before `now`
  pub fn last_days(now: DateTime<Utc>, days: i64) -> Self {
    Self {
      start: now - Duration::days(days),
      end: None,
    }
  }

  /// The `days`-long window ending where this one starts
  pub fn preceding(&self, days: i64) -> Self {
    Self {
      start: self.start - Duration::days(days),
      end: Some(self.start),
    }
  }

  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    at >= self.start && self.end.map_or(true, |end| at < end)
  }
}

/// Records inside `window`, in input order
pub fn filter_window<'a, T: Dated>(records: &'a [T], window: &TimeWindow) -> Vec<&'a T> {
  records
    .iter()
    .filter(|r| window.contains(r.occurred_at()))
    .collect()
}
