pub mod record;
pub mod workout;

pub use record::{
  Pace, RunDetails, RunRecord, StrengthRecord, StrengthSet, Workout, WorkoutKind,
};
pub use workout::{
  DateValue, DurationValue, Feeling, PaceValue, RawRunLog, RawStrengthSession, RawStrengthSet,
  RpeValue,
};
