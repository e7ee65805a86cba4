pub mod documents;
pub mod insights;

use crate::analysis::{workout_rows, WorkoutRow};
use crate::db::AppState;
use crate::models::{RunRecord, StrengthRecord, WorkoutKind};
use crate::normalize::normalize_records;
use crate::store::{self, LogFilter};
use tracing::{debug, info};

pub use documents::{delete_workout, get_workout, import_documents, update_workout, ImportSummary};
pub use insights::{
  get_insights, get_session_trend, get_stats_cards, get_workout_trend, SessionTrend,
};

/// Fetch and normalize both collections for a user, newest first
pub(crate) async fn load_records(
  state: &AppState,
  user_id: &str,
  filter: &LogFilter,
) -> Result<(Vec<RunRecord>, Vec<StrengthRecord>), String> {
  let raw_runs = store::fetch_runs(&state.db, user_id, filter, state.fetch_limit)
    .await
    .map_err(|e| format!("Failed to fetch runs: {}", e))?;
  let raw_sessions = store::fetch_strength_sessions(&state.db, user_id, filter, state.fetch_limit)
    .await
    .map_err(|e| format!("Failed to fetch strength sessions: {}", e))?;

  let runs: Vec<RunRecord> = normalize_records(raw_runs, state.skip_malformed)
    .map_err(|e| format!("Failed to read run log: {}", e))?;
  let sessions: Vec<StrengthRecord> = normalize_records(raw_sessions, state.skip_malformed)
    .map_err(|e| format!("Failed to read strength session: {}", e))?;

  debug!(runs = runs.len(), sessions = sessions.len(), "Loaded records");
  Ok((runs, sessions))
}

/// Combined workout table, newest first. `kind` restricts to one collection,
/// `limit` caps the number of rows.
pub async fn get_workouts(
  state: &AppState,
  user_id: &str,
  filter: &LogFilter,
  kind: Option<WorkoutKind>,
  limit: Option<usize>,
) -> Result<Vec<WorkoutRow>, String> {
  let (mut runs, mut sessions) = load_records(state, user_id, filter).await?;
  match kind {
    Some(WorkoutKind::Run) => sessions.clear(),
    Some(WorkoutKind::Strength) => runs.clear(),
    None => {}
  }

  let mut rows = workout_rows(&runs, &sessions);
  if let Some(limit) = limit {
    rows.truncate(limit);
  }

  info!(user_id, rows = rows.len(), "Listed workouts");
  Ok(rows)
}
