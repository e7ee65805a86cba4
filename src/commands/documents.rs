use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::db::AppState;
use crate::models::{Workout, WorkoutKind};
use crate::store;

/// ---------------------------------------------------------------------------
/// Import
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
  pub runs: usize,
  pub strength_sessions: usize,
  pub skipped: usize,
  pub ids: Vec<String>,
}

/// Store exported documents for a user. Unreadable documents abort the import
/// unless the state skips malformed records.
pub async fn import_documents(
  state: &AppState,
  user_id: &str,
  docs: Vec<Value>,
) -> Result<ImportSummary, String> {
  let mut summary = ImportSummary::default();

  for (index, doc) in docs.into_iter().enumerate() {
    match store::insert_document(&state.db, user_id, doc).await {
      Ok((kind, id)) => {
        match kind {
          WorkoutKind::Run => summary.runs += 1,
          WorkoutKind::Strength => summary.strength_sessions += 1,
        }
        summary.ids.push(id);
      }
      Err(e) if state.skip_malformed => {
        warn!(index, error = %e, "Skipping document");
        summary.skipped += 1;
      }
      Err(e) => return Err(format!("Failed to import document {}: {}", index, e)),
    }
  }

  info!(
    user_id,
    runs = summary.runs,
    strength_sessions = summary.strength_sessions,
    skipped = summary.skipped,
    "Imported documents"
  );
  Ok(summary)
}

/// ---------------------------------------------------------------------------
/// Single Documents
/// ---------------------------------------------------------------------------

/// Load and normalize one workout
pub async fn get_workout(
  state: &AppState,
  user_id: &str,
  kind: WorkoutKind,
  id: &str,
) -> Result<Workout, String> {
  let doc = store::get_document(&state.db, user_id, kind, id)
    .await
    .map_err(|e| format!("Failed to load workout: {}", e))?;
  Workout::from_document(kind, doc).map_err(|e| format!("Failed to read workout: {}", e))
}

pub async fn update_workout(
  state: &AppState,
  user_id: &str,
  kind: WorkoutKind,
  id: &str,
  patch: Value,
) -> Result<Workout, String> {
  let doc = store::update_document(&state.db, user_id, kind, id, patch)
    .await
    .map_err(|e| format!("Failed to update workout: {}", e))?;

  info!(user_id, %kind, id, "Updated workout");
  Workout::from_document(kind, doc).map_err(|e| format!("Failed to read workout: {}", e))
}

pub async fn delete_workout(
  state: &AppState,
  user_id: &str,
  kind: WorkoutKind,
  id: &str,
) -> Result<(), String> {
  store::delete_document(&state.db, user_id, kind, id)
    .await
    .map_err(|e| format!("Failed to delete workout: {}", e))
}
