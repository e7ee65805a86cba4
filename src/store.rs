//! Document store for workout logs
//!
//! Each collection (`run_logs`, `strength_sessions`) is a table holding the
//! logged JSON document next to a few columns derived from it at write time:
//! owner, normalized date, feeling and workout type. Reads filter and order on
//! those columns and hand the documents back untouched (plus their `id`);
//! typing them is left to the caller's malformed-record policy.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Feeling, RunRecord, StrengthRecord, WorkoutKind};
use crate::normalize::{detect_kind, FromDocument, NormalizationError};

pub const DEFAULT_FETCH_LIMIT: u32 = 100;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Invalid document JSON: {0}")]
  Document(#[from] serde_json::Error),

  #[error(transparent)]
  Normalization(#[from] NormalizationError),

  #[error("Document {id} not found in {collection}")]
  NotFound { collection: &'static str, id: String },

  #[error("Document must be a JSON object")]
  NotAnObject,
}

/// ---------------------------------------------------------------------------
/// Query Filter
/// ---------------------------------------------------------------------------

/// Optional constraints, AND-combined. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFilter {
  pub date_from: Option<DateTime<Utc>>,
  pub date_to: Option<DateTime<Utc>>,
  pub feeling: Option<Feeling>,
  pub workout_type: Option<String>,
}

/// Stored date format. Fixed width so text comparison orders chronologically.
pub fn format_date(date: DateTime<Utc>) -> String {
  date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// ---------------------------------------------------------------------------
/// Reads
/// ---------------------------------------------------------------------------

/// Run log documents for a user, newest first
pub async fn fetch_runs(
  pool: &SqlitePool,
  user_id: &str,
  filter: &LogFilter,
  limit: u32,
) -> Result<Vec<Value>, StoreError> {
  fetch_documents(pool, WorkoutKind::Run, user_id, filter, limit).await
}

/// Strength session documents for a user, newest first
pub async fn fetch_strength_sessions(
  pool: &SqlitePool,
  user_id: &str,
  filter: &LogFilter,
  limit: u32,
) -> Result<Vec<Value>, StoreError> {
  fetch_documents(pool, WorkoutKind::Strength, user_id, filter, limit).await
}

async fn fetch_documents(
  pool: &SqlitePool,
  kind: WorkoutKind,
  user_id: &str,
  filter: &LogFilter,
  limit: u32,
) -> Result<Vec<Value>, StoreError> {
  let sql = format!(
    r#"
    SELECT id, document
    FROM {}
    WHERE user_id = ?1
      AND (?2 IS NULL OR date >= ?2)
      AND (?3 IS NULL OR date <= ?3)
      AND (?4 IS NULL OR feeling = ?4)
      AND (?5 IS NULL OR workout_type = ?5)
    ORDER BY date DESC, rowid DESC
    LIMIT ?6
    "#,
    kind.collection()
  );

  let rows = sqlx::query(&sql)
    .bind(user_id)
    .bind(filter.date_from.map(format_date))
    .bind(filter.date_to.map(format_date))
    .bind(filter.feeling.map(|f| f.as_str()))
    .bind(filter.workout_type.as_deref())
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

  debug!(collection = kind.collection(), count = rows.len(), "Fetched documents");

  rows.iter().map(document_from_row).collect()
}

/// Fetch one document by id, with its `id` field set
pub async fn get_document(
  pool: &SqlitePool,
  user_id: &str,
  kind: WorkoutKind,
  id: &str,
) -> Result<Value, StoreError> {
  let sql = format!(
    "SELECT id, document FROM {} WHERE user_id = ? AND id = ?",
    kind.collection()
  );

  let row = sqlx::query(&sql)
    .bind(user_id)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::NotFound {
      collection: kind.collection(),
      id: id.to_string(),
    })?;

  document_from_row(&row)
}

fn document_from_row(row: &SqliteRow) -> Result<Value, StoreError> {
  let id: String = row.get("id");
  let document: String = row.get("document");

  let mut fields = into_object(serde_json::from_str(&document)?)?;
  fields.insert("id".to_string(), Value::String(id));
  Ok(Value::Object(fields))
}

fn into_object(value: Value) -> Result<Map<String, Value>, StoreError> {
  match value {
    Value::Object(fields) => Ok(fields),
    _ => Err(StoreError::NotAnObject),
  }
}

/// ---------------------------------------------------------------------------
/// Writes
/// ---------------------------------------------------------------------------

/// Columns derived from a document. Computing them normalizes the document,
/// so nothing unreadable gets stored.
struct IndexedFields {
  date: String,
  feeling: Option<String>,
  workout_type: Option<String>,
}

fn index_fields(kind: WorkoutKind, fields: &Map<String, Value>) -> Result<IndexedFields, StoreError> {
  let doc = Value::Object(fields.clone());

  let found = detect_kind(&doc)?;
  if found != kind {
    return Err(NormalizationError::KindMismatch { expected: kind, found }.into());
  }

  let (date, workout_type) = match kind {
    WorkoutKind::Run => {
      let run = RunRecord::from_document(doc)?;
      (run.date, run.details.run_type)
    }
    WorkoutKind::Strength => {
      let session = StrengthRecord::from_document(doc)?;
      (session.date, session.workout_type)
    }
  };

  Ok(IndexedFields {
    date: format_date(date),
    feeling: fields.get("feeling").and_then(Value::as_str).map(str::to_string),
    workout_type,
  })
}

/// Store a new document. The kind is detected from its fields; an `id` in the
/// document is kept, otherwise one is generated.
pub async fn insert_document(
  pool: &SqlitePool,
  user_id: &str,
  doc: Value,
) -> Result<(WorkoutKind, String), StoreError> {
  let kind = detect_kind(&doc)?;
  let mut fields = into_object(doc)?;

  let id = match fields.remove("id") {
    Some(Value::String(id)) if !id.is_empty() => id,
    _ => {
      sqlx::query_scalar::<_, String>("SELECT lower(hex(randomblob(16)))")
        .fetch_one(pool)
        .await?
    }
  };

  let indexed = index_fields(kind, &fields)?;
  let document = serde_json::to_string(&fields)?;

  let sql = format!(
    r#"
    INSERT INTO {} (id, user_id, date, feeling, workout_type, document)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
    kind.collection()
  );

  sqlx::query(&sql)
    .bind(&id)
    .bind(user_id)
    .bind(&indexed.date)
    .bind(&indexed.feeling)
    .bind(&indexed.workout_type)
    .bind(&document)
    .execute(pool)
    .await?;

  info!(collection = kind.collection(), %id, "Inserted document");
  Ok((kind, id))
}

/// Merge `patch` into a stored document (top-level keys replace) and
/// re-derive its columns. The merged document must still read as `kind`.
/// Returns the updated document.
pub async fn update_document(
  pool: &SqlitePool,
  user_id: &str,
  kind: WorkoutKind,
  id: &str,
  patch: Value,
) -> Result<Value, StoreError> {
  let patch = into_object(patch)?;
  let mut fields = into_object(get_document(pool, user_id, kind, id).await?)?;
  fields.remove("id");

  for (key, value) in patch {
    if key != "id" {
      fields.insert(key, value);
    }
  }

  let indexed = index_fields(kind, &fields)?;
  let document = serde_json::to_string(&fields)?;

  let sql = format!(
    r#"
    UPDATE {}
    SET date = ?1,
        feeling = ?2,
        workout_type = ?3,
        document = ?4,
        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
    WHERE user_id = ?5 AND id = ?6
    "#,
    kind.collection()
  );

  sqlx::query(&sql)
    .bind(&indexed.date)
    .bind(&indexed.feeling)
    .bind(&indexed.workout_type)
    .bind(&document)
    .bind(user_id)
    .bind(id)
    .execute(pool)
    .await?;

  fields.insert("id".to_string(), Value::String(id.to_string()));
  Ok(Value::Object(fields))
}

pub async fn delete_document(
  pool: &SqlitePool,
  user_id: &str,
  kind: WorkoutKind,
  id: &str,
) -> Result<(), StoreError> {
  let sql = format!("DELETE FROM {} WHERE user_id = ? AND id = ?", kind.collection());

  let result = sqlx::query(&sql)
    .bind(user_id)
    .bind(id)
    .execute(pool)
    .await?;

  if result.rows_affected() == 0 {
    return Err(StoreError::NotFound {
      collection: kind.collection(),
      id: id.to_string(),
    });
  }

  info!(collection = kind.collection(), %id, "Deleted document");
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
