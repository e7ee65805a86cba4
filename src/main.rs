//! `fitlog`: workout log and training insights from the command line
//!
//! Usage:
//! ```bash
//! # 30-day insights for the configured user (FITLOG_USER_ID)
//! fitlog insights
//!
//! # Stats cards as of a fixed instant, as JSON
//! fitlog --user alice --now 2025-06-15T12:00:00Z --json stats
//!
//! # Import an export (JSON array or one document per line)
//! fitlog import runs.json
//! ```

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use fitlog_insights::analysis::{MAX_TREND_DAYS, SESSION_TREND_COUNT};
use fitlog_insights::commands;
use fitlog_insights::config::AppConfig;
use fitlog_insights::db::{self, AppState};
use fitlog_insights::display;
use fitlog_insights::logging::LoggingConfig;
use fitlog_insights::models::{DateValue, Feeling, Workout, WorkoutKind};
use fitlog_insights::normalize::normalize_date;
use fitlog_insights::store::LogFilter;

#[derive(Parser)]
#[command(name = "fitlog", version, about = "Workout log and training insights")]
struct Cli {
  /// User to act for (defaults to FITLOG_USER_ID)
  #[arg(long, global = true)]
  user: Option<String>,

  /// Evaluate as of this instant instead of the current time
  #[arg(long, global = true, value_parser = parse_instant)]
  now: Option<DateTime<Utc>>,

  /// Print JSON instead of text
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Quick insights, monthly summary and recommendations (last 30 days)
  Insights,

  /// Workout, distance, calorie and volume cards (last 7 days)
  Stats,

  /// Recent workouts, newest first
  Workouts {
    /// Only one kind: run or strength
    #[arg(long)]
    kind: Option<WorkoutKind>,

    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Earliest date (inclusive)
    #[arg(long, value_parser = parse_instant)]
    from: Option<DateTime<Utc>>,

    /// Latest date (inclusive)
    #[arg(long, value_parser = parse_instant)]
    to: Option<DateTime<Utc>>,

    #[arg(long)]
    feeling: Option<Feeling>,

    /// Run type or strength workout type
    #[arg(long = "type")]
    workout_type: Option<String>,
  },

  /// Workouts per day
  Trend {
    #[arg(
      long,
      default_value_t = 7,
      value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_TREND_DAYS))
    )]
    days: u32,
  },

  /// Chart data for the most recent sessions of one kind
  Sessions {
    kind: WorkoutKind,

    #[arg(long, default_value_t = SESSION_TREND_COUNT)]
    count: usize,
  },

  /// Import exported documents
  Import { path: PathBuf },

  /// Show one workout
  Show { kind: WorkoutKind, id: String },

  /// Merge a JSON object into a stored workout
  Update {
    kind: WorkoutKind,
    id: String,
    patch: String,
  },

  /// Delete one workout
  Delete { kind: WorkoutKind, id: String },
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
  normalize_date(&DateValue::Text(s.to_string())).map_err(|e| e.to_string())
}

/// A JSON array, or a stream of documents (e.g. one per line)
fn read_documents(path: &Path) -> Result<Vec<Value>, Box<dyn Error>> {
  let content = fs::read_to_string(path)?;
  if content.trim_start().starts_with('[') {
    return Ok(serde_json::from_str(&content)?);
  }

  let docs = serde_json::Deserializer::from_str(&content)
    .into_iter::<Value>()
    .collect::<Result<Vec<_>, _>>()?;
  Ok(docs)
}

fn emit<T: Serialize>(json: bool, value: &T, render: impl FnOnce(&T) -> String) -> Result<(), Box<dyn Error>> {
  if json {
    println!("{}", serde_json::to_string_pretty(value)?);
  } else {
    print!("{}", render(value));
  }
  Ok(())
}

fn render_workout(workout: &Workout) -> String {
  serde_json::to_string_pretty(workout).unwrap_or_default() + "\n"
}

async fn run(
  state: &AppState,
  user_id: &str,
  now: DateTime<Utc>,
  json: bool,
  command: Command,
) -> Result<(), Box<dyn Error>> {
  match command {
    Command::Insights => {
      let insights = commands::get_insights(state, user_id, now).await?;
      emit(json, &insights, display::render_insights)
    }
    Command::Stats => {
      let stats = commands::get_stats_cards(state, user_id, now).await?;
      emit(json, &stats, display::render_stats_cards)
    }
    Command::Workouts {
      kind,
      limit,
      from,
      to,
      feeling,
      workout_type,
    } => {
      let filter = LogFilter {
        date_from: from,
        date_to: to,
        feeling,
        workout_type,
      };
      let rows = commands::get_workouts(state, user_id, &filter, kind, Some(limit)).await?;
      emit(json, &rows, |rows| display::render_workout_rows(rows))
    }
    Command::Trend { days } => {
      let trend = commands::get_workout_trend(state, user_id, now, days).await?;
      emit(json, &trend, |days| display::render_workout_trend(days))
    }
    Command::Sessions { kind, count } => {
      let trend = commands::get_session_trend(state, user_id, kind, count).await?;
      emit(json, &trend, display::render_session_trend)
    }
    Command::Import { path } => {
      let docs = read_documents(&path)?;
      let summary = commands::import_documents(state, user_id, docs).await?;
      emit(json, &summary, |s| {
        format!(
          "Imported {} runs and {} strength sessions ({} skipped)\n",
          s.runs, s.strength_sessions, s.skipped
        )
      })
    }
    Command::Show { kind, id } => {
      let workout = commands::get_workout(state, user_id, kind, &id).await?;
      emit(json, &workout, render_workout)
    }
    Command::Update { kind, id, patch } => {
      let patch: Value = serde_json::from_str(&patch)?;
      let workout = commands::update_workout(state, user_id, kind, &id, patch).await?;
      emit(json, &workout, render_workout)
    }
    Command::Delete { kind, id } => {
      commands::delete_workout(state, user_id, kind, &id).await?;
      emit(json, &id, |id| format!("Deleted {} {}\n", kind, id))
    }
  }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
  dotenvy::dotenv().ok();
  let cli = Cli::parse();

  LoggingConfig::from_env().init()?;

  let config = AppConfig::from_env()?;
  let user_id = config.resolve_user(cli.user.as_deref())?;
  let now = cli.now.unwrap_or_else(Utc::now);

  let pool = db::initialize_db(&config).await?;
  let state = AppState::new(pool, &config);

  let result = run(&state, &user_id, now, cli.json, cli.command).await;
  state.db.close().await;
  result
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_trend_days_are_bounded() {
    let days = |arg: &str| match Cli::try_parse_from(["fitlog", "trend", "--days", arg]) {
      Ok(Cli { command: Command::Trend { days }, .. }) => Some(days),
      _ => None,
    };

    assert_eq!(days("30"), Some(30));
    assert_eq!(days("366"), Some(366));
    assert_eq!(days("0"), None);
    assert_eq!(days("100000000"), None);
  }
}
