use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::{info, warn};

use crate::state::PersistedState;

use super::DB;

impl DB {
    /// Stores `state` under `exercise_hash`, replacing earlier answers.
    pub async fn save_state(&self, exercise_hash: &str, state: &PersistedState) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let answers = state.to_json().context("Failed to encode answers")?;

        sqlx::query(
            r#"
            INSERT INTO exercise_state (exercise_hash, answers, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (exercise_hash)
            DO UPDATE SET answers = EXCLUDED.answers, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(exercise_hash)
        .bind(answers)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(exercise_hash, groups = state.answers.len(), "saved answers");
        Ok(())
    }

    /// Saved answers, if any. A row that no longer parses is treated as
    /// missing.
    pub async fn load_state(&self, exercise_hash: &str) -> Result<Option<PersistedState>> {
        let row = sqlx::query("SELECT answers FROM exercise_state WHERE exercise_hash = ?")
            .bind(exercise_hash)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let answers: String = row.try_get("answers")?;

        match PersistedState::from_json(&answers) {
            Ok(state) => Ok(Some(state)),
            Err(err) => {
                warn!(exercise_hash, %err, "ignoring unreadable saved answers");
                Ok(None)
            }
        }
    }

    /// Returns whether anything was removed.
    pub async fn clear_state(&self, exercise_hash: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM exercise_state WHERE exercise_hash = ?")
            .bind(exercise_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn state_updated_at(&self, exercise_hash: &str) -> Result<Option<DateTime<Utc>>> {
        let updated_at: Option<String> =
            sqlx::query_scalar("SELECT updated_at FROM exercise_state WHERE exercise_hash = ?")
                .bind(exercise_hash)
                .fetch_optional(&self.pool)
                .await?;

        updated_at
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|parsed| parsed.with_timezone(&Utc))
                    .with_context(|| format!("Invalid timestamp {raw}"))
            })
            .transpose()
    }
}
