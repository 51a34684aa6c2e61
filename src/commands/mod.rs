pub mod check;
pub mod drill;
pub mod forget;
pub mod report;

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::info;

use crate::config::{ExerciseConfig, apply_defaults};
use crate::crud::DB;
use crate::exercise::Exercise;
use crate::parser::{exercise_fingerprint, load_exercise};

/// An exercise read from disk together with the key its answers are saved
/// under.
pub struct LoadedExercise {
    pub exercise: Exercise,
    pub fingerprint: String,
}

/// Loads the file at `path`, lets `symbols` override its alphabet and resumes
/// from the saved answers when `restore` is set. Saved answers take priority
/// over a `previousState` written into the file.
pub async fn open_exercise(
    db: &DB,
    path: &Path,
    symbols: Option<String>,
    restore: bool,
) -> Result<LoadedExercise> {
    let (mut config, fingerprint) = read_config(path, symbols)?;

    if restore && let Some(state) = db.load_state(&fingerprint).await? {
        info!(path = %path.display(), "resuming saved answers");
        config.previous_state = Some(state);
    }

    let exercise = Exercise::new(config)
        .with_context(|| format!("Failed to prepare {}", path.display()))?;
    Ok(LoadedExercise {
        exercise,
        fingerprint,
    })
}

pub fn read_config(path: &Path, symbols: Option<String>) -> Result<(ExerciseConfig, String)> {
    let mut raw = load_exercise(path)?;
    if symbols.is_some() {
        raw.symbols = symbols;
    }
    let config = apply_defaults(raw);

    let fingerprint = exercise_fingerprint(&config.text, &config.symbols)
        .ok_or_else(|| anyhow!("{} has no text or no symbols to practise", path.display()))?;
    Ok((config, fingerprint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PersistedState;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn saved_answers_are_restored() {
        let db = DB::new_in_memory().await.unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("exercise.txt");
        fs::write(&path, "Hi, you.").unwrap();

        let loaded = open_exercise(&db, &path, Some(",.".into()), true)
            .await
            .unwrap();
        assert_eq!(loaded.exercise.groups().len(), 2);

        let state = PersistedState::new(vec![vec![Some(','), Some(' ')], vec![None]]);
        db.save_state(&loaded.fingerprint, &state).await.unwrap();

        let resumed = open_exercise(&db, &path, Some(",.".into()), true)
            .await
            .unwrap();
        assert_eq!(resumed.exercise.current_state(), state);

        let fresh = open_exercise(&db, &path, Some(",.".into()), false)
            .await
            .unwrap();
        assert_eq!(
            fresh.exercise.current_state(),
            PersistedState::new(vec![vec![None], vec![None]])
        );
    }

    #[tokio::test]
    async fn symbols_flag_changes_the_exercise() {
        let db = DB::new_in_memory().await.unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("exercise.json");
        fs::write(&path, r#"{"text": "Hi, you.", "symbols": ","}"#).unwrap();

        let from_file = open_exercise(&db, &path, None, false).await.unwrap();
        let overridden = open_exercise(&db, &path, Some(",.".into()), false)
            .await
            .unwrap();
        assert_eq!(from_file.exercise.max_score(), 1);
        assert_eq!(overridden.exercise.max_score(), 2);
        assert_ne!(from_file.fingerprint, overridden.fingerprint);
    }

    #[test]
    fn empty_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.html");
        fs::write(&path, "").unwrap();
        assert!(read_config(&path, None).is_err());
    }

    #[tokio::test]
    async fn space_only_file_is_an_exercise() {
        let db = DB::new_in_memory().await.unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("spaces.html");
        fs::write(&path, "   ").unwrap();

        let loaded = open_exercise(&db, &path, Some(",".into()), true)
            .await
            .unwrap();
        assert_eq!(loaded.exercise.groups().len(), 1);
        assert_eq!(loaded.exercise.max_score(), 0);
    }
}
