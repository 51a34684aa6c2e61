use std::path::Path;

use anyhow::{Context, Result};

use crate::commands::open_exercise;
use crate::crud::DB;
use crate::report::Report;

/// Prints the reporting bundle for the saved answers as JSON.
pub async fn run(db: &DB, path: &Path, symbols: Option<String>) -> Result<()> {
    let loaded = open_exercise(db, path, symbols, true).await?;
    let report = Report::from_exercise(&loaded.exercise);
    let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
    println!("{json}");
    Ok(())
}
