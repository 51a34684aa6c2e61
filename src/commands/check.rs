use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};

use crate::blank_group::BlankGroup;
use crate::commands::open_exercise;
use crate::crud::DB;
use crate::exercise::Exercise;
use crate::palette::Palette;
use crate::utils::pluralize;

pub async fn run(db: &DB, path: &Path, symbols: Option<String>) -> Result<()> {
    let loaded = open_exercise(db, path, symbols, true).await?;
    let saved_at = db.state_updated_at(&loaded.fingerprint).await?;
    render_plain_summary(path, &loaded.exercise, saved_at);
    Ok(())
}

fn render_plain_summary(path: &Path, exercise: &Exercise, saved_at: Option<DateTime<Utc>>) {
    println!("{}", Palette::paint(Palette::ACCENT, "Exercise Summary"));
    println!(
        "{} {}",
        Palette::dim("File:"),
        Palette::paint(Palette::INFO, path.display())
    );
    println!(
        "{} {}",
        Palette::dim("Symbols:"),
        Palette::paint(Palette::INFO, exercise.alphabet())
    );
    println!(
        "{} {}",
        Palette::dim("Blank groups:"),
        Palette::paint(Palette::INFO, exercise.groups().len())
    );
    println!(
        "{} {}",
        Palette::dim("Max score:"),
        Palette::paint(
            Palette::INFO,
            pluralize("point", exercise.max_score())
        )
    );

    println!("\n{}", Palette::paint(Palette::ACCENT, "Solutions"));
    for line in solution_lines(exercise) {
        println!("{line}");
    }

    println!("\n{}", Palette::paint(Palette::ACCENT, "Saved Progress"));
    match saved_at {
        None => println!("{}", Palette::dim("No answers saved yet.")),
        Some(saved_at) => {
            let score = exercise.score();
            let color = if score.is_passed() {
                Palette::SUCCESS
            } else {
                Palette::WARNING
            };
            println!(
                "{} {}",
                Palette::dim("Last saved:"),
                Palette::paint(
                    Palette::INFO,
                    saved_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                )
            );
            println!(
                "{} {}",
                Palette::dim("Current score:"),
                Palette::paint(color, format!("{}/{}", score.score, score.max_score))
            );
            if let Some(feedback) = exercise.config().overall_feedback(&score) {
                println!("{} {}", Palette::dim("Feedback:"), feedback);
            }
        }
    }
}

/// One line per group that expects at least one symbol.
fn solution_lines(exercise: &Exercise) -> Vec<String> {
    let scored: Vec<(usize, &BlankGroup)> = exercise
        .groups()
        .iter()
        .enumerate()
        .filter(|(_, group)| group.max_score() > 0)
        .collect();

    if scored.is_empty() {
        return vec![Palette::dim("Every blank only holds spaces.")];
    }

    scored
        .into_iter()
        .map(|(index, group)| {
            format!(
                "{} {}",
                Palette::dim(format!("#{}:", index + 1)),
                Palette::paint(Palette::INFO, format!("\"{}\"", group.trimmed_solution()))
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExerciseConfig;

    #[test]
    fn lists_only_groups_holding_symbols() {
        let exercise = Exercise::new(ExerciseConfig::new("Wait... so what? Yes", ".?")).unwrap();
        let lines = solution_lines(&exercise);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"...\""));
        assert!(lines[0].contains("#1:"));
        assert!(lines[1].contains("\"?\""));
        assert!(lines[1].contains("#3:"));
    }

    #[test]
    fn notes_when_nothing_is_scored() {
        let exercise = Exercise::new(ExerciseConfig::new("Hi you", ".")).unwrap();
        let lines = solution_lines(&exercise);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("only holds spaces"));
    }
}
