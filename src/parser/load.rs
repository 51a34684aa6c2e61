use std::path::Path;

use anyhow::{Context, Result};
use pulldown_cmark::{Options, Parser, html};
use tracing::debug;

use crate::config::RawExerciseConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExerciseFormat {
    /// Options object with `text`, `symbols` and behaviour keys.
    Json,
    /// Text only, rendered to HTML first.
    Markdown,
    /// Text only, used as is.
    Html,
}

impl ExerciseFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => ExerciseFormat::Json,
            Some("md") | Some("markdown") => ExerciseFormat::Markdown,
            _ => ExerciseFormat::Html,
        }
    }
}

pub fn markdown_to_html(md: &str) -> String {
    let parser = Parser::new_ext(md, Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(md.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out.trim_end().to_string()
}

/// Reads an exercise file. Text-only formats yield a config carrying nothing
/// but the text, leaving every option at its default.
pub fn load_exercise(path: &Path) -> Result<RawExerciseConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let format = ExerciseFormat::from_path(path);
    debug!(path = %path.display(), ?format, "loading exercise");

    let raw = match format {
        ExerciseFormat::Json => serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
        ExerciseFormat::Markdown => RawExerciseConfig {
            text: Some(markdown_to_html(&contents)),
            ..RawExerciseConfig::default()
        },
        ExerciseFormat::Html => RawExerciseConfig {
            text: Some(contents.trim_end_matches(['\r', '\n']).to_string()),
            ..RawExerciseConfig::default()
        },
    };
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn format_follows_the_extension() {
        assert_eq!(
            ExerciseFormat::from_path(Path::new("a.JSON")),
            ExerciseFormat::Json
        );
        assert_eq!(
            ExerciseFormat::from_path(Path::new("notes/a.md")),
            ExerciseFormat::Markdown
        );
        assert_eq!(
            ExerciseFormat::from_path(Path::new("a.html")),
            ExerciseFormat::Html
        );
        assert_eq!(
            ExerciseFormat::from_path(Path::new("README")),
            ExerciseFormat::Html
        );
    }

    #[test]
    fn markdown_becomes_paragraphs() {
        assert_eq!(
            markdown_to_html("Hi, *you*.\n\nBye!"),
            "<p>Hi, <em>you</em>.</p>\n<p>Bye!</p>"
        );
    }

    #[test]
    fn loads_json_options() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exercise.json");
        fs::write(
            &path,
            r#"{"text": "Hi, you.", "symbols": ",.", "behaviour": {"slimBlanks": true}}"#,
        )
        .unwrap();

        let raw = load_exercise(&path).unwrap();
        assert_eq!(raw.text.as_deref(), Some("Hi, you."));
        assert_eq!(raw.symbols.as_deref(), Some(",."));
        assert_eq!(raw.behaviour.slim_blanks, Some(true));
    }

    #[test]
    fn loads_markdown_and_html_as_text() {
        let dir = tempdir().unwrap();
        let md = dir.path().join("exercise.md");
        fs::write(&md, "Hi, you.\n").unwrap();
        let raw = load_exercise(&md).unwrap();
        assert_eq!(raw.text.as_deref(), Some("<p>Hi, you.</p>"));
        assert!(raw.symbols.is_none());

        let html = dir.path().join("exercise.html");
        fs::write(&html, "<p>Hi, you.</p>\r\n").unwrap();
        let raw = load_exercise(&html).unwrap();
        assert_eq!(raw.text.as_deref(), Some("<p>Hi, you.</p>"));
    }

    #[test]
    fn reports_missing_and_malformed_files() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = load_exercise(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        let err = load_exercise(&broken).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
