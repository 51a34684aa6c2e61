use html_escape::decode_html_entities;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::blank_group::BlankGroup;
use crate::exercise::{BlankRef, Exercise};
use crate::palette::Palette;
use crate::parser::{NBSP, Segment, ZERO_WIDTH_SPACE};
use crate::tui::Theme;

/// Lays the exercise out as styled terminal lines: paragraphs become lines,
/// inline emphasis becomes modifiers and every blank group becomes one span
/// per blank.
pub fn exercise_text(exercise: &Exercise, focus: Option<BlankRef>) -> Text<'static> {
    let background = Palette::parse_hex(&exercise.config().behaviour.color_background)
        .unwrap_or(Color::Gray);
    let mut writer = LineWriter::default();

    for segment in exercise.template().segments() {
        match segment {
            Segment::Text(text) => writer.push_text(text),
            Segment::Markup(markup) => writer.push_markup(markup),
            Segment::Placeholder(index) => {
                if let Ok(group) = exercise.group(*index) {
                    writer.push_group(group, *index, focus, background);
                }
            }
            Segment::WordGroup { word, placeholder } => {
                writer.push_text(word);
                if let Ok(group) = exercise.group(*placeholder) {
                    writer.push_group(group, *placeholder, focus, background);
                }
            }
        }
    }

    writer.finish()
}

#[derive(Default)]
struct LineWriter {
    lines: Vec<Line<'static>>,
    current_line: Vec<Span<'static>>,
    styles: Vec<Style>,
    pending_prefix: Option<String>,
}

impl LineWriter {
    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_text(&mut self, text: &str) {
        let decoded = decode_html_entities(text).replace([NBSP], " ");
        let mut parts = decoded.split('\n').peekable();
        while let Some(part) = parts.next() {
            let part: String = part.chars().filter(|ch| *ch != ZERO_WIDTH_SPACE).collect();
            if !part.is_empty() {
                self.apply_prefix();
                self.current_line.push(Span::styled(part, self.style()));
            }
            if parts.peek().is_some() {
                self.flush_line();
            }
        }
    }

    fn push_markup(&mut self, markup: &str) {
        let Some((name, closing)) = tag_name(markup) else {
            return;
        };
        match (name.as_str(), closing) {
            ("strong" | "b", false) => self.push_style(Modifier::BOLD),
            ("em" | "i", false) => self.push_style(Modifier::ITALIC),
            ("u", false) => self.push_style(Modifier::UNDERLINED),
            ("strong" | "b" | "em" | "i" | "u", true) => {
                self.styles.pop();
            }
            ("li", false) => {
                self.flush_line();
                self.pending_prefix = Some("• ".to_string());
            }
            ("br", _) => {
                let was_empty = self.current_line.is_empty();
                self.flush_line();
                if was_empty {
                    self.lines.push(Line::default());
                }
            }
            ("p" | "div" | "li" | "blockquote" | "pre" | "tr", true)
            | ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", true) => {
                self.flush_line();
                self.pending_prefix = None;
            }
            ("p" | "div" | "ul" | "ol" | "blockquote" | "pre" | "table", false)
            | ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", false) => self.flush_line(),
            _ => {}
        }
    }

    fn push_group(
        &mut self,
        group: &BlankGroup,
        group_index: usize,
        focus: Option<BlankRef>,
        background: Color,
    ) {
        self.apply_prefix();
        let slim = group.config().slim_blanks;
        for (blank_index, blank) in group.blanks().iter().enumerate() {
            let focused = focus
                == Some(BlankRef {
                    group: group_index,
                    blank: blank_index,
                });
            let glyph = match blank.glyph() {
                NBSP => ' ',
                other => other,
            };
            let content = if slim {
                glyph.to_string()
            } else {
                format!("[{glyph}]")
            };
            let style = Theme::blank(blank.mark(), focused, blank.is_solution_shown(), background);
            self.current_line.push(Span::styled(content, style));
        }
    }

    fn push_style(&mut self, modifier: Modifier) {
        let style = self.style().add_modifier(modifier);
        self.styles.push(style);
    }

    fn apply_prefix(&mut self) {
        if let Some(prefix) = self.pending_prefix.take() {
            self.current_line.push(Span::raw(prefix));
        }
    }

    fn flush_line(&mut self) {
        if self.current_line.is_empty() {
            return;
        }
        self.lines
            .push(Line::from(std::mem::take(&mut self.current_line)));
    }

    fn finish(mut self) -> Text<'static> {
        self.flush_line();
        Text::from(self.lines)
    }
}

/// Lowercased element name and whether the tag closes it. Comments and
/// declarations have no name.
fn tag_name(markup: &str) -> Option<(String, bool)> {
    let inner = markup.strip_prefix('<')?;
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name: String = inner
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect();
    if name.is_empty() {
        None
    } else {
        Some((name, closing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExerciseConfig, RawExerciseConfig, apply_defaults};
    use crate::exercise::{ChooserOption, Interaction};

    fn flatten(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.to_string())
                    .collect::<String>()
            })
            .collect()
    }

    fn exercise(text: &str) -> Exercise {
        Exercise::new(ExerciseConfig::new(text, ",.!")).unwrap()
    }

    #[test]
    fn blanks_replace_the_symbols() {
        let exercise = exercise("Hi, you.");
        let text = exercise_text(&exercise, None);
        assert_eq!(flatten(&text), vec!["Hi[ ]you[ ]"]);
    }

    #[test]
    fn answers_and_focus_are_drawn() {
        let mut exercise = exercise("Hi, you.");
        exercise
            .handle(Interaction::OpenChooser(BlankRef { group: 0, blank: 0 }))
            .unwrap();
        exercise
            .handle(Interaction::Pick(ChooserOption::Symbol(',')))
            .unwrap();

        let focus = BlankRef { group: 1, blank: 0 };
        let text = exercise_text(&exercise, Some(focus));
        assert_eq!(flatten(&text), vec!["Hi[,]you[ ]"]);

        let focused = &text.lines[0].spans[3];
        assert!(focused.style.add_modifier.contains(Modifier::REVERSED));
        let unfocused = &text.lines[0].spans[1];
        assert!(!unfocused.style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn paragraphs_and_breaks_become_lines() {
        let exercise = exercise("<p>Hi, <em>you</em>.</p><p>Bye!</p>");
        let text = exercise_text(&exercise, None);
        assert_eq!(flatten(&text), vec!["Hi[ ]you[ ]", "Bye[ ]"]);

        let italic = text.lines[0]
            .spans
            .iter()
            .find(|span| span.content == "you")
            .unwrap();
        assert!(italic.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn entities_are_decoded_for_display() {
        let exercise = exercise("Tom &amp; Jerry!");
        let text = exercise_text(&exercise, None);
        assert_eq!(flatten(&text), vec!["Tom[ ]&[ ]Jerry[ ]"]);
    }

    #[test]
    fn slim_blanks_drop_the_brackets() {
        let raw: RawExerciseConfig =
            serde_json::from_str(r#"{"text": "Hi, you.", "symbols": ",.", "slimBlanks": true}"#)
                .unwrap();
        let exercise = Exercise::new(apply_defaults(raw)).unwrap();
        let text = exercise_text(&exercise, None);
        assert_eq!(flatten(&text), vec!["Hi you "]);
    }

    #[test]
    fn list_items_get_bullets() {
        let exercise = exercise("<ul><li>One.</li><li>Two!</li></ul>");
        let text = exercise_text(&exercise, None);
        assert_eq!(flatten(&text), vec!["• One[ ]", "• Two[ ]"]);
    }

    #[test]
    fn tag_names_are_read_case_insensitively() {
        assert_eq!(tag_name("<P class=\"x\">"), Some(("p".into(), false)));
        assert_eq!(tag_name("</em>"), Some(("em".into(), true)));
        assert_eq!(tag_name("<!-- note -->"), None);
    }
}
