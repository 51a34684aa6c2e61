use crate::blank::Mark;
use crate::palette::Palette;

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders},
};

/// Centralized color palette and helpers for a consistent TUI look.
pub struct Theme;

impl Theme {
    pub const KEY_FG: Color = Color::Rgb(255, 255, 255);
    pub const BLANK_FG: Color = Color::Rgb(0, 0, 0);

    pub fn label() -> Style {
        Style::default()
            .fg(Palette::ACCENT.tui())
            .add_modifier(Modifier::BOLD)
    }

    pub fn success() -> Style {
        Style::default()
            .fg(Palette::SUCCESS.tui())
            .add_modifier(Modifier::BOLD)
    }

    pub fn danger() -> Style {
        Style::default()
            .fg(Palette::WARNING.tui())
            .add_modifier(Modifier::BOLD)
    }

    pub fn emphasis() -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    /// Style of one blank. Marks override the background so verdicts stay
    /// readable on any exercise color.
    pub fn blank(mark: Mark, focused: bool, solution_shown: bool, background: Color) -> Style {
        let mut style = match mark {
            Mark::None => Style::default().fg(Self::BLANK_FG).bg(background),
            Mark::Correct => Style::default()
                .fg(Self::KEY_FG)
                .bg(Palette::SUCCESS.tui()),
            Mark::Wrong => Style::default().fg(Self::KEY_FG).bg(Palette::DANGER.tui()),
        };
        if focused {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        if solution_shown {
            style = style.add_modifier(Modifier::ITALIC);
        }
        style
    }

    pub fn backdrop<'a>() -> Block<'a> {
        Block::default()
    }

    pub fn panel_with_line<'a>(title: Line<'a>) -> Block<'a> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Palette::BORDER.tui()))
            .title(title)
            .title_alignment(Alignment::Left)
    }

    pub fn label_span(text: impl Into<String>) -> Span<'static> {
        Span::styled(text.into(), Self::label())
    }

    pub fn span(text: impl Into<String>) -> Span<'static> {
        Span::raw(text.into())
    }

    pub fn key_chip(text: impl Into<String>) -> Span<'static> {
        Span::styled(
            format!(" {} ", text.into()),
            Style::default()
                .fg(Self::KEY_FG)
                .bg(Palette::ACCENT.tui())
                .add_modifier(Modifier::BOLD),
        )
    }

    pub fn bullet() -> Span<'static> {
        Self::span(" • ")
    }

    pub fn section_header(text: impl Into<String>) -> Line<'static> {
        Line::from(vec![Span::styled(text.into(), Self::emphasis())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_win_over_the_background() {
        let background = Color::Rgb(224, 224, 224);
        assert_eq!(
            Theme::blank(Mark::None, false, false, background).bg,
            Some(background)
        );
        assert_eq!(
            Theme::blank(Mark::Wrong, false, false, background).bg,
            Some(Palette::DANGER.tui())
        );
    }

    #[test]
    fn focus_and_revealed_solutions_are_visible() {
        let style = Theme::blank(Mark::Correct, true, true, Color::Reset);
        assert!(style.add_modifier.contains(Modifier::REVERSED));
        assert!(style.add_modifier.contains(Modifier::ITALIC));
    }
}
