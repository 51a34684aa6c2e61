use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::commands::open_exercise;
use crate::crud::DB;
use crate::exercise::{BlankRef, ChooserOption, Exercise, Interaction};
use crate::scoring::Score;
use crate::tui::{Theme, exercise_text};
use crate::utils::pluralize;

use anyhow::{Context, Result};
use crossterm::event::{KeyEvent, KeyModifiers};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use tracing::info;

const FLASH_SECS: f64 = 2.0;

pub async fn run(db: &DB, path: &Path, symbols: Option<String>, fresh: bool) -> Result<()> {
    let loaded = open_exercise(db, path, symbols, !fresh).await?;
    let state = DrillState::new(loaded.exercise);

    let state = start_drill_session(state)?;

    db.save_state(&loaded.fingerprint, &state.exercise.current_state())
        .await
        .context("Failed to save answers")?;

    let score = state.exercise.score();
    println!(
        "Saved answers. Score {}/{}.",
        score.score,
        pluralize("point", score.max_score)
    );
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Quit,
}

struct Flash {
    message: String,
    shown_at: Instant,
}

struct DrillState {
    exercise: Exercise,
    focus: usize,
    last_score: Option<Score>,
    flash: Option<Flash>,
}

impl DrillState {
    fn new(exercise: Exercise) -> Self {
        Self {
            exercise,
            focus: 0,
            last_score: None,
            flash: None,
        }
    }

    fn blank_refs(&self) -> Vec<BlankRef> {
        self.exercise.blank_refs()
    }

    fn focused(&self) -> Option<BlankRef> {
        let refs = self.blank_refs();
        refs.get(self.focus.min(refs.len().saturating_sub(1))).copied()
    }

    fn move_focus(&mut self, forward: bool) {
        let len = self.blank_refs().len();
        if len == 0 {
            return;
        }
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
    }

    fn focus_on(&mut self, target: BlankRef) {
        if let Some(index) = self.blank_refs().iter().position(|r| *r == target) {
            self.focus = index;
        }
    }

    fn flash(&mut self, message: impl Into<String>) {
        self.flash = Some(Flash {
            message: message.into(),
            shown_at: Instant::now(),
        });
    }

    fn is_checked(&self) -> bool {
        !self.exercise.is_enabled()
    }

    fn is_passed(&self) -> bool {
        self.last_score.is_some_and(|score| score.is_passed())
    }

    fn can_continue(&self) -> bool {
        self.is_checked() && self.exercise.config().behaviour.infinite_checking && !self.is_passed()
    }

    fn can_show_solutions(&self) -> bool {
        self.is_checked()
            && self.exercise.config().behaviour.enable_solutions_button
            && !self.is_passed()
            && !self.exercise.is_solution_showing()
    }

    fn can_retry(&self) -> bool {
        self.is_checked() && self.exercise.config().behaviour.enable_retry
    }

    fn fill(&mut self, option: ChooserOption) -> Result<()> {
        let Some(target) = self.focused() else {
            return Ok(());
        };
        self.exercise.handle(Interaction::OpenChooser(target))?;
        self.exercise.handle(Interaction::Pick(option))?;
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<KeyOutcome> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return Ok(KeyOutcome::Quit),
            KeyCode::Char('c') if ctrl => return Ok(KeyOutcome::Quit),
            KeyCode::Tab | KeyCode::Right => self.move_focus(true),
            KeyCode::BackTab | KeyCode::Left => self.move_focus(false),
            _ if self.is_checked() => self.handle_checked_key(key.code, ctrl),
            _ => self.handle_editing_key(key.code, ctrl)?,
        }
        Ok(KeyOutcome::Continue)
    }

    fn handle_editing_key(&mut self, code: KeyCode, ctrl: bool) -> Result<()> {
        match code {
            KeyCode::Enter => {
                let score = self.exercise.check_answers();
                self.last_score = Some(score);
            }
            KeyCode::Char('a') if ctrl => {
                if let Some(target) = self.focused() {
                    self.exercise
                        .handle(Interaction::AddBlank { group: target.group })?;
                    let last = self.exercise.group(target.group)?.len() - 1;
                    self.focus_on(BlankRef {
                        group: target.group,
                        blank: last,
                    });
                }
            }
            KeyCode::Char('r') if ctrl => {
                if let Some(target) = self.focused() {
                    self.exercise
                        .handle(Interaction::RemoveBlank { group: target.group })?;
                    let last = self.exercise.group(target.group)?.len() - 1;
                    self.focus_on(BlankRef {
                        group: target.group,
                        blank: target.blank.min(last),
                    });
                }
            }
            KeyCode::Backspace | KeyCode::Delete => self.fill(ChooserOption::Clear)?,
            KeyCode::Char(' ') => self.fill(ChooserOption::Space)?,
            KeyCode::Char(symbol) if !ctrl => {
                if self.exercise.alphabet().contains(symbol) {
                    self.fill(ChooserOption::Symbol(symbol))?;
                } else {
                    self.flash(format!("'{symbol}' is not one of the symbols"));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_checked_key(&mut self, code: KeyCode, ctrl: bool) {
        match code {
            KeyCode::Enter if self.can_continue() => {
                self.exercise.continue_editing();
                self.last_score = None;
            }
            KeyCode::Char('s') if ctrl && self.can_show_solutions() => {
                self.exercise.show_solutions();
            }
            KeyCode::Char('t') if ctrl && self.can_retry() => {
                self.exercise.retry();
                self.last_score = None;
                self.focus = 0;
                info!("retrying exercise");
            }
            _ => {}
        }
    }
}

fn start_drill_session(mut state: DrillState) -> Result<DrillState> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                | KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        )
    )
    .context("failed to configure terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to start terminal")?;
    terminal.hide_cursor().context("failed to hide cursor")?;

    let loop_result = (|| -> Result<()> {
        loop {
            terminal
                .draw(|frame| {
                    let area = frame.area();
                    frame.render_widget(Theme::backdrop(), area);
                    let chunks = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([Constraint::Min(5), Constraint::Length(5)])
                        .split(area);

                    let exercise_widget =
                        Paragraph::new(exercise_text(&state.exercise, state.focused()))
                            .block(Theme::panel_with_line(header_line(&state)))
                            .wrap(Wrap { trim: false });
                    frame.render_widget(exercise_widget, chunks[0]);

                    let footer = Paragraph::new(instructions_text(&state))
                        .block(Theme::panel_with_line(Theme::section_header("Controls")));
                    frame.render_widget(footer, chunks[1]);
                })
                .context("failed to render frame")?;

            if event::poll(Duration::from_millis(16))?
                && let Event::Key(key) = event::read()?
            {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if state.handle_key(key)? == KeyOutcome::Quit {
                    break Ok(());
                }
            }
        }
    })();

    teardown_terminal(&mut terminal)?;

    loop_result.map(|()| state)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        PopKeyboardEnhancementFlags,
        LeaveAlternateScreen
    )
    .context("failed to restore terminal")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

fn header_line(state: &DrillState) -> Line<'static> {
    let total = state.blank_refs().len();
    let mut spans = vec![
        Theme::label_span(format!(" {} ", state.exercise.config().description())),
        Theme::bullet(),
        Theme::span(format!("Blank {}/{}", (state.focus + 1).min(total), total)),
    ];
    if let Some(target) = state.focused() {
        spans.push(Theme::bullet());
        spans.push(Theme::span(format!("Group {}", target.group + 1)));
    }
    Line::from(spans)
}

fn instructions_text(state: &DrillState) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if state.is_checked() {
        let mut line = Vec::new();
        if let Some(score) = state.last_score {
            let style = if score.is_passed() {
                Theme::success()
            } else {
                Theme::danger()
            };
            line.push(Span::styled(
                format!("Score {}/{}", score.score, score.max_score),
                style,
            ));
        }
        if state.can_continue() {
            line.push(Theme::bullet());
            line.push(Theme::key_chip("Enter"));
            line.push(Theme::span(" continue"));
        }
        if state.can_show_solutions() {
            line.push(Theme::bullet());
            line.push(Theme::key_chip("Ctrl+S"));
            line.push(Theme::span(" show solutions"));
        }
        if state.can_retry() {
            line.push(Theme::bullet());
            line.push(Theme::key_chip("Ctrl+T"));
            line.push(Theme::span(" retry"));
        }
        line.push(Theme::bullet());
        line.push(Theme::key_chip("Esc"));
        line.push(Theme::span(" save & exit"));
        lines.push(Line::from(line));

        if let Some(feedback) = state
            .last_score
            .and_then(|score| state.exercise.config().overall_feedback(&score))
        {
            lines.push(Line::from(Span::styled(
                feedback.to_string(),
                Theme::emphasis(),
            )));
        }
    } else {
        lines.push(Line::from(vec![
            Theme::key_chip("Tab"),
            Theme::span(" next blank"),
            Theme::bullet(),
            Theme::key_chip(state.exercise.alphabet().to_string()),
            Theme::span(" / "),
            Theme::key_chip("Space"),
            Theme::span(" fill"),
            Theme::bullet(),
            Theme::key_chip("Backspace"),
            Theme::span(" clear"),
        ]));
        lines.push(Line::from(vec![
            Theme::key_chip("Ctrl+A"),
            Theme::span(" add blank"),
            Theme::bullet(),
            Theme::key_chip("Ctrl+R"),
            Theme::span(" remove blank"),
            Theme::bullet(),
            Theme::key_chip("Enter"),
            Theme::span(" check"),
            Theme::bullet(),
            Theme::key_chip("Esc"),
            Theme::span(" save & exit"),
        ]));
    }

    if let Some(flash) = &state.flash
        && flash.shown_at.elapsed().as_secs_f64() < FLASH_SECS
    {
        lines.push(Line::from(Span::styled(
            flash.message.clone(),
            Theme::danger(),
        )));
    }

    lines
}
