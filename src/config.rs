//! Exercise options.
//!
//! Options arrive as a loosely filled [`RawExerciseConfig`] (JSON exercise
//! file, CLI flags) and are merged once into a fully typed [`ExerciseConfig`]
//! by [`apply_defaults`]. Nothing downstream falls back to defaults again.

use serde::{Deserialize, Serialize};

use crate::blank_group::GroupConfig;
use crate::parser::{DeconstructOptions, SymbolAlphabet};
use crate::report::XAPI_PLACEHOLDER;
use crate::scoring::Score;
use crate::state::PersistedState;

pub const DEFAULT_SYMBOLS: &str = ".?!,:;'\"";
pub const DEFAULT_COLOR_BACKGROUND: &str = "#e0e0e0";
pub const DEFAULT_DESCRIPTION: &str = "Pick the Symbols";

/// What revealing the solution does with unanswered trailing blanks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SolutionPruning {
    /// Show one blank per solution character, trailing spaces included.
    Keep,
    /// Drop unanswered blanks that only stand for trailing spaces.
    #[default]
    TrailingSpaces,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBehaviour {
    pub color_background: Option<String>,
    pub slim_blanks: Option<bool>,
    pub show_all_blanks: Option<bool>,
    pub infinite_checking: Option<bool>,
    pub enable_retry: Option<bool>,
    pub enable_solutions_button: Option<bool>,
    pub word_groups: Option<bool>,
    pub solution_pruning: Option<SolutionPruning>,
}

impl RawBehaviour {
    /// Fields set in `self` win over those in `fallback`.
    fn or(self, fallback: RawBehaviour) -> RawBehaviour {
        RawBehaviour {
            color_background: self.color_background.or(fallback.color_background),
            slim_blanks: self.slim_blanks.or(fallback.slim_blanks),
            show_all_blanks: self.show_all_blanks.or(fallback.show_all_blanks),
            infinite_checking: self.infinite_checking.or(fallback.infinite_checking),
            enable_retry: self.enable_retry.or(fallback.enable_retry),
            enable_solutions_button: self
                .enable_solutions_button
                .or(fallback.enable_solutions_button),
            word_groups: self.word_groups.or(fallback.word_groups),
            solution_pruning: self.solution_pruning.or(fallback.solution_pruning),
        }
    }
}

/// Message shown when the score, in whole percent, lies within `from..=to`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackRange {
    pub from: u32,
    pub to: u32,
    pub feedback: String,
}

impl Default for FeedbackRange {
    fn default() -> Self {
        Self {
            from: 0,
            to: 100,
            feedback: String::new(),
        }
    }
}

impl FeedbackRange {
    fn contains(&self, percentage: u32) -> bool {
        (self.from..=self.to).contains(&percentage)
    }
}

/// Options as found in an exercise file. Behaviour switches may be given at
/// the top level or nested under `behaviour`; top-level keys win.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawExerciseConfig {
    pub task_description: Option<String>,
    pub text: Option<String>,
    pub symbols: Option<String>,
    #[serde(flatten)]
    pub flat: RawBehaviour,
    pub behaviour: RawBehaviour,
    pub previous_state: Option<PersistedState>,
    #[serde(rename = "xAPIPlaceholder")]
    pub xapi_placeholder: Option<String>,
    pub overall_feedback: Option<Vec<FeedbackRange>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Behaviour {
    pub color_background: String,
    pub slim_blanks: bool,
    pub show_all_blanks: bool,
    pub infinite_checking: bool,
    pub enable_retry: bool,
    pub enable_solutions_button: bool,
    pub word_groups: bool,
    pub solution_pruning: SolutionPruning,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            color_background: DEFAULT_COLOR_BACKGROUND.to_string(),
            slim_blanks: false,
            show_all_blanks: false,
            infinite_checking: true,
            enable_retry: true,
            enable_solutions_button: true,
            word_groups: true,
            solution_pruning: SolutionPruning::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExerciseConfig {
    pub task_description: String,
    pub text: String,
    pub symbols: SymbolAlphabet,
    pub behaviour: Behaviour,
    pub previous_state: Option<PersistedState>,
    pub xapi_placeholder: String,
    pub overall_feedback: Vec<FeedbackRange>,
}

impl ExerciseConfig {
    pub fn new(text: impl Into<String>, symbols: &str) -> Self {
        apply_defaults(RawExerciseConfig {
            text: Some(text.into()),
            symbols: Some(symbols.to_string()),
            ..RawExerciseConfig::default()
        })
    }

    pub fn description(&self) -> &str {
        if self.task_description.trim().is_empty() {
            DEFAULT_DESCRIPTION
        } else {
            &self.task_description
        }
    }

    /// Feedback of the first range holding the score's percentage. Ranges
    /// with empty text give nothing.
    pub fn overall_feedback(&self, score: &Score) -> Option<&str> {
        let percentage = score.percentage();
        self.overall_feedback
            .iter()
            .find(|range| range.contains(percentage))
            .map(|range| range.feedback.trim())
            .filter(|feedback| !feedback.is_empty())
    }

    pub fn group_config(&self) -> GroupConfig {
        GroupConfig {
            color_background: self.behaviour.color_background.clone(),
            slim_blanks: self.behaviour.slim_blanks,
            xapi_placeholder: self.xapi_placeholder.clone(),
            solution_pruning: self.behaviour.solution_pruning,
        }
    }

    pub fn deconstruct_options(&self) -> DeconstructOptions {
        DeconstructOptions {
            word_groups: self.behaviour.word_groups,
        }
    }
}

/// Merges `raw` over the defaults. Pure: the same input always yields the
/// same configuration.
pub fn apply_defaults(raw: RawExerciseConfig) -> ExerciseConfig {
    let defaults = Behaviour::default();
    let behaviour = raw.flat.or(raw.behaviour);

    ExerciseConfig {
        task_description: raw.task_description.unwrap_or_default(),
        text: raw.text.unwrap_or_default(),
        symbols: SymbolAlphabet::new(raw.symbols.as_deref().unwrap_or(DEFAULT_SYMBOLS)),
        behaviour: Behaviour {
            color_background: behaviour
                .color_background
                .unwrap_or(defaults.color_background),
            slim_blanks: behaviour.slim_blanks.unwrap_or(defaults.slim_blanks),
            show_all_blanks: behaviour.show_all_blanks.unwrap_or(defaults.show_all_blanks),
            infinite_checking: behaviour
                .infinite_checking
                .unwrap_or(defaults.infinite_checking),
            enable_retry: behaviour.enable_retry.unwrap_or(defaults.enable_retry),
            enable_solutions_button: behaviour
                .enable_solutions_button
                .unwrap_or(defaults.enable_solutions_button),
            word_groups: behaviour.word_groups.unwrap_or(defaults.word_groups),
            solution_pruning: behaviour
                .solution_pruning
                .unwrap_or(defaults.solution_pruning),
        },
        previous_state: raw.previous_state.filter(|state| !state.is_empty()),
        xapi_placeholder: raw
            .xapi_placeholder
            .filter(|placeholder| !placeholder.is_empty())
            .unwrap_or_else(|| XAPI_PLACEHOLDER.to_string()),
        overall_feedback: raw.overall_feedback.unwrap_or_default(),
    }
}
