use tracing::trace;

use crate::blank::{Blank, Highlight};
use crate::config::{DEFAULT_COLOR_BACKGROUND, SolutionPruning};
use crate::report::{XAPI_BLANK, XAPI_DELIMITER, XAPI_PLACEHOLDER};

/// Presentation tokens and policies shared by every blank of a group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupConfig {
    pub color_background: String,
    pub slim_blanks: bool,
    pub xapi_placeholder: String,
    pub solution_pruning: SolutionPruning,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            color_background: DEFAULT_COLOR_BACKGROUND.to_string(),
            slim_blanks: false,
            xapi_placeholder: XAPI_PLACEHOLDER.to_string(),
            solution_pruning: SolutionPruning::default(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AddBlankOptions {
    /// Number of blanks to append, at least one.
    pub amount: usize,
    /// Answers for the new blanks, the first entry going to the first new
    /// blank. An entry (even `None`) counts as given.
    pub answers: Option<Vec<Option<char>>>,
    /// Pre-fill a new blank with a space when its solution is a space and no
    /// answer was given for it.
    pub provide_default_space: bool,
}

impl AddBlankOptions {
    pub fn amount(amount: usize) -> Self {
        Self {
            amount,
            ..Self::default()
        }
    }

    pub fn with_answers(answers: &[Option<char>]) -> Self {
        Self {
            amount: answers.len(),
            answers: Some(answers.to_vec()),
            provide_default_space: false,
        }
    }

    pub fn default_space() -> Self {
        Self {
            provide_default_space: true,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShowSolutionsOptions {
    pub highlight: Option<Highlight>,
    /// Reveal solutions, growing the group to show every meaningful position.
    pub answer: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResetOptions {
    pub keep_all_blanks: bool,
    pub keep_answered_blanks: bool,
    pub keep_answers: bool,
}

/// The blanks standing in for one blank run of the text.
///
/// A group never holds fewer than one blank. Blanks are only ever appended or
/// popped from the end, so blank `i` is always matched against character `i`
/// of the solution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlankGroup {
    solution: Vec<char>,
    blanks: Vec<Blank>,
    enabled: bool,
    config: GroupConfig,
}

impl BlankGroup {
    pub fn new(solution: &str, config: GroupConfig) -> Self {
        Self::with_state(solution, config, None, false)
    }

    /// Builds the group from saved answers when there are any, otherwise with
    /// one blank per meaningful solution character (`show_all_blanks`) or a
    /// single blank.
    pub fn with_state(
        solution: &str,
        config: GroupConfig,
        previous: Option<&[Option<char>]>,
        show_all_blanks: bool,
    ) -> Self {
        let mut group = Self {
            solution: solution.chars().collect(),
            blanks: Vec::new(),
            enabled: true,
            config,
        };

        match previous.filter(|answers| !answers.is_empty()) {
            Some(answers) => group.add_blank(AddBlankOptions::with_answers(answers)),
            None if show_all_blanks => {
                let amount = group.meaningful_len(SolutionPruning::TrailingSpaces);
                group.add_blank(AddBlankOptions::amount(amount));
            }
            None => group.add_blank(AddBlankOptions::default()),
        }

        group
    }

    pub fn solution(&self) -> String {
        self.solution.iter().collect()
    }

    pub fn trimmed_solution(&self) -> String {
        self.solution().trim().to_string()
    }

    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    pub fn blanks(&self) -> &[Blank] {
        &self.blanks
    }

    pub fn len(&self) -> usize {
        self.blanks.len()
    }

    /// Always false, kept for symmetry with [`BlankGroup::len`].
    pub fn is_empty(&self) -> bool {
        self.blanks.is_empty()
    }

    pub fn add_blank(&mut self, options: AddBlankOptions) {
        let amount = options.amount.max(1);

        for offset in 0..amount {
            let solution = self.solution.get(self.blanks.len()).copied();
            let given = options
                .answers
                .as_ref()
                .and_then(|answers| answers.get(offset).copied());

            let answer = match given {
                Some(answer) => answer,
                None if options.provide_default_space && solution == Some(' ') => Some(' '),
                None => None,
            };

            let mut blank = Blank::new(solution, answer);
            blank.set_enabled(self.enabled);
            self.blanks.push(blank);
        }

        trace!(blanks = self.blanks.len(), "added blanks");
    }

    /// Pops the last blank. Refuses when only one is left.
    pub fn remove_blank(&mut self) -> bool {
        if self.blanks.len() < 2 {
            return false;
        }
        self.blanks.pop();
        true
    }

    /// `None` addresses the last blank; out-of-range indices are clamped.
    pub fn blank(&self, index: Option<usize>) -> &Blank {
        &self.blanks[self.clamp(index)]
    }

    pub fn blank_mut(&mut self, index: Option<usize>) -> &mut Blank {
        let index = self.clamp(index);
        &mut self.blanks[index]
    }

    fn clamp(&self, index: Option<usize>) -> usize {
        index
            .unwrap_or(usize::MAX)
            .min(self.blanks.len().saturating_sub(1))
    }

    /// Number of solution characters that are not spaces.
    pub fn max_score(&self) -> usize {
        self.solution.iter().filter(|ch| **ch != ' ').count()
    }

    /// Sum of the blank scores, never below zero.
    pub fn score(&self) -> usize {
        let raw: i32 = self.blanks.iter().map(Blank::score).sum();
        raw.max(0) as usize
    }

    pub fn answer_given(&self) -> bool {
        self.blanks.iter().any(Blank::has_answer)
    }

    /// Number of blanks needed to show the solution under `pruning`.
    fn meaningful_len(&self, pruning: SolutionPruning) -> usize {
        let len = match pruning {
            SolutionPruning::Keep => self.solution.len(),
            SolutionPruning::TrailingSpaces => self
                .solution
                .iter()
                .rposition(|ch| *ch != ' ')
                .map_or(0, |last| last + 1),
        };
        len.max(1)
    }

    pub fn show_solutions(&mut self, options: ShowSolutionsOptions) {
        if options.answer {
            while self.blanks.len() < self.solution.len() {
                self.add_blank(AddBlankOptions::default());
            }

            let target = self.meaningful_len(self.config.solution_pruning);
            while self.blanks.len() > target && !self.blank(None).has_answer() {
                if !self.remove_blank() {
                    break;
                }
            }
        }

        for blank in &mut self.blanks {
            blank.show_solution(options.highlight, options.answer);
        }
    }

    pub fn reset(&mut self, options: ResetOptions) {
        if !options.keep_all_blanks {
            while self.blanks.len() > 1 {
                if options.keep_answered_blanks && self.blank(None).has_answer() {
                    break;
                }
                self.remove_blank();
            }
        }

        for blank in &mut self.blanks {
            blank.reset(options.keep_answers);
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        for blank in &mut self.blanks {
            blank.set_enabled(enabled);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn current_state(&self) -> Vec<Option<char>> {
        self.blanks.iter().map(Blank::answer).collect()
    }

    fn scored_blanks(&self) -> impl Iterator<Item = &Blank> {
        self.blanks.iter().filter(|blank| blank.score() != 0)
    }

    /// Whether the group contributes to the reporting strings at all.
    pub fn has_scored_blanks(&self) -> bool {
        self.scored_blanks().next().is_some()
    }

    pub fn xapi_correct_responses_pattern(&self) -> String {
        self.scored_blanks()
            .map(|blank| blank.solution().map(String::from).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(XAPI_DELIMITER)
    }

    pub fn xapi_response(&self) -> String {
        self.scored_blanks()
            .filter_map(|blank| blank.answer().map(String::from))
            .collect::<Vec<_>>()
            .join(XAPI_DELIMITER)
    }

    pub fn xapi_gap(&self) -> String {
        self.blanks
            .iter()
            .map(|blank| {
                if blank.score() != 0 {
                    self.config.xapi_placeholder.as_str()
                } else {
                    XAPI_BLANK
                }
            })
            .collect()
    }
}
