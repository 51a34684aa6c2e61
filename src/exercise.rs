//! Coordination of all blank groups of one exercise.
//!
//! The presentation layer never mutates groups directly while the exercise is
//! running: it sends [`Interaction`] messages to [`Exercise::handle`], which
//! keeps track of the single open chooser and ignores input while disabled.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::blank::Highlight;
use crate::blank_group::{AddBlankOptions, BlankGroup, ResetOptions, ShowSolutionsOptions};
use crate::config::ExerciseConfig;
use crate::parser::{
    DeconstructError, Deconstruction, SymbolAlphabet, Template, deconstruct_with,
    exercise_fingerprint,
};
use crate::report::XAPI_DELIMITER;
use crate::scoring::Score;
use crate::state::PersistedState;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExerciseError {
    #[error(transparent)]
    Deconstruct(#[from] DeconstructError),
    #[error("no blank group {index}, the exercise has {len}")]
    UnknownGroup { index: usize, len: usize },
}

/// Address of one blank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlankRef {
    pub group: usize,
    pub blank: usize,
}

/// An entry of the symbol chooser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChooserOption {
    Symbol(char),
    /// Deliberately leave the position as a space.
    Space,
    Clear,
}

impl ChooserOption {
    pub fn answer(self) -> Option<char> {
        match self {
            ChooserOption::Symbol(symbol) => Some(symbol),
            ChooserOption::Space => Some(' '),
            ChooserOption::Clear => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    OpenChooser(BlankRef),
    Pick(ChooserOption),
    AddBlank { group: usize },
    RemoveBlank { group: usize },
    /// Close the chooser without picking, e.g. outside click or Escape.
    Dismiss,
}

pub struct Exercise {
    config: ExerciseConfig,
    deconstruction: Deconstruction,
    groups: Vec<BlankGroup>,
    open_blank: Option<BlankRef>,
    enabled: bool,
    solution_showing: bool,
}

impl Exercise {
    /// Deconstructs the text and creates one group per placeholder, restoring
    /// `previous_state` when it matches the placeholders.
    pub fn new(config: ExerciseConfig) -> Result<Self, ExerciseError> {
        let deconstruction =
            deconstruct_with(&config.text, &config.symbols, config.deconstruct_options())?;

        let previous = config
            .previous_state
            .as_ref()
            .filter(|state| usable_state(state, deconstruction.len()));
        if let Some(previous) = previous {
            info!(groups = previous.answers.len(), "restoring previous answers");
        }

        let group_config = config.group_config();
        let groups = deconstruction
            .solutions
            .iter()
            .enumerate()
            .map(|(index, solution)| {
                BlankGroup::with_state(
                    solution,
                    group_config.clone(),
                    previous.and_then(|state| state.group(index)),
                    config.behaviour.show_all_blanks,
                )
            })
            .collect();

        Ok(Self {
            config,
            deconstruction,
            groups,
            open_blank: None,
            enabled: true,
            solution_showing: false,
        })
    }

    pub fn config(&self) -> &ExerciseConfig {
        &self.config
    }

    pub fn alphabet(&self) -> &SymbolAlphabet {
        &self.config.symbols
    }

    pub fn template(&self) -> &Template {
        &self.deconstruction.template
    }

    pub fn deconstruction(&self) -> &Deconstruction {
        &self.deconstruction
    }

    pub fn fingerprint(&self) -> Option<String> {
        exercise_fingerprint(&self.config.text, &self.config.symbols)
    }

    pub fn groups(&self) -> &[BlankGroup] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Result<&BlankGroup, ExerciseError> {
        let len = self.groups.len();
        self.groups
            .get(index)
            .ok_or(ExerciseError::UnknownGroup { index, len })
    }

    fn group_mut(&mut self, index: usize) -> Result<&mut BlankGroup, ExerciseError> {
        let len = self.groups.len();
        self.groups
            .get_mut(index)
            .ok_or(ExerciseError::UnknownGroup { index, len })
    }

    /// Every blank in reading order.
    pub fn blank_refs(&self) -> Vec<BlankRef> {
        self.groups
            .iter()
            .enumerate()
            .flat_map(|(group, blanks)| (0..blanks.len()).map(move |blank| BlankRef { group, blank }))
            .collect()
    }

    pub fn chooser_options(&self) -> Vec<ChooserOption> {
        self.config
            .symbols
            .iter()
            .map(ChooserOption::Symbol)
            .chain([ChooserOption::Space])
            .collect()
    }

    pub fn handle(&mut self, interaction: Interaction) -> Result<(), ExerciseError> {
        if !self.enabled && interaction != Interaction::Dismiss {
            debug!(?interaction, "ignoring interaction while disabled");
            return Ok(());
        }

        match interaction {
            Interaction::OpenChooser(target) => {
                let group = self.group(target.group)?;
                let blank = target.blank.min(group.len() - 1);
                self.open_blank = Some(BlankRef {
                    group: target.group,
                    blank,
                });
            }
            Interaction::Pick(option) => {
                let Some(target) = self.open_blank.take() else {
                    debug!(?option, "pick without an open chooser");
                    return Ok(());
                };
                self.group_mut(target.group)?
                    .blank_mut(Some(target.blank))
                    .set_answer(option.answer());
            }
            Interaction::AddBlank { group } => {
                self.group_mut(group)?
                    .add_blank(AddBlankOptions::default_space());
            }
            Interaction::RemoveBlank { group } => {
                self.group_mut(group)?.remove_blank();
                if let Some(open) = self.open_blank
                    && open.group == group
                    && open.blank >= self.groups[group].len()
                {
                    self.handle_close_overlay();
                }
            }
            Interaction::Dismiss => self.handle_close_overlay(),
        }
        Ok(())
    }

    pub fn open_blank(&self) -> Option<BlankRef> {
        self.open_blank
    }

    pub fn handle_close_overlay(&mut self) {
        self.open_blank = None;
    }

    pub fn toggle_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        for group in &mut self.groups {
            group.set_enabled(enabled);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn score(&self) -> Score {
        Score::aggregate(&self.groups)
    }

    pub fn max_score(&self) -> usize {
        self.score().max_score
    }

    pub fn answer_given(&self) -> bool {
        self.groups.iter().any(BlankGroup::answer_given)
    }

    pub fn is_solution_showing(&self) -> bool {
        self.solution_showing
    }

    pub fn show_solutions_with(&mut self, options: ShowSolutionsOptions) {
        for group in &mut self.groups {
            group.show_solutions(options);
        }
        if options.answer {
            self.solution_showing = true;
        }
    }

    pub fn reset(&mut self, options: ResetOptions) {
        for group in &mut self.groups {
            group.reset(options);
        }
        self.solution_showing = false;
        self.handle_close_overlay();
    }

    /// Locks input and marks every scored blank.
    pub fn check_answers(&mut self) -> Score {
        self.toggle_enabled(false);
        self.handle_close_overlay();
        self.show_solutions_with(ShowSolutionsOptions {
            highlight: Some(Highlight::Scored),
            answer: false,
        });
        let score = self.score();
        info!(score = score.score, max_score = score.max_score, "checked answers");
        score
    }

    pub fn show_solutions(&mut self) {
        self.handle_close_overlay();
        self.show_solutions_with(ShowSolutionsOptions {
            highlight: Some(Highlight::All),
            answer: true,
        });
    }

    /// Starts over from a single empty blank per group.
    pub fn retry(&mut self) {
        self.reset(ResetOptions::default());
        self.toggle_enabled(true);
    }

    /// Unlocks input after checking, keeping the answers given so far.
    pub fn continue_editing(&mut self) {
        let solution_showing = self.solution_showing;
        self.reset(ResetOptions {
            keep_answers: true,
            keep_answered_blanks: solution_showing,
            keep_all_blanks: !solution_showing,
        });
        self.toggle_enabled(true);
    }

    pub fn current_state(&self) -> PersistedState {
        PersistedState::new(self.groups.iter().map(BlankGroup::current_state).collect())
    }

    pub fn xapi_correct_responses_patterns(&self) -> Vec<String> {
        vec![self.join_scored_groups(BlankGroup::xapi_correct_responses_pattern)]
    }

    pub fn xapi_responses(&self) -> String {
        self.join_scored_groups(BlankGroup::xapi_response)
    }

    /// Groups without scored blanks are left out of both strings so that
    /// patterns and responses stay position-aligned.
    fn join_scored_groups(&self, part: impl Fn(&BlankGroup) -> String) -> String {
        self.groups
            .iter()
            .filter(|group| group.has_scored_blanks())
            .map(part)
            .collect::<Vec<_>>()
            .join(XAPI_DELIMITER)
    }

    /// The text with every blank group replaced by its reporting gap.
    pub fn xapi_gaps(&self) -> String {
        self.deconstruction
            .placeholder_template()
            .render_with(|index| {
                self.groups
                    .get(index)
                    .map(BlankGroup::xapi_gap)
                    .unwrap_or_default()
            })
    }
}

fn usable_state(state: &PersistedState, groups: usize) -> bool {
    if state.answers.len() != groups {
        warn!(
            saved = state.answers.len(),
            groups, "previous state does not match the text, starting fresh"
        );
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blank::Mark;
    use crate::config::{RawExerciseConfig, apply_defaults};

    fn exercise(text: &str, symbols: &str) -> Exercise {
        Exercise::new(ExerciseConfig::new(text, symbols)).unwrap()
    }

    fn pick(exercise: &mut Exercise, group: usize, blank: usize, option: ChooserOption) {
        exercise
            .handle(Interaction::OpenChooser(BlankRef { group, blank }))
            .unwrap();
        exercise.handle(Interaction::Pick(option)).unwrap();
    }

    #[test]
    fn one_group_per_placeholder() {
        let exercise = exercise("Hello, world! Bye.", ",!.");
        assert_eq!(exercise.groups().len(), 3);
        assert_eq!(exercise.max_score(), 3);
        assert_eq!(exercise.score().score, 0);
        assert!(!exercise.answer_given());
    }

    #[test]
    fn invalid_text_is_reported() {
        let result = Exercise::new(ExerciseConfig::new("", ","));
        assert!(matches!(
            result,
            Err(ExerciseError::Deconstruct(DeconstructError::EmptyText))
        ));
    }

    #[test]
    fn picking_fills_the_open_blank_and_closes_the_chooser() {
        let mut exercise = exercise("Hello, world!", ",!");
        pick(&mut exercise, 0, 0, ChooserOption::Symbol(','));
        assert_eq!(exercise.open_blank(), None);
        assert_eq!(exercise.groups()[0].blank(Some(0)).answer(), Some(','));
        assert_eq!(exercise.score().score, 1);
        assert!(exercise.answer_given());
    }

    #[test]
    fn pick_without_chooser_or_after_dismiss_is_ignored() {
        let mut exercise = exercise("Hello, world!", ",!");
        exercise
            .handle(Interaction::Pick(ChooserOption::Symbol(',')))
            .unwrap();
        exercise
            .handle(Interaction::OpenChooser(BlankRef { group: 1, blank: 0 }))
            .unwrap();
        exercise.handle(Interaction::Dismiss).unwrap();
        exercise
            .handle(Interaction::Pick(ChooserOption::Symbol('!')))
            .unwrap();
        assert!(!exercise.answer_given());
    }

    #[test]
    fn opening_clamps_the_blank_but_not_the_group() {
        let mut exercise = exercise("Hello, world!", ",!");
        exercise
            .handle(Interaction::OpenChooser(BlankRef { group: 0, blank: 7 }))
            .unwrap();
        assert_eq!(exercise.open_blank(), Some(BlankRef { group: 0, blank: 0 }));

        let result = exercise.handle(Interaction::OpenChooser(BlankRef { group: 5, blank: 0 }));
        assert_eq!(result, Err(ExerciseError::UnknownGroup { index: 5, len: 2 }));
    }

    #[test]
    fn adding_blanks_prefills_spaces() {
        let mut exercise = exercise("Hello, world!", ",!");
        exercise.handle(Interaction::AddBlank { group: 0 }).unwrap();
        let group = &exercise.groups()[0];
        assert_eq!(group.current_state(), vec![None, Some(' ')]);

        exercise.handle(Interaction::RemoveBlank { group: 0 }).unwrap();
        exercise.handle(Interaction::RemoveBlank { group: 0 }).unwrap();
        assert_eq!(exercise.groups()[0].len(), 1);
    }

    #[test]
    fn removing_the_open_blank_closes_the_chooser() {
        let mut exercise = exercise("Hello, world!", ",!");
        exercise.handle(Interaction::AddBlank { group: 0 }).unwrap();
        exercise
            .handle(Interaction::OpenChooser(BlankRef { group: 0, blank: 1 }))
            .unwrap();
        exercise.handle(Interaction::RemoveBlank { group: 0 }).unwrap();
        assert_eq!(exercise.open_blank(), None);
    }

    #[test]
    fn checking_locks_input_until_continuing() {
        let mut exercise = exercise("Hello, world!", ",!");
        pick(&mut exercise, 0, 0, ChooserOption::Symbol('.'));
        let score = exercise.check_answers();
        assert_eq!(score.score, 0);
        assert!(!exercise.is_enabled());
        assert_eq!(exercise.groups()[0].blank(None).mark(), Mark::Wrong);

        pick(&mut exercise, 1, 0, ChooserOption::Symbol('!'));
        assert!(!exercise.groups()[1].answer_given());

        exercise.continue_editing();
        assert!(exercise.is_enabled());
        assert_eq!(exercise.groups()[0].blank(None).answer(), Some('.'));
        assert_eq!(exercise.groups()[0].blank(None).mark(), Mark::None);
    }

    #[test]
    fn continuing_after_solutions_keeps_only_answered_blanks() {
        let mut exercise = exercise("Hi... you", ".");
        pick(&mut exercise, 0, 0, ChooserOption::Symbol('.'));
        exercise.check_answers();
        exercise.show_solutions();
        assert!(exercise.is_solution_showing());
        assert_eq!(exercise.groups()[0].len(), 3);

        exercise.continue_editing();
        assert!(!exercise.is_solution_showing());
        assert_eq!(exercise.groups()[0].current_state(), vec![Some('.')]);
    }

    #[test]
    fn retry_starts_over() {
        let mut exercise = exercise("Hello, world!", ",!");
        exercise.handle(Interaction::AddBlank { group: 0 }).unwrap();
        pick(&mut exercise, 0, 0, ChooserOption::Symbol(','));
        exercise.check_answers();
        exercise.retry();
        assert!(exercise.is_enabled());
        assert_eq!(
            exercise.current_state(),
            PersistedState::new(vec![vec![None], vec![None]])
        );
    }

    #[test]
    fn state_round_trips_through_a_new_exercise() {
        let mut first = exercise("Hello, world!", ",!");
        first.handle(Interaction::AddBlank { group: 0 }).unwrap();
        pick(&mut first, 0, 0, ChooserOption::Symbol(','));
        pick(&mut first, 1, 0, ChooserOption::Space);
        let state = first.current_state();

        let mut config = ExerciseConfig::new("Hello, world!", ",!");
        config.previous_state = Some(state.clone());
        let second = Exercise::new(config).unwrap();
        assert_eq!(second.current_state(), state);
        assert_eq!(second.score(), first.score());
    }

    #[test]
    fn mismatched_state_is_discarded() {
        let mut config = ExerciseConfig::new("Hello, world!", ",!");
        config.previous_state = Some(PersistedState::new(vec![vec![Some(',')]]));
        let exercise = Exercise::new(config).unwrap();
        assert_eq!(
            exercise.current_state(),
            PersistedState::new(vec![vec![None], vec![None]])
        );
    }

    #[test]
    fn show_all_blanks_reveals_group_sizes() {
        let raw: RawExerciseConfig = serde_json::from_str(
            r#"{"text": "Wait... what?!", "symbols": ".?!", "behaviour": {"showAllBlanks": true}}"#,
        )
        .unwrap();
        let exercise = Exercise::new(apply_defaults(raw)).unwrap();
        let lens: Vec<_> = exercise.groups().iter().map(BlankGroup::len).collect();
        assert_eq!(lens, vec![3, 2]);
    }

    #[test]
    fn chooser_lists_symbols_then_space() {
        let exercise = exercise("Hi, you.", ".,");
        assert_eq!(
            exercise.chooser_options(),
            vec![
                ChooserOption::Symbol('.'),
                ChooserOption::Symbol(','),
                ChooserOption::Space
            ]
        );
    }

    #[test]
    fn blank_refs_follow_reading_order() {
        let mut exercise = exercise("Hi, you.", ",.");
        exercise.handle(Interaction::AddBlank { group: 0 }).unwrap();
        assert_eq!(
            exercise.blank_refs(),
            vec![
                BlankRef { group: 0, blank: 0 },
                BlankRef { group: 0, blank: 1 },
                BlankRef { group: 1, blank: 0 },
            ]
        );
    }

    #[test]
    fn reporting_strings_join_groups() {
        let mut exercise = exercise("Hi, you. Bye!", ",.!");
        pick(&mut exercise, 0, 0, ChooserOption::Symbol(','));
        pick(&mut exercise, 2, 0, ChooserOption::Symbol('?'));

        assert_eq!(exercise.xapi_correct_responses_patterns(), vec![",[,]!"]);
        assert_eq!(exercise.xapi_responses(), ",[,]?");
        assert_eq!(
            exercise.xapi_gaps(),
            "Hi__________you&nbsp;Bye__________"
        );
    }

    #[test]
    fn reporting_strings_stay_aligned_for_extra_blanks() {
        let mut exercise = exercise("Hi, you.", ",.");
        exercise.handle(Interaction::AddBlank { group: 0 }).unwrap();
        exercise.handle(Interaction::AddBlank { group: 0 }).unwrap();
        // the third blank lies past the end of ", " and expects nothing
        pick(&mut exercise, 0, 2, ChooserOption::Symbol('.'));
        pick(&mut exercise, 1, 0, ChooserOption::Symbol('.'));

        let patterns = exercise.xapi_correct_responses_patterns();
        let responses = exercise.xapi_responses();
        assert_eq!(patterns, vec!["[,]."]);
        assert_eq!(responses, ".[,].");
        assert_eq!(
            patterns[0].split(XAPI_DELIMITER).count(),
            responses.split(XAPI_DELIMITER).count()
        );
    }

    #[test]
    fn fingerprint_ignores_formatting_noise() {
        let a = exercise("Hi,  you.", ",.");
        let b = exercise("Hi, you.", ".,");
        assert!(a.fingerprint().is_some());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }
}
