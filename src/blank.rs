use crate::parser::NBSP;

/// Visual verdict shown on a blank after checking or revealing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mark {
    #[default]
    None,
    Correct,
    Wrong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Highlight {
    /// Mark only blanks that count towards the score, either way.
    Scored,
    /// Mark every blank as correct or wrong.
    All,
}

/// One fillable position inside a blank group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blank {
    answer: Option<char>,
    solution: Option<char>,
    enabled: bool,
    mark: Mark,
    solution_shown: bool,
}

impl Blank {
    /// `solution` is `None` for positions beyond the end of the group's
    /// solution string.
    pub fn new(solution: Option<char>, answer: Option<char>) -> Self {
        Self {
            answer,
            solution,
            enabled: true,
            mark: Mark::None,
            solution_shown: false,
        }
    }

    pub fn answer(&self) -> Option<char> {
        self.answer
    }

    pub fn solution(&self) -> Option<char> {
        self.solution
    }

    pub fn has_answer(&self) -> bool {
        self.answer.is_some()
    }

    /// `Some(' ')` is an explicit space and differs from `None`.
    pub fn set_answer(&mut self, answer: Option<char>) {
        self.answer = answer;
        self.mark = Mark::None;
    }

    /// True when no symbol belongs here: the solution is a space or the blank
    /// lies past the end of the solution.
    pub fn expects_nothing(&self) -> bool {
        self.solution.is_none_or(|ch| ch == ' ')
    }

    /// `0` without an answer or for a space where nothing is expected, `1`
    /// for the exact solution, `-1` otherwise.
    pub fn score(&self) -> i32 {
        match self.answer {
            None => 0,
            Some(' ') if self.expects_nothing() => 0,
            Some(answer) if Some(answer) == self.solution => 1,
            Some(_) => -1,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.score() == 1 || (self.expects_nothing() && self.answer.is_none())
    }

    pub fn show_solution(&mut self, highlight: Option<Highlight>, reveal: bool) {
        self.mark = match highlight {
            None => Mark::None,
            Some(Highlight::Scored) => match self.score() {
                1 => Mark::Correct,
                -1 => Mark::Wrong,
                _ => Mark::None,
            },
            Some(Highlight::All) => {
                if self.is_correct() {
                    Mark::Correct
                } else if self.score() == 0 && self.expects_nothing() {
                    Mark::None
                } else {
                    Mark::Wrong
                }
            }
        };
        self.solution_shown = reveal;
    }

    pub fn reset(&mut self, keep_answer: bool) {
        if !keep_answer {
            self.answer = None;
        }
        self.mark = Mark::None;
        self.solution_shown = false;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn mark(&self) -> Mark {
        self.mark
    }

    pub fn is_solution_shown(&self) -> bool {
        self.solution_shown
    }

    /// Character to draw. Spaces and empty blanks share the same glyph.
    pub fn glyph(&self) -> char {
        let shown = if self.solution_shown {
            self.solution
        } else {
            self.answer
        };
        shown.filter(|ch| *ch != ' ').unwrap_or(NBSP)
    }
}
