use serde::Serialize;

use crate::blank_group::BlankGroup;

/// Anything contributing points to an exercise.
pub trait Scored {
    fn score(&self) -> usize;
    fn max_score(&self) -> usize;
}

impl Scored for BlankGroup {
    fn score(&self) -> usize {
        BlankGroup::score(self)
    }

    fn max_score(&self) -> usize {
        BlankGroup::max_score(self)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub score: usize,
    pub max_score: usize,
}

impl Score {
    /// Totals over all parts. Parts never report negative scores, so the
    /// total is floored at zero as well.
    pub fn aggregate<'a, T, I>(parts: I) -> Self
    where
        T: Scored + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        parts.into_iter().fold(Score::default(), |total, part| Score {
            score: total.score + part.score(),
            max_score: total.max_score + part.max_score(),
        })
    }

    pub fn is_passed(&self) -> bool {
        self.score == self.max_score
    }

    /// Score as a fraction of the maximum; zero when nothing can be scored.
    pub fn scaled(&self) -> f64 {
        if self.max_score == 0 {
            0.0
        } else {
            self.score as f64 / self.max_score as f64
        }
    }

    /// [`Score::scaled`] as a whole percentage, rounded half away from zero.
    pub fn percentage(&self) -> u32 {
        (self.scaled() * 100.0).round() as u32
    }
}
