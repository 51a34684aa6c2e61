use serde::{Deserialize, Deserializer, Serialize};

/// Answers of every blank group, in placeholder order, one entry per blank.
/// `None` is an untouched blank, `Some(' ')` an explicitly chosen space.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PersistedState {
    pub answers: Vec<Vec<Option<char>>>,
}

impl PersistedState {
    pub fn new(answers: Vec<Vec<Option<char>>>) -> Self {
        Self { answers }
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn group(&self, index: usize) -> Option<&[Option<char>]> {
        self.answers.get(index).map(Vec::as_slice)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

type LenientAnswers = Vec<Vec<Option<String>>>;

#[derive(Deserialize)]
#[serde(untagged)]
enum StateShape {
    Bare(LenientAnswers),
    Wrapped { answers: LenientAnswers },
}

impl<'de> Deserialize<'de> for PersistedState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = match StateShape::deserialize(deserializer)? {
            StateShape::Bare(answers) | StateShape::Wrapped { answers } => answers,
        };

        let answers = raw
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .map(|answer| answer.and_then(|s| s.chars().next()))
                    .collect()
            })
            .collect();

        Ok(Self { answers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_nested_nullable_strings() {
        let state = PersistedState::new(vec![vec![Some(','), None], vec![Some(' ')]]);
        assert_eq!(
            state.to_json().unwrap(),
            r#"{"answers":[[",",null],[" "]]}"#
        );
    }

    #[test]
    fn reads_wrapped_and_bare_shapes() {
        let wrapped = PersistedState::from_json(r#"{"answers":[[",",null],[" "]]}"#).unwrap();
        let bare = PersistedState::from_json(r#"[[",",null],[" "]]"#).unwrap();
        assert_eq!(wrapped, bare);
        assert_eq!(wrapped.group(0), Some(&[Some(','), None][..]));
        assert_eq!(wrapped.group(2), None);
    }

    #[test]
    fn long_answers_are_cut_and_empty_ones_are_null() {
        let state = PersistedState::from_json(r#"[["?!", ""]]"#).unwrap();
        assert_eq!(state.answers, vec![vec![Some('?'), None]]);
    }

    #[test]
    fn round_trips() {
        let state = PersistedState::new(vec![vec![None], vec![Some('.'), Some(' '), None]]);
        let json = state.to_json().unwrap();
        assert_eq!(PersistedState::from_json(&json).unwrap(), state);
    }
}
