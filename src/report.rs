use serde::Serialize;

use crate::exercise::Exercise;

/// Separates the entries of a fill-in response pattern.
pub const XAPI_DELIMITER: &str = "[,]";
/// Stands for a scored blank in the gap description.
pub const XAPI_PLACEHOLDER: &str = "__________";
/// Stands for an unscored blank in the gap description.
pub const XAPI_BLANK: &str = "&nbsp;";

/// Everything a fill-in interaction report needs, in reporting encoding.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub description: String,
    pub correct_responses_pattern: Vec<String>,
    pub response: String,
    pub score: usize,
    pub max_score: usize,
    pub scaled: f64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Report {
    pub fn from_exercise(exercise: &Exercise) -> Self {
        let score = exercise.score();
        Self {
            description: format!(
                "{}{}",
                exercise.config().description(),
                exercise.xapi_gaps()
            ),
            correct_responses_pattern: exercise.xapi_correct_responses_patterns(),
            response: exercise.xapi_responses(),
            score: score.score,
            max_score: score.max_score,
            scaled: score.scaled(),
            success: score.is_passed(),
            feedback: exercise
                .config()
                .overall_feedback(&score)
                .map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExerciseConfig, RawExerciseConfig, apply_defaults};
    use crate::exercise::{BlankRef, ChooserOption, Interaction};

    #[test]
    fn reports_gaps_patterns_and_score() {
        let mut config = ExerciseConfig::new("Hi, you.", ",.");
        config.task_description = "Punctuate: ".into();
        let mut exercise = Exercise::new(config).unwrap();
        exercise
            .handle(Interaction::OpenChooser(BlankRef { group: 0, blank: 0 }))
            .unwrap();
        exercise
            .handle(Interaction::Pick(ChooserOption::Symbol(',')))
            .unwrap();

        let report = Report::from_exercise(&exercise);
        assert_eq!(report.description, "Punctuate: Hi__________you&nbsp;");
        assert_eq!(report.correct_responses_pattern, vec![",".to_string()]);
        assert_eq!(report.response, ",");
        assert_eq!(report.score, 1);
        assert_eq!(report.max_score, 2);
        assert!(!report.success);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["maxScore"], 2);
        assert_eq!(json["correctResponsesPattern"][0], ",");
        assert!(json.get("feedback").is_none());
    }

    #[test]
    fn carries_the_overall_feedback() {
        let raw: RawExerciseConfig = serde_json::from_str(
            r#"{
                "text": "Hi, you.",
                "symbols": ",.",
                "overallFeedback": [
                    {"from": 0, "to": 50, "feedback": "Half way."},
                    {"from": 51, "to": 100, "feedback": "Well done."}
                ]
            }"#,
        )
        .unwrap();
        let mut exercise = Exercise::new(apply_defaults(raw)).unwrap();
        exercise
            .handle(Interaction::OpenChooser(BlankRef { group: 0, blank: 0 }))
            .unwrap();
        exercise
            .handle(Interaction::Pick(ChooserOption::Symbol(',')))
            .unwrap();

        let report = Report::from_exercise(&exercise);
        assert_eq!(report.feedback.as_deref(), Some("Half way."));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["feedback"], "Half way.");
    }
}
