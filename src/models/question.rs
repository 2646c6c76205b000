// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Kind of input a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Essay,
}

/// A single answer value: free text / one selected choice, or a list of
/// selected choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Many(Vec<String>),
}

impl AnswerValue {
    /// Blank text and empty selections both count as "not answered".
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.trim().is_empty(),
            AnswerValue::Many(items) => items.is_empty(),
        }
    }
}

impl Default for AnswerValue {
    fn default() -> Self {
        AnswerValue::Text(String::new())
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        AnswerValue::Many(value)
    }
}

/// A question as delivered by the quiz backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(alias = "_id")]
    #[validate(length(min = 1))]
    pub id: String,

    /// Mapped from the wire field 'type' since `type` is a reserved keyword in Rust.
    #[serde(rename = "type")]
    pub question_type: QuestionType,

    /// The prompt text of the question.
    #[serde(rename = "question")]
    #[validate(length(min = 1, max = 5000))]
    pub content: String,

    /// List of choices (e.g., ["Option A", "Option B"]).
    #[serde(default)]
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,

    /// The correct answer. Never inspected client-side.
    #[serde(default)]
    pub correct_answer: Option<AnswerValue>,

    #[serde(default = "default_points")]
    pub points: u32,

    /// Explanation of the correct answer, shown with results.
    #[serde(default)]
    pub explanation: Option<String>,

    /// Display order within the quiz.
    #[serde(default)]
    pub order: i32,
}

fn default_points() -> u32 {
    1
}

impl Question {
    /// Choices the respondent can pick from.
    ///
    /// True/false questions fall back to `["True", "False"]` when the backend
    /// omits the options. Open questions have no choices.
    pub fn choices(&self) -> Vec<String> {
        match self.question_type {
            QuestionType::MultipleChoice | QuestionType::TrueFalse if !self.options.is_empty() => {
                self.options.clone()
            }
            QuestionType::TrueFalse => vec!["True".to_string(), "False".to_string()],
            _ => Vec::new(),
        }
    }

    /// Multiple-choice questions with more than one correct option accept a
    /// list of selections.
    pub fn allows_many(&self) -> bool {
        self.question_type == QuestionType::MultipleChoice
            && matches!(self.correct_answer, Some(AnswerValue::Many(_)))
    }
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    for opt in options {
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_shape() {
        let q: Question = serde_json::from_value(serde_json::json!({
            "_id": "q1",
            "type": "multiple-choice",
            "question": "Pick one",
            "options": ["A", "B"],
            "correctAnswer": "A",
            "points": 2
        }))
        .unwrap();

        assert_eq!(q.id, "q1");
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
        assert_eq!(q.correct_answer, Some(AnswerValue::Text("A".to_string())));
        assert_eq!(q.points, 2);
        assert_eq!(q.order, 0);
        assert!(!q.allows_many());
    }

    #[test]
    fn test_true_false_default_choices() {
        let q: Question = serde_json::from_value(serde_json::json!({
            "id": "q2",
            "type": "true-false",
            "question": "Rust has a GC"
        }))
        .unwrap();

        assert_eq!(q.choices(), vec!["True".to_string(), "False".to_string()]);
        assert_eq!(q.points, 1);
    }

    #[test]
    fn test_list_answer_allows_many() {
        let q: Question = serde_json::from_value(serde_json::json!({
            "id": "q3",
            "type": "multiple-choice",
            "question": "Pick two",
            "options": ["A", "B", "C"],
            "correctAnswer": ["A", "C"]
        }))
        .unwrap();

        assert!(q.allows_many());
    }

    #[test]
    fn test_answer_emptiness() {
        assert!(AnswerValue::default().is_empty());
        assert!(AnswerValue::from("   ").is_empty());
        assert!(AnswerValue::Many(vec![]).is_empty());
        assert!(!AnswerValue::from("x").is_empty());
    }

    #[test]
    fn test_option_too_long_rejected() {
        let q = Question {
            id: "q4".to_string(),
            question_type: QuestionType::MultipleChoice,
            content: "Long".to_string(),
            options: vec!["x".repeat(501)],
            correct_answer: None,
            points: 1,
            explanation: None,
            order: 0,
        };
        assert!(q.validate().is_err());
    }
}
