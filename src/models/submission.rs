// src/models/submission.rs

use serde::{Deserialize, Serialize};

use super::question::AnswerValue;

/// One `{questionId, answer}` pair of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEntry {
    pub question_id: String,
    pub answer: AnswerValue,
}

/// DTO for submitting a quiz attempt.
///
/// Built once by the session when it transitions to `Submitted`; there is no
/// way to change it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    quiz_id: String,
    answers: Vec<AnswerEntry>,
}

impl SubmissionPayload {
    pub(crate) fn new(quiz_id: String, answers: Vec<AnswerEntry>) -> Self {
        Self { quiz_id, answers }
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn answers(&self) -> &[AnswerEntry] {
        &self.answers
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers
            .iter()
            .find(|entry| entry.question_id == question_id)
            .map(|entry| &entry.answer)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|e| !e.answer.is_empty()).count()
    }
}

/// Graded attempt record returned by the backend after a submission.
/// The backend shape is not guaranteed, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAttempt {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub total_points: Option<f64>,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub passed: Option<bool>,
}
