// src/session/answers.rs

use std::collections::HashMap;

use crate::models::{
    question::{AnswerValue, Question},
    submission::AnswerEntry,
};

/// Respondent's answers-in-progress, keyed by question id.
#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    answers: HashMap<String, AnswerValue>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the answer, returning the previous one.
    pub fn set(&mut self, question_id: &str, value: AnswerValue) -> Option<AnswerValue> {
        self.answers.insert(question_id.to_string(), value)
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.get(question_id).is_some_and(|a| !a.is_empty())
    }

    /// Number of questions holding a non-empty answer.
    pub fn answered_count(&self) -> usize {
        self.answers.values().filter(|a| !a.is_empty()).count()
    }

    /// One entry per question, in sequence order. Unanswered questions get
    /// an empty answer.
    pub(crate) fn to_entries(&self, questions: &[Question]) -> Vec<AnswerEntry> {
        questions
            .iter()
            .map(|q| AnswerEntry {
                question_id: q.id.clone(),
                answer: self.get(&q.id).cloned().unwrap_or_default(),
            })
            .collect()
    }
}
