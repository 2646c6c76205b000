// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::question::Question;

/// Quiz configuration fetched once at session start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizDefinition {
    #[serde(default, alias = "_id")]
    pub id: String,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<Question>,

    /// Time limit in minutes. `None` and `0` both mean untimed.
    #[serde(default)]
    #[validate(range(max = 1440))]
    pub time_limit: Option<u32>,

    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1))]
    pub max_attempts: u32,

    /// Percentage required to pass.
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub passing_score: f64,

    #[serde(default)]
    pub randomize_questions: bool,

    #[serde(default = "default_show_results")]
    pub show_results: bool,
}

fn default_max_attempts() -> u32 {
    1
}

fn default_show_results() -> bool {
    true
}

impl QuizDefinition {
    /// Countdown length in seconds, or `None` for untimed quizzes.
    pub fn time_limit_secs(&self) -> Option<u32> {
        match self.time_limit {
            Some(minutes) if minutes > 0 => Some(minutes.saturating_mul(60)),
            _ => None,
        }
    }

    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }
}
