// src/api/mod.rs

mod client;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        quiz::QuizDefinition,
        submission::{GradedAttempt, SubmissionPayload},
    },
};

pub use client::HttpQuizApi;

/// The two backend calls an attempt depends on.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Fetches and validates a quiz definition.
    async fn fetch_quiz(&self, quiz_id: &str) -> Result<QuizDefinition, AppError>;

    /// Sends a finished attempt for grading.
    async fn submit_attempt(&self, payload: &SubmissionPayload) -> Result<GradedAttempt, AppError>;
}
