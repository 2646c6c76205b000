// src/session/submit.rs

use crate::{
    api::QuizApi,
    error::AppError,
    models::submission::{GradedAttempt, SubmissionPayload},
};

/// What caused the session to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// Respondent confirmed the submit prompt.
    User,
    /// Countdown reached zero.
    Timeout,
}

/// Summary shown before a user-initiated submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitPrompt {
    pub total: usize,
    pub answered: usize,
    pub flagged: usize,
}

impl SubmitPrompt {
    pub fn unanswered(&self) -> usize {
        self.total.saturating_sub(self.answered)
    }

    pub fn message(&self) -> String {
        let mut message = match self.unanswered() {
            0 => "You have answered all questions.".to_string(),
            1 => "You have 1 unanswered question.".to_string(),
            n => format!("You have {} unanswered questions.", n),
        };
        if self.flagged > 0 {
            message.push_str(&format!(" {} flagged for review.", self.flagged));
        }
        message.push_str(" Submit now? Answers cannot be changed afterwards.");
        message
    }
}

/// Outcome of the one network submission of a session.
#[derive(Debug)]
pub struct SubmissionReport {
    pub trigger: SubmitTrigger,
    /// The payload that was sent, kept so the answers can still be shown
    /// when the call failed.
    pub payload: SubmissionPayload,
    pub result: Result<GradedAttempt, AppError>,
}

impl SubmissionReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Sends the payload to the grading endpoint once.
///
/// The session is already `Submitted` when this runs; a failure is reported
/// but never retried.
pub async fn submit_attempt<A>(api: &A, trigger: SubmitTrigger, payload: SubmissionPayload) -> SubmissionReport
where
    A: QuizApi + ?Sized,
{
    tracing::info!(
        quiz_id = payload.quiz_id(),
        answered = payload.answered_count(),
        total = payload.answers().len(),
        "Submitting attempt ({:?})",
        trigger
    );

    let result = api.submit_attempt(&payload).await;
    match &result {
        Ok(graded) => tracing::info!("Attempt graded: {:?}", graded),
        Err(e) => tracing::error!("Failed to submit attempt: {}", e),
    }

    SubmissionReport {
        trigger,
        payload,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_warns_about_unanswered() {
        let prompt = SubmitPrompt {
            total: 5,
            answered: 3,
            flagged: 0,
        };
        assert_eq!(prompt.unanswered(), 2);
        assert!(prompt.message().starts_with("You have 2 unanswered questions."));
    }

    #[test]
    fn test_prompt_mentions_flags() {
        let prompt = SubmitPrompt {
            total: 2,
            answered: 2,
            flagged: 1,
        };
        let message = prompt.message();
        assert!(message.starts_with("You have answered all questions."));
        assert!(message.contains("1 flagged for review."));
    }
}
