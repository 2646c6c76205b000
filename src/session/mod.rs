// src/session/mod.rs

//! The timed quiz-attempt state machine.
//!
//! An [`AttemptSession`] moves `NotStarted -> InProgress -> Submitted`.
//! Everything here is synchronous; the countdown task and the network call
//! live outside and feed the session through [`AttemptSession::tick`] and
//! [`submit_attempt`].

mod answers;
mod initializer;
mod navigation;
mod submit;
mod timer;

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::{
    config::LOW_TIME_THRESHOLD_SECS,
    models::{
        question::{AnswerValue, Question},
        quiz::QuizDefinition,
        submission::SubmissionPayload,
    },
};

pub use answers::AnswerStore;
pub use navigation::Navigator;
pub use submit::{SubmissionReport, SubmitPrompt, SubmitTrigger, submit_attempt};
pub use timer::{Tick, TickOutcome, TimerHandle, TimerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    NotStarted,
    InProgress,
    Submitted,
}

/// Rejected session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    AlreadyStarted,
    NotInProgress(Lifecycle),
    UnknownQuestion(String),
    IndexOutOfRange { index: usize, len: usize },
    NoCurrentQuestion,
    /// The submit prompt is open; confirm or cancel it first.
    AwaitingConfirmation,
    NoPendingSubmit,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AlreadyStarted => write!(f, "Quiz already started"),
            SessionError::NotInProgress(Lifecycle::NotStarted) => write!(f, "Quiz not started yet"),
            SessionError::NotInProgress(_) => write!(f, "Quiz already submitted"),
            SessionError::UnknownQuestion(id) => write!(f, "Unknown question: {}", id),
            SessionError::IndexOutOfRange { index, len } => {
                write!(f, "Question {} does not exist (quiz has {})", index + 1, len)
            }
            SessionError::NoCurrentQuestion => write!(f, "This quiz has no questions"),
            SessionError::AwaitingConfirmation => write!(f, "Confirm or cancel the submission first"),
            SessionError::NoPendingSubmit => write!(f, "Nothing to confirm"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Per-question entry of the question picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionStatus {
    pub index: usize,
    pub question_id: String,
    pub current: bool,
    pub answered: bool,
    pub flagged: bool,
}

/// One respondent's pass through a quiz.
#[derive(Debug)]
pub struct AttemptSession {
    id: Uuid,
    quiz: Arc<QuizDefinition>,
    questions: Vec<Question>,
    navigator: Navigator,
    answers: AnswerStore,
    remaining: Option<u32>,
    lifecycle: Lifecycle,
    confirming: bool,
    submitted_by: Option<SubmitTrigger>,
    started_at: Option<DateTime<Utc>>,
}

impl AttemptSession {
    pub fn new(quiz: impl Into<Arc<QuizDefinition>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            quiz: quiz.into(),
            questions: Vec::new(),
            navigator: Navigator::default(),
            answers: AnswerStore::new(),
            remaining: None,
            lifecycle: Lifecycle::NotStarted,
            confirming: false,
            submitted_by: None,
            started_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz(&self) -> &QuizDefinition {
        &self.quiz
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn submitted_by(&self) -> Option<SubmitTrigger> {
        self.submitted_by
    }

    pub fn is_confirming(&self) -> bool {
        self.confirming
    }

    // ---- initializer ----

    /// Starts the attempt: builds the question sequence and arms the countdown.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SessionError> {
        self.ensure_not_started()?;
        let questions = initializer::order_questions(&self.quiz, rng);
        self.begin(questions);
        Ok(())
    }

    /// Starts the attempt keeping a previously used question order instead of
    /// reshuffling.
    pub fn start_resumed(&mut self, order: &[String]) -> Result<(), SessionError> {
        self.ensure_not_started()?;
        let questions = initializer::restore_order(&self.quiz, order);
        self.begin(questions);
        Ok(())
    }

    fn ensure_not_started(&self) -> Result<(), SessionError> {
        if self.lifecycle == Lifecycle::NotStarted {
            Ok(())
        } else {
            Err(SessionError::AlreadyStarted)
        }
    }

    fn begin(&mut self, questions: Vec<Question>) {
        self.navigator = Navigator::new(questions.len());
        self.questions = questions;
        self.remaining = self.quiz.time_limit_secs();
        self.started_at = Some(Utc::now());
        self.lifecycle = Lifecycle::InProgress;

        if self.questions.is_empty() {
            tracing::warn!(session = %self.id, "Quiz '{}' has no questions", self.quiz.title);
        }
        tracing::info!(
            session = %self.id,
            quiz_id = %self.quiz.id,
            questions = self.questions.len(),
            time_limit_secs = ?self.remaining,
            "Attempt started"
        );
    }

    // ---- questions & navigation ----

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.navigator.current()
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.navigator.current())
    }

    pub fn next(&mut self) -> Result<usize, SessionError> {
        self.ensure_editable()?;
        Ok(self.navigator.next())
    }

    pub fn previous(&mut self) -> Result<usize, SessionError> {
        self.ensure_editable()?;
        Ok(self.navigator.previous())
    }

    pub fn jump_to(&mut self, index: usize) -> Result<usize, SessionError> {
        self.ensure_editable()?;
        self.navigator.jump_to(index)
    }

    /// Flags are advisory only; they never touch the answers.
    pub fn toggle_flag(&mut self, index: usize) -> Result<bool, SessionError> {
        self.ensure_editable()?;
        self.navigator.toggle_flag(index)
    }

    pub fn is_flagged(&self, index: usize) -> bool {
        self.navigator.is_flagged(index)
    }

    pub fn picker(&self) -> Vec<QuestionStatus> {
        self.questions
            .iter()
            .enumerate()
            .map(|(index, q)| QuestionStatus {
                index,
                question_id: q.id.clone(),
                current: index == self.navigator.current(),
                answered: self.answers.is_answered(&q.id),
                flagged: self.navigator.is_flagged(index),
            })
            .collect()
    }

    /// `(answered, total)`
    pub fn progress(&self) -> (usize, usize) {
        (self.answered_count(), self.questions.len())
    }

    // ---- answers ----

    pub fn set_answer(&mut self, question_id: &str, value: AnswerValue) -> Result<(), SessionError> {
        self.ensure_editable()?;
        if !self.questions.iter().any(|q| q.id == question_id) {
            return Err(SessionError::UnknownQuestion(question_id.to_string()));
        }
        tracing::debug!(session = %self.id, question_id, "Answer updated");
        self.answers.set(question_id, value);
        Ok(())
    }

    pub fn answer_current(&mut self, value: AnswerValue) -> Result<(), SessionError> {
        let id = self
            .current()
            .map(|q| q.id.clone())
            .ok_or(SessionError::NoCurrentQuestion)?;
        self.set_answer(&id, value)
    }

    pub fn answer(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.answered_count()
    }

    // ---- countdown ----

    pub fn remaining_secs(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_low_time(&self) -> bool {
        self.lifecycle == Lifecycle::InProgress
            && self.remaining.is_some_and(|r| r <= LOW_TIME_THRESHOLD_SECS)
    }

    pub fn timer_state(&self) -> TimerState {
        match (self.lifecycle, self.remaining, self.submitted_by) {
            (Lifecycle::InProgress, Some(_), _) => TimerState::Running,
            (Lifecycle::Submitted, _, Some(SubmitTrigger::Timeout)) => TimerState::Expired,
            _ => TimerState::Idle,
        }
    }

    /// Applies one second of countdown. Reaching zero submits the session
    /// immediately, bypassing the confirmation prompt.
    pub fn tick(&mut self) -> TickOutcome {
        if self.lifecycle != Lifecycle::InProgress {
            return TickOutcome::Ignored;
        }
        let remaining = match self.remaining.as_mut() {
            Some(remaining) => {
                *remaining = remaining.saturating_sub(1);
                *remaining
            }
            None => return TickOutcome::Ignored,
        };

        if remaining > 0 {
            return TickOutcome::Running { remaining };
        }

        tracing::info!(session = %self.id, "Time is up, submitting automatically");
        match self.take_submission(SubmitTrigger::Timeout) {
            Some(payload) => TickOutcome::Expired(payload),
            None => TickOutcome::Ignored,
        }
    }

    // ---- submission ----

    /// Opens the submit prompt.
    pub fn request_submit(&mut self) -> Result<SubmitPrompt, SessionError> {
        self.ensure_in_progress()?;
        self.confirming = true;
        Ok(SubmitPrompt {
            total: self.questions.len(),
            answered: self.answered_count(),
            flagged: self.navigator.flagged_count(),
        })
    }

    pub fn cancel_submit(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if !self.confirming {
            return Err(SessionError::NoPendingSubmit);
        }
        self.confirming = false;
        Ok(())
    }

    /// Confirms the open prompt. A session that is already submitted yields
    /// `Ok(None)`.
    pub fn confirm_submit(&mut self) -> Result<Option<SubmissionPayload>, SessionError> {
        match self.lifecycle {
            Lifecycle::Submitted => Ok(None),
            Lifecycle::NotStarted => Err(SessionError::NotInProgress(Lifecycle::NotStarted)),
            Lifecycle::InProgress if !self.confirming => Err(SessionError::NoPendingSubmit),
            Lifecycle::InProgress => Ok(self.take_submission(SubmitTrigger::User)),
        }
    }

    /// Marks the session submitted and builds its payload.
    ///
    /// Returns `Some` exactly once per session; every later call, from any
    /// trigger, returns `None`.
    pub fn take_submission(&mut self, trigger: SubmitTrigger) -> Option<SubmissionPayload> {
        if self.lifecycle != Lifecycle::InProgress {
            return None;
        }
        self.lifecycle = Lifecycle::Submitted;
        self.confirming = false;
        self.submitted_by = Some(trigger);

        let entries = self.answers.to_entries(&self.questions);
        tracing::info!(session = %self.id, ?trigger, "Attempt submitted");
        Some(SubmissionPayload::new(self.quiz.id.clone(), entries))
    }

    /// Abandons the attempt without submitting anything.
    pub fn exit(self) {
        tracing::info!(
            session = %self.id,
            lifecycle = ?self.lifecycle,
            "Attempt discarded without submission"
        );
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        match self.lifecycle {
            Lifecycle::InProgress => Ok(()),
            other => Err(SessionError::NotInProgress(other)),
        }
    }

    fn ensure_editable(&self) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if self.confirming {
            return Err(SessionError::AwaitingConfirmation);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn quiz(time_limit: Option<u32>, count: usize) -> QuizDefinition {
        let questions: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "id": format!("q{}", i),
                    "type": "short-answer",
                    "question": format!("Question {}", i),
                    "order": i
                })
            })
            .collect();
        serde_json::from_value(serde_json::json!({
            "id": "quiz-1",
            "title": "Unit quiz",
            "timeLimit": time_limit,
            "questions": questions
        }))
        .unwrap()
    }

    fn started(time_limit: Option<u32>, count: usize) -> AttemptSession {
        let mut session = AttemptSession::new(quiz(time_limit, count));
        session.start(&mut StdRng::seed_from_u64(1)).unwrap();
        session
    }

    #[test]
    fn test_nothing_editable_before_start() {
        let mut session = AttemptSession::new(quiz(None, 2));
        assert_eq!(session.lifecycle(), Lifecycle::NotStarted);
        assert_eq!(session.timer_state(), TimerState::Idle);
        assert_eq!(
            session.next(),
            Err(SessionError::NotInProgress(Lifecycle::NotStarted))
        );
        assert_eq!(session.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn test_start_only_once() {
        let mut session = started(Some(2), 1);
        assert_eq!(session.remaining_secs(), Some(120));
        assert_eq!(session.timer_state(), TimerState::Running);
        assert!(session.started_at().is_some());
        assert_eq!(
            session.start(&mut StdRng::seed_from_u64(2)),
            Err(SessionError::AlreadyStarted)
        );
    }

    #[test]
    fn test_oversized_time_limit_starts() {
        let mut session = started(Some(80_000_000), 1);
        assert_eq!(session.remaining_secs(), Some(u32::MAX));
        assert_eq!(
            session.tick(),
            TickOutcome::Running {
                remaining: u32::MAX - 1
            }
        );
    }

    #[test]
    fn test_untimed_tick_is_ignored() {
        let mut session = started(None, 1);
        assert_eq!(session.remaining_secs(), None);
        assert_eq!(session.timer_state(), TimerState::Idle);
        assert_eq!(session.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn test_unknown_question_rejected() {
        let mut session = started(None, 1);
        assert_eq!(
            session.set_answer("nope", "x".into()),
            Err(SessionError::UnknownQuestion("nope".to_string()))
        );
    }

    #[test]
    fn test_empty_quiz_has_no_current() {
        let mut session = started(None, 0);
        assert!(session.current().is_none());
        assert_eq!(
            session.answer_current("x".into()),
            Err(SessionError::NoCurrentQuestion)
        );
        let payload = session.take_submission(SubmitTrigger::User).unwrap();
        assert!(payload.answers().is_empty());
    }

    #[test]
    fn test_prompt_is_modal() {
        let mut session = started(None, 2);
        session.answer_current("a".into()).unwrap();
        session.toggle_flag(1).unwrap();

        let prompt = session.request_submit().unwrap();
        assert_eq!(prompt.unanswered(), 1);
        assert_eq!(prompt.flagged, 1);
        assert_eq!(session.next(), Err(SessionError::AwaitingConfirmation));

        session.cancel_submit().unwrap();
        assert_eq!(session.next(), Ok(1));
        assert_eq!(session.confirm_submit(), Err(SessionError::NoPendingSubmit));
    }

    #[test]
    fn test_confirm_submits_once() {
        let mut session = started(None, 1);
        session.request_submit().unwrap();
        assert!(session.confirm_submit().unwrap().is_some());
        assert_eq!(session.lifecycle(), Lifecycle::Submitted);
        assert_eq!(session.submitted_by(), Some(SubmitTrigger::User));
        assert_eq!(session.confirm_submit(), Ok(None));
        assert!(session.take_submission(SubmitTrigger::Timeout).is_none());
    }

    #[test]
    fn test_timer_expiry_submits_and_freezes_answers() {
        let mut session = started(Some(1), 1);
        for _ in 0..59 {
            assert!(matches!(session.tick(), TickOutcome::Running { .. }));
        }
        assert!(session.is_low_time());
        assert!(matches!(session.tick(), TickOutcome::Expired(_)));
        assert_eq!(session.remaining_secs(), Some(0));
        assert_eq!(session.timer_state(), TimerState::Expired);
        assert_eq!(
            session.set_answer("q0", "late".into()),
            Err(SessionError::NotInProgress(Lifecycle::Submitted))
        );
        assert_eq!(session.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn test_picker_reflects_answers_and_flags() {
        let mut session = started(None, 3);
        session.answer_current("a".into()).unwrap();
        session.toggle_flag(2).unwrap();
        session.jump_to(1).unwrap();

        let picker = session.picker();
        assert!(picker[0].answered && !picker[0].current);
        assert!(picker[1].current && !picker[1].answered);
        assert!(picker[2].flagged);
        assert_eq!(session.progress(), (1, 3));
    }

    #[test]
    fn test_start_resumed_keeps_order() {
        let mut session = AttemptSession::new(quiz(None, 3));
        session
            .start_resumed(&["q2".to_string(), "q0".to_string(), "q1".to_string()])
            .unwrap();
        let ids: Vec<&str> = session.questions().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q2", "q0", "q1"]);
    }
}
