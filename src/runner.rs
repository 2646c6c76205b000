// src/runner.rs

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    api::QuizApi,
    config::TICK_INTERVAL,
    models::{question::AnswerValue, question::Question, submission::SubmissionPayload},
    session::{
        AttemptSession, Lifecycle, QuestionStatus, SessionError, SubmissionReport, SubmitPrompt,
        SubmitTrigger, Tick, TickOutcome, TimerHandle, submit_attempt,
    },
};

const TICK_BUFFER: usize = 8;

/// Respondent actions, applied in the order they arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Jump(usize),
    /// Toggles the flag of the given question, or of the current one.
    Flag(Option<usize>),
    /// Answers the current question.
    Answer(AnswerValue),
    /// Requests the question picker.
    Overview,
    Submit,
    Confirm,
    Cancel,
    Exit,
}

/// What the front-end needs to draw one question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub question: Question,
    pub answer: Option<AnswerValue>,
    pub flagged: bool,
    pub answered: usize,
    pub remaining: Option<u32>,
}

impl QuestionView {
    fn of(session: &AttemptSession) -> Option<Self> {
        let question = session.current()?.clone();
        Some(Self {
            index: session.current_index(),
            total: session.question_count(),
            answer: session.answer(&question.id).cloned(),
            flagged: session.is_flagged(session.current_index()),
            answered: session.answered_count(),
            remaining: session.remaining_secs(),
            question,
        })
    }
}

/// Events published to the front-end while an attempt runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Started {
        session: Uuid,
        total: usize,
        time_limit_secs: Option<u32>,
    },
    /// The quiz has no questions; only submit or exit make sense.
    Empty,
    Question(QuestionView),
    Overview(Vec<QuestionStatus>),
    Tick { remaining: u32 },
    LowTime { remaining: u32 },
    Prompt(SubmitPrompt),
    Rejected(SessionError),
    Submitting(SubmitTrigger),
}

#[derive(Debug)]
pub enum RunOutcome {
    Submitted(SubmissionReport),
    /// Respondent exited before submitting.
    Exited,
    /// Command channel closed (front-end went away) before submission.
    Abandoned,
}

enum Event {
    Tick,
    Command(Option<Command>),
}

/// Drives one attempt until it is submitted, exited or abandoned.
///
/// A session that has not been started yet is started here. The countdown
/// task is owned by this loop and stopped before the submission is sent.
pub async fn run_attempt<A>(
    mut session: AttemptSession,
    api: &A,
    mut commands: mpsc::Receiver<Command>,
    updates: mpsc::UnboundedSender<Update>,
) -> RunOutcome
where
    A: QuizApi + ?Sized,
{
    match session.lifecycle() {
        Lifecycle::NotStarted => {
            let started = session.start(&mut rand::thread_rng());
            if let Err(e) = started {
                tracing::error!("Failed to start attempt: {}", e);
                return RunOutcome::Abandoned;
            }
        }
        Lifecycle::InProgress => {}
        Lifecycle::Submitted => {
            tracing::warn!(session = %session.id(), "Attempt already submitted");
            return RunOutcome::Abandoned;
        }
    }

    let (tick_tx, mut tick_rx) = mpsc::channel(TICK_BUFFER);
    let mut timer = session
        .remaining_secs()
        .map(|_| TimerHandle::spawn(TICK_INTERVAL, tick_tx));

    publish(
        &updates,
        Update::Started {
            session: session.id(),
            total: session.question_count(),
            time_limit_secs: session.remaining_secs(),
        },
    );
    publish_question(&updates, &session);

    let mut warned = false;
    loop {
        let event = tokio::select! {
            biased;
            Some(Tick) = tick_rx.recv(), if timer.is_some() => Event::Tick,
            command = commands.recv() => Event::Command(command),
        };

        let command = match event {
            Event::Tick => {
                match session.tick() {
                    TickOutcome::Running { remaining } => {
                        publish(&updates, Update::Tick { remaining });
                        if !warned && session.is_low_time() {
                            warned = true;
                            tracing::warn!(session = %session.id(), remaining, "Time is running out");
                            publish(&updates, Update::LowTime { remaining });
                        }
                    }
                    TickOutcome::Expired(payload) => {
                        return finish(api, &updates, timer.take(), SubmitTrigger::Timeout, payload).await;
                    }
                    TickOutcome::Ignored => {}
                }
                continue;
            }
            Event::Command(None) => {
                tracing::info!(session = %session.id(), "Command channel closed, abandoning attempt");
                stop_timer(timer.take()).await;
                session.exit();
                return RunOutcome::Abandoned;
            }
            Event::Command(Some(command)) => command,
        };

        tracing::debug!(session = %session.id(), ?command, "Applying command");
        let applied = match command {
            Command::Exit => {
                stop_timer(timer.take()).await;
                session.exit();
                return RunOutcome::Exited;
            }
            Command::Confirm => match session.confirm_submit() {
                Ok(Some(payload)) => {
                    return finish(api, &updates, timer.take(), SubmitTrigger::User, payload).await;
                }
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            },
            Command::Submit => session
                .request_submit()
                .map(|prompt| publish(&updates, Update::Prompt(prompt))),
            Command::Cancel => session
                .cancel_submit()
                .map(|_| publish_question(&updates, &session)),
            Command::Overview => {
                publish(&updates, Update::Overview(session.picker()));
                Ok(())
            }
            Command::Next => session.next().map(|_| publish_question(&updates, &session)),
            Command::Previous => session
                .previous()
                .map(|_| publish_question(&updates, &session)),
            Command::Jump(index) => session
                .jump_to(index)
                .map(|_| publish_question(&updates, &session)),
            Command::Flag(index) => {
                let index = index.unwrap_or(session.current_index());
                session
                    .toggle_flag(index)
                    .map(|_| publish_question(&updates, &session))
            }
            Command::Answer(value) => session
                .answer_current(value)
                .map(|_| publish_question(&updates, &session)),
        };

        if let Err(e) = applied {
            tracing::warn!(session = %session.id(), "Command rejected: {}", e);
            publish(&updates, Update::Rejected(e));
        }
    }
}

async fn finish<A>(
    api: &A,
    updates: &mpsc::UnboundedSender<Update>,
    timer: Option<TimerHandle>,
    trigger: SubmitTrigger,
    payload: SubmissionPayload,
) -> RunOutcome
where
    A: QuizApi + ?Sized,
{
    stop_timer(timer).await;
    publish(updates, Update::Submitting(trigger));
    RunOutcome::Submitted(submit_attempt(api, trigger, payload).await)
}

async fn stop_timer(timer: Option<TimerHandle>) {
    if let Some(timer) = timer {
        timer.stop().await;
    }
}

fn publish(updates: &mpsc::UnboundedSender<Update>, update: Update) {
    if updates.send(update).is_err() {
        tracing::debug!("Front-end gone, update dropped");
    }
}

fn publish_question(updates: &mpsc::UnboundedSender<Update>, session: &AttemptSession) {
    match QuestionView::of(session) {
        Some(view) => publish(updates, Update::Question(view)),
        None => publish(updates, Update::Empty),
    }
}
