// src/session/initializer.rs

use rand::{Rng, seq::SliceRandom};

use crate::models::{question::Question, quiz::QuizDefinition};

/// Builds the question sequence for a fresh attempt.
///
/// Questions are put in display order first; randomized quizzes are then
/// shuffled with the supplied RNG.
pub(super) fn order_questions<R: Rng + ?Sized>(quiz: &QuizDefinition, rng: &mut R) -> Vec<Question> {
    let mut questions = quiz.questions.clone();
    questions.sort_by_key(|q| q.order);
    if quiz.randomize_questions {
        questions.shuffle(rng);
    }
    questions
}

/// Rebuilds the sequence of a resumed attempt from its question-id order.
/// Ids that no longer exist are skipped; questions missing from `order`
/// are appended in display order.
pub(super) fn restore_order(quiz: &QuizDefinition, order: &[String]) -> Vec<Question> {
    let mut remaining = quiz.questions.clone();
    remaining.sort_by_key(|q| q.order);

    let mut questions = Vec::with_capacity(remaining.len());
    for id in order {
        if let Some(pos) = remaining.iter().position(|q| &q.id == id) {
            questions.push(remaining.remove(pos));
        }
    }
    questions.extend(remaining);
    questions
}
