// src/cli.rs

//! Line-based terminal front-end: parses respondent input into runner
//! commands and renders runner updates as text.

use clap::Parser;

use crate::{
    models::{
        question::{AnswerValue, Question, QuestionType},
        quiz::QuizDefinition,
        submission::SubmissionPayload,
    },
    runner::{Command, QuestionView, RunOutcome, Update},
    session::{QuestionStatus, SubmitTrigger},
    utils::time::{format_limit, format_remaining},
};

#[derive(Debug, Parser)]
#[command(name = "quiztaker", version, about = "Take a timed quiz in the terminal")]
pub struct Args {
    /// Id of the quiz to take.
    pub quiz_id: String,

    #[arg(long, help = "HTTP timeout in seconds, overrides QUIZ_HTTP_TIMEOUT_SECS")]
    pub timeout: Option<u64>,
}

pub const HELP: &str = "\
Commands:
  n, next            next question
  p, prev            previous question
  j N, jump N        go to question N
  f [N], flag [N]    flag/unflag current question (or question N)
  a X, answer X      answer the current question
                     (option numbers for choices, e.g. `a 2` or `a 1,3`; t/f for true/false)
  l, list            question overview
  s, submit          submit the quiz
  y, yes             confirm submission
  c, cancel          cancel submission
  q, quit            exit without submitting
  ?, help            show this help";

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    Help,
    Command(Command),
}

/// Parses a line. `current` is the question on screen, needed to resolve
/// option numbers.
pub fn parse_line(line: &str, current: Option<&Question>) -> Result<Input, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "start" => return Ok(Input::Start),
        "?" | "h" | "help" => return Ok(Input::Help),
        "n" | "next" => Command::Next,
        "p" | "prev" | "previous" => Command::Previous,
        "j" | "jump" => Command::Jump(parse_number(rest)?),
        "f" | "flag" if rest.is_empty() => Command::Flag(None),
        "f" | "flag" => Command::Flag(Some(parse_number(rest)?)),
        "a" | "answer" => {
            let question = current.ok_or_else(|| "No question to answer".to_string())?;
            Command::Answer(parse_answer(question, rest)?)
        }
        "l" | "list" => Command::Overview,
        "s" | "submit" => Command::Submit,
        "y" | "yes" | "confirm" => Command::Confirm,
        "c" | "cancel" | "no" => Command::Cancel,
        "q" | "quit" | "exit" => Command::Exit,
        "" => return Err("Type `?` for help".to_string()),
        other => return Err(format!("Unknown command `{}`, type `?` for help", other)),
    };
    Ok(Input::Command(command))
}

/// 1-based question number to 0-based index.
fn parse_number(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("`{}` is not a question number", raw)),
    }
}

/// Turns raw input into an answer for the given question. Empty input
/// clears the answer.
pub fn parse_answer(question: &Question, raw: &str) -> Result<AnswerValue, String> {
    if raw.is_empty() {
        return Ok(AnswerValue::default());
    }

    match question.question_type {
        QuestionType::ShortAnswer | QuestionType::Essay => Ok(AnswerValue::Text(raw.to_string())),
        QuestionType::TrueFalse => {
            let choices = question.choices();
            let pick = match raw.to_lowercase().as_str() {
                "t" | "true" | "1" => 0,
                "f" | "false" | "2" => 1,
                _ => return Err("Answer with t(rue) or f(alse)".to_string()),
            };
            choices
                .get(pick)
                .cloned()
                .map(AnswerValue::Text)
                .ok_or_else(|| "Question has no choices".to_string())
        }
        QuestionType::MultipleChoice => {
            let choices = question.choices();
            let mut picked = Vec::new();
            for part in raw.split([',', ' ']).filter(|p| !p.is_empty()) {
                let choice = part
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .and_then(|n| choices.get(n - 1))
                    .ok_or_else(|| format!("Pick option numbers between 1 and {}", choices.len()))?;
                if !picked.contains(choice) {
                    picked.push(choice.clone());
                }
            }

            if question.allows_many() {
                Ok(AnswerValue::Many(picked))
            } else if picked.len() == 1 {
                Ok(AnswerValue::Text(picked.remove(0)))
            } else {
                Err("Pick exactly one option".to_string())
            }
        }
    }
}

pub fn render_intro(quiz: &QuizDefinition) -> String {
    let mut out = format!("== {} ==\n", quiz.title);
    if !quiz.description.is_empty() {
        out.push_str(&format!("{}\n", quiz.description));
    }
    out.push_str(&format!(
        "\nQuestions: {}\nPoints: {}\nTime limit: {}\nAttempts allowed: {}\nPassing score: {}%\n",
        quiz.questions.len(),
        quiz.total_points(),
        format_limit(quiz.time_limit),
        quiz.max_attempts,
        quiz.passing_score
    ));
    if quiz.time_limit_secs().is_some() {
        out.push_str("The timer starts when you begin and the quiz is submitted automatically when it runs out.\n");
    }
    out.push_str("\nType `start` to begin or `q` to quit.");
    out
}

fn render_answer(answer: &AnswerValue) -> String {
    match answer {
        AnswerValue::Text(text) => text.clone(),
        AnswerValue::Many(items) => items.join(", "),
    }
}

pub fn render_question(view: &QuestionView) -> String {
    let q = &view.question;
    let mut out = format!("\nQuestion {} of {}", view.index + 1, view.total);
    if view.flagged {
        out.push_str(" [flagged]");
    }
    if let Some(remaining) = view.remaining {
        out.push_str(&format!("  ({} left)", format_remaining(remaining)));
    }
    out.push_str(&format!("  {} pt\n{}\n", q.points, q.content));

    for (i, choice) in q.choices().iter().enumerate() {
        out.push_str(&format!("  {}) {}\n", i + 1, choice));
    }
    if q.allows_many() {
        out.push_str("  (select all that apply)\n");
    }

    match view.answer.as_ref().filter(|a| !a.is_empty()) {
        Some(answer) => out.push_str(&format!("Your answer: {}\n", render_answer(answer))),
        None => out.push_str("Not answered\n"),
    }
    out.push_str(&format!("Answered {}/{}", view.answered, view.total));
    out
}

pub fn render_overview(statuses: &[QuestionStatus]) -> String {
    statuses
        .iter()
        .map(|s| {
            format!(
                "{}{:>3} {}{}",
                if s.current { ">" } else { " " },
                s.index + 1,
                if s.answered { "answered" } else { "--" },
                if s.flagged { " (flagged)" } else { "" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text for an update, or `None` when nothing should be printed.
pub fn render_update(update: &Update) -> Option<String> {
    match update {
        Update::Started { total, time_limit_secs, .. } => Some(match time_limit_secs {
            Some(secs) => format!("Quiz started: {} questions, {} on the clock.", total, format_remaining(*secs)),
            None => format!("Quiz started: {} questions.", total),
        }),
        Update::Empty => Some("This quiz has no questions. Submit (`s`) or quit (`q`).".to_string()),
        Update::Question(view) => Some(render_question(view)),
        Update::Overview(statuses) => Some(render_overview(statuses)),
        // Only whole minutes are announced to keep the terminal readable.
        Update::Tick { remaining } if *remaining > 0 && *remaining % 60 == 0 => {
            Some(format!("{} remaining", format_remaining(*remaining)))
        }
        Update::Tick { .. } => None,
        Update::LowTime { remaining } => Some(format!(
            "Hurry up! Only {} left.",
            format_remaining(*remaining)
        )),
        Update::Prompt(prompt) => Some(format!("{} (y/c)", prompt.message())),
        Update::Rejected(e) => Some(e.to_string()),
        Update::Submitting(SubmitTrigger::Timeout) => Some("Time's up! Submitting your answers...".to_string()),
        Update::Submitting(SubmitTrigger::User) => Some("Submitting your answers...".to_string()),
    }
}

fn render_payload(payload: &SubmissionPayload) -> String {
    payload
        .answers()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let answer = if entry.answer.is_empty() {
                "(no answer)".to_string()
            } else {
                render_answer(&entry.answer)
            };
            format!("  {}. {}", i + 1, answer)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_outcome(outcome: &RunOutcome, show_results: bool) -> String {
    let report = match outcome {
        RunOutcome::Exited => return "Quiz exited without submitting.".to_string(),
        RunOutcome::Abandoned => return "Quiz abandoned, nothing was submitted.".to_string(),
        RunOutcome::Submitted(report) => report,
    };

    match &report.result {
        Ok(graded) if show_results => {
            let mut out = "Quiz submitted.".to_string();
            if let (Some(score), Some(total)) = (graded.score, graded.total_points) {
                out.push_str(&format!("\nScore: {} / {}", score, total));
            } else if let Some(score) = graded.score {
                out.push_str(&format!("\nScore: {}", score));
            }
            if let Some(percentage) = graded.percentage {
                out.push_str(&format!(" ({:.0}%)", percentage));
            }
            match graded.passed {
                Some(true) => out.push_str("\nPassed!"),
                Some(false) => out.push_str("\nNot passed."),
                None => {}
            }
            out
        }
        Ok(_) => "Quiz submitted. Results will be available later.".to_string(),
        Err(e) => format!(
            "{}\nThe attempt cannot be submitted again. Your answers were:\n{}",
            e.user_message(),
            render_payload(&report.payload)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(kind: &str, options: serde_json::Value, correct: serde_json::Value) -> Question {
        let mut value = serde_json::json!({
            "id": "q",
            "type": kind,
            "question": "?",
            "correctAnswer": correct
        });
        if !options.is_null() {
            value["options"] = options;
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse_line("n", None), Ok(Input::Command(Command::Next)));
        assert_eq!(parse_line(" prev ", None), Ok(Input::Command(Command::Previous)));
        assert_eq!(parse_line("j 3", None), Ok(Input::Command(Command::Jump(2))));
        assert_eq!(parse_line("f", None), Ok(Input::Command(Command::Flag(None))));
        assert_eq!(parse_line("flag 1", None), Ok(Input::Command(Command::Flag(Some(0)))));
        assert_eq!(parse_line("START", None), Ok(Input::Start));
        assert!(parse_line("j 0", None).is_err());
        assert!(parse_line("dance", None).is_err());
    }

    #[test]
    fn test_answer_needs_question() {
        assert!(parse_line("a hello", None).is_err());
    }

    #[test]
    fn test_parse_single_choice() {
        let q = question("multiple-choice", serde_json::json!(["A", "B", "C"]), serde_json::json!("B"));
        assert_eq!(
            parse_line("a 2", Some(&q)),
            Ok(Input::Command(Command::Answer(AnswerValue::from("B"))))
        );
        assert!(parse_answer(&q, "1,2").is_err());
        assert!(parse_answer(&q, "4").is_err());
    }

    #[test]
    fn test_parse_many_choices() {
        let q = question(
            "multiple-choice",
            serde_json::json!(["A", "B", "C"]),
            serde_json::json!(["A", "C"]),
        );
        assert_eq!(
            parse_answer(&q, "3,1,3"),
            Ok(AnswerValue::Many(vec!["C".to_string(), "A".to_string()]))
        );
    }

    #[test]
    fn test_parse_true_false_and_text() {
        let tf = question("true-false", serde_json::Value::Null, serde_json::json!("True"));
        assert_eq!(parse_answer(&tf, "f"), Ok(AnswerValue::from("False")));

        let essay = question("essay", serde_json::Value::Null, serde_json::Value::Null);
        assert_eq!(
            parse_line("answer borrow checker", Some(&essay)),
            Ok(Input::Command(Command::Answer(AnswerValue::from("borrow checker"))))
        );
        assert_eq!(parse_answer(&essay, ""), Ok(AnswerValue::default()));
    }

    #[test]
    fn test_args_take_quiz_id_and_timeout() {
        let args = Args::try_parse_from(["quiztaker", "rust-101", "--timeout", "3"]).unwrap();
        assert_eq!(args.quiz_id, "rust-101");
        assert_eq!(args.timeout, Some(3));
    }

    #[test]
    fn test_args_help_is_not_a_quiz_id() {
        let err = Args::try_parse_from(["quiztaker", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);

        let err = Args::try_parse_from(["quiztaker"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_tick_rendering_is_sparse() {
        assert_eq!(render_update(&Update::Tick { remaining: 59 }), None);
        assert_eq!(
            render_update(&Update::Tick { remaining: 120 }),
            Some("02:00 remaining".to_string())
        );
    }
}
