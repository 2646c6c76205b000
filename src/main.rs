// src/main.rs

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use quiztaker::{
    AttemptSession,
    api::{HttpQuizApi, QuizApi},
    cli::{self, Args, Input},
    config::Config,
    models::question::Question,
    run_attempt,
    runner::{Command, RunOutcome, Update},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::mpsc,
};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

const COMMAND_BUFFER: usize = 16;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration from environment (.env included)
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    if let Some(secs) = args.timeout {
        config.http_timeout = Duration::from_secs(secs);
    }
    let quiz_id = args.quiz_id;

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "quiztaker.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    // Terminal output belongs to the quiz; logs on stderr stay at warn and above.
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(LevelFilter::WARN);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    let api = match HttpQuizApi::from_config(&config) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    let quiz = match api.fetch_quiz(&quiz_id).await {
        Ok(quiz) => quiz,
        Err(e) => {
            tracing::error!("Failed to load quiz {}: {}", quiz_id, e);
            println!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };
    let show_results = quiz.show_results;

    println!("{}", cli::render_intro(&quiz));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    if !wait_for_start(&mut lines).await {
        println!("Bye.");
        return ExitCode::SUCCESS;
    }

    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (update_tx, update_rx) = mpsc::unbounded_channel();

    let session = AttemptSession::new(quiz);
    let (outcome, ()) = tokio::join!(
        run_attempt(session, &api, command_rx, update_tx),
        drive_terminal(lines, command_tx, update_rx),
    );

    println!("{}", cli::render_outcome(&outcome, show_results));
    match outcome {
        RunOutcome::Submitted(report) if !report.is_success() => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

/// Shows the instructions until the respondent types `start`. Returns
/// `false` when they quit instead.
async fn wait_for_start(lines: &mut Lines<BufReader<Stdin>>) -> bool {
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return false,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                return false;
            }
        };
        match cli::parse_line(&line, None) {
            Ok(Input::Start) => return true,
            Ok(Input::Command(Command::Exit)) => return false,
            Ok(Input::Help) => println!("{}", cli::HELP),
            _ => println!("Type `start` to begin or `q` to quit."),
        }
    }
}

/// Forwards parsed input to the runner and prints its updates until the
/// runner finishes.
async fn drive_terminal(
    mut lines: Lines<BufReader<Stdin>>,
    commands: mpsc::Sender<Command>,
    mut updates: mpsc::UnboundedReceiver<Update>,
) {
    let mut current: Option<Question> = None;

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                match &update {
                    Update::Question(view) => current = Some(view.question.clone()),
                    Update::Empty => current = None,
                    _ => {}
                }
                if let Some(text) = cli::render_update(&update) {
                    println!("{}", text);
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    // Closing stdin abandons the attempt.
                    Ok(None) | Err(_) => break,
                };
                match cli::parse_line(&line, current.as_ref()) {
                    Ok(Input::Command(command)) => {
                        if commands.send(command).await.is_err() {
                            break;
                        }
                    }
                    Ok(Input::Help) => println!("{}", cli::HELP),
                    Ok(Input::Start) => println!("The quiz is already running."),
                    Err(message) => println!("{}", message),
                }
            }
        }
    }
}
