//! # study-quiz
//!
//! Quiz-taking core of a study assistant: a shuffled, lock-once question
//! session with scoring, best-effort interaction analytics, and a terminal
//! front-end.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use study_quiz::{Quiz, QuizError};
//!
//! fn main() -> Result<(), QuizError> {
//!     // Load questions from a JSON file
//!     let quiz = Quiz::from_json("quiz.json")?;
//!
//!     // Run the quiz in the terminal
//!     quiz.run()?;
//!
//!     Ok(())
//! }
//! ```

pub mod analytics;
mod app;
pub mod auth;
pub mod config;
mod data;
pub mod logging;
mod models;
pub mod protocol;
pub mod session;
pub mod terminal;
pub mod time;
mod ui;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use thiserror::Error;

pub use analytics::{AnalyticsSink, Emitter, HttpSink, MemorySink};
pub use app::App;
pub use auth::{AuthProvider, StaticAuth};
pub use config::{Cli, Config};
pub use data::{LoadError, QuizSource, load_questions_from_json, parse_questions};
pub use models::{AppState, Question};
pub use protocol::{InteractionRecord, ResultSummary};
pub use session::{CheckResult, QuizResult, QuizSession, SessionError};

/// How long shutdown waits for interaction records still in flight.
const FLUSH_GRACE: Duration = Duration::from_secs(2);

/// Error type for quiz operations.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("failed to load questions: {0}")]
    Load(#[from] LoadError),
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("failed to set up logging: {0}")]
    Logging(#[from] logging::LogError),
    #[error("failed to set up analytics: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A quiz instance that can be run in the terminal.
pub struct Quiz {
    app: App,
}

impl Quiz {
    /// Create a new quiz from a vector of questions, with analytics off.
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            app: App::with_questions(questions),
        }
    }

    /// Load a quiz from a JSON file.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use study_quiz::Quiz;
    ///
    /// let quiz = Quiz::from_json("quiz.json").expect("Failed to load quiz");
    /// ```
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self, QuizError> {
        let source = load_questions_from_json(path)?;
        Ok(Self {
            app: App::with_questions(source.questions).with_quiz_id(source.quiz_id),
        })
    }

    /// Build a quiz from resolved configuration, wiring the analytics sink
    /// when an endpoint is configured.
    pub fn from_config(config: &Config) -> Result<Self, QuizError> {
        let source = load_questions_from_json(&config.questions_path)?;
        let quiz_id = config.quiz_id.clone().or(source.quiz_id);

        let emitter = match &config.analytics {
            Some(analytics) => {
                let auth: Arc<dyn AuthProvider> = match &analytics.access_token {
                    Some(token) => Arc::new(StaticAuth::new(token.clone(), analytics.user_id.clone())),
                    None => Arc::new(StaticAuth::signed_out()),
                };
                let sink = HttpSink::new(
                    analytics.endpoint.clone(),
                    analytics.api_key.clone(),
                    auth,
                    analytics.timeout,
                )?;
                tracing::info!(endpoint = sink.endpoint(), "interaction analytics enabled");
                Emitter::new(Arc::new(sink))
            }
            None => Emitter::disabled(),
        };

        let app = App::with_questions(source.questions)
            .with_quiz_id(quiz_id)
            .with_seed(config.seed)
            .with_analytics(emitter);
        Ok(Self { app })
    }

    /// Run the quiz in the terminal.
    ///
    /// This will take over the terminal, display the quiz UI, and return
    /// when the user quits, with the summary of the last finished session.
    pub fn run(mut self) -> Result<Option<ResultSummary>, QuizError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        let outcome = {
            let _context = runtime.enter();
            let mut term = terminal::TerminalGuard::enter()?;
            run_event_loop(&mut term, &mut self.app)
        };

        let emitter = self.app.emitter().clone();
        runtime.block_on(async {
            if tokio::time::timeout(FLUSH_GRACE, emitter.flush()).await.is_err() {
                tracing::warn!("gave up waiting for pending interaction records");
            }
        });

        outcome.map(|()| self.app.summary())
    }

    /// Get a reference to the underlying app for custom handling.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the underlying app for custom handling.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}

fn run_event_loop(terminal: &mut terminal::AppTerminal, app: &mut App) -> Result<(), QuizError> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if handle_input(app, key.code) {
                break;
            }
        }
    }

    Ok(())
}

/// Returns true if the app should exit.
fn handle_input(app: &mut App, key: KeyCode) -> bool {
    if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q')) {
        return true;
    }

    match app.state {
        AppState::Welcome => handle_welcome_input(app, key),
        AppState::Quiz => handle_quiz_input(app, key),
        AppState::Result => handle_result_input(app, key),
        AppState::Review => handle_review_input(app, key),
    }
    false
}

fn handle_welcome_input(app: &mut App, key: KeyCode) {
    if key == KeyCode::Enter {
        app.start_quiz();
    }
}

fn handle_quiz_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.highlight_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.highlight_next_option(),
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(digit) = c.to_digit(10) {
                app.pick_option(digit as usize - 1);
            }
        }
        KeyCode::Enter | KeyCode::Char(' ') => app.confirm(),
        KeyCode::Right | KeyCode::Char('l') => app.next_question(),
        KeyCode::Left | KeyCode::Char('h') => app.previous_question(),
        KeyCode::Char('f') | KeyCode::Char('F') => app.finish(),
        _ => {}
    }
}

fn handle_result_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
        KeyCode::Char('v') | KeyCode::Char('V') => app.start_review(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.restart(),
        _ => {}
    }
}

fn handle_review_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Right | KeyCode::Char('l') => app.review_next(),
        KeyCode::Left | KeyCode::Char('h') => app.review_previous(),
        KeyCode::Esc | KeyCode::Backspace => app.back_to_results(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(n: usize) -> Quiz {
        let questions = (0..n)
            .map(|i| Question::new(format!("Q{i}"), vec!["a".into(), "b".into()], 0))
            .collect();
        Quiz::new(questions)
    }

    #[test]
    fn keys_drive_a_full_sitting() {
        let mut quiz = quiz(2);
        let app = quiz.app_mut();

        assert!(!handle_input(app, KeyCode::Enter));
        assert_eq!(app.state, AppState::Quiz);

        handle_input(app, KeyCode::Char('1'));
        handle_input(app, KeyCode::Enter);
        handle_input(app, KeyCode::Char('l'));
        handle_input(app, KeyCode::Char('2'));
        handle_input(app, KeyCode::Enter);
        handle_input(app, KeyCode::Enter);

        assert_eq!(app.state, AppState::Result);
        let result = *app.result().unwrap();
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.wrong_count, 1);

        handle_input(app, KeyCode::Char('v'));
        assert_eq!(app.state, AppState::Review);
        handle_input(app, KeyCode::Esc);
        assert_eq!(app.state, AppState::Result);
    }

    #[test]
    fn q_quits_from_any_screen() {
        let mut quiz = quiz(1);
        let app = quiz.app_mut();
        assert!(handle_input(app, KeyCode::Char('q')));
        app.start_quiz();
        assert!(handle_input(app, KeyCode::Char('Q')));
    }

    #[test]
    fn digit_past_last_option_is_rejected() {
        let mut quiz = quiz(1);
        let app = quiz.app_mut();
        app.start_quiz();
        handle_input(app, KeyCode::Char('9'));

        assert_eq!(app.highlighted_option(), None);
        assert!(app.banner().is_some());
    }
}
