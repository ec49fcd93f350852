use crate::analytics::Emitter;
use crate::models::{AppState, Question};
use crate::protocol::ResultSummary;
use crate::session::{CheckResult, QuizResult, QuizSession, SessionError};
use crate::time::Clock;

/// Presentation state around a [`QuizSession`].
///
/// Owns what only the screen cares about (highlighted option, scroll
/// offsets, banner text) and forwards every quiz transition to the session.
pub struct App {
    pub state: AppState,
    questions: Vec<Question>,
    quiz_id: Option<String>,
    seed: Option<u64>,
    clock: Clock,
    emitter: Emitter,
    session: Option<QuizSession>,
    highlighted: Option<usize>,
    banner: Option<String>,
    result: Option<QuizResult>,
    result_scroll: usize,
    review_index: usize,
}

impl App {
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            state: AppState::Welcome,
            questions,
            quiz_id: None,
            seed: None,
            clock: Clock::default(),
            emitter: Emitter::disabled(),
            session: None,
            highlighted: None,
            banner: None,
            result: None,
            result_scroll: 0,
            review_index: 0,
        }
    }

    pub fn with_quiz_id(mut self, quiz_id: Option<String>) -> Self {
        self.quiz_id = quiz_id;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_analytics(mut self, emitter: Emitter) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn highlighted_option(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn review_index(&self) -> usize {
        self.review_index
    }

    /// Outcome of the question under the cursor, if it was already checked.
    pub fn current_outcome(&self) -> Option<&CheckResult> {
        let session = self.session.as_ref()?;
        session.outcome(session.current_index())
    }

    /// Begin a new sitting. Each start reshuffles the source questions.
    pub fn start_quiz(&mut self) {
        let built = QuizSession::builder(self.questions.clone())
            .with_quiz_id(self.quiz_id.clone())
            .with_seed(self.seed)
            .with_clock(self.clock)
            .with_analytics(self.emitter.for_new_session())
            .build();

        match built {
            Ok(session) => {
                self.session = Some(session);
                self.highlighted = None;
                self.banner = None;
                self.result = None;
                self.state = AppState::Quiz;
            }
            Err(e) => self.banner = Some(e.to_string()),
        }
    }

    pub fn highlight_next_option(&mut self) {
        let Some(count) = self.current_option_count() else {
            return;
        };
        let next = match self.highlighted {
            Some(i) => (i + 1) % count,
            None => 0,
        };
        self.pick_option(next);
    }

    pub fn highlight_previous_option(&mut self) {
        let Some(count) = self.current_option_count() else {
            return;
        };
        let previous = match self.highlighted {
            Some(i) => (i + count - 1) % count,
            None => count - 1,
        };
        self.pick_option(previous);
    }

    /// Highlight `option` and make it the tentative choice.
    pub fn pick_option(&mut self, option: usize) {
        let outcome = self.with_session(|s| s.select_option(option));
        if outcome.is_some() {
            self.highlighted = Some(option);
        }
    }

    /// Check the current question; on an already checked last question this
    /// finishes the quiz instead.
    pub fn confirm(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.is_locked(session.current_index()) && session.is_last() {
            self.finish();
            return;
        }
        self.with_session(QuizSession::check_answer);
    }

    pub fn next_question(&mut self) {
        if self.with_session(QuizSession::go_to_next).is_some() {
            self.sync_highlight();
        }
    }

    pub fn previous_question(&mut self) {
        if self.with_session(QuizSession::go_to_previous).is_some() {
            self.sync_highlight();
        }
    }

    pub fn finish(&mut self) {
        if let Some(result) = self.with_session(QuizSession::finish) {
            self.result = Some(result);
            self.result_scroll = 0;
            self.state = AppState::Result;
        }
    }

    pub fn scroll_results_down(&mut self) {
        let max = self.total_questions().saturating_sub(1);
        self.result_scroll = (self.result_scroll + 1).min(max);
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    pub fn start_review(&mut self) {
        if self.result.is_some() {
            self.review_index = 0;
            self.state = AppState::Review;
        }
    }

    pub fn review_next(&mut self) {
        let max = self.total_questions().saturating_sub(1);
        self.review_index = (self.review_index + 1).min(max);
    }

    pub fn review_previous(&mut self) {
        self.review_index = self.review_index.saturating_sub(1);
    }

    pub fn back_to_results(&mut self) {
        if self.result.is_some() {
            self.state = AppState::Result;
        }
    }

    pub fn restart(&mut self) {
        self.state = AppState::Welcome;
        self.session = None;
        self.highlighted = None;
        self.banner = None;
        self.result = None;
        self.result_scroll = 0;
        self.review_index = 0;
    }

    /// Summary of the finished session, if there is one.
    pub fn summary(&self) -> Option<ResultSummary> {
        let session = self.session.as_ref()?;
        let result = self.result?;
        Some(ResultSummary {
            session_id: session.id(),
            quiz_id: session.quiz_id().map(str::to_string),
            result,
        })
    }

    fn current_option_count(&self) -> Option<usize> {
        self.session
            .as_ref()
            .map(|s| s.current_question().option_count())
    }

    /// Keep the highlight on the recorded answer of a checked question, or on
    /// the tentative choice of an open one.
    fn sync_highlight(&mut self) {
        self.highlighted = self
            .session
            .as_ref()
            .and_then(|s| s.answer(s.current_index()).or(s.tentative_selection()));
    }

    /// Run a transition, turning a rejection into the banner text.
    fn with_session<T>(
        &mut self,
        op: impl FnOnce(&mut QuizSession) -> Result<T, SessionError>,
    ) -> Option<T> {
        let session = self.session.as_mut()?;
        match op(session) {
            Ok(value) => {
                self.banner = None;
                Some(value)
            }
            Err(e) => {
                tracing::debug!("rejected: {}", e);
                self.banner = Some(banner_text(&e));
                None
            }
        }
    }
}

fn banner_text(err: &SessionError) -> String {
    match err {
        SessionError::NothingSelected { .. } => "Pick an option before checking".to_string(),
        SessionError::Locked { .. } => "This question is already checked".to_string(),
        other => other.to_string(),
    }
}
