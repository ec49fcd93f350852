//! The quiz-taking state machine.
//!
//! Per question: `Unanswered -> TentativelySelected -> Locked`.
//! Per session: `InProgress -> Completed`. Neither `Locked` nor `Completed`
//! can be left once entered.

mod error;
mod scoring;
mod shuffle;

use std::fmt;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use uuid::Uuid;

use crate::analytics::Emitter;
use crate::models::Question;
use crate::protocol::InteractionRecord;
use crate::time::{Clock, elapsed_seconds};

pub use error::{ErrorKind, SessionError};
pub use scoring::{CheckResult, QuizResult, accuracy_percent};
pub use shuffle::fisher_yates;

/// One sitting of a quiz over a fixed, shuffled question list.
pub struct QuizSession {
    id: Uuid,
    quiz_id: Option<String>,
    questions: Vec<Question>,
    current: usize,
    tentative: Option<usize>,
    answers: Vec<Option<usize>>,
    /// `Some` exactly for locked indices.
    outcomes: Vec<Option<CheckResult>>,
    question_started_at: Option<DateTime<Utc>>,
    completed: bool,
    clock: Clock,
    emitter: Emitter,
}

impl QuizSession {
    /// Start a session with a fresh random order and analytics disabled.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty.
    pub fn create(questions: Vec<Question>) -> Result<Self, SessionError> {
        Self::builder(questions).build()
    }

    pub fn builder(questions: Vec<Question>) -> QuizSessionBuilder {
        QuizSessionBuilder {
            questions,
            quiz_id: None,
            seed: None,
            clock: Clock::default(),
            emitter: Emitter::disabled(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn quiz_id(&self) -> Option<&str> {
        self.quiz_id.as_deref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    /// Tentative choice for the current question, if one is pending.
    #[must_use]
    pub fn tentative_selection(&self) -> Option<usize> {
        self.tentative
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<usize> {
        self.answers.get(index).copied().flatten()
    }

    /// The result recorded when `index` was checked.
    #[must_use]
    pub fn outcome(&self, index: usize) -> Option<&CheckResult> {
        self.outcomes.get(index).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn is_locked(&self, index: usize) -> bool {
        self.outcome(index).is_some()
    }

    pub fn locked_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.is_some().then_some(i))
    }

    #[must_use]
    pub fn locked_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_some()).count()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn question_started_at(&self) -> Option<DateTime<Utc>> {
        self.question_started_at
    }

    #[must_use]
    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Clock used for question timing. Exposed so replays and tests can
    /// advance a fixed clock.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Score as it stands now. Does not complete the session.
    #[must_use]
    pub fn result(&self) -> QuizResult {
        QuizResult::tally(&self.questions, &self.answers)
    }

    /// Record a tentative choice for the current question.
    ///
    /// # Errors
    ///
    /// `Completed` after `finish`, `Locked` if the current question was
    /// already checked, `OptionOutOfRange` for an option the question lacks.
    pub fn select_option(&mut self, option: usize) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.ensure_unlocked()?;

        let options = self.current_question().option_count();
        if option >= options {
            return Err(SessionError::OptionOutOfRange {
                index: self.current,
                option,
                options,
            });
        }

        self.tentative = Some(option);
        Ok(())
    }

    /// Commit the tentative choice, lock the question and report it.
    ///
    /// The interaction record goes out at most once per question index; a
    /// failed delivery is logged and never fails this call.
    ///
    /// # Errors
    ///
    /// `Completed` after `finish`, `Locked` if already checked,
    /// `NothingSelected` without a tentative choice.
    pub fn check_answer(&mut self) -> Result<CheckResult, SessionError> {
        self.ensure_in_progress()?;
        self.ensure_unlocked()?;
        let index = self.current;
        let selected = self
            .tentative
            .ok_or(SessionError::NothingSelected { index })?;

        let elapsed = self
            .question_started_at
            .map_or(0.0, |started| elapsed_seconds(started, self.clock.now()));

        let question = &self.questions[index];
        let result = CheckResult {
            is_correct: question.is_correct(selected),
            selected_option_index: selected,
            correct_option_index: question.correct_answer,
            elapsed_seconds: elapsed,
        };

        self.answers[index] = Some(selected);
        self.outcomes[index] = Some(result);
        self.tentative = None;

        tracing::debug!(
            session = %self.id,
            question = index,
            correct = result.is_correct,
            elapsed,
            "answer checked"
        );

        self.emitter.emit(InteractionRecord {
            question_id: index,
            is_correct: result.is_correct,
            time_taken: elapsed,
            quiz_id: self.quiz_id.clone(),
        });

        Ok(result)
    }

    /// Move to the next question. No-op on the last one.
    ///
    /// # Errors
    ///
    /// `Completed` after `finish`.
    pub fn go_to_next(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if self.current + 1 < self.questions.len() {
            self.arrive_at(self.current + 1);
        }
        Ok(())
    }

    /// Move to the previous question. No-op on the first one.
    ///
    /// # Errors
    ///
    /// `Completed` after `finish`.
    pub fn go_to_previous(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if self.current > 0 {
            self.arrive_at(self.current - 1);
        }
        Ok(())
    }

    /// Complete the session and score it. Unchecked questions count as
    /// unanswered, wherever the cursor is.
    ///
    /// # Errors
    ///
    /// `Completed` if the session was already finished.
    pub fn finish(&mut self) -> Result<QuizResult, SessionError> {
        self.ensure_in_progress()?;
        self.completed = true;
        self.tentative = None;
        self.question_started_at = None;

        let result = self.result();
        tracing::info!(
            session = %self.id,
            correct = result.correct_count,
            wrong = result.wrong_count,
            unanswered = result.unanswered_count,
            accuracy = result.accuracy_percent,
            "quiz finished"
        );
        Ok(result)
    }

    /// Re-dispatch interaction records whose delivery failed.
    pub fn retry_failed_emissions(&self) -> usize {
        self.emitter.retry_failed()
    }

    fn arrive_at(&mut self, index: usize) {
        self.current = index;
        self.tentative = None;
        self.question_started_at = if self.is_locked(index) {
            None
        } else {
            Some(self.clock.now())
        };
        tracing::trace!(session = %self.id, question = index, "moved");
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.completed {
            Err(SessionError::Completed)
        } else {
            Ok(())
        }
    }

    fn ensure_unlocked(&self) -> Result<(), SessionError> {
        if self.is_locked(self.current) {
            Err(SessionError::Locked {
                index: self.current,
            })
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("tentative", &self.tentative)
            .field("locked", &self.locked_count())
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}

/// Configures a [`QuizSession`] before the one-time shuffle.
pub struct QuizSessionBuilder {
    questions: Vec<Question>,
    quiz_id: Option<String>,
    seed: Option<u64>,
    clock: Clock,
    emitter: Emitter,
}

impl QuizSessionBuilder {
    /// Backend quiz id attached to every interaction record.
    #[must_use]
    pub fn with_quiz_id(mut self, quiz_id: Option<String>) -> Self {
        self.quiz_id = quiz_id;
        self
    }

    /// Shuffle deterministically instead of from OS entropy.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_analytics(mut self, emitter: Emitter) -> Self {
        self.emitter = emitter;
        self
    }

    /// # Errors
    ///
    /// Returns `SessionError::Empty` if there are no questions.
    pub fn build(self) -> Result<QuizSession, SessionError> {
        let mut questions = self.questions;
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        match self.seed {
            Some(seed) => fisher_yates(&mut questions, &mut StdRng::seed_from_u64(seed)),
            None => fisher_yates(&mut questions, &mut rand::rng()),
        }

        let len = questions.len();
        let session = QuizSession {
            id: Uuid::new_v4(),
            quiz_id: self.quiz_id,
            questions,
            current: 0,
            tentative: None,
            answers: vec![None; len],
            outcomes: vec![None; len],
            question_started_at: Some(self.clock.now()),
            completed: false,
            clock: self.clock,
            emitter: self.emitter,
        };

        tracing::info!(
            session = %session.id,
            questions = len,
            analytics = session.emitter.is_enabled(),
            "quiz session started"
        );
        Ok(session)
    }
}
