use serde::{Deserialize, Serialize};

use crate::models::Question;

/// Outcome of checking one question.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub is_correct: bool,
    pub selected_option_index: usize,
    pub correct_option_index: usize,
    pub elapsed_seconds: f64,
}

/// Aggregate score handed to the surrounding application on finish.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub correct_count: usize,
    pub wrong_count: usize,
    pub unanswered_count: usize,
    pub accuracy_percent: f64,
}

impl QuizResult {
    /// Score a set of answers; `answers[i]` belongs to `questions[i]`.
    pub fn tally(questions: &[Question], answers: &[Option<usize>]) -> Self {
        let mut correct_count = 0;
        let mut wrong_count = 0;
        let mut unanswered_count = 0;

        for (question, answer) in questions.iter().zip(answers.iter()) {
            match answer {
                Some(option) if question.is_correct(*option) => correct_count += 1,
                Some(_) => wrong_count += 1,
                None => unanswered_count += 1,
            }
        }

        Self {
            correct_count,
            wrong_count,
            unanswered_count,
            accuracy_percent: accuracy_percent(correct_count, wrong_count),
        }
    }

    pub fn total(&self) -> usize {
        self.correct_count + self.wrong_count + self.unanswered_count
    }

    pub fn answered(&self) -> usize {
        self.correct_count + self.wrong_count
    }
}

/// Share of answered questions that were correct; unanswered ones don't count.
pub fn accuracy_percent(correct: usize, wrong: usize) -> f64 {
    let answered = correct + wrong;
    if answered == 0 {
        0.0
    } else {
        100.0 * correct as f64 / answered as f64
    }
}
