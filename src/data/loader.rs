use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::models::Question;

const MIN_OPTIONS: usize = 2;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse quiz JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("quiz must contain at least one question")]
    Empty,
    #[error("question {number} is invalid: {reason}")]
    InvalidQuestion { number: usize, reason: String },
}

/// Questions read from disk, plus the backend quiz id when the file carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSource {
    pub quiz_id: Option<String>,
    pub questions: Vec<Question>,
}

/// Either a bare list or the generator's response envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuizFile {
    List(Vec<Question>),
    Envelope {
        quiz_id: Option<String>,
        questions: Vec<Question>,
    },
}

pub fn load_questions_from_json<P: AsRef<Path>>(path: P) -> Result<QuizSource, LoadError> {
    let path = path.as_ref();
    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let source = parse_questions(&json_content)?;
    tracing::debug!(
        path = %path.display(),
        questions = source.questions.len(),
        quiz_id = ?source.quiz_id,
        "loaded quiz"
    );
    Ok(source)
}

pub fn parse_questions(json: &str) -> Result<QuizSource, LoadError> {
    let source = match serde_json::from_str::<QuizFile>(json)? {
        QuizFile::List(questions) => QuizSource {
            quiz_id: None,
            questions,
        },
        QuizFile::Envelope { quiz_id, questions } => QuizSource { quiz_id, questions },
    };

    if source.questions.is_empty() {
        return Err(LoadError::Empty);
    }

    for (index, question) in source.questions.iter().enumerate() {
        validate(question).map_err(|reason| LoadError::InvalidQuestion {
            number: index + 1,
            reason,
        })?;
    }

    Ok(source)
}

fn validate(question: &Question) -> Result<(), String> {
    if question.text.trim().is_empty() {
        return Err("question text is blank".to_string());
    }
    if question.options.len() < MIN_OPTIONS {
        return Err(format!(
            "needs at least {} options, found {}",
            MIN_OPTIONS,
            question.options.len()
        ));
    }
    if question.correct_answer >= question.options.len() {
        return Err(format!(
            "answer_index {} is out of range for {} options",
            question.correct_answer,
            question.options.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_list() {
        let json = r#"[
            {"question": "A?", "options": ["x", "y"], "answer_index": 0},
            {"question": "B?", "options": ["x", "y", "z"], "answer_index": 2}
        ]"#;
        let source = parse_questions(json).unwrap();

        assert_eq!(source.quiz_id, None);
        assert_eq!(source.questions.len(), 2);
        assert_eq!(source.questions[1].correct_answer, 2);
    }

    #[test]
    fn parses_generator_envelope() {
        let json = r#"{
            "quiz_id": "9b1c",
            "cached": true,
            "questions": [{"question": "A?", "options": ["x", "y"], "answer_index": 1}]
        }"#;
        let source = parse_questions(json).unwrap();

        assert_eq!(source.quiz_id.as_deref(), Some("9b1c"));
        assert_eq!(source.questions.len(), 1);
    }

    #[test]
    fn rejects_empty_quiz() {
        assert!(matches!(parse_questions("[]"), Err(LoadError::Empty)));
    }

    #[test]
    fn rejects_out_of_range_answer() {
        let json = r#"[
            {"question": "A?", "options": ["x", "y"], "answer_index": 0},
            {"question": "B?", "options": ["x", "y"], "answer_index": 2}
        ]"#;
        match parse_questions(json) {
            Err(LoadError::InvalidQuestion { number, .. }) => assert_eq!(number, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_single_option() {
        let json = r#"[{"question": "A?", "options": ["only"], "answer_index": 0}]"#;
        assert!(matches!(
            parse_questions(json),
            Err(LoadError::InvalidQuestion { number: 1, .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_questions_from_json("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
