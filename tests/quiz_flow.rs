use std::sync::Arc;

use chrono::{DateTime, Duration};
use study_quiz::analytics::Delivery;
use study_quiz::session::ErrorKind;
use study_quiz::time::Clock;
use study_quiz::{Emitter, MemorySink, QuizSession, SessionError, parse_questions};

fn fixed_clock() -> Clock {
    Clock::fixed(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
}

const QUIZ: &str = r#"{
    "quiz_id": "c0ffee",
    "cached": false,
    "questions": [
        {"question": "Largest planet?", "options": ["Mars", "Jupiter", "Venus", "Earth"], "answer_index": 1},
        {"question": "H2O is?", "options": ["Water", "Salt"], "answer_index": 0},
        {"question": "2 * 3?", "options": ["5", "6", "9"], "answer_index": 1},
        {"question": "Rust mascot?", "options": ["Gopher", "Ferris", "Duke"], "answer_index": 1}
    ]
}"#;

#[tokio::test]
async fn sitting_reports_each_checked_question_once() {
    let source = parse_questions(QUIZ).unwrap();
    let sink = Arc::new(MemorySink::new());
    let mut session = QuizSession::builder(source.questions)
        .with_quiz_id(source.quiz_id)
        .with_seed(Some(2024))
        .with_clock(fixed_clock())
        .with_analytics(Emitter::new(sink.clone()))
        .build()
        .unwrap();

    // First question right, second wrong, the rest left alone.
    session.clock_mut().advance(Duration::seconds(6));
    let right = session.current_question().correct_answer;
    session.select_option(right).unwrap();
    assert!(session.check_answer().unwrap().is_correct);

    session.go_to_next().unwrap();
    let wrong = (session.current_question().correct_answer + 1) % 2;
    session.select_option(wrong).unwrap();
    assert!(!session.check_answer().unwrap().is_correct);

    // Wander back over the locked questions; nothing may change or re-send.
    session.go_to_previous().unwrap();
    let err = session.select_option(wrong).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    session.go_to_next().unwrap();
    assert!(matches!(
        session.check_answer(),
        Err(SessionError::Locked { index: 1 })
    ));

    let result = session.finish().unwrap();
    session.emitter().flush().await;

    assert_eq!(result.correct_count, 1);
    assert_eq!(result.wrong_count, 1);
    assert_eq!(result.unanswered_count, 2);
    assert!((result.accuracy_percent - 50.0).abs() < 1e-6);

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert_eq!(sink.count_for(0), 1);
    assert_eq!(sink.count_for(1), 1);
    assert!(records.iter().all(|r| r.quiz_id.as_deref() == Some("c0ffee")));
    let first = records.iter().find(|r| r.question_id == 0).unwrap();
    assert_eq!(first.time_taken, 6.0);
    assert_eq!(session.emitter().delivery(1), Some(Delivery::Delivered));
}

#[test]
fn empty_source_is_invalid_input() {
    let err = QuizSession::create(Vec::new()).unwrap_err();
    assert_eq!(err, SessionError::Empty);
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn every_session_is_a_permutation_of_the_source() {
    let source = parse_questions(QUIZ).unwrap();
    let first = QuizSession::create(source.questions.clone()).unwrap();
    let second = QuizSession::create(source.questions.clone()).unwrap();

    for session in [&first, &second] {
        let mut texts: Vec<&str> = session.questions().iter().map(|q| q.text.as_str()).collect();
        texts.sort_unstable();
        let mut want: Vec<&str> = source.questions.iter().map(|q| q.text.as_str()).collect();
        want.sort_unstable();
        assert_eq!(texts, want);
    }
}
