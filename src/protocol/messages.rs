use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::QuizResult;

/// One checked answer, reported to the interaction-recording endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Index of the question within the (shuffled) session.
    pub question_id: usize,
    pub is_correct: bool,
    /// Seconds between landing on the question and checking it.
    pub time_taken: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<String>,
}

/// Row body posted to the `quiz_interactions` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionRow<'a> {
    #[serde(flatten)]
    pub record: &'a InteractionRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
}

/// Final summary printed for the surrounding application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<String>,
    #[serde(flatten)]
    pub result: QuizResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_record_field_names() {
        let record = InteractionRecord {
            question_id: 3,
            is_correct: true,
            time_taken: 4.5,
            quiz_id: None,
        };
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["question_id"], 3);
        assert_eq!(json["is_correct"], true);
        assert_eq!(json["time_taken"], 4.5);
        assert!(json.get("quiz_id").is_none());
    }

    #[test]
    fn row_flattens_record_and_user() {
        let record = InteractionRecord {
            question_id: 0,
            is_correct: false,
            time_taken: 1.0,
            quiz_id: Some("quiz-1".to_string()),
        };
        let row = InteractionRow {
            record: &record,
            user_id: Some("user-9"),
        };
        let json = serde_json::to_string(&row).unwrap();

        assert!(json.contains("\"quiz_id\":\"quiz-1\""));
        assert!(json.contains("\"user_id\":\"user-9\""));
        assert!(json.contains("\"is_correct\":false"));
    }
}
