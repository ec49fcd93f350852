use serde::{Deserialize, Serialize};

/// A multiple-choice question as produced by the quiz generator.
///
/// Field names follow the backend's wire shape, so `answer_index` stays
/// zero-based and is renamed only on the Rust side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    #[serde(rename = "answer_index")]
    pub correct_answer: usize,
}

impl Question {
    pub fn new(text: impl Into<String>, options: Vec<String>, correct_answer: usize) -> Self {
        Self {
            text: text.into(),
            options,
            correct_answer,
        }
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_answer).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_shape() {
        let json = r#"{"question":"2 + 2?","options":["3","4","5"],"answer_index":1}"#;
        let q: Question = serde_json::from_str(json).unwrap();

        assert_eq!(q.text, "2 + 2?");
        assert_eq!(q.option_count(), 3);
        assert!(q.is_correct(1));
        assert_eq!(q.correct_option(), Some("4"));
    }

    #[test]
    fn serializes_with_answer_index() {
        let q = Question::new("Capital of France?", vec!["Paris".into(), "Rome".into()], 0);
        let json = serde_json::to_string(&q).unwrap();

        assert!(json.contains("\"question\":\"Capital of France?\""));
        assert!(json.contains("\"answer_index\":0"));
    }
}
