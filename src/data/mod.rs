mod loader;

pub use loader::{LoadError, QuizSource, load_questions_from_json, parse_questions};
