//! Wire records exchanged with the backend.
//!
//! All records are serialized as JSON.

mod messages;

pub use messages::{InteractionRecord, InteractionRow, ResultSummary};
