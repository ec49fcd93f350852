use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{AnalyticsError, AnalyticsSink};
use crate::protocol::InteractionRecord;

/// Keeps delivered records in memory. Can be told to reject upcoming deliveries.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<InteractionRecord>>,
    failures_left: Mutex<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` deliveries.
    pub fn fail_next(&self, count: usize) {
        *self
            .failures_left
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = count;
    }

    pub fn records(&self) -> Vec<InteractionRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count_for(&self, question_id: usize) -> usize {
        self.records()
            .iter()
            .filter(|r| r.question_id == question_id)
            .count()
    }
}

#[async_trait]
impl AnalyticsSink for MemorySink {
    async fn record_interaction(&self, record: &InteractionRecord) -> Result<(), AnalyticsError> {
        {
            let mut failures = self
                .failures_left
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *failures > 0 {
                *failures -= 1;
                return Err(AnalyticsError::Rejected(format!(
                    "simulated failure for question {}",
                    record.question_id
                )));
            }
        }

        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}
