use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::join_all;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::{AnalyticsError, AnalyticsSink};
use crate::protocol::InteractionRecord;

/// Delivery state of the record for one question index.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    InFlight,
    Delivered,
    Failed(InteractionRecord),
}

type Ledger = Arc<Mutex<HashMap<usize, Delivery>>>;

fn settle(ledger: &Ledger, question_id: usize, delivery: Delivery) {
    ledger
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(question_id, delivery);
}

/// Dispatches interaction records without blocking the caller.
///
/// The ledger is keyed by question index and is independent of the session's
/// lock state: an index that is in flight or delivered is never sent again,
/// while a failed one can be re-dispatched with [`Emitter::retry_failed`].
/// Each session needs its own ledger, see [`Emitter::for_new_session`].
#[derive(Clone)]
pub struct Emitter {
    sink: Option<Arc<dyn AnalyticsSink>>,
    ledger: Ledger,
    in_flight: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Emitter {
    pub fn new(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self {
            sink: Some(sink),
            ledger: Arc::default(),
            in_flight: Arc::default(),
        }
    }

    /// An emitter that drops every record.
    pub fn disabled() -> Self {
        Self {
            sink: None,
            ledger: Arc::default(),
            in_flight: Arc::default(),
        }
    }

    /// Same sink and in-flight list, empty ledger. Question indices restart
    /// with every session, so delivery state must not carry over.
    #[must_use]
    pub fn for_new_session(&self) -> Self {
        Self {
            sink: self.sink.clone(),
            ledger: Arc::default(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Queue `record` for delivery. Returns false when it was skipped because
    /// the same question index is already in flight or delivered.
    pub fn emit(&self, record: InteractionRecord) -> bool {
        let Some(sink) = &self.sink else {
            tracing::trace!(question_id = record.question_id, "analytics disabled, dropping record");
            return false;
        };

        {
            let mut ledger = self
                .ledger
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match ledger.get(&record.question_id) {
                Some(Delivery::InFlight | Delivery::Delivered) => {
                    tracing::debug!(
                        question_id = record.question_id,
                        "interaction already sent, skipping"
                    );
                    return false;
                }
                Some(Delivery::Failed(_)) | None => {
                    ledger.insert(record.question_id, Delivery::InFlight);
                }
            }
        }

        self.dispatch(Arc::clone(sink), record);
        true
    }

    /// Re-dispatch every record whose last delivery failed. Returns how many
    /// were queued.
    pub fn retry_failed(&self) -> usize {
        let failed: Vec<InteractionRecord> = {
            let ledger = self
                .ledger
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            ledger
                .values()
                .filter_map(|d| match d {
                    Delivery::Failed(record) => Some(record.clone()),
                    _ => None,
                })
                .collect()
        };

        failed
            .into_iter()
            .filter(|record| self.emit(record.clone()))
            .count()
    }

    pub fn delivery(&self, question_id: usize) -> Option<Delivery> {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&question_id)
            .cloned()
    }

    pub fn failed_count(&self) -> usize {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|d| matches!(d, Delivery::Failed(_)))
            .count()
    }

    /// Wait for every dispatched delivery to settle.
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = std::mem::take(
            &mut *self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for joined in join_all(handles).await {
            if let Err(e) = joined {
                tracing::warn!("interaction delivery task ended abnormally: {}", e);
            }
        }
    }

    fn dispatch(&self, sink: Arc<dyn AnalyticsSink>, record: InteractionRecord) {
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!(
                question_id = record.question_id,
                "failed to record interaction: {}",
                AnalyticsError::NoRuntime
            );
            settle(&self.ledger, record.question_id, Delivery::Failed(record));
            return;
        };

        let ledger = Arc::clone(&self.ledger);
        let task = handle.spawn(async move {
            let question_id = record.question_id;
            match sink.record_interaction(&record).await {
                Ok(()) => settle(&ledger, question_id, Delivery::Delivered),
                Err(e) => {
                    tracing::warn!(question_id, "failed to record interaction: {}", e);
                    settle(&ledger, question_id, Delivery::Failed(record));
                }
            }
        });

        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(task);
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::MemorySink;

    fn record(question_id: usize) -> InteractionRecord {
        InteractionRecord {
            question_id,
            is_correct: true,
            time_taken: 1.0,
            quiz_id: None,
        }
    }

    #[tokio::test]
    async fn delivers_once_per_index() {
        let sink = Arc::new(MemorySink::new());
        let emitter = Emitter::new(sink.clone());

        assert!(emitter.emit(record(0)));
        assert!(!emitter.emit(record(0)));
        emitter.flush().await;
        assert!(!emitter.emit(record(0)));
        emitter.flush().await;

        assert_eq!(sink.count_for(0), 1);
        assert_eq!(emitter.delivery(0), Some(Delivery::Delivered));
    }

    #[tokio::test]
    async fn failure_is_recorded_and_retryable() {
        let sink = Arc::new(MemorySink::new());
        sink.fail_next(1);
        let emitter = Emitter::new(sink.clone());

        emitter.emit(record(4));
        emitter.flush().await;
        assert!(matches!(emitter.delivery(4), Some(Delivery::Failed(_))));
        assert_eq!(emitter.failed_count(), 1);
        assert!(sink.records().is_empty());

        assert_eq!(emitter.retry_failed(), 1);
        emitter.flush().await;
        assert_eq!(emitter.delivery(4), Some(Delivery::Delivered));
        assert_eq!(emitter.retry_failed(), 0);
        assert_eq!(sink.count_for(4), 1);
    }

    #[test]
    fn without_runtime_marks_failed() {
        let sink = Arc::new(MemorySink::new());
        let emitter = Emitter::new(sink.clone());

        assert!(emitter.emit(record(1)));
        assert!(matches!(emitter.delivery(1), Some(Delivery::Failed(_))));
        assert!(sink.records().is_empty());
    }

    #[tokio::test]
    async fn new_session_starts_with_empty_ledger() {
        let sink = Arc::new(MemorySink::new());
        let first = Emitter::new(sink.clone());
        first.emit(record(0));
        first.flush().await;

        let second = first.for_new_session();
        assert_eq!(second.delivery(0), None);
        assert!(second.emit(record(0)));
        // In-flight handles are shared, so either emitter can flush both.
        first.flush().await;

        assert_eq!(sink.count_for(0), 2);
        assert_eq!(first.delivery(0), Some(Delivery::Delivered));
        assert_eq!(second.delivery(0), Some(Delivery::Delivered));
    }

    #[test]
    fn disabled_drops_records() {
        let emitter = Emitter::disabled();
        assert!(!emitter.emit(record(0)));
        assert_eq!(emitter.delivery(0), None);
    }
}
