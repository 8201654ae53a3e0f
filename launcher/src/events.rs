//! Step progress events.
//!
//! Every batch step reports `Sending` before submission and then either
//! `Confirmed` or `Failed`. Subscribers receive events as a stream.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::builder::StepKind;

/// Progress of a single step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    /// Transaction signed and being sent.
    Sending,
    /// Transaction confirmed.
    Confirmed {
        /// Transaction signature (base58 encoded).
        signature: String,
        /// Slot the transaction landed in.
        slot: u64,
    },
    /// Sending or confirmation failed; later steps are not attempted.
    Failed {
        /// Failure description.
        error: String,
    },
}

impl StepStatus {
    /// Returns true for `Confirmed` and `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Sending)
    }
}

/// A progress notification for one step of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEvent {
    /// What the step does.
    pub step: StepKind,
    /// Zero-based position in the batch.
    pub index: usize,
    /// Number of steps in the batch.
    pub total: usize,
    /// Progress.
    #[serde(flatten)]
    pub status: StepStatus,
    /// When the event was emitted.
    pub at: DateTime<Utc>,
}

impl StepEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(step: StepKind, index: usize, total: usize, status: StepStatus) -> Self {
        Self {
            step,
            index,
            total,
            status,
            at: Utc::now(),
        }
    }

    /// Human readable message for the event.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.status {
            StepStatus::Sending => self.step.sending_message().to_string(),
            StepStatus::Confirmed { .. } => self.step.success_message().to_string(),
            StepStatus::Failed { error } => format!(
                "Failed to {}: {}",
                self.step.as_str().replace('_', " "),
                error
            ),
        }
    }
}

/// Fan-out of step events to any number of subscribers.
#[derive(Debug, Default)]
pub struct EventHub {
    senders: Mutex<Vec<UnboundedSender<StepEvent>>>,
}

impl EventHub {
    /// Creates a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to all events published from now on.
    pub fn subscribe(&self) -> UnboundedReceiverStream<StepEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        UnboundedReceiverStream::new(rx)
    }

    /// Publishes an event, dropping subscribers that went away.
    pub fn publish(&self, event: StepEvent) {
        let mut senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
        senders.retain(|sender| sender.send(event.clone()).is_ok());
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
        senders.retain(|sender| !sender.is_closed());
        senders.len()
    }
}
