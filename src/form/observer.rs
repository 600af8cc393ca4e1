//! Form state change notifications.
//!
//! UI layers that bind to form state implement [`FormObserver`] and receive
//! a [`FormEvent`] for every change the form makes. The default sink drops
//! everything.

use crate::transport::Method;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Started {
        submission_id: String,
        method: Method,
        url: String,
    },
    Progress {
        submission_id: String,
        percent: u8,
    },
    Succeeded {
        submission_id: String,
        status: u16,
    },
    Failed {
        submission_id: String,
        status: Option<u16>,
        /// The failure populated the error bag.
        validation: bool,
    },
    /// A field (or every field, when `None`) was removed from the error bag.
    ErrorsCleared { field: Option<String> },
    Finished { submission_id: String },
}

impl FormEvent {
    pub fn submission_id(&self) -> Option<&str> {
        match self {
            FormEvent::Started { submission_id, .. }
            | FormEvent::Progress { submission_id, .. }
            | FormEvent::Succeeded { submission_id, .. }
            | FormEvent::Failed { submission_id, .. }
            | FormEvent::Finished { submission_id } => Some(submission_id),
            FormEvent::ErrorsCleared { .. } => None,
        }
    }
}

/// Receives form state changes. Called synchronously; keep it cheap.
pub trait FormObserver: Send + Sync {
    fn notify(&self, event: &FormEvent);
}

/// Default observer.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl FormObserver for NoopObserver {
    fn notify(&self, _event: &FormEvent) {}
}

pub fn noop_observer() -> Arc<dyn FormObserver> {
    Arc::new(NoopObserver)
}

/// Keeps the last `max_events` events in memory.
pub struct InMemoryObserver {
    events: RwLock<Vec<FormEvent>>,
    max_events: usize,
}

impl InMemoryObserver {
    pub fn new(max: usize) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            max_events: max.max(1),
        }
    }

    pub fn events(&self) -> Vec<FormEvent> {
        self.events
            .read()
            .map(|e| e.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn events_for(&self, submission_id: &str) -> Vec<FormEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.submission_id() == Some(submission_id))
            .collect()
    }

    pub fn clear(&self) {
        self.events
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.events
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryObserver {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl FormObserver for InMemoryObserver {
    fn notify(&self, event: &FormEvent) {
        let mut events = self
            .events
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        events.push(event.clone());
        if events.len() > self.max_events {
            events.remove(0);
        }
    }
}
