//! Events delivered to the UI listener
//!
//! The navigator sends [`DirectoryEvent`]s over a channel; the listener
//! holds a [`DirectoryEvents`] receiver and does its own diffing.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cds_didl::CdsObject;

/// Something the listener should react to
#[derive(Debug, Clone)]
pub enum DirectoryEvent {
    /// The current listing was cleared and a fetch started
    Started { parent_id: String },
    /// Entities accumulated so far for the current listing
    Updated {
        parent_id: String,
        entities: Vec<Arc<CdsObject>>,
    },
    /// A parent listing became current again, from cache
    Restored {
        parent_id: String,
        entities: Vec<Arc<CdsObject>>,
    },
    /// The current listing is complete
    Completed { parent_id: String },
    /// The current listing stopped early; fetched entities are kept
    Failed { parent_id: String, reason: String },
    Deleted { object_id: String },
    DeleteFailed { object_id: String, reason: String },
}

impl DirectoryEvent {
    /// Container the event is about, for listing events
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            DirectoryEvent::Started { parent_id }
            | DirectoryEvent::Updated { parent_id, .. }
            | DirectoryEvent::Restored { parent_id, .. }
            | DirectoryEvent::Completed { parent_id }
            | DirectoryEvent::Failed { parent_id, .. } => Some(parent_id),
            DirectoryEvent::Deleted { .. } | DirectoryEvent::DeleteFailed { .. } => None,
        }
    }
}

/// Receiving end of the listener channel
///
/// Blocks on `next()` until an event arrives or the navigator is dropped,
/// terminated or re-subscribed. Use `try_recv()` for non-blocking access.
pub struct DirectoryEvents {
    rx: Arc<Mutex<mpsc::Receiver<DirectoryEvent>>>,
}

impl DirectoryEvents {
    pub(crate) fn new(rx: mpsc::Receiver<DirectoryEvent>) -> Self {
        Self {
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Block until an event is available
    ///
    /// Returns `None` once the channel is closed.
    pub fn recv(&self) -> Option<DirectoryEvent> {
        self.rx.lock().ok()?.recv().ok()
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<DirectoryEvent> {
        self.rx.lock().ok()?.try_recv().ok()
    }

    /// Block until an event is available or timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<DirectoryEvent> {
        self.rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    /// Non-blocking iterator over currently queued events
    pub fn try_iter(&self) -> TryIterator<'_> {
        TryIterator { inner: self }
    }
}

impl Iterator for DirectoryEvents {
    type Item = DirectoryEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl Clone for DirectoryEvents {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
        }
    }
}

/// Non-blocking iterator over currently queued events
pub struct TryIterator<'a> {
    inner: &'a DirectoryEvents,
}

impl<'a> Iterator for TryIterator<'a> {
    type Item = DirectoryEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}
