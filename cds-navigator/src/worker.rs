//! Background workers for page fetches and deletes
//!
//! Workers never touch navigator state. They report over one channel and
//! the owner applies messages in `Navigator::pump`.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use cds_api::{BrowseParams, BrowsePager, CancellationToken, ContentDirectory, PageOutcome};
use cds_didl::CdsObject;
use tracing::{debug, warn};

/// Messages sent from workers back to the navigator
#[derive(Debug)]
pub(crate) enum WorkerMessage {
    /// One page of a listing
    Page {
        context_id: u64,
        generation: u64,
        objects: Vec<Arc<CdsObject>>,
    },
    /// The listing ended; `error` is set when it ended early
    Finished {
        context_id: u64,
        generation: u64,
        error: Option<String>,
    },
    /// A DestroyObject call returned
    Destroyed {
        context_id: u64,
        object_id: String,
        result: Result<(), String>,
    },
}

/// Spawn a thread that pages through `params` until done, canceled or failed
pub(crate) fn spawn_browse_worker(
    directory: Arc<dyn ContentDirectory>,
    params: BrowseParams,
    cancel: CancellationToken,
    context_id: u64,
    generation: u64,
    tx: mpsc::Sender<WorkerMessage>,
) {
    thread::spawn(move || {
        let object_id = params.object_id.clone();
        let mut pager = BrowsePager::new(directory, params, cancel);

        loop {
            let message = match pager.next_page() {
                PageOutcome::Batch(objects) => WorkerMessage::Page {
                    context_id,
                    generation,
                    objects,
                },
                PageOutcome::Done => WorkerMessage::Finished {
                    context_id,
                    generation,
                    error: None,
                },
                PageOutcome::Canceled => {
                    debug!(object_id = %object_id, generation, "browse canceled");
                    return;
                }
                PageOutcome::Failed(e) => {
                    warn!(object_id = %object_id, error = %e, "browse failed");
                    WorkerMessage::Finished {
                        context_id,
                        generation,
                        error: Some(e.to_string()),
                    }
                }
            };

            let last = matches!(message, WorkerMessage::Finished { .. });
            if tx.send(message).is_err() || last {
                return;
            }
        }
    });
}

/// Spawn a thread issuing one DestroyObject call
pub(crate) fn spawn_delete_worker(
    directory: Arc<dyn ContentDirectory>,
    object_id: String,
    context_id: u64,
    tx: mpsc::Sender<WorkerMessage>,
) {
    thread::spawn(move || {
        let result = directory
            .destroy_object(&object_id)
            .map_err(|e| e.to_string());

        if let Err(reason) = &result {
            warn!(object_id = %object_id, reason = %reason, "delete failed");
        }

        let _ = tx.send(WorkerMessage::Destroyed {
            context_id,
            object_id,
            result,
        });
    });
}
