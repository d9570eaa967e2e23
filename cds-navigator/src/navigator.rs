//! The navigation stack.
//!
//! ```text
//!  contexts[0]  root ("0")            <- bottom, parent_name ""
//!  contexts[1]  Music ("1")
//!  contexts[2]  Albums ("1$7")        <- head, the only one emitting events
//! ```
//!
//! All mutation happens through `&mut self` on the owning thread. Page
//! fetches and deletes run on worker threads and come back as messages
//! that [`Navigator::pump`] or [`Navigator::wait_idle`] apply.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cds_api::{browse_metadata, ApiError, BrowseParams, CancellationToken, ContentDirectory};
use cds_didl::CdsObject;
use tracing::{debug, info, warn};

use crate::config::NavigatorConfig;
use crate::context::{DirectoryContext, ScanMode};
use crate::error::Result;
use crate::events::{DirectoryEvent, DirectoryEvents};
use crate::playback::{PlaybackTarget, Selection};
use crate::worker::{spawn_browse_worker, spawn_delete_worker, WorkerMessage};

/// Separator between container titles in [`Navigator::path_string`]
pub const PATH_SEPARATOR: &str = " < ";

/// Stateful navigation over one ContentDirectory
pub struct Navigator {
    directory: Arc<dyn ContentDirectory>,
    config: NavigatorConfig,
    contexts: Vec<DirectoryContext>,
    next_context_id: u64,
    next_generation: u64,
    tx: mpsc::Sender<WorkerMessage>,
    rx: mpsc::Receiver<WorkerMessage>,
    listener: Option<mpsc::Sender<DirectoryEvent>>,
    playback: Option<Box<dyn PlaybackTarget>>,
    pending_deletes: usize,
    terminated: bool,
}

impl Navigator {
    /// Create a navigator positioned at the configured root.
    ///
    /// Nothing is fetched until [`Navigator::reload`] is called.
    pub fn new(directory: Arc<dyn ContentDirectory>, config: NavigatorConfig) -> Result<Self> {
        config.validate()?;

        let (tx, rx) = mpsc::channel();
        let root = DirectoryContext::new(0, config.root_object_id.clone(), "");

        Ok(Self {
            directory,
            config,
            contexts: vec![root],
            next_context_id: 1,
            next_generation: 1,
            tx,
            rx,
            listener: None,
            playback: None,
            pending_deletes: 0,
            terminated: false,
        })
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn directory(&self) -> &Arc<dyn ContentDirectory> {
        &self.directory
    }

    /// Synthetic object standing for the bottom of the stack
    pub fn root_object(&self) -> CdsObject {
        CdsObject::root(self.directory.server_id(), self.config.root_object_id.clone())
    }

    /// Register the UI listener, replacing any previous one
    pub fn subscribe(&mut self) -> DirectoryEvents {
        let (tx, rx) = mpsc::channel();
        if !self.terminated {
            self.listener = Some(tx);
        }
        DirectoryEvents::new(rx)
    }

    pub fn set_playback_target(&mut self, target: Box<dyn PlaybackTarget>) {
        if !self.terminated {
            self.playback = Some(target);
        }
    }

    /// The head context
    pub fn current(&self) -> &DirectoryContext {
        // the stack is never empty: the root context is never popped
        &self.contexts[self.contexts.len() - 1]
    }

    fn current_mut(&mut self) -> &mut DirectoryContext {
        let last = self.contexts.len() - 1;
        &mut self.contexts[last]
    }

    /// Contexts from bottom to head
    pub fn contexts(&self) -> &[DirectoryContext] {
        &self.contexts
    }

    pub fn depth(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Re-fetch the head's listing from scratch
    pub fn reload(&mut self) -> bool {
        if self.terminated {
            return false;
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        let cancel = CancellationToken::new();

        let head = self.current_mut();
        head.clear_state(generation, cancel.clone());
        let context_id = head.id();
        let parent_id = head.parent_id().to_string();

        debug!(parent_id = %parent_id, generation, "listing started");
        self.emit(DirectoryEvent::Started {
            parent_id: parent_id.clone(),
        });

        let params = BrowseParams::children(parent_id)
            .with_filter(self.config.filter.clone())
            .with_sort_criteria(self.config.sort_criteria.clone())
            .with_page_size(self.config.page_size);

        spawn_browse_worker(
            Arc::clone(&self.directory),
            params,
            cancel,
            context_id,
            generation,
            self.tx.clone(),
        );
        true
    }

    /// Push a context for `entity`, a container listed in the head.
    ///
    /// The entered container becomes the head's selection. The new context
    /// is empty until [`Navigator::reload`] is called, see
    /// [`Navigator::open`].
    pub fn enter_child(&mut self, entity: &CdsObject) -> bool {
        if self.terminated || !entity.is_container() || entity.is_root() {
            return false;
        }

        let child = match self.current().member(entity).cloned() {
            Some(child) => child,
            None => return false,
        };
        self.current_mut().select(Some(child.as_ref()));

        let id = self.next_context_id;
        self.next_context_id += 1;
        self.contexts
            .push(DirectoryContext::new(id, child.object_id(), child.title()));

        info!(object_id = %child.object_id(), title = %child.title(), depth = self.contexts.len(), "entered container");
        true
    }

    /// Enter `entity` and start listing it
    pub fn open(&mut self, entity: &CdsObject) -> bool {
        self.enter_child(entity) && self.reload()
    }

    /// Pop the head and make its parent current again from cache
    pub fn exit_to_parent(&mut self) -> bool {
        if self.terminated || self.contexts.len() < 2 {
            return false;
        }

        if let Some(mut left) = self.contexts.pop() {
            left.cancel_fetch();
            info!(object_id = %left.parent_id(), "left container");
        }

        let head = self.current();
        let event = DirectoryEvent::Restored {
            parent_id: head.parent_id().to_string(),
            entities: head.entities().to_vec(),
        };
        self.emit(event);
        true
    }

    /// Cancel every fetch and drop the listener and playback target.
    ///
    /// Every later operation is refused.
    pub fn terminate(&mut self) {
        for context in &mut self.contexts {
            context.cancel_fetch();
        }
        self.listener = None;
        self.playback = None;
        self.terminated = true;
        info!("navigator terminated");
    }

    /// The head's selection
    pub fn selected(&self) -> Option<&Arc<CdsObject>> {
        self.current().selected()
    }

    /// Select `entity` in the head; a non-member clears the selection.
    ///
    /// Returns whether something is selected afterwards. Selected items are
    /// reported to the playback target.
    pub fn set_selected(&mut self, entity: Option<&CdsObject>) -> bool {
        if self.terminated {
            return false;
        }

        match self.current_mut().select(entity) {
            Some(selected) => {
                self.report_selection(selected);
                true
            }
            None => false,
        }
    }

    pub fn find_next(&self, current: &CdsObject, mode: ScanMode) -> Option<Arc<CdsObject>> {
        self.current().find_next(current, mode)
    }

    pub fn find_previous(&self, current: &CdsObject, mode: ScanMode) -> Option<Arc<CdsObject>> {
        self.current().find_previous(current, mode)
    }

    /// Move the selection to the next playable sibling
    pub fn select_next(&mut self, mode: ScanMode) -> Option<Arc<CdsObject>> {
        let next = {
            let current = self.selected()?;
            self.find_next(current, mode)?
        };
        self.set_selected(Some(next.as_ref()));
        Some(next)
    }

    /// Move the selection to the previous playable sibling
    pub fn select_previous(&mut self, mode: ScanMode) -> Option<Arc<CdsObject>> {
        let previous = {
            let current = self.selected()?;
            self.find_previous(current, mode)?
        };
        self.set_selected(Some(previous.as_ref()));
        Some(previous)
    }

    fn report_selection(&mut self, entity: Arc<CdsObject>) {
        if !entity.is_item() {
            return;
        }
        if let Some(target) = self.playback.as_mut() {
            target.on_selection(Selection::for_entity(entity));
        }
    }

    /// Whether [`Navigator::delete`] would accept `entity`
    pub fn can_delete(&self, entity: &CdsObject) -> bool {
        if self.terminated || !self.directory.supports_destroy() {
            return false;
        }

        let listed = self
            .current()
            .member(entity)
            .map_or(false, |member| member.is_deletable());
        if !listed {
            return false;
        }

        if self.contexts.len() >= 2 {
            let parent = &self.contexts[self.contexts.len() - 2];
            if let Some(selected) = parent.selected() {
                return selected.is_deletable();
            }
        }
        true
    }

    /// Destroy `entity` on the server.
    ///
    /// Returns `false` without side effects when refused. Otherwise the
    /// outcome arrives as [`DirectoryEvent::Deleted`], followed by a reload
    /// of the context it was issued from if that is still the head, or as
    /// [`DirectoryEvent::DeleteFailed`].
    pub fn delete(&mut self, entity: &CdsObject) -> bool {
        if !self.can_delete(entity) {
            debug!(object_id = %entity.object_id(), "delete refused");
            return false;
        }

        info!(object_id = %entity.object_id(), "deleting object");
        self.pending_deletes += 1;
        spawn_delete_worker(
            Arc::clone(&self.directory),
            entity.object_id().to_string(),
            self.current().id(),
            self.tx.clone(),
        );
        true
    }

    /// Titles of the visited containers, bottom to top
    pub fn path_string(&self) -> String {
        self.contexts
            .iter()
            .map(DirectoryContext::parent_name)
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR)
    }

    /// Blocking single-object metadata request with the configured filter
    pub fn metadata(&self, object_id: &str) -> std::result::Result<Arc<CdsObject>, ApiError> {
        browse_metadata(self.directory.as_ref(), object_id, &self.config.metadata_filter)
    }

    /// Apply every worker message already received.
    ///
    /// Returns the number of messages applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.apply(message);
            applied += 1;
        }
        applied
    }

    /// No listing in progress anywhere in the stack and no delete pending
    pub fn is_idle(&self) -> bool {
        self.terminated
            || (self.pending_deletes == 0 && !self.contexts.iter().any(DirectoryContext::is_in_progress))
    }

    /// Apply worker messages until idle or until `timeout` elapses.
    ///
    /// Returns whether the navigator is idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        while !self.is_idle() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.rx.recv_timeout(remaining) {
                Ok(message) => self.apply(message),
                Err(_) => return self.is_idle(),
            }
        }

        self.pump();
        true
    }

    fn apply(&mut self, message: WorkerMessage) {
        if self.terminated {
            return;
        }

        match message {
            WorkerMessage::Page {
                context_id,
                generation,
                objects,
            } => {
                let Some(index) = self.live_context(context_id, generation) else {
                    debug!(context_id, generation, "dropping stale page");
                    return;
                };

                let context = &mut self.contexts[index];
                context.append(objects);
                debug!(parent_id = %context.parent_id(), total = context.entities().len(), "page applied");

                if self.is_head(index) {
                    let head = &self.contexts[index];
                    let event = DirectoryEvent::Updated {
                        parent_id: head.parent_id().to_string(),
                        entities: head.entities().to_vec(),
                    };
                    self.emit(event);
                }
            }
            WorkerMessage::Finished {
                context_id,
                generation,
                error,
            } => {
                let Some(index) = self.live_context(context_id, generation) else {
                    debug!(context_id, generation, "dropping stale completion");
                    return;
                };

                let context = &mut self.contexts[index];
                context.finish(error.is_some());
                let parent_id = context.parent_id().to_string();

                let event = match error {
                    Some(reason) => {
                        warn!(parent_id = %parent_id, reason = %reason, "listing failed");
                        DirectoryEvent::Failed { parent_id, reason }
                    }
                    None => {
                        debug!(parent_id = %parent_id, "listing complete");
                        DirectoryEvent::Completed { parent_id }
                    }
                };

                if self.is_head(index) {
                    self.emit(event);
                }
            }
            WorkerMessage::Destroyed {
                context_id,
                object_id,
                result,
            } => {
                self.pending_deletes = self.pending_deletes.saturating_sub(1);

                match result {
                    Ok(()) => {
                        self.emit(DirectoryEvent::Deleted { object_id });
                        if self.current().id() == context_id {
                            self.reload();
                        }
                    }
                    Err(reason) => {
                        self.emit(DirectoryEvent::DeleteFailed { object_id, reason });
                    }
                }
            }
        }
    }

    fn live_context(&self, context_id: u64, generation: u64) -> Option<usize> {
        self.contexts
            .iter()
            .position(|c| c.id() == context_id)
            .filter(|&i| self.contexts[i].accepts(generation))
    }

    fn is_head(&self, index: usize) -> bool {
        index + 1 == self.contexts.len()
    }

    fn emit(&mut self, event: DirectoryEvent) {
        if let Some(listener) = &self.listener {
            if listener.send(event).is_err() {
                debug!("listener dropped, unsubscribing");
                self.listener = None;
            }
        }
    }
}

impl Drop for Navigator {
    fn drop(&mut self) {
        for context in &mut self.contexts {
            context.cancel_fetch();
        }
    }
}
