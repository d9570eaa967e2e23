//! Paginated browsing of a container's children.
//!
//! A listing is fetched page by page. Each call to
//! [`BrowsePager::next_page`] performs at most one Browse request and
//! reports one of four outcomes:
//!
//! ```text
//!            +-------- Batch --------+
//!            v                       |
//!   start -> next_page() ------------+--> Done      (listing exhausted)
//!                                    +--> Canceled  (token tripped)
//!                                    +--> Failed    (network, fault, counters)
//! ```
//!
//! The cursor advances by the server's `NumberReturned`, not by the number
//! of objects that parsed: a few malformed elements are tolerated, a page
//! with nothing parseable is not.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cds_didl::{parse_batch, CdsObject};
use tracing::{debug, warn};

use crate::operations::{BrowseRequest, BrowseResponse};
use crate::{ApiError, ContentDirectory, Result};

/// Objects requested per Browse call unless configured otherwise
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Cooperative cancellation flag shared between a pager and its owner
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What to list and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseParams {
    pub object_id: String,
    pub filter: String,
    pub sort_criteria: String,
    pub starting_index: u32,
    /// Upper bound on objects fetched overall; 0 fetches everything
    pub requested_count: u32,
    pub page_size: u32,
}

impl BrowseParams {
    /// Every child of `object_id`, all properties, server ordering
    pub fn children(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            filter: "*".to_string(),
            sort_criteria: String::new(),
            starting_index: 0,
            requested_count: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_sort_criteria(mut self, sort_criteria: impl Into<String>) -> Self {
        self.sort_criteria = sort_criteria.into();
        self
    }

    pub fn with_range(mut self, starting_index: u32, requested_count: u32) -> Self {
        self.starting_index = starting_index;
        self.requested_count = requested_count;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Result of one pull on a [`BrowsePager`]
#[derive(Debug)]
pub enum PageOutcome {
    /// Objects of one page, in server order
    Batch(Vec<Arc<CdsObject>>),
    Done,
    Canceled,
    Failed(ApiError),
}

/// Pull-based pager over a container listing
pub struct BrowsePager {
    directory: Arc<dyn ContentDirectory>,
    params: BrowseParams,
    cancel: CancellationToken,
    cursor: u32,
    fetched: u64,
    total: Option<u64>,
    finished: bool,
}

impl BrowsePager {
    pub fn new(
        directory: Arc<dyn ContentDirectory>,
        mut params: BrowseParams,
        cancel: CancellationToken,
    ) -> Self {
        if params.page_size == 0 {
            params.page_size = DEFAULT_PAGE_SIZE;
        }
        let cursor = params.starting_index;
        Self {
            directory,
            params,
            cancel,
            cursor,
            fetched: 0,
            total: None,
            finished: false,
        }
    }

    /// Index of the next object to request
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// `TotalMatches` from the latest page, once one has been fetched
    pub fn total_matches(&self) -> Option<u64> {
        self.total
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fetch the next page.
    ///
    /// Once anything other than [`PageOutcome::Batch`] has been returned,
    /// later calls return [`PageOutcome::Done`] without touching the network.
    pub fn next_page(&mut self) -> PageOutcome {
        if self.finished {
            return PageOutcome::Done;
        }

        let outcome = self.fetch_page();
        if !matches!(outcome, PageOutcome::Batch(_)) {
            self.finished = true;
        }
        outcome
    }

    fn fetch_page(&mut self) -> PageOutcome {
        if self.cancel.is_canceled() {
            return PageOutcome::Canceled;
        }

        let requested = u64::from(self.params.requested_count);
        if requested > 0 && self.fetched >= requested {
            return PageOutcome::Done;
        }
        if let Some(total) = self.total {
            if u64::from(self.cursor) >= total {
                return PageOutcome::Done;
            }
        }

        let page_size = u64::from(self.params.page_size);
        let count = if requested > 0 {
            page_size.min(requested - self.fetched)
        } else {
            page_size
        };

        let request = BrowseRequest {
            object_id: self.params.object_id.clone(),
            browse_flag: crate::operations::BrowseFlag::BrowseDirectChildren,
            filter: self.params.filter.clone(),
            starting_index: self.cursor,
            requested_count: u32::try_from(count).unwrap_or(u32::MAX),
            sort_criteria: self.params.sort_criteria.clone(),
        };

        debug!(
            object_id = %request.object_id,
            start = request.starting_index,
            count = request.requested_count,
            "requesting page"
        );

        let response = match self.directory.browse(&request) {
            Ok(response) => response,
            Err(e) => return PageOutcome::Failed(e),
        };

        if self.cancel.is_canceled() {
            return PageOutcome::Canceled;
        }

        let remaining = if requested > 0 {
            usize::try_from(requested - self.fetched).unwrap_or(usize::MAX)
        } else {
            usize::MAX
        };
        let objects = match page_objects(self.directory.server_id(), &response, remaining) {
            Ok(Some(objects)) => objects,
            Ok(None) => return PageOutcome::Done,
            Err(e) => return PageOutcome::Failed(e),
        };

        let returned = response.number_returned as u64;
        self.cursor = self
            .cursor
            .saturating_add(u32::try_from(returned).unwrap_or(u32::MAX));
        self.fetched += returned;
        self.total = Some(response.total_matches as u64);

        PageOutcome::Batch(objects)
    }
}

/// Objects of one page, at most `remaining` of them; `None` when the server
/// reports nothing left
fn page_objects(
    server_id: &str,
    response: &BrowseResponse,
    remaining: usize,
) -> Result<Option<Vec<Arc<CdsObject>>>> {
    if response.number_returned == 0 || response.total_matches == 0 {
        return Ok(None);
    }

    if response.is_malformed() {
        return Err(ApiError::ProtocolError(format!(
            "negative counters: NumberReturned={} TotalMatches={} UpdateID={}",
            response.number_returned, response.total_matches, response.update_id
        )));
    }

    let mut batch = parse_batch(&response.result, server_id)?;
    if batch.is_empty() {
        return Err(ApiError::ProtocolError(format!(
            "server returned {} objects but none could be parsed",
            response.number_returned
        )));
    }

    if batch.skipped > 0 {
        warn!(
            server_id,
            skipped = batch.skipped,
            "dropped unparseable objects from page"
        );
    }

    let reported = usize::try_from(response.number_returned).unwrap_or(usize::MAX);
    let limit = reported.min(remaining);
    if batch.objects.len() > limit {
        warn!(
            server_id,
            parsed = batch.objects.len(),
            reported,
            remaining,
            "page holds more objects than reported or requested, truncating"
        );
        batch.objects.truncate(limit);
    }

    Ok(Some(batch.objects))
}

impl Iterator for BrowsePager {
    type Item = Result<Vec<Arc<CdsObject>>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_page() {
            PageOutcome::Batch(objects) => Some(Ok(objects)),
            PageOutcome::Done | PageOutcome::Canceled => None,
            PageOutcome::Failed(e) => Some(Err(e)),
        }
    }
}

/// Fetch the full metadata of a single object
pub fn browse_metadata(
    directory: &dyn ContentDirectory,
    object_id: &str,
    filter: &str,
) -> Result<Arc<CdsObject>> {
    let response = directory.browse(&BrowseRequest::metadata(object_id, filter))?;

    if response.is_malformed() {
        return Err(ApiError::ProtocolError(format!(
            "negative counters in metadata of {}",
            object_id
        )));
    }

    let batch = parse_batch(&response.result, directory.server_id())?;
    batch.objects.into_iter().next().ok_or_else(|| {
        ApiError::ProtocolError(format!("no parseable metadata for {}", object_id))
    })
}
