use std::collections::HashSet;

use listkit_logging::{listkit_debug, listkit_warn};

use crate::{Cursor, FetchKey, ListError, ListItem, Page};

pub type ListId = u64;

/// One page request, tagged so that its response can be matched back to the
/// accumulator generation that issued it.
///
/// Generations are unique across the whole application, so a request can
/// never be mistaken for one issued by a later accumulator of the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub key: FetchKey,
    pub generation: u64,
    pub page_index: usize,
    pub cursor: Option<Cursor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    FetchingFirst,
    Idle,
    FetchingMore,
    Exhausted,
    Failed,
}

/// Outcome of feeding a response into an accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Accepted,
    /// The response belongs to a request that is no longer awaited.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PageFailure {
    request: PageRequest,
    error: ListError,
}

/// Ordered pages of a single fetch key.
///
/// At most one request is awaited at a time; an invalidation starts a new
/// generation and discards everything fetched before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulator<T> {
    key: FetchKey,
    generation: u64,
    pages: Vec<Page<T>>,
    phase: Phase,
    in_flight: Option<PageRequest>,
    failure: Option<PageFailure>,
}

impl<T: ListItem> Accumulator<T> {
    /// Creates an uninitialized accumulator; `generation` must not have been
    /// handed out before.
    pub fn new(key: FetchKey, generation: u64) -> Self {
        Self {
            key,
            generation,
            pages: Vec::new(),
            phase: Phase::Uninitialized,
            in_flight: None,
            failure: None,
        }
    }

    /// Requests the first page of an uninitialized accumulator.
    pub fn start(&mut self) -> Option<PageRequest> {
        if self.phase != Phase::Uninitialized {
            return None;
        }
        self.phase = Phase::FetchingFirst;
        Some(self.issue(None))
    }

    /// Marks the key stale: discards all pages and refetches the first page
    /// under the fresh `generation`.
    pub fn invalidate(&mut self, generation: u64) -> PageRequest {
        if let Some(abandoned) = self.in_flight.take() {
            listkit_debug!(
                "{} abandons page {} (generation {})",
                self.key,
                abandoned.page_index,
                abandoned.generation
            );
        }
        self.generation = generation;
        self.pages.clear();
        self.failure = None;
        self.phase = Phase::FetchingFirst;
        self.issue(None)
    }

    /// Requests the page after the last fetched one.
    ///
    /// No-op while a request is awaited, after a failure, or once exhausted.
    pub fn request_more(&mut self) -> Option<PageRequest> {
        if self.phase != Phase::Idle {
            listkit_debug!("{} coalesced load-more in phase {:?}", self.key, self.phase);
            return None;
        }
        let cursor = self.pages.last().and_then(Page::next_cursor).cloned()?;
        self.phase = Phase::FetchingMore;
        Some(self.issue(Some(cursor)))
    }

    /// Re-issues the request that failed, with the same cursor.
    pub fn retry(&mut self) -> Option<PageRequest> {
        if self.phase != Phase::Failed {
            return None;
        }
        let failure = self.failure.take()?;
        self.phase = if failure.request.page_index == 0 {
            Phase::FetchingFirst
        } else {
            Phase::FetchingMore
        };
        self.in_flight = Some(failure.request.clone());
        Some(failure.request)
    }

    pub fn apply_page(&mut self, request: &PageRequest, page: Page<T>) -> Applied {
        if !self.awaits(request) {
            return Applied::Stale;
        }
        self.in_flight = None;
        self.warn_on_repeated_ids(&page);
        if page.has_more && page.last_cursor.is_none() {
            listkit_warn!(
                "{} page {} claims more items but carries no cursor; treating as exhausted",
                self.key,
                request.page_index
            );
        }
        self.phase = if page.next_cursor().is_some() {
            Phase::Idle
        } else {
            Phase::Exhausted
        };
        self.pages.push(page);
        Applied::Accepted
    }

    pub fn apply_failure(&mut self, request: &PageRequest, error: ListError) -> Applied {
        if !self.awaits(request) {
            return Applied::Stale;
        }
        listkit_warn!(
            "{} page {} failed: {}",
            self.key,
            request.page_index,
            error.message
        );
        self.in_flight = None;
        self.phase = Phase::Failed;
        self.failure = Some(PageFailure {
            request: request.clone(),
            error,
        });
        Applied::Accepted
    }

    /// Flattened items of all fetched pages, in fetch order.
    pub fn current_items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.list.iter())
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|page| page.list.len()).sum()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn has_more(&self) -> bool {
        self.pages
            .last()
            .is_some_and(|page| page.next_cursor().is_some())
    }

    pub fn is_fetching_first(&self) -> bool {
        self.phase == Phase::FetchingFirst
    }

    pub fn is_fetching_more(&self) -> bool {
        self.phase == Phase::FetchingMore
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Exhausted
    }

    /// Loaded successfully but the server had nothing to show.
    pub fn is_empty_result(&self) -> bool {
        self.phase == Phase::Exhausted && self.item_count() == 0
    }

    pub fn error(&self) -> Option<&ListError> {
        self.failure.as_ref().map(|failure| &failure.error)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn key(&self) -> &FetchKey {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn issue(&mut self, cursor: Option<Cursor>) -> PageRequest {
        let request = PageRequest {
            key: self.key.clone(),
            generation: self.generation,
            page_index: self.pages.len(),
            cursor,
        };
        self.in_flight = Some(request.clone());
        request
    }

    fn awaits(&self, request: &PageRequest) -> bool {
        let current = self.in_flight.as_ref() == Some(request);
        if !current {
            listkit_debug!(
                "{} drops stale page {} of {} (generation {}, current {})",
                self.key,
                request.page_index,
                request.key,
                request.generation,
                self.generation
            );
        }
        current
    }

    fn warn_on_repeated_ids(&self, page: &Page<T>) {
        let seen: HashSet<&str> = self.current_items().map(ListItem::item_id).collect();
        for id in page.list.iter().map(ListItem::item_id) {
            if seen.contains(id) {
                listkit_warn!("{} repeated item {} across a page boundary", self.key, id);
            }
        }
    }
}
