//! Sans-IO list coordinator.
//!
//! The coordinator owns page position, cursor cache and filters. Operations
//! that need data return a [`FetchRequest`] for the caller to execute; the
//! outcome is fed back with [`ListCoordinator::complete`]. Only the most
//! recently issued request is ever applied.

use std::collections::BTreeSet;

use tracing::debug;

use crate::cursor::{CursorCache, PageCursor};
use crate::error::{CoordinatorError, FetchError};
use crate::filter::{apply_filters, status_options, FilterState};
use crate::model::{Candidate, Page};
use crate::view::ListViewState;

/// Identity of an issued request. Later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Wraps a raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Name filters sent to the gateway (server-side filtering).
///
/// Blank values are stored as `None` so that `""` and absent compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NameFilter {
    /// Sent as `firstName`.
    pub first_name: Option<String>,
    /// Sent as `lastName`.
    pub last_name: Option<String>,
}

impl NameFilter {
    /// Trims both parts; blank parts become `None`.
    pub fn new(first_name: &str, last_name: &str) -> Self {
        let normalise = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        Self {
            first_name: normalise(first_name),
            last_name: normalise(last_name),
        }
    }

    /// Neither part is set.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }
}

/// One call the shell must make against the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Pass back to [`ListCoordinator::complete`].
    pub id: RequestId,
    /// Zero-based page being fetched.
    pub page: usize,
    /// Page size.
    pub limit: usize,
    /// Where the page starts.
    pub cursor: PageCursor,
    /// Server-side name filters.
    pub names: NameFilter,
}

/// Lifecycle of the current fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    /// Nothing requested yet.
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request delivered a page.
    Succeeded,
    /// The last request failed.
    Failed,
}

/// What happened to a reported result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result became the current page or error.
    Applied,
    /// Superseded by a later request; ignored.
    Stale,
}

/// Page position, cursors and filters for one candidate list.
#[derive(Debug, Clone)]
pub struct ListCoordinator {
    cursors: CursorCache,
    filters: FilterState,
    names: NameFilter,
    page: usize,
    page_size: usize,
    phase: FetchPhase,
    next_id: u64,
    in_flight: Option<FetchRequest>,
    last_request: Option<FetchRequest>,
    fetched: Vec<Candidate>,
    has_next_page: bool,
    error: Option<FetchError>,
    view: ListViewState,
}

impl ListCoordinator {
    /// Idle coordinator on page 0. Nothing is fetched until [`Self::load`].
    pub fn new(page_size: usize) -> Result<Self, CoordinatorError> {
        if page_size == 0 {
            return Err(CoordinatorError::InvalidPageSize);
        }
        Ok(Self {
            cursors: CursorCache::new(),
            filters: FilterState::default(),
            names: NameFilter::default(),
            page: 0,
            page_size,
            phase: FetchPhase::Idle,
            next_id: 0,
            in_flight: None,
            last_request: None,
            fetched: Vec::new(),
            has_next_page: false,
            error: None,
            view: ListViewState::idle(page_size),
        })
    }

    /// Current published state.
    pub fn view(&self) -> &ListViewState {
        &self.view
    }

    /// Zero-based current page.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Where the current fetch stands.
    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    /// Local filters.
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Server-side name filters.
    pub fn names(&self) -> &NameFilter {
        &self.names
    }

    /// Cursors discovered so far.
    pub fn cursors(&self) -> &CursorCache {
        &self.cursors
    }

    /// The request whose result is awaited, if any.
    pub fn in_flight(&self) -> Option<&FetchRequest> {
        self.in_flight.as_ref()
    }

    /// (Re)fetches the current page.
    pub fn load(&mut self) -> Result<FetchRequest, CoordinatorError> {
        let cursor = self.cursors.cursor_for(self.page)?;
        Ok(self.issue(cursor))
    }

    /// Moves to a page whose cursor is known. Staying put is a no-op unless
    /// the last fetch failed.
    pub fn set_page(&mut self, page: usize) -> Result<Option<FetchRequest>, CoordinatorError> {
        let cursor = self.cursors.cursor_for(page)?;
        if page == self.page && self.phase != FetchPhase::Failed && self.last_request.is_some() {
            return Ok(None);
        }
        debug!(from = self.page, to = page, "page change");
        self.page = page;
        Ok(Some(self.issue(cursor)))
    }

    /// Moves one page forward.
    pub fn next_page(&mut self) -> Result<FetchRequest, CoordinatorError> {
        let target = self.page + 1;
        let cursor = self.cursors.cursor_for(target)?;
        self.page = target;
        Ok(self.issue(cursor))
    }

    /// Moves one page back.
    pub fn previous_page(&mut self) -> Result<FetchRequest, CoordinatorError> {
        let target = self
            .page
            .checked_sub(1)
            .ok_or(CoordinatorError::NoPreviousPage)?;
        let cursor = self.cursors.cursor_for(target)?;
        self.page = target;
        Ok(self.issue(cursor))
    }

    /// New page size: every discovered cursor is invalid, back to page 0.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<FetchRequest, CoordinatorError> {
        if page_size == 0 {
            return Err(CoordinatorError::InvalidPageSize);
        }
        debug!(from = self.page_size, to = page_size, "page size change");
        self.page_size = page_size;
        self.restart()
    }

    /// Local search. Returns to page 0; only page 0 itself needs refetching.
    pub fn set_search_term(&mut self, term: impl Into<String>) -> Option<FetchRequest> {
        let term = term.into();
        if term == self.filters.search_term {
            return None;
        }
        debug!(term = %term, "search term change");
        self.filters.search_term = term;
        self.back_to_first_page()
    }

    /// Local status filter. Returns to page 0 as with search.
    pub fn set_status_filters<I, S>(&mut self, statuses: I) -> Option<FetchRequest>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let statuses: BTreeSet<String> = statuses.into_iter().map(Into::into).collect();
        if statuses == self.filters.statuses {
            return None;
        }
        debug!(statuses = ?statuses, "status filter change");
        self.filters.statuses = statuses;
        self.back_to_first_page()
    }

    /// Server-side name filter. A change invalidates every cursor.
    pub fn set_name_filter(&mut self, names: NameFilter) -> Option<FetchRequest> {
        if names == self.names {
            return None;
        }
        debug!(first = ?names.first_name, last = ?names.last_name, "name filter change");
        self.names = names;
        self.restart().ok()
    }

    /// Re-issues the last request under a fresh id.
    pub fn retry(&mut self) -> Result<FetchRequest, CoordinatorError> {
        match self.last_request.clone() {
            Some(last) => {
                debug!(page = last.page, "retry");
                Ok(self.issue(last.cursor))
            }
            None => self.load(),
        }
    }

    /// Feeds back the outcome of request `id`.
    pub fn complete(&mut self, id: RequestId, result: Result<Page, FetchError>) -> Completion {
        let request = match self.in_flight.take() {
            Some(request) if request.id == id => request,
            other => {
                debug!(id = id.get(), "discarding stale result");
                self.in_flight = other;
                return Completion::Stale;
            }
        };

        match result {
            Ok(page) => {
                if let Err(e) = self.cursors.record(request.page, page.next_token.clone()) {
                    // Current page is always discovered; unreachable in practice.
                    debug!(error = %e, "cursor not recorded");
                }
                debug!(
                    page = request.page,
                    items = page.items.len(),
                    has_next = page.next_token.is_some(),
                    "page loaded"
                );
                self.has_next_page = page.next_token.is_some();
                self.fetched = page.items;
                self.error = None;
                self.phase = FetchPhase::Succeeded;
            }
            Err(error) => {
                debug!(page = request.page, error = %error, "page failed");
                self.fetched.clear();
                self.has_next_page = false;
                self.error = Some(error);
                self.phase = FetchPhase::Failed;
            }
        }
        self.recompute();
        Completion::Applied
    }

    fn restart(&mut self) -> Result<FetchRequest, CoordinatorError> {
        self.cursors.reset();
        self.page = 0;
        self.load()
    }

    fn back_to_first_page(&mut self) -> Option<FetchRequest> {
        if self.page == 0 {
            self.recompute();
            return None;
        }
        self.page = 0;
        Some(self.issue(PageCursor::Start))
    }

    fn issue(&mut self, cursor: PageCursor) -> FetchRequest {
        self.next_id += 1;
        let request = FetchRequest {
            id: RequestId(self.next_id),
            page: self.page,
            limit: self.page_size,
            cursor,
            names: self.names.clone(),
        };
        if let Some(previous) = &self.in_flight {
            debug!(superseded = previous.id.get(), by = request.id.get(), "request superseded");
        }
        self.in_flight = Some(request.clone());
        self.last_request = Some(request.clone());
        self.fetched.clear();
        self.has_next_page = false;
        self.error = None;
        self.phase = FetchPhase::Loading;
        self.recompute();
        request
    }

    fn recompute(&mut self) {
        let rows = apply_filters(&self.fetched, &self.filters).into_owned();
        self.view = ListViewState {
            total_count_estimate: rows.len() + self.page * self.page_size,
            rows,
            all_fetched_rows: self.fetched.clone(),
            loading: self.phase == FetchPhase::Loading,
            error: self.error.clone(),
            has_next_page: self.has_next_page,
            page: self.page,
            page_size: self.page_size,
            status_options: status_options(&self.fetched),
        };
    }
}
