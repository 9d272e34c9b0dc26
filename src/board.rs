// src/board.rs
//! View-model for one listing view.
//!
//! Data flows one direction: query mutations update [`QueryState`], a fetch
//! pulls the matching result set from the backend, refinement and
//! pagination derive the visible page. Filter and page mutations re-derive
//! synchronously without touching the network; only a change to the
//! backend-relevant fields warrants a new fetch.
//!
//! Fetches are not cancelled or de-duplicated. Instead every fetch carries
//! a monotonically increasing sequence number and the board applies
//! "latest query wins": an outcome is discarded when a newer fetch has been
//! issued since, so a slow stale response can never overwrite a fresher one.

use anyhow::Result;
use tracing::{debug, error};

use crate::fetch::JobService;
use crate::page::{recompute, slice_page, PaginationState};
use crate::query::{FilterKey, FilterValue, PageSize, QueryState};
use crate::refine::refine;
use crate::types::job::JobListing;

/// Per-fetch lifecycle: `Idle → Loading → (Success | Error)`. An error
/// shows its captured message alongside an empty list; the next successful
/// fetch returns to `Success`.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Success,
    Error(String),
}

pub struct JobBoard {
    query: QueryState,
    fetched: Vec<JobListing>,
    refined: Vec<JobListing>,
    pagination: PaginationState,
    status: FetchStatus,
    issued_seq: u64,
    applied_seq: u64,
    fetched_fingerprint: Option<String>,
}

impl Default for JobBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl JobBoard {
    pub fn new() -> Self {
        Self::with_query(QueryState::new())
    }

    pub fn with_query(query: QueryState) -> Self {
        let pagination = recompute(0, query.page_size(), query.page());
        Self {
            query,
            fetched: Vec::new(),
            refined: Vec::new(),
            pagination,
            status: FetchStatus::Idle,
            issued_seq: 0,
            applied_seq: 0,
            fetched_fingerprint: None,
        }
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn set_keyword(&mut self, keyword: &str) {
        self.query.set_keyword(keyword);
        self.derive();
    }

    pub fn set_location(&mut self, location: &str) {
        self.query.set_location(location);
        self.derive();
    }

    pub fn set_filter(&mut self, key: FilterKey, value: FilterValue) {
        self.query.set_filter(key, value);
        self.derive();
    }

    pub fn toggle_skill(&mut self, skill: &str) {
        self.query.toggle_skill(skill);
        self.derive();
    }

    pub fn set_page(&mut self, page: usize) {
        self.query.set_page(page);
        self.derive();
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.query.set_page_size(size);
        self.derive();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
        self.derive();
    }

    /// Whether the current query needs a round-trip: nothing fetched yet, or
    /// a backend-relevant field changed since the last applied fetch.
    pub fn needs_fetch(&self) -> bool {
        match &self.fetched_fingerprint {
            None => true,
            Some(fingerprint) => *fingerprint != self.query.server_fingerprint(),
        }
    }

    /// Issue one fetch and apply its outcome. The await point keeps the UI
    /// free; sequencing makes overlapping calls safe.
    pub async fn refresh(&mut self, service: &JobService) {
        let seq = self.begin_fetch();
        let outcome = service.fetch(&self.query).await;
        self.apply_fetch(seq, outcome);
    }

    /// Mark a fetch as in flight and hand back its sequence number.
    pub fn begin_fetch(&mut self) -> u64 {
        self.issued_seq += 1;
        self.status = FetchStatus::Loading;
        self.issued_seq
    }

    /// Apply a fetch outcome. Outcomes from superseded fetches are dropped;
    /// the listing cache only ever moves forward.
    pub fn apply_fetch(&mut self, seq: u64, outcome: Result<Vec<JobListing>>) {
        if seq < self.issued_seq || seq <= self.applied_seq {
            debug!(seq, issued = self.issued_seq, "discarding stale fetch outcome");
            return;
        }
        self.applied_seq = seq;

        match outcome {
            Ok(listings) => {
                self.fetched = listings;
                self.fetched_fingerprint = Some(self.query.server_fingerprint());
                self.status = FetchStatus::Success;
            }
            Err(e) => {
                error!("Job fetch failed: {e:#}");
                self.fetched.clear();
                self.fetched_fingerprint = None;
                self.status = FetchStatus::Error(e.to_string());
            }
        }
        self.derive();
    }

    fn derive(&mut self) {
        self.refined = refine(&self.fetched, &self.query);
        self.pagination = recompute(self.refined.len(), self.query.page_size(), self.query.page());
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            FetchStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    /// The slice of refined listings visible on the current page.
    pub fn current_page_items(&self) -> &[JobListing] {
        slice_page(&self.refined, self.pagination.current_page, self.query.page_size())
    }

    pub fn has_prev(&self) -> bool {
        self.pagination.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.pagination.current_page < self.pagination.total_pages
    }

    /// Clamped page navigation; a no-op at the bounds.
    pub fn next_page(&mut self) {
        if self.has_next() {
            self.query.set_page(self.pagination.current_page + 1);
            self.derive();
        }
    }

    pub fn prev_page(&mut self) {
        if self.has_prev() {
            self.query.set_page(self.pagination.current_page - 1);
            self.derive();
        }
    }
}
