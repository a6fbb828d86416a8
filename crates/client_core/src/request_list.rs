use shared::{
    domain::{FilterCriteria, FilterField, SortCriteria, SortField},
    error::FlowError,
    protocol::CertificateRequestRecord,
};
use tracing::{debug, error, info};

use crate::{listing::ListingCache, CertificateApi};

pub const LIST_LOAD_FAILED_MESSAGE: &str = "Failed to load requests list. Please try again later.";
pub const LIST_EMPTY_MESSAGE: &str = "No requests found.";

/// Tags one list fetch. Only the most recently issued ticket may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ListStatus<'a> {
    Loading,
    Errored(&'a FlowError),
    Empty,
    Ready(&'a [CertificateRequestRecord]),
}

/// State behind the requests list page.
///
/// Fetching happens on [`RequestListView::activate`]; filtering and sorting
/// only ever recompute the local view.
#[derive(Debug, Default)]
pub struct RequestListView {
    records: Vec<CertificateRequestRecord>,
    generation: u64,
    loading: bool,
    error: Option<FlowError>,
    filters: FilterCriteria,
    sort: SortCriteria,
    latest_ticket: u64,
    cache: ListingCache,
}

impl RequestListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self) -> FetchTicket {
        self.latest_ticket += 1;
        self.loading = true;
        self.error = None;
        debug!(ticket = self.latest_ticket, "request list activated");
        FetchTicket(self.latest_ticket)
    }

    /// Apply a fetch result. Returns `false` when the ticket has been superseded.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: anyhow::Result<Vec<CertificateRequestRecord>>,
    ) -> bool {
        if ticket.0 != self.latest_ticket {
            debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "discarding superseded request list result"
            );
            return false;
        }

        match outcome {
            Ok(records) => {
                info!(count = records.len(), "request list loaded");
                self.records = records;
                self.generation += 1;
                self.error = None;
            }
            Err(err) => {
                error!("failed to load request list: {err:#}");
                self.error = Some(FlowError::transport(LIST_LOAD_FAILED_MESSAGE));
            }
        }
        self.loading = false;
        true
    }

    pub async fn refresh<A>(&mut self, api: &A) -> bool
    where
        A: CertificateApi + ?Sized,
    {
        let ticket = self.activate();
        let outcome = api.fetch_requests().await;
        self.complete(ticket, outcome)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&FlowError> {
        self.error.as_ref()
    }

    pub fn records(&self) -> &[CertificateRequestRecord] {
        &self.records
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    pub fn set_filter(&mut self, field: FilterField, value: impl Into<String>) {
        self.filters.set(field, value);
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterCriteria::default();
    }

    pub fn sort(&self) -> SortCriteria {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortCriteria) {
        self.sort = sort;
    }

    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort = self.sort.toggled(field);
    }

    pub fn visible(&mut self) -> &[CertificateRequestRecord] {
        self.cache
            .view(self.generation, &self.records, &self.filters, self.sort)
    }

    pub fn status(&mut self) -> ListStatus<'_> {
        let rows = self
            .cache
            .view(self.generation, &self.records, &self.filters, self.sort);
        if self.loading {
            ListStatus::Loading
        } else if let Some(err) = &self.error {
            ListStatus::Errored(err)
        } else if rows.is_empty() {
            ListStatus::Empty
        } else {
            ListStatus::Ready(rows)
        }
    }
}
