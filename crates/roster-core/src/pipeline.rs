//! Listing view state: fetch, enrich, filter, paginate.
//!
//! `ViewState` owns the enriched list, the search text and the current page.
//! Everything the screen shows (`visible_slice`, `page_count`) is derived
//! from those three inputs. `DirectoryView` wraps it with refresh
//! bookkeeping: one fetch at a time, stale completions discarded.

use thiserror::Error;

use crate::directory::DirectorySource;
use crate::enrich::Enricher;
use crate::error::DirectoryError;
use crate::model::{DisplayEmployee, RawPerson};

/// Cards per page.
pub const PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("page {requested} is out of range (1..={page_count})")]
pub struct PageOutOfRange {
    pub requested: usize,
    pub page_count: usize,
}

/// Filter and page state over one enriched list.
#[derive(Debug, Clone)]
pub struct ViewState {
    full_list: Vec<DisplayEmployee>,
    filter_text: String,
    current_page: usize,
    /// Indices into `full_list` whose name matches `filter_text`.
    matches: Vec<usize>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            full_list: Vec::new(),
            filter_text: String::new(),
            current_page: 1,
            matches: Vec::new(),
        }
    }

    pub fn with_list(list: Vec<DisplayEmployee>) -> Self {
        let mut state = Self::new();
        state.replace_list(list);
        state
    }

    /// Installs a freshly enriched list. The filter survives; the page resets.
    pub fn replace_list(&mut self, list: Vec<DisplayEmployee>) {
        self.full_list = list;
        self.current_page = 1;
        self.recompute_matches();
    }

    /// Replaces the search text and jumps back to the first page.
    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
        self.current_page = 1;
        self.recompute_matches();
    }

    /// Moves to page `page` (1-based).
    ///
    /// # Errors
    /// Returns `PageOutOfRange` and leaves the state untouched when `page`
    /// is 0 or beyond `page_count()`.
    pub fn set_page(&mut self, page: usize) -> Result<(), PageOutOfRange> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PageOutOfRange {
                requested: page,
                page_count,
            });
        }
        self.current_page = page;
        Ok(())
    }

    /// # Errors
    /// Returns `PageOutOfRange` on the last page.
    pub fn next_page(&mut self) -> Result<(), PageOutOfRange> {
        self.set_page(self.current_page + 1)
    }

    /// # Errors
    /// Returns `PageOutOfRange` on the first page.
    pub fn prev_page(&mut self) -> Result<(), PageOutOfRange> {
        self.set_page(self.current_page.saturating_sub(1))
    }

    /// Number of pages over the filtered list; 0 when nothing matches.
    pub fn page_count(&self) -> usize {
        self.matches.len().div_ceil(PAGE_SIZE)
    }

    /// Records on the current page, in list order.
    pub fn visible_slice(&self) -> Vec<&DisplayEmployee> {
        let start = (self.current_page - 1) * PAGE_SIZE;
        self.matches
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .map(|&idx| &self.full_list[idx])
            .collect()
    }

    /// All records matching the filter, in list order.
    pub fn filtered(&self) -> impl Iterator<Item = &DisplayEmployee> {
        self.matches.iter().map(|&idx| &self.full_list[idx])
    }

    pub fn filtered_len(&self) -> usize {
        self.matches.len()
    }

    pub fn full_list(&self) -> &[DisplayEmployee] {
        &self.full_list
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    fn recompute_matches(&mut self) {
        let needle = self.filter_text.to_lowercase();
        self.matches = self
            .full_list
            .iter()
            .enumerate()
            .filter(|(_, employee)| employee.name.to_lowercase().contains(&needle))
            .map(|(idx, _)| idx)
            .collect();
    }
}

/// Handle for one outstanding directory fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    seq: u64,
}

impl FetchTicket {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RefreshRejected {
    #[error("a refresh is already in progress")]
    InFlight,
}

/// What a completed fetch did to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The list was replaced with `count` records.
    Applied { count: usize },
    /// The fetch failed; the previous list is still shown.
    Failed { message: String },
    /// The view was detached or reset after the fetch started.
    Stale,
}

/// `ViewState` plus refresh coordination for the listing screen.
#[derive(Debug, Default)]
pub struct DirectoryView {
    state: ViewState,
    generation: u64,
    next_seq: u64,
    in_flight: Option<FetchTicket>,
    last_error: Option<String>,
    loaded: bool,
}

impl DirectoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    /// Starts a fetch.
    ///
    /// # Errors
    /// Returns `RefreshRejected::InFlight` while another fetch is pending.
    pub fn begin_refresh(&mut self) -> Result<FetchTicket, RefreshRejected> {
        if self.in_flight.is_some() {
            return Err(RefreshRejected::InFlight);
        }
        self.next_seq += 1;
        let ticket = FetchTicket {
            generation: self.generation,
            seq: self.next_seq,
        };
        self.in_flight = Some(ticket);
        Ok(ticket)
    }

    /// True when `ticket` is the outstanding fetch of this generation.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.in_flight == Some(ticket)
    }

    /// Applies a fetch result. Stale tickets leave everything untouched,
    /// including the enricher.
    pub fn complete_refresh(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<RawPerson>, DirectoryError>,
        enricher: &mut Enricher,
    ) -> RefreshOutcome {
        if !self.is_current(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                "Discarding stale directory result"
            );
            return RefreshOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(people) => {
                let count = people.len();
                self.state.replace_list(enricher.enrich(&people));
                self.loaded = true;
                self.last_error = None;
                tracing::info!(count, "Directory refreshed");
                RefreshOutcome::Applied { count }
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(error = %message, "Directory refresh failed");
                self.last_error = Some(message.clone());
                RefreshOutcome::Failed { message }
            }
        }
    }

    /// Fetches and applies in one step.
    ///
    /// # Errors
    /// Returns `RefreshRejected::InFlight` if a fetch is already pending.
    pub async fn refresh(
        &mut self,
        source: &dyn DirectorySource,
        enricher: &mut Enricher,
    ) -> Result<RefreshOutcome, RefreshRejected> {
        let ticket = self.begin_refresh()?;
        let result = source.fetch().await;
        Ok(self.complete_refresh(ticket, result, enricher))
    }

    /// The screen stopped observing this view. Pending results become stale.
    pub fn detach(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }

    /// Detaches and forgets the list, filter and error.
    pub fn reset(&mut self) {
        self.detach();
        self.state = ViewState::new();
        self.last_error = None;
        self.loaded = false;
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// A fetch is pending and no list has arrived yet.
    pub fn is_initial_load(&self) -> bool {
        self.in_flight.is_some() && !self.loaded
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn has_error(&self) -> bool {
        self.last_error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::enrich::EnrichmentMode;
    use crate::model::Address;

    const NAMES: [&str; 10] = [
        "Alice", "Bob", "Alicia", "Carol", "Alina", "Dan", "Eve", "Al", "Zoe", "Ann",
    ];

    fn raw(names: &[&str]) -> Vec<RawPerson> {
        names
            .iter()
            .enumerate()
            .map(|(idx, name)| RawPerson {
                id: idx as u64 + 1,
                name: (*name).to_string(),
                address: Address::default(),
            })
            .collect()
    }

    fn enriched(names: &[&str]) -> Vec<DisplayEmployee> {
        Enricher::new(EnrichmentMode::Fresh, 1).enrich(&raw(names))
    }

    fn numbered(count: usize) -> Vec<DisplayEmployee> {
        let names: Vec<String> = (1..=count).map(|n| format!("Person {n}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        enriched(&refs)
    }

    fn visible_names(state: &ViewState) -> Vec<String> {
        state
            .visible_slice()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    #[test]
    fn test_filter_ali_scenario() {
        let mut state = ViewState::with_list(enriched(&NAMES));
        state.set_filter_text("ali");
        assert_eq!(visible_names(&state), ["Alice", "Alicia", "Alina"]);
        assert_eq!(state.filtered_len(), 3);
        assert_eq!(state.page_count(), 1);
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let mut state = ViewState::with_list(enriched(&NAMES));
        state.set_filter_text("ALI");
        assert_eq!(state.filtered_len(), 3);
    }

    #[test]
    fn test_set_filter_text_is_idempotent() {
        let mut state = ViewState::with_list(numbered(23));
        state.set_filter_text("1");
        let once = (visible_names(&state), state.page_count(), state.current_page());
        state.set_filter_text("1");
        let twice = (visible_names(&state), state.page_count(), state.current_page());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut state = ViewState::with_list(numbered(12));
        state.set_page(3).unwrap();
        state.set_filter_text("Person");
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn test_pages_concatenate_to_filtered_list() {
        let mut state = ViewState::with_list(numbered(23));
        state.set_filter_text("2");
        let expected: Vec<String> = state.filtered().map(|e| e.name.clone()).collect();

        let mut collected = Vec::new();
        for page in 1..=state.page_count() {
            state.set_page(page).unwrap();
            let slice = visible_names(&state);
            assert!(slice.len() <= PAGE_SIZE);
            collected.extend(slice);
        }
        assert_eq!(collected, expected);
    }

    #[test]
    fn test_ten_items_make_two_full_pages() {
        let mut state = ViewState::with_list(numbered(10));
        assert_eq!(state.page_count(), 2);
        assert_eq!(state.visible_slice().len(), 5);
        state.set_page(2).unwrap();
        assert_eq!(state.visible_slice().len(), 5);
        assert!(state.next_page().is_err());
    }

    #[test]
    fn test_eleven_items_leave_one_on_last_page() {
        let mut state = ViewState::with_list(numbered(11));
        assert_eq!(state.page_count(), 3);
        state.set_page(3).unwrap();
        assert_eq!(visible_names(&state), ["Person 11"]);
    }

    #[test]
    fn test_empty_filter_result_has_no_pages() {
        let mut state = ViewState::with_list(enriched(&NAMES));
        state.set_filter_text("zzz");
        assert_eq!(state.page_count(), 0);
        assert!(state.visible_slice().is_empty());
        assert_eq!(
            state.set_page(1),
            Err(PageOutOfRange {
                requested: 1,
                page_count: 0
            })
        );
    }

    #[test]
    fn test_out_of_range_page_leaves_state_untouched() {
        let mut state = ViewState::with_list(numbered(11));
        state.set_page(2).unwrap();
        assert!(state.set_page(0).is_err());
        assert!(state.set_page(4).is_err());
        assert_eq!(state.current_page(), 2);
        state.prev_page().unwrap();
        assert!(state.prev_page().is_err());
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn test_replace_list_keeps_filter_and_resets_page() {
        let mut state = ViewState::with_list(numbered(12));
        state.set_filter_text("person");
        state.set_page(2).unwrap();
        state.replace_list(enriched(&NAMES));
        assert_eq!(state.filter_text(), "person");
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.filtered_len(), 0);
    }

    struct FixedSource(Result<Vec<RawPerson>, DirectoryError>);

    #[async_trait]
    impl DirectorySource for FixedSource {
        async fn fetch(&self) -> Result<Vec<RawPerson>, DirectoryError> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_list() {
        let mut view = DirectoryView::new();
        let mut enricher = Enricher::new(EnrichmentMode::Fresh, 3);

        let ok = FixedSource(Ok(raw(&NAMES)));
        let outcome = view.refresh(&ok, &mut enricher).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Applied { count: 10 });
        assert!(!view.has_error());

        let failing = FixedSource(Err(DirectoryError::Timeout(Duration::from_secs(10))));
        let outcome = view.refresh(&failing, &mut enricher).await.unwrap();
        assert!(matches!(outcome, RefreshOutcome::Failed { .. }));
        assert!(view.has_error());
        assert_eq!(view.state().full_list().len(), 10);
        assert!(!view.is_refreshing());

        view.refresh(&ok, &mut enricher).await.unwrap();
        assert!(!view.has_error());
    }

    #[test]
    fn test_overlapping_refresh_is_rejected() {
        let mut view = DirectoryView::new();
        let ticket = view.begin_refresh().unwrap();
        assert!(view.is_initial_load());
        assert_eq!(view.begin_refresh(), Err(RefreshRejected::InFlight));

        let mut enricher = Enricher::new(EnrichmentMode::Fresh, 3);
        view.complete_refresh(ticket, Ok(raw(&NAMES)), &mut enricher);
        assert!(view.begin_refresh().is_ok());
        assert!(!view.is_initial_load());
    }

    #[test]
    fn test_result_after_detach_is_stale() {
        let mut view = DirectoryView::new();
        let mut enricher = Enricher::new(EnrichmentMode::Fresh, 3);
        let seed_before = enricher.seed();

        let ticket = view.begin_refresh().unwrap();
        view.detach();
        let outcome = view.complete_refresh(ticket, Ok(raw(&NAMES)), &mut enricher);

        assert_eq!(outcome, RefreshOutcome::Stale);
        assert!(view.state().full_list().is_empty());
        assert_eq!(enricher.seed(), seed_before);
        assert!(!view.is_refreshing());
    }

    #[test]
    fn test_old_ticket_cannot_complete_newer_fetch() {
        let mut view = DirectoryView::new();
        let mut enricher = Enricher::new(EnrichmentMode::Fresh, 3);

        let old = view.begin_refresh().unwrap();
        view.detach();
        let new = view.begin_refresh().unwrap();
        assert_ne!(old.generation(), new.generation());

        assert_eq!(
            view.complete_refresh(old, Ok(raw(&NAMES)), &mut enricher),
            RefreshOutcome::Stale
        );
        assert!(view.is_refreshing());
        assert_eq!(
            view.complete_refresh(new, Ok(raw(&NAMES[..2])), &mut enricher),
            RefreshOutcome::Applied { count: 2 }
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut view = DirectoryView::new();
        let mut enricher = Enricher::new(EnrichmentMode::Fresh, 3);
        let ticket = view.begin_refresh().unwrap();
        view.complete_refresh(ticket, Ok(raw(&NAMES)), &mut enricher);
        view.state_mut().set_filter_text("ali");

        view.reset();
        assert!(view.state().full_list().is_empty());
        assert_eq!(view.state().filter_text(), "");
        assert!(!view.is_loaded());
    }
}
