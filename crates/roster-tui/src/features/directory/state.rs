//! Directory feature state.

use roster_core::enrich::Enricher;
use roster_core::model::DisplayEmployee;
use roster_core::pipeline::DirectoryView;

use crate::common::TextInput;

#[derive(Debug)]
pub struct DirectoryState {
    pub view: DirectoryView,
    pub enricher: Enricher,
    pub search: TextInput,
    /// Index of the highlighted card within the visible page.
    pub selected: usize,
    /// Record shown on the detail screen.
    pub detail: Option<DisplayEmployee>,
    /// Transient status line (e.g. "Refresh already in progress").
    pub notice: Option<String>,
}

impl DirectoryState {
    pub fn new(enricher: Enricher) -> Self {
        Self {
            view: DirectoryView::new(),
            enricher,
            search: TextInput::default(),
            selected: 0,
            detail: None,
            notice: None,
        }
    }

    /// The highlighted employee on the current page, if any.
    pub fn selected_employee(&self) -> Option<&DisplayEmployee> {
        self.view.state().visible_slice().get(self.selected).copied()
    }

    /// Keeps the selection inside the visible page.
    pub fn clamp_selection(&mut self) {
        let visible = self.view.state().visible_slice().len();
        self.selected = self.selected.min(visible.saturating_sub(1));
    }

    /// Drops the list, search and detail.
    pub fn reset(&mut self) {
        self.view.reset();
        self.search.clear();
        self.selected = 0;
        self.detail = None;
        self.notice = None;
    }
}
