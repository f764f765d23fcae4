use crate::candidate::Candidate;
use crate::ranker::{Presentation, RankedEntry, Ranker};

/// Query, selection and candidate snapshot of one open switcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitcherState {
    candidates: Vec<Candidate>,
    query: String,
    selection: usize,
    limit: Option<usize>,
}

impl SwitcherState {
    #[must_use]
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// A new query starts the selection over at the top.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.selection = 0;
    }

    /// Swaps in a fresh snapshot, keeping the query and the selection index.
    pub fn replace_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
    }

    #[must_use]
    pub fn view<'a>(&'a self, ranker: &Ranker) -> Presentation<'a> {
        ranker.present(&self.candidates, &self.query, self.limit)
    }

    /// The selection index clamped to the current result count.
    #[must_use]
    pub fn selection(&self, ranker: &Ranker) -> usize {
        clamp(self.selection, self.view(ranker).len())
    }

    #[must_use]
    pub fn selected<'a>(&'a self, ranker: &Ranker) -> Option<RankedEntry<'a>> {
        let view = self.view(ranker);
        let index = clamp(self.selection, view.len());
        view.get(index).cloned()
    }

    pub fn select_next(&mut self, ranker: &Ranker) {
        let len = self.view(ranker).len();
        self.selection = clamp(self.selection.saturating_add(1), len);
    }

    pub fn select_previous(&mut self, ranker: &Ranker) {
        let len = self.view(ranker).len();
        self.selection = clamp(self.selection, len).saturating_sub(1);
    }
}

fn clamp(selection: usize, len: usize) -> usize {
    selection.min(len.saturating_sub(1))
}
