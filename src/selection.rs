//! Cross-page selection bookkeeping.
//!
//! [`PageSelectionTracker`] keeps the set of selected record ids while the user
//! pages through a lazily fetched collection. Only ids are stored, never
//! records, so memory does not grow with page history. The rows reported as
//! selected for the visible page are always recomputed as
//! `current_page ∩ selection`.
//!
//! # Bulk selection
//!
//! "Select the first N rows" replaces the whole selection with the first N
//! records of the remote collection, which needs a fetch. While that fetch is
//! in flight the tracker is *pending*:
//!
//! - a second bulk request is rejected with [`SelectionError::BulkInProgress`];
//! - visible-page edits and clears are queued and replayed, in arrival order,
//!   on top of the bulk result once it lands (or on top of the unchanged
//!   selection if the fetch fails).
//!
//! A queued edit is stored as the rows it checked and unchecked, worked out
//! against the selection as the user saw it. Replaying it touches only those
//! rows, so bulk-selected rows the user never flipped stay selected, and
//! paging away while the fetch runs does not change what the edit touches.
//!
//! ```rust
//! use artworks_table::artwork::{Page, RecordId};
//! use artworks_table::selection::{BulkStart, PageSelectionTracker};
//!
//! let mut tracker = PageSelectionTracker::new();
//! tracker.on_page_loaded(Page::new(2, 10, (11..=20).collect::<Vec<RecordId>>(), 100));
//!
//! let BulkStart::Fetch(ticket) = tracker.begin_bulk("15").unwrap() else {
//!     panic!("15 is a valid count");
//! };
//! let first_fifteen: Vec<RecordId> = (1..=15).collect();
//! tracker.complete_bulk(ticket, Ok(first_fifteen)).unwrap();
//!
//! assert_eq!(tracker.selection_count(), 15);
//! assert_eq!(tracker.visible_selected_ids(), vec![11, 12, 13, 14, 15]);
//! ```

use crate::artwork::{Identified, Page, RecordId};
use crate::source::FetchError;
use std::collections::HashSet;
use std::future::Future;
use std::num::NonZeroUsize;
use thiserror::Error;
use tracing::{debug, warn};

/// Parses the user's bulk-count text.
///
/// Any decimal notation of a whole number of at least 1 is a count: `"20"`,
/// `"5.0"` and `"1e3"` all qualify. A count too large for `usize` saturates,
/// which selects the whole collection. Everything else returns `None`: empty
/// text, zero, negative numbers, fractional values such as `"2.5"`,
/// infinities and non-numeric input.
///
/// ```rust
/// use artworks_table::selection::parse_bulk_count;
///
/// assert_eq!(parse_bulk_count(" 20 ").map(|n| n.get()), Some(20));
/// assert_eq!(parse_bulk_count("1e3").map(|n| n.get()), Some(1000));
/// assert_eq!(parse_bulk_count("0"), None);
/// assert_eq!(parse_bulk_count("-3"), None);
/// assert_eq!(parse_bulk_count("2.5"), None);
/// assert_eq!(parse_bulk_count("abc"), None);
/// ```
pub fn parse_bulk_count(raw: &str) -> Option<NonZeroUsize> {
    let text = raw.trim();
    if text.is_empty() || text.starts_with('-') {
        return None;
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        let count = text.parse::<usize>().unwrap_or(usize::MAX);
        return NonZeroUsize::new(count);
    }

    let value: f64 = text.parse().ok()?;
    if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
        return None;
    }
    // Float to int casts saturate at usize::MAX
    NonZeroUsize::new(value as usize)
}

/// Whether an edit took effect immediately or was deferred behind a pending
/// bulk selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The selection already reflects the edit.
    Applied,
    /// The edit will be replayed when the pending bulk selection completes.
    Queued,
}

/// Handle for one in-flight bulk selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkTicket {
    generation: u64,
    count: NonZeroUsize,
}

impl BulkTicket {
    /// Number of records to fetch and select.
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// Identifies the bulk operation this ticket belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of [`PageSelectionTracker::begin_bulk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkStart {
    /// The input was not a positive count; the selection has been cleared and
    /// nothing needs fetching.
    Cleared,
    /// Fetch `ticket.count()` records and hand them to
    /// [`PageSelectionTracker::complete_bulk`].
    Fetch(BulkTicket),
}

/// Errors reported by bulk selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Another bulk selection is still waiting for its fetch.
    #[error("a bulk selection is already in progress")]
    BulkInProgress,
    /// The ticket does not belong to the pending bulk selection.
    #[error("bulk selection {generation} is no longer pending")]
    StaleTicket {
        /// Generation of the rejected ticket.
        generation: u64,
    },
    /// The bulk fetch failed; the previous selection was kept.
    #[error("bulk selection failed: {0}")]
    Fetch(#[from] FetchError),
}

// Queued edits are deltas, so replaying them on top of the bulk result only
// touches the rows the user actually flipped.
#[derive(Debug)]
enum DeferredEdit {
    Visible {
        added: Vec<RecordId>,
        removed: Vec<RecordId>,
    },
    Clear,
}

#[derive(Debug)]
struct PendingBulk {
    ticket: BulkTicket,
    queued: Vec<DeferredEdit>,
    // Selection as the user sees it: the pre-bulk selection with the queued
    // edits applied.
    projected: HashSet<RecordId>,
}

/// Tracks selected record ids across independently fetched pages.
#[derive(Debug)]
pub struct PageSelectionTracker<R> {
    selection: HashSet<RecordId>,
    current_page: Option<Page<R>>,
    pending: Option<PendingBulk>,
    generation: u64,
}

impl<R> Default for PageSelectionTracker<R> {
    fn default() -> Self {
        Self {
            selection: HashSet::new(),
            current_page: None,
            pending: None,
            generation: 0,
        }
    }
}

impl<R: Identified> PageSelectionTracker<R> {
    /// Creates a tracker with an empty selection and no page loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `page` the visible page and returns its selected records.
    ///
    /// The selection itself is not touched.
    pub fn on_page_loaded(&mut self, page: Page<R>) -> Vec<&R> {
        debug!(
            page = page.number,
            size = page.size,
            records = page.records.len(),
            total = page.total_count,
            "page loaded"
        );
        self.current_page = Some(page);
        self.visible_selection()
    }

    /// The visible page, if one has been loaded.
    pub fn current_page(&self) -> Option<&Page<R>> {
        self.current_page.as_ref()
    }

    /// Records on the visible page that are currently selected, in page order.
    pub fn visible_selection(&self) -> Vec<&R> {
        self.current_page
            .iter()
            .flat_map(|page| page.records.iter())
            .filter(|record| self.selection.contains(&record.id()))
            .collect()
    }

    /// Ids of [`visible_selection`](Self::visible_selection).
    pub fn visible_selected_ids(&self) -> Vec<RecordId> {
        self.visible_selection()
            .into_iter()
            .map(|record| record.id())
            .collect()
    }

    /// Ids on the visible page as the user should see them checked.
    ///
    /// Same as [`visible_selected_ids`](Self::visible_selected_ids) except
    /// while a bulk selection is pending, when edits queued behind it are
    /// already reflected.
    pub fn displayed_selected_ids(&self) -> Vec<RecordId> {
        let shown = match &self.pending {
            Some(pending) => &pending.projected,
            None => &self.selection,
        };
        self.current_page
            .iter()
            .flat_map(|page| page.records.iter())
            .map(Identified::id)
            .filter(|id| shown.contains(id))
            .collect()
    }

    /// Replaces the selection of the visible page with `chosen`.
    ///
    /// `chosen` is the complete post-edit selection of the visible page, not a
    /// delta. Every record on the visible page is selected if it appears in
    /// `chosen` and deselected otherwise; ids from other pages are never
    /// touched, and entries of `chosen` that are not on the visible page are
    /// ignored. Without a visible page this does nothing.
    pub fn set_visible_selection<I>(&mut self, chosen: I) -> EditOutcome
    where
        I: IntoIterator,
        I::Item: Identified,
    {
        let Some(page) = self.current_page.as_ref() else {
            return EditOutcome::Applied;
        };
        let page_ids = page.ids();
        let chosen: HashSet<RecordId> = chosen.into_iter().map(|r| r.id()).collect();

        if let Some(pending) = self.pending.as_mut() {
            let (added, removed): (Vec<RecordId>, Vec<RecordId>) = page_ids
                .iter()
                .copied()
                .filter(|id| chosen.contains(id) != pending.projected.contains(id))
                .partition(|id| chosen.contains(id));
            debug!(
                page = page.number,
                added = added.len(),
                removed = removed.len(),
                "queued page edit"
            );
            apply_visible(&mut pending.projected, &page_ids, &chosen);
            pending.queued.push(DeferredEdit::Visible { added, removed });
            return EditOutcome::Queued;
        }

        apply_visible(&mut self.selection, &page_ids, &chosen);
        EditOutcome::Applied
    }

    /// Number of selected records across all pages.
    pub fn selection_count(&self) -> usize {
        self.selection.len()
    }

    /// Returns true if `id` is selected, wherever it lives.
    pub fn is_selected(&self, id: RecordId) -> bool {
        self.selection.contains(&id)
    }

    /// All selected ids, in no particular order.
    pub fn selected_ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.selection.iter().copied()
    }

    /// Empties the selection.
    pub fn clear(&mut self) -> EditOutcome {
        if let Some(pending) = self.pending.as_mut() {
            pending.queued.push(DeferredEdit::Clear);
            pending.projected.clear();
            return EditOutcome::Queued;
        }
        self.selection.clear();
        EditOutcome::Applied
    }

    /// Returns true while a bulk selection is waiting for its fetch.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a bulk "select first N" from the user's raw input.
    ///
    /// Input that is not a positive integer clears the selection at once and
    /// returns [`BulkStart::Cleared`]. Otherwise the tracker becomes pending and
    /// the returned ticket says how many records to fetch.
    pub fn begin_bulk(&mut self, raw: &str) -> Result<BulkStart, SelectionError> {
        if self.pending.is_some() {
            return Err(SelectionError::BulkInProgress);
        }

        let Some(count) = parse_bulk_count(raw) else {
            debug!(input = raw, "bulk count is not positive, clearing selection");
            self.selection.clear();
            return Ok(BulkStart::Cleared);
        };

        self.generation += 1;
        let ticket = BulkTicket {
            generation: self.generation,
            count,
        };
        debug!(count = count.get(), generation = self.generation, "bulk selection pending");
        self.pending = Some(PendingBulk {
            ticket,
            queued: Vec::new(),
            projected: self.selection.clone(),
        });
        Ok(BulkStart::Fetch(ticket))
    }

    /// Finishes the bulk selection identified by `ticket`.
    ///
    /// On success the selection becomes exactly the ids of the first
    /// `ticket.count()` fetched records; on failure it is left as it was. Edits
    /// queued while pending are then replayed in order. Returns the new
    /// selection count.
    pub fn complete_bulk<I>(
        &mut self,
        ticket: BulkTicket,
        result: Result<I, FetchError>,
    ) -> Result<usize, SelectionError>
    where
        I: IntoIterator,
        I::Item: Identified,
    {
        let pending = match self.pending.take() {
            Some(pending) if pending.ticket == ticket => pending,
            other => {
                self.pending = other;
                return Err(SelectionError::StaleTicket {
                    generation: ticket.generation,
                });
            }
        };

        let outcome = match result {
            Ok(records) => {
                self.selection.clear();
                self.selection.extend(
                    records
                        .into_iter()
                        .take(ticket.count())
                        .map(|record| record.id()),
                );
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "bulk selection fetch failed, keeping selection");
                Err(SelectionError::Fetch(err))
            }
        };

        self.replay(pending.queued);
        outcome.map(|()| self.selection.len())
    }

    /// Gives up on the pending bulk selection, if any, keeping the current
    /// selection and replaying queued edits. Returns true if something was
    /// pending.
    ///
    /// Needed when the bulk fetch future is dropped before it resolves.
    pub fn abandon_bulk(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                debug!(generation = pending.ticket.generation, "bulk selection abandoned");
                self.replay(pending.queued);
                true
            }
            None => false,
        }
    }

    /// Selects the first `n` records of the whole collection.
    ///
    /// `raw` is the user's text; anything but a positive integer clears the
    /// selection without fetching. Otherwise `fetch_first_n` is awaited for
    /// the records and the selection is replaced by their ids. Returns the
    /// recomputed visible selection: a record shows as selected only if it is
    /// both among the first `n` and on the visible page.
    ///
    /// `page_size` is the page size the user is looking at; selection is kept
    /// by id, so it does not influence which records are selected.
    pub async fn bulk_select_first_n<F, Fut, I>(
        &mut self,
        raw: &str,
        page_size: usize,
        fetch_first_n: F,
    ) -> Result<Vec<&R>, SelectionError>
    where
        F: FnOnce(usize) -> Fut,
        Fut: Future<Output = Result<I, FetchError>>,
        I: IntoIterator,
        I::Item: Identified,
    {
        match self.begin_bulk(raw)? {
            BulkStart::Cleared => Ok(self.visible_selection()),
            BulkStart::Fetch(ticket) => {
                debug!(count = ticket.count(), page_size, "fetching bulk selection");
                let result = fetch_first_n(ticket.count()).await;
                self.complete_bulk(ticket, result)?;
                Ok(self.visible_selection())
            }
        }
    }

    fn replay(&mut self, queued: Vec<DeferredEdit>) {
        for edit in queued {
            match edit {
                DeferredEdit::Visible { added, removed } => {
                    self.selection.extend(added);
                    for id in removed {
                        self.selection.remove(&id);
                    }
                }
                DeferredEdit::Clear => self.selection.clear(),
            }
        }
    }
}

fn apply_visible(selection: &mut HashSet<RecordId>, page_ids: &[RecordId], chosen: &HashSet<RecordId>) {
    for id in page_ids {
        if chosen.contains(id) {
            selection.insert(*id);
        } else {
            selection.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::Artwork;

    fn page(number: usize, size: usize, total: usize) -> Page<Artwork> {
        let start = (number - 1) * size + 1;
        let end = (number * size).min(total);
        let records = (start..=end)
            .map(|id| Artwork::sample(id as RecordId))
            .collect();
        Page::new(number, size, records, total)
    }

    fn first_n(n: usize) -> Vec<RecordId> {
        (1..=n as RecordId).collect()
    }

    fn sorted(ids: impl Iterator<Item = RecordId>) -> Vec<RecordId> {
        let mut ids: Vec<_> = ids.collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_new_tracker_is_empty() {
        let tracker: PageSelectionTracker<Artwork> = PageSelectionTracker::new();
        assert_eq!(tracker.selection_count(), 0);
        assert!(tracker.current_page().is_none());
        assert!(tracker.visible_selection().is_empty());
        assert!(!tracker.is_pending());
    }

    #[test]
    fn test_visible_selection_is_recomputed_on_load() {
        let mut tracker = PageSelectionTracker::new();
        tracker.on_page_loaded(page(1, 10, 100));
        tracker.set_visible_selection([3 as RecordId, 4]);

        // Selection changes while page 2 is visible, then page 1 comes back
        tracker.on_page_loaded(page(2, 10, 100));
        tracker.set_visible_selection([12 as RecordId]);
        let visible: Vec<RecordId> = tracker
            .on_page_loaded(page(1, 10, 100))
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(visible, vec![3, 4]);

        tracker.clear();
        assert!(tracker.visible_selection().is_empty());
    }

    #[test]
    fn test_edits_stay_on_their_page() {
        let mut tracker = PageSelectionTracker::new();
        tracker.on_page_loaded(page(1, 10, 100));
        tracker.set_visible_selection([1 as RecordId, 2]);

        tracker.on_page_loaded(page(2, 10, 100));
        tracker.set_visible_selection([11 as RecordId]);

        tracker.on_page_loaded(page(1, 10, 100));
        assert_eq!(tracker.visible_selected_ids(), vec![1, 2]);
        assert!(tracker.is_selected(11));
    }

    #[test]
    fn test_edit_ignores_ids_from_other_pages() {
        let mut tracker = PageSelectionTracker::new();
        tracker.on_page_loaded(page(2, 10, 100));
        tracker.set_visible_selection([11 as RecordId, 3, 99]);
        assert_eq!(sorted(tracker.selected_ids()), vec![11]);
    }

    #[test]
    fn test_edit_accepts_records() {
        let mut tracker = PageSelectionTracker::new();
        let loaded = page(1, 5, 5);
        let chosen = vec![loaded.records[0].clone(), loaded.records[4].clone()];
        tracker.on_page_loaded(loaded);
        assert_eq!(tracker.set_visible_selection(&chosen), EditOutcome::Applied);
        assert_eq!(tracker.visible_selected_ids(), vec![1, 5]);
    }

    #[test]
    fn test_edit_without_page_is_noop() {
        let mut tracker: PageSelectionTracker<Artwork> = PageSelectionTracker::new();
        assert_eq!(
            tracker.set_visible_selection([1 as RecordId]),
            EditOutcome::Applied
        );
        assert_eq!(tracker.selection_count(), 0);
    }

    #[test]
    fn test_edit_is_idempotent() {
        let mut once = PageSelectionTracker::new();
        once.on_page_loaded(page(3, 10, 100));
        once.set_visible_selection([21 as RecordId, 25, 30]);

        let mut twice = PageSelectionTracker::new();
        twice.on_page_loaded(page(3, 10, 100));
        twice.set_visible_selection([21 as RecordId, 25, 30]);
        twice.set_visible_selection([21 as RecordId, 25, 30]);

        assert_eq!(sorted(once.selected_ids()), sorted(twice.selected_ids()));
    }

    #[test]
    fn test_count_sums_disjoint_pages() {
        let mut tracker = PageSelectionTracker::new();
        tracker.on_page_loaded(page(1, 10, 100));
        tracker.set_visible_selection([1 as RecordId, 2, 3]);
        tracker.on_page_loaded(page(4, 10, 100));
        tracker.set_visible_selection([31 as RecordId, 40]);
        assert_eq!(tracker.selection_count(), 5);
    }

    #[test]
    fn test_deselecting_on_page() {
        let mut tracker = PageSelectionTracker::new();
        tracker.on_page_loaded(page(1, 10, 100));
        tracker.set_visible_selection([1 as RecordId, 2, 3]);
        tracker.set_visible_selection([2 as RecordId]);
        assert_eq!(tracker.visible_selected_ids(), vec![2]);
        tracker.set_visible_selection(Vec::<RecordId>::new());
        assert_eq!(tracker.selection_count(), 0);
    }

    #[tokio::test]
    async fn test_bulk_selects_across_pages() {
        let mut tracker = PageSelectionTracker::new();
        tracker.on_page_loaded(page(2, 10, 100));

        let visible: Vec<RecordId> = tracker
            .bulk_select_first_n("15", 10, |n| async move { Ok(first_n(n)) })
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();

        assert_eq!(visible, vec![11, 12, 13, 14, 15]);
        assert_eq!(tracker.selection_count(), 15);
        assert!(!tracker.is_pending());
    }

    #[tokio::test]
    async fn test_bulk_replaces_previous_selection() {
        let mut tracker = PageSelectionTracker::new();
        tracker.on_page_loaded(page(5, 10, 100));
        tracker.set_visible_selection([45 as RecordId]);

        tracker
            .bulk_select_first_n("3", 10, |n| async move { Ok(first_n(n)) })
            .await
            .unwrap();
        assert_eq!(sorted(tracker.selected_ids()), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_bulk_with_invalid_count_clears() {
        for raw in ["0", "abc", "", "-4", "2.5"] {
            let mut tracker = PageSelectionTracker::new();
            tracker.on_page_loaded(page(1, 10, 100));
            tracker.set_visible_selection([1 as RecordId, 2]);

            let mut fetched = false;
            let visible = tracker
                .bulk_select_first_n(raw, 10, |n| {
                    fetched = true;
                    async move { Ok(first_n(n)) }
                })
                .await
                .unwrap();
            assert!(visible.is_empty(), "input {:?}", raw);
            assert!(!fetched, "input {:?} must not fetch", raw);
            assert_eq!(tracker.selection_count(), 0, "input {:?}", raw);
        }
    }

    #[tokio::test]
    async fn test_bulk_fetch_failure_keeps_selection() {
        let mut tracker = PageSelectionTracker::new();
        tracker.on_page_loaded(page(1, 10, 100));
        tracker.set_visible_selection([4 as RecordId]);

        let err = tracker
            .bulk_select_first_n("20", 10, |_| async {
                Err::<Vec<RecordId>, _>(FetchError::Status(500))
            })
            .await
            .unwrap_err();

        assert_eq!(err, SelectionError::Fetch(FetchError::Status(500)));
        assert_eq!(sorted(tracker.selected_ids()), vec![4]);
        assert!(!tracker.is_pending());
    }

    #[test]
    fn test_bulk_truncates_oversized_results() {
        let mut tracker: PageSelectionTracker<Artwork> = PageSelectionTracker::new();
        let BulkStart::Fetch(ticket) = tracker.begin_bulk("5").unwrap() else {
            panic!("expected a fetch");
        };
        assert_eq!(tracker.complete_bulk(ticket, Ok(first_n(8))), Ok(5));
    }

    #[test]
    fn test_second_bulk_is_rejected_while_pending() {
        let mut tracker: PageSelectionTracker<Artwork> = PageSelectionTracker::new();
        let BulkStart::Fetch(ticket) = tracker.begin_bulk("10").unwrap() else {
            panic!("expected a fetch");
        };
        assert_eq!(
            tracker.begin_bulk("3"),
            Err(SelectionError::BulkInProgress)
        );
        // Invalid input is rejected too rather than clearing mid-flight
        assert_eq!(tracker.begin_bulk(""), Err(SelectionError::BulkInProgress));

        assert_eq!(tracker.complete_bulk(ticket, Ok(first_n(10))), Ok(10));
        assert!(tracker.begin_bulk("3").is_ok());
    }

    #[test]
    fn test_edits_queue_behind_pending_bulk() {
        let mut tracker = PageSelectionTracker::new();
        tracker.on_page_loaded(page(2, 10, 100));

        let BulkStart::Fetch(ticket) = tracker.begin_bulk("12").unwrap() else {
            panic!("expected a fetch");
        };
        // User checks 12 and 20 on page 2 while the fetch runs
        let chosen: Vec<RecordId> = vec![12, 20];
        assert_eq!(tracker.set_visible_selection(chosen), EditOutcome::Queued);
        assert_eq!(tracker.selection_count(), 0);
        assert_eq!(tracker.displayed_selected_ids(), vec![12, 20]);

        // and then moves on to page 3 before the fetch lands
        tracker.on_page_loaded(page(3, 10, 100));

        assert_eq!(tracker.complete_bulk(ticket, Ok(first_n(12))), Ok(13));
        // 11 came with the bulk and was never unchecked, so it stays
        assert_eq!(
            sorted(tracker.selected_ids()),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 20]
        );
    }

    #[test]
    fn test_queued_edits_replay_only_flipped_rows() {
        let mut tracker = PageSelectionTracker::new();
        tracker.on_page_loaded(page(1, 10, 100));
        tracker.set_visible_selection([3 as RecordId, 4]);

        let BulkStart::Fetch(ticket) = tracker.begin_bulk("6").unwrap() else {
            panic!("expected a fetch");
        };
        // Check 9, then uncheck it again, then uncheck 4
        tracker.set_visible_selection([3 as RecordId, 4, 9]);
        tracker.set_visible_selection([3 as RecordId, 4]);
        tracker.set_visible_selection([3 as RecordId]);
        assert_eq!(tracker.displayed_selected_ids(), vec![3]);

        assert_eq!(tracker.complete_bulk(ticket, Ok(first_n(6))), Ok(5));
        assert_eq!(sorted(tracker.selected_ids()), vec![1, 2, 3, 5, 6]);
        assert_eq!(tracker.displayed_selected_ids(), tracker.visible_selected_ids());
    }

    #[test]
    fn test_queued_clear_wins_over_bulk() {
        let mut tracker: PageSelectionTracker<Artwork> = PageSelectionTracker::new();
        let BulkStart::Fetch(ticket) = tracker.begin_bulk("7").unwrap() else {
            panic!("expected a fetch");
        };
        assert_eq!(tracker.clear(), EditOutcome::Queued);
        assert!(tracker.displayed_selected_ids().is_empty());
        assert_eq!(tracker.complete_bulk(ticket, Ok(first_n(7))), Ok(0));
    }

    #[test]
    fn test_queued_edits_apply_after_failed_bulk() {
        let mut tracker = PageSelectionTracker::new();
        tracker.on_page_loaded(page(1, 10, 100));
        tracker.set_visible_selection([1 as RecordId]);

        let BulkStart::Fetch(ticket) = tracker.begin_bulk("30").unwrap() else {
            panic!("expected a fetch");
        };
        tracker.set_visible_selection([1 as RecordId, 2]);
        let result = tracker.complete_bulk(ticket, Err::<Vec<RecordId>, _>(FetchError::Transport(
            "connection reset".to_string(),
        )));
        assert!(matches!(result, Err(SelectionError::Fetch(_))));
        assert_eq!(tracker.visible_selected_ids(), vec![1, 2]);
    }

    #[test]
    fn test_stale_ticket_is_rejected() {
        let mut tracker: PageSelectionTracker<Artwork> = PageSelectionTracker::new();
        let BulkStart::Fetch(old) = tracker.begin_bulk("4").unwrap() else {
            panic!("expected a fetch");
        };
        tracker.complete_bulk(old, Ok(first_n(4))).unwrap();

        let BulkStart::Fetch(current) = tracker.begin_bulk("2").unwrap() else {
            panic!("expected a fetch");
        };
        assert_eq!(
            tracker.complete_bulk(old, Ok(first_n(4))),
            Err(SelectionError::StaleTicket {
                generation: old.generation()
            })
        );
        // The pending operation survives the stale completion
        assert!(tracker.is_pending());
        assert_eq!(tracker.complete_bulk(current, Ok(first_n(2))), Ok(2));
    }

    #[test]
    fn test_abandon_bulk_replays_queue() {
        let mut tracker = PageSelectionTracker::new();
        tracker.on_page_loaded(page(1, 10, 100));
        assert!(!tracker.abandon_bulk());

        let BulkStart::Fetch(ticket) = tracker.begin_bulk("9").unwrap() else {
            panic!("expected a fetch");
        };
        tracker.set_visible_selection([6 as RecordId]);
        assert!(tracker.abandon_bulk());
        assert!(!tracker.is_pending());
        assert_eq!(tracker.visible_selected_ids(), vec![6]);
        assert!(matches!(
            tracker.complete_bulk(ticket, Ok(first_n(9))),
            Err(SelectionError::StaleTicket { .. })
        ));
    }

    #[test]
    fn test_parse_bulk_count() {
        assert_eq!(parse_bulk_count("15").map(NonZeroUsize::get), Some(15));
        assert_eq!(parse_bulk_count("  7\n").map(NonZeroUsize::get), Some(7));
        assert_eq!(parse_bulk_count(""), None);
        assert_eq!(parse_bulk_count("0"), None);
        assert_eq!(parse_bulk_count("-1"), None);
        assert_eq!(parse_bulk_count("twelve"), None);
    }

    #[test]
    fn test_parse_bulk_count_numeric_notations() {
        assert_eq!(parse_bulk_count("5.0").map(NonZeroUsize::get), Some(5));
        assert_eq!(parse_bulk_count("1e3").map(NonZeroUsize::get), Some(1000));
        assert_eq!(parse_bulk_count("+8").map(NonZeroUsize::get), Some(8));
        assert_eq!(parse_bulk_count("2.5"), None);
        assert_eq!(parse_bulk_count("0.0"), None);
        assert_eq!(parse_bulk_count("-1e3"), None);
        assert_eq!(parse_bulk_count("inf"), None);
        assert_eq!(parse_bulk_count("NaN"), None);
        assert_eq!(parse_bulk_count("1e400"), None);
    }

    #[test]
    fn test_parse_bulk_count_saturates_huge_integers() {
        let huge = "9".repeat(40);
        assert_eq!(parse_bulk_count(&huge).map(NonZeroUsize::get), Some(usize::MAX));
        assert_eq!(parse_bulk_count("1e30").map(NonZeroUsize::get), Some(usize::MAX));
        assert_eq!(parse_bulk_count(&"0".repeat(40)), None);
    }
}
