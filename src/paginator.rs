//! A paginator component for lazily loaded, server-paginated collections.
//!
//! The paginator does not hold any records. It tracks which page is showing,
//! how many records there are in total, and renders the pagination control:
//!
//! ```text
//! Showing 11 to 20 of 95 entries  Previous 1 [2] 3 4 5 Next
//! ```
//!
//! Pages are 0-indexed internally; [`Model::page_number`] gives the 1-based
//! number that page sources expect.

use crate::key::{self, KeyMap as KeyMapTrait};
use bubbletea_rs::{KeyMsg, Msg};
use lipgloss_extras::prelude::*;

/// Key bindings for paginator navigation.
///
/// # Examples
///
/// ```rust
/// use artworks_table::paginator::PaginatorKeyMap;
/// use artworks_table::key::KeyMap;
///
/// let keymap = PaginatorKeyMap::default();
/// assert_eq!(keymap.short_help().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct PaginatorKeyMap {
    /// Previous page. Default keys: PageUp, Left Arrow, 'h'.
    pub prev_page: key::Binding,
    /// Next page. Default keys: PageDown, Right Arrow, 'l'.
    pub next_page: key::Binding,
    /// First page. Default keys: Home, 'g'.
    pub first_page: key::Binding,
    /// Last page. Default keys: End, 'G'.
    pub last_page: key::Binding,
}

impl Default for PaginatorKeyMap {
    fn default() -> Self {
        Self {
            prev_page: key::new_binding(vec![
                key::with_keys_str(&["pgup", "left", "h"]),
                key::with_help("←/h", "prev page"),
            ]),
            next_page: key::new_binding(vec![
                key::with_keys_str(&["pgdown", "right", "l"]),
                key::with_help("→/l", "next page"),
            ]),
            first_page: key::new_binding(vec![
                key::with_keys_str(&["home", "g"]),
                key::with_help("g/home", "first page"),
            ]),
            last_page: key::new_binding(vec![
                key::with_keys_str(&["end", "G"]),
                key::with_help("G/end", "last page"),
            ]),
        }
    }
}

impl KeyMapTrait for PaginatorKeyMap {
    fn short_help(&self) -> Vec<&key::Binding> {
        vec![&self.prev_page, &self.next_page]
    }

    fn full_help(&self) -> Vec<Vec<&key::Binding>> {
        vec![vec![
            &self.prev_page,
            &self.next_page,
            &self.first_page,
            &self.last_page,
        ]]
    }
}

/// Paginator state and rendering.
///
/// # Examples
///
/// ```rust
/// use artworks_table::paginator::Model;
///
/// let mut paginator = Model::new()
///     .with_per_page(10)
///     .with_total_items(95); // 10 pages, the last one holding 5 records
///
/// assert_eq!(paginator.total_pages, 10);
/// assert_eq!(paginator.page_number(), 1);
///
/// paginator.next_page();
/// assert_eq!(paginator.page_number(), 2);
/// assert_eq!(paginator.current_page_report(), "Showing 11 to 20 of 95 entries");
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    /// The current page, 0-indexed.
    pub page: usize,
    /// Records per page.
    pub per_page: usize,
    /// Records in the whole collection.
    pub total_items: usize,
    /// Number of pages, at least 1.
    pub total_pages: usize,
    /// How many numbered page links to show at most.
    pub link_size: usize,
    /// Style of the current page link.
    pub active_style: Style,
    /// Style of the other page links and the Previous/Next controls.
    pub link_style: Style,
    /// Style of Previous/Next when they cannot be used.
    pub disabled_style: Style,
    /// Key bindings.
    pub keymap: PaginatorKeyMap,
}

impl Default for Model {
    /// A single empty page of one record, five links.
    fn default() -> Self {
        Self {
            page: 0,
            per_page: 1,
            total_items: 0,
            total_pages: 1,
            link_size: 5,
            active_style: Style::new().bold(true).foreground(Color::from("212")),
            link_style: Style::new(),
            disabled_style: Style::new().foreground(Color::from("240")),
            keymap: PaginatorKeyMap::default(),
        }
    }
}

impl Model {
    /// Creates a paginator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total record count (builder pattern).
    pub fn with_total_items(mut self, items: usize) -> Self {
        self.set_total_items(items);
        self
    }

    /// Sets records per page (builder pattern). Values below 1 are clamped to 1.
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.set_per_page(per_page);
        self
    }

    /// Sets the number of page links (builder pattern). Values below 1 are
    /// clamped to 1.
    pub fn with_link_size(mut self, links: usize) -> Self {
        self.link_size = links.max(1);
        self
    }

    /// Sets records per page, recomputing the page count.
    ///
    /// The current page is kept if it still exists, otherwise it moves to the
    /// last page.
    ///
    /// ```rust
    /// use artworks_table::paginator::Model;
    ///
    /// let mut paginator = Model::new().with_per_page(10).with_total_items(100);
    /// paginator.page = 9;
    /// paginator.set_per_page(50);
    /// assert_eq!(paginator.total_pages, 2);
    /// assert_eq!(paginator.page, 1);
    /// ```
    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
        self.recompute_pages();
    }

    /// Sets the total record count, recomputing the page count.
    ///
    /// Zero records still make one (empty) page.
    pub fn set_total_items(&mut self, items: usize) {
        self.total_items = items;
        self.recompute_pages();
    }

    fn recompute_pages(&mut self) {
        self.total_pages = if self.total_items == 0 {
            1
        } else {
            self.total_items.div_ceil(self.per_page)
        };
        if self.page >= self.total_pages {
            self.page = self.total_pages.saturating_sub(1);
        }
    }

    /// The current page as a 1-based number.
    pub fn page_number(&self) -> usize {
        self.page + 1
    }

    /// Moves to the 0-indexed `page`, clamped to the last page.
    pub fn go_to(&mut self, page: usize) {
        self.page = page.min(self.total_pages.saturating_sub(1));
    }

    /// Moves back one page; no effect on the first page.
    pub fn prev_page(&mut self) {
        if self.page > 0 {
            self.page -= 1;
        }
    }

    /// Moves forward one page; no effect on the last page.
    pub fn next_page(&mut self) {
        if !self.on_last_page() {
            self.page += 1;
        }
    }

    /// Returns true on the first page.
    pub fn on_first_page(&self) -> bool {
        self.page == 0
    }

    /// Returns true on the last page.
    pub fn on_last_page(&self) -> bool {
        self.page == self.total_pages.saturating_sub(1)
    }

    /// 1-based positions of the first and last record on the current page,
    /// `(0, 0)` when there are no records.
    pub fn visible_range(&self) -> (usize, usize) {
        if self.total_items == 0 {
            return (0, 0);
        }
        let first = self.page * self.per_page + 1;
        let last = ((self.page + 1) * self.per_page).min(self.total_items);
        (first.min(last), last)
    }

    /// `Showing {first} to {last} of {total} entries`.
    pub fn current_page_report(&self) -> String {
        let (first, last) = self.visible_range();
        format!(
            "Showing {} to {} of {} entries",
            first, last, self.total_items
        )
    }

    /// 0-indexed pages that get a numbered link, centred on the current page.
    ///
    /// ```rust
    /// use artworks_table::paginator::Model;
    ///
    /// let mut paginator = Model::new().with_per_page(10).with_total_items(200);
    /// paginator.page = 9;
    /// assert_eq!(paginator.page_links(), vec![7, 8, 9, 10, 11]);
    ///
    /// paginator.page = 19;
    /// assert_eq!(paginator.page_links(), vec![15, 16, 17, 18, 19]);
    /// ```
    pub fn page_links(&self) -> Vec<usize> {
        let visible = self.link_size.max(1).min(self.total_pages);
        let mut start = self.page.saturating_sub(visible / 2);
        let end = (start + visible - 1).min(self.total_pages - 1);
        let missing = visible - (end - start + 1);
        start = start.saturating_sub(missing);
        (start..=end).collect()
    }

    /// Handles navigation keys. Returns true if the page changed, in which case
    /// the caller should fetch the new page.
    pub fn update(&mut self, msg: &Msg) -> bool {
        let Some(key_msg) = msg.downcast_ref::<KeyMsg>() else {
            return false;
        };
        let before = self.page;
        if self.keymap.next_page.matches(key_msg) {
            self.next_page();
        } else if self.keymap.prev_page.matches(key_msg) {
            self.prev_page();
        } else if self.keymap.first_page.matches(key_msg) {
            self.go_to(0);
        } else if self.keymap.last_page.matches(key_msg) {
            self.go_to(self.total_pages.saturating_sub(1));
        }
        self.page != before
    }

    /// Renders the report followed by Previous, the page links and Next.
    pub fn view(&self) -> String {
        let control = |label: &str, disabled: bool| {
            if disabled {
                self.disabled_style.clone().render(label)
            } else {
                self.link_style.clone().render(label)
            }
        };

        let mut parts = vec![control("Previous", self.on_first_page())];
        for page in self.page_links() {
            let label = (page + 1).to_string();
            if page == self.page {
                parts.push(self.active_style.clone().render(&format!("[{}]", label)));
            } else {
                parts.push(self.link_style.clone().render(&label));
            }
        }
        parts.push(control("Next", self.on_last_page()));

        format!("{}  {}", self.current_page_report(), parts.join(" "))
    }
}
