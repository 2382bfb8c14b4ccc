//! The artworks table screen.
//!
//! [`ArtworksTable`] wires a [`PageSource`] to the checkbox table, the
//! paginator and the bulk-select popbox, with a [`PageSelectionTracker`]
//! holding the selection across pages. Fetches run as bubbletea commands and
//! come back as [`PageLoadedMsg`] and [`BulkLoadedMsg`]; page responses are
//! tagged with a [`RequestToken`] so only the latest request is ever applied.
//!
//! ```rust,no_run
//! use artworks_table::app::ArtworksTable;
//! use artworks_table::artwork::Artwork;
//! use artworks_table::config::Config;
//! use artworks_table::source::{MemorySource, PageSource};
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let source: Arc<dyn PageSource<Record = Artwork>> =
//!     Arc::new(MemorySource::new((1..=42).map(Artwork::sample).collect()));
//! let (mut app, first_page) = ArtworksTable::new(Config::default(), source);
//!
//! if let Some(msg) = first_page.await {
//!     app.update(msg);
//! }
//! assert_eq!(app.tracker().current_page().map(|p| p.number), Some(1));
//! # }
//! ```

use crate::artwork::{Artwork, Page, RecordId};
use crate::config::Config;
use crate::key::{self, KeyMap as KeyMapTrait};
use crate::paginator;
use crate::popbox::{self, PopboxEvent};
use crate::selection::{BulkStart, BulkTicket, EditOutcome, PageSelectionTracker, SelectionError};
use crate::sequence::{RequestSequence, RequestToken};
use crate::source::{FetchError, PageSource};
use crate::table::{self, Row, SelectionEdited};
use crate::Component;
use bubbletea_rs::{Cmd, KeyMsg, Msg};
use lipgloss_extras::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A page fetch finished.
#[derive(Debug)]
pub struct PageLoadedMsg {
    /// Token issued when the request was made.
    pub token: RequestToken,
    /// Requested 1-based page.
    pub page_number: usize,
    /// Requested page size.
    pub page_size: usize,
    /// The page, or why it could not be fetched.
    pub result: Result<Page<Artwork>, FetchError>,
}

/// A bulk "first N" fetch finished.
#[derive(Debug)]
pub struct BulkLoadedMsg {
    /// Ticket of the bulk selection the records belong to.
    pub ticket: BulkTicket,
    /// The records, or why they could not be fetched.
    pub result: Result<Vec<Artwork>, FetchError>,
}

/// Screen-level key bindings.
#[derive(Debug, Clone)]
pub struct AppKeyMap {
    /// Open the bulk-select popbox.
    pub bulk_select: key::Binding,
    /// Clear the whole selection.
    pub clear: key::Binding,
    /// Fetch the last requested page again.
    pub retry: key::Binding,
    /// Next page size option.
    pub grow_page: key::Binding,
    /// Previous page size option.
    pub shrink_page: key::Binding,
    /// Abandon a pending bulk selection.
    pub cancel_bulk: key::Binding,
    /// Leave the program.
    pub quit: key::Binding,
}

impl Default for AppKeyMap {
    fn default() -> Self {
        Self {
            bulk_select: key::new_binding(vec![
                key::with_keys_str(&["s"]),
                key::with_help("s", "select first n"),
            ]),
            clear: key::new_binding(vec![
                key::with_keys_str(&["c"]),
                key::with_help("c", "clear"),
            ]),
            retry: key::new_binding(vec![
                key::with_keys_str(&["r"]),
                key::with_help("r", "retry"),
            ]),
            grow_page: key::new_binding(vec![
                key::with_keys_str(&["]"]),
                key::with_help("[/]", "rows per page"),
            ]),
            shrink_page: key::new_binding(vec![key::with_keys_str(&["["])]),
            cancel_bulk: key::new_binding(vec![
                key::with_keys_str(&["esc"]),
                key::with_help("esc", "cancel bulk"),
            ]),
            quit: key::new_binding(vec![
                key::with_keys_str(&["q", "ctrl+c"]),
                key::with_help("q", "quit"),
            ]),
        }
    }
}

impl KeyMapTrait for AppKeyMap {
    fn short_help(&self) -> Vec<&key::Binding> {
        vec![
            &self.bulk_select,
            &self.clear,
            &self.grow_page,
            &self.retry,
            &self.quit,
        ]
    }

    fn full_help(&self) -> Vec<Vec<&key::Binding>> {
        vec![self.short_help()]
    }
}

/// The paginated artworks table with cross-page selection.
pub struct ArtworksTable {
    config: Config,
    source: Arc<dyn PageSource<Record = Artwork>>,
    tracker: PageSelectionTracker<Artwork>,
    requests: RequestSequence,
    last_request: (usize, usize),
    bulk: Option<BulkTicket>,
    error: Option<String>,
    /// Checkbox table.
    pub table: table::Model,
    /// Page controls.
    pub paginator: paginator::Model,
    /// Bulk-select prompt.
    pub popbox: popbox::Model,
    /// Screen-level bindings.
    pub keymap: AppKeyMap,
    /// Style of the title line.
    pub title_style: Style,
    /// Style of the error line.
    pub error_style: Style,
    /// Style of the help line.
    pub help_style: Style,
}

impl ArtworksTable {
    /// Creates the screen and the command fetching page 1.
    pub fn new(config: Config, source: Arc<dyn PageSource<Record = Artwork>>) -> (Self, Cmd) {
        let paginator = paginator::Model::new()
            .with_per_page(config.page_size)
            .with_link_size(config.page_link_size);
        let mut app = Self {
            last_request: (1, config.page_size),
            config,
            source,
            tracker: PageSelectionTracker::new(),
            requests: RequestSequence::new(),
            bulk: None,
            error: None,
            table: table::Model::new(table::artwork_columns()),
            paginator,
            popbox: popbox::Model::new(),
            keymap: AppKeyMap::default(),
            title_style: Style::new().bold(true).foreground(Color::from("212")),
            error_style: Style::new().foreground(Color::from("196")),
            help_style: Style::new().foreground(Color::from("241")),
        };
        let page_size = app.config.page_size;
        let cmd = app.request_page(1, page_size);
        (app, cmd)
    }

    /// The selection tracker.
    pub fn tracker(&self) -> &PageSelectionTracker<Artwork> {
        &self.tracker
    }

    /// The configuration the screen was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Selected records across all pages.
    pub fn selection_count(&self) -> usize {
        self.tracker.selection_count()
    }

    /// The message shown on the error line, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns true while a page fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.table.loading()
    }

    /// Requests a page. The returned command resolves to a [`PageLoadedMsg`];
    /// responses to anything but the latest request are dropped when they
    /// arrive.
    pub fn request_page(&mut self, page_number: usize, page_size: usize) -> Cmd {
        let token = self.requests.issue();
        self.last_request = (page_number, page_size);
        self.table.set_loading(true);
        debug!(
            token = token.value(),
            page = page_number,
            size = page_size,
            source = self.source.source_name(),
            "requesting page"
        );

        let source = Arc::clone(&self.source);
        Box::pin(async move {
            let result = source.fetch_page(page_number, page_size).await;
            Some(Box::new(PageLoadedMsg {
                token,
                page_number,
                page_size,
                result,
            }) as Msg)
        })
    }

    /// Applies the user's checkbox state for the visible page.
    ///
    /// While a bulk selection is pending the edit is queued and applied after
    /// it lands.
    pub fn edit_visible_selection<I>(&mut self, ids: I) -> EditOutcome
    where
        I: IntoIterator<Item = RecordId>,
    {
        let outcome = self.tracker.set_visible_selection(ids);
        if outcome == EditOutcome::Applied {
            self.sync_checks();
        }
        outcome
    }

    /// Starts "select the first N rows" from the popbox text.
    ///
    /// Text that is not a positive count clears the selection and returns
    /// `None`, as does a request made while another one is pending (which
    /// also sets the error line). Otherwise the returned command resolves to a
    /// [`BulkLoadedMsg`].
    pub fn request_bulk_select(&mut self, raw: &str) -> Option<Cmd> {
        match self.tracker.begin_bulk(raw) {
            Ok(BulkStart::Cleared) => {
                self.sync_checks();
                None
            }
            Ok(BulkStart::Fetch(ticket)) => {
                self.bulk = Some(ticket);
                self.error = None;
                let source = Arc::clone(&self.source);
                Some(Box::pin(async move {
                    let result = source.fetch_first_n(ticket.count()).await;
                    Some(Box::new(BulkLoadedMsg { ticket, result }) as Msg)
                }))
            }
            Err(err) => {
                warn!(error = %err, "bulk selection rejected");
                self.error = Some(err.to_string());
                None
            }
        }
    }

    /// Clears the selection, or queues the clear behind a pending bulk selection.
    pub fn clear_selection(&mut self) -> EditOutcome {
        let outcome = self.tracker.clear();
        if outcome == EditOutcome::Applied {
            self.sync_checks();
        }
        outcome
    }

    /// Moves to a new page size, keeping the selection and going back to page 1.
    pub fn change_page_size(&mut self, page_size: usize) -> Cmd {
        self.paginator.set_per_page(page_size);
        self.paginator.go_to(0);
        self.request_page(1, page_size)
    }

    fn on_page_loaded(&mut self, loaded: PageLoadedMsg) {
        if !self.requests.is_current(loaded.token) {
            warn!(
                token = loaded.token.value(),
                latest = self.requests.latest().map(RequestToken::value),
                page = loaded.page_number,
                "dropping stale page response"
            );
            return;
        }
        self.table.set_loading(false);

        match loaded.result {
            Ok(page) => {
                self.error = None;
                self.paginator.set_per_page(page.size);
                self.paginator.set_total_items(page.total_count);
                if page.is_empty() && page.number > self.paginator.total_pages {
                    // Past the end, usually because the collection shrank:
                    // keep showing the current page under the new totals.
                    debug!(
                        page = page.number,
                        total_pages = self.paginator.total_pages,
                        "requested page is past the end"
                    );
                    self.restore_paginator();
                    return;
                }
                self.paginator.go_to(page.number.saturating_sub(1));
                self.table
                    .set_rows(page.records.iter().map(Row::from).collect());
                self.tracker.on_page_loaded(page);
                self.sync_checks();
            }
            Err(err) => {
                warn!(
                    error = %err,
                    page = loaded.page_number,
                    size = loaded.page_size,
                    "page fetch failed"
                );
                self.error = Some(format!("Could not load page {}: {}", loaded.page_number, err));
                self.restore_paginator();
            }
        }
    }

    fn on_bulk_loaded(&mut self, loaded: BulkLoadedMsg) {
        let ticket = loaded.ticket;
        match self.tracker.complete_bulk(ticket, loaded.result) {
            Ok(count) => {
                info!(requested = ticket.count(), selected = count, "bulk selection applied");
                self.error = None;
            }
            Err(SelectionError::StaleTicket { generation }) => {
                warn!(generation, "dropping stale bulk response");
                return;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
        if self.bulk == Some(ticket) {
            self.bulk = None;
        }
        self.sync_checks();
    }

    // A failed fetch leaves the visible page in place, so the page controls
    // go back to it.
    fn restore_paginator(&mut self) {
        if let Some(page) = self.tracker.current_page() {
            self.paginator.set_per_page(page.size);
            self.paginator.go_to(page.number.saturating_sub(1));
        }
    }

    fn sync_checks(&mut self) {
        self.table.set_checked(self.tracker.displayed_selected_ids());
    }

    /// Gives up on the pending bulk selection. Its result is dropped when it
    /// arrives; edits queued behind it are applied now.
    pub fn cancel_bulk_select(&mut self) -> bool {
        if !self.tracker.abandon_bulk() {
            return false;
        }
        if let Some(ticket) = self.bulk.take() {
            info!(requested = ticket.count(), "bulk selection cancelled");
        }
        self.sync_checks();
        true
    }

    fn handle_key(&mut self, msg: &Msg) -> Option<Cmd> {
        let key_msg = msg.downcast_ref::<KeyMsg>()?;
        if self.popbox.focused() {
            return match self.popbox.update(msg)? {
                PopboxEvent::Submitted(raw) => self.request_bulk_select(&raw),
                PopboxEvent::Dismissed => None,
            };
        }

        if self.keymap.quit.matches(key_msg) {
            return Some(bubbletea_rs::quit());
        }
        if self.keymap.bulk_select.matches(key_msg) {
            return self.popbox.focus();
        }
        if self.keymap.cancel_bulk.matches(key_msg) {
            self.cancel_bulk_select();
            return None;
        }
        if self.keymap.clear.matches(key_msg) {
            self.clear_selection();
            return None;
        }
        if self.keymap.retry.matches(key_msg) {
            let (page_number, page_size) = self.last_request;
            return Some(self.request_page(page_number, page_size));
        }
        if key::matches(key_msg, &[&self.keymap.grow_page, &self.keymap.shrink_page]) {
            let current = self.paginator.per_page;
            let size = if self.keymap.grow_page.matches(key_msg) {
                self.config.next_page_size(current)
            } else {
                self.config.prev_page_size(current)
            };
            return Some(self.change_page_size(size));
        }

        if self.paginator.update(msg) {
            let (page_number, page_size) = (self.paginator.page_number(), self.paginator.per_page);
            return Some(self.request_page(page_number, page_size));
        }

        if let Some(SelectionEdited(ids)) = self.table.update(msg) {
            if self.edit_visible_selection(ids) == EditOutcome::Queued {
                debug!("selection edit queued behind bulk selection");
            }
        }
        None
    }

    /// Routes fetch results and key presses.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        let msg = match msg.downcast::<PageLoadedMsg>() {
            Ok(loaded) => {
                self.on_page_loaded(*loaded);
                return None;
            }
            Err(msg) => msg,
        };
        let msg = match msg.downcast::<BulkLoadedMsg>() {
            Ok(loaded) => {
                self.on_bulk_loaded(*loaded);
                return None;
            }
            Err(msg) => msg,
        };

        self.handle_key(&msg)
    }

    /// `Selected: N rows`, plus the pending bulk selection if there is one.
    pub fn status_line(&self) -> String {
        let mut status = format!("Selected: {} rows", self.tracker.selection_count());
        if let Some(ticket) = self.bulk {
            status.push_str(&format!("  Selecting first {} rows…", ticket.count()));
        }
        status
    }

    /// Renders the screen.
    pub fn view(&self) -> String {
        let mut sections = vec![
            self.title_style
                .clone()
                .render(&format!("Artworks · {}", self.source.source_name())),
            self.status_line(),
        ];
        if self.popbox.is_open() {
            sections.push(self.popbox.view());
        }
        sections.push(self.table.view());
        sections.push(self.paginator.view());
        if let Some(error) = &self.error {
            sections.push(self.error_style.clone().render(error));
        }

        let mut help = self.table.keymap.short_help();
        help.extend(self.paginator.keymap.short_help());
        help.extend(self.keymap.short_help());
        sections.push(self.help_style.clone().render(&key::short_help_view(&help)));

        sections.join("\n")
    }
}
