#![warn(missing_docs)]

//! # artworks-table
//!
//! A terminal table over the [Art Institute of Chicago](https://api.artic.edu/docs/)
//! artworks collection, fetched one page at a time, with row selection that
//! survives paging. Built on [bubbletea-rs](https://github.com/joshka/bubbletea-rs).
//!
//! ## Overview
//!
//! The collection is too large to hold in memory, so only the visible page is
//! kept. Selection is kept separately, as a set of record ids, by a
//! [`PageSelectionTracker`]. When a page arrives the tracker reports which of
//! its rows are selected; when the user edits the checkboxes the tracker
//! updates the ids of that page and leaves every other page alone.
//!
//! "Select the first N rows" replaces the selection with the first N records
//! of the whole collection, fetched from the source independently of the page
//! size being viewed.
//!
//! ## Components
//!
//! - **Selection**: [`selection`], [`sequence`]
//! - **Data**: [`artwork`], [`source`], [`client`], [`config`]
//! - **Widgets**: [`table`], [`paginator`], [`popbox`], [`key`]
//! - **Screen**: [`app`]
//!
//! ## Tracking a selection
//!
//! ```rust
//! use artworks_table::prelude::*;
//!
//! let mut tracker = PageSelectionTracker::new();
//!
//! tracker.on_page_loaded(Page::new(1, 10, (1..=10).map(Artwork::sample).collect(), 95));
//! tracker.set_visible_selection([3 as RecordId, 4]);
//!
//! tracker.on_page_loaded(Page::new(2, 10, (11..=20).map(Artwork::sample).collect(), 95));
//! assert!(tracker.visible_selection().is_empty());
//! assert_eq!(tracker.selection_count(), 2);
//! ```
//!
//! ## Integration with bubbletea-rs
//!
//! [`ArtworksTable`] is driven the way any bubbletea model is: feed it
//! messages, run the commands it returns and print its view.
//!
//! ```rust,no_run
//! use artworks_table::prelude::*;
//! use bubbletea_rs::{Cmd, Model, Msg};
//! use std::sync::Arc;
//!
//! struct App {
//!     table: ArtworksTable,
//! }
//!
//! impl Model for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let source = Arc::new(MemorySource::new((1..=50).map(Artwork::sample).collect()));
//!         let (table, cmd) = ArtworksTable::new(Config::default(), source);
//!         (Self { table }, Some(cmd))
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         self.table.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.table.view()
//!     }
//! }
//! ```

pub mod app;
pub mod artwork;
pub mod client;
pub mod config;
pub mod key;
pub mod paginator;
pub mod popbox;
pub mod selection;
pub mod sequence;
pub mod source;
pub mod table;

use bubbletea_rs::Cmd;

/// Components that can take and give up keyboard focus.
///
/// A focused component receives key presses ahead of the rest of the screen
/// and renders itself as active.
///
/// ```rust
/// use artworks_table::prelude::*;
///
/// let mut popbox = Popbox::new();
/// assert!(!popbox.focused());
///
/// popbox.focus();
/// assert!(popbox.focused());
///
/// popbox.blur();
/// assert!(!popbox.focused());
/// ```
pub trait Component {
    /// Gives the component focus. May return a command to run.
    fn focus(&mut self) -> Option<Cmd>;

    /// Takes focus away from the component.
    fn blur(&mut self);

    /// Returns true while the component has focus.
    fn focused(&self) -> bool;
}

pub use app::{ArtworksTable, BulkLoadedMsg, PageLoadedMsg};
pub use artwork::{Artwork, Identified, Page, RecordId};
pub use client::ArticClient;
pub use config::{Config, ConfigError};
pub use key::{new_binding, with_help, with_keys_str, Binding, KeyMap, KeyPress};
pub use paginator::Model as Paginator;
pub use popbox::{Model as Popbox, PopboxEvent};
pub use selection::{
    parse_bulk_count, BulkStart, BulkTicket, EditOutcome, PageSelectionTracker, SelectionError,
};
pub use sequence::{RequestSequence, RequestToken};
pub use source::{FetchError, MemorySource, PageSource};
pub use table::Model as Table;

/// Everything needed to build and drive the table, in one import.
///
/// ```rust
/// use artworks_table::prelude::*;
///
/// let config = Config::default();
/// assert!(config.validate().is_ok());
/// ```
pub mod prelude {
    pub use crate::app::{ArtworksTable, BulkLoadedMsg, PageLoadedMsg};
    pub use crate::artwork::{Artwork, Identified, Page, RecordId};
    pub use crate::client::ArticClient;
    pub use crate::config::{Config, ConfigError};
    pub use crate::key::{Binding, KeyMap};
    pub use crate::paginator::Model as Paginator;
    pub use crate::popbox::{Model as Popbox, PopboxEvent};
    pub use crate::selection::{
        parse_bulk_count, BulkStart, BulkTicket, EditOutcome, PageSelectionTracker,
        SelectionError,
    };
    pub use crate::sequence::{RequestSequence, RequestToken};
    pub use crate::source::{FetchError, MemorySource, PageSource};
    pub use crate::table::Model as Table;
    pub use crate::Component;
}
