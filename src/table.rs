//! A selectable table for one page of records.
//!
//! Rows are keyed by [`RecordId`] and carry a checkbox. The table only knows
//! about the page it shows: every checkbox edit is reported as a
//! [`SelectionEdited`] holding the complete post-edit selection of the visible
//! rows, which the caller hands to the cross-page tracker.

use crate::artwork::{Artwork, RecordId};
use crate::key::{self, KeyMap as KeyMapTrait};
use bubbletea_rs::{KeyMsg, Msg};
use lipgloss_extras::prelude::*;
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const ELLIPSIS: &str = "…";
const COLUMN_SEPARATOR: &str = " │ ";

/// A column header with an optional fixed width.
#[derive(Debug, Clone)]
pub struct Column {
    /// Header text.
    pub title: String,
    /// Display width; defaults to the title's width.
    pub width: Option<usize>,
}

impl Column {
    /// Creates a column sized to its title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: None,
        }
    }

    /// Sets a fixed display width.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Width the column renders at.
    pub fn display_width(&self) -> usize {
        self.width
            .unwrap_or_else(|| UnicodeWidthStr::width(self.title.as_str()))
    }
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Record the row shows.
    pub id: RecordId,
    /// Cell text, one per column.
    pub cells: Vec<String>,
}

impl Row {
    /// Creates a row.
    pub fn new(id: RecordId, cells: Vec<String>) -> Self {
        Self { id, cells }
    }
}

impl From<&Artwork> for Row {
    fn from(artwork: &Artwork) -> Self {
        Self::new(artwork.id, artwork.cells())
    }
}

/// Columns for [`Artwork`] rows.
pub fn artwork_columns() -> Vec<Column> {
    const WIDTHS: [usize; 6] = [28, 16, 26, 20, 10, 8];
    Artwork::COLUMN_TITLES
        .iter()
        .zip(WIDTHS)
        .map(|(title, width)| Column::new(*title).with_width(width))
        .collect()
}

/// The complete selection of the visible rows after an edit, in row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEdited(pub Vec<RecordId>);

/// Key bindings for the table.
#[derive(Debug, Clone)]
pub struct TableKeyMap {
    /// Move the cursor up.
    pub cursor_up: key::Binding,
    /// Move the cursor down.
    pub cursor_down: key::Binding,
    /// Check or uncheck the row under the cursor.
    pub toggle_row: key::Binding,
    /// Check every visible row, or uncheck them all if they already are.
    pub toggle_all: key::Binding,
}

impl Default for TableKeyMap {
    fn default() -> Self {
        Self {
            cursor_up: key::new_binding(vec![
                key::with_keys_str(&["up", "k"]),
                key::with_help("↑/k", "up"),
            ]),
            cursor_down: key::new_binding(vec![
                key::with_keys_str(&["down", "j"]),
                key::with_help("↓/j", "down"),
            ]),
            toggle_row: key::new_binding(vec![
                key::with_keys_str(&["space", "x"]),
                key::with_help("space", "select row"),
            ]),
            toggle_all: key::new_binding(vec![
                key::with_keys_str(&["a"]),
                key::with_help("a", "select page"),
            ]),
        }
    }
}

impl KeyMapTrait for TableKeyMap {
    fn short_help(&self) -> Vec<&key::Binding> {
        vec![&self.toggle_row, &self.toggle_all]
    }

    fn full_help(&self) -> Vec<Vec<&key::Binding>> {
        vec![
            vec![&self.cursor_up, &self.cursor_down],
            vec![&self.toggle_row, &self.toggle_all],
        ]
    }
}

/// Styles used by [`Model::view`].
#[derive(Debug, Clone)]
pub struct TableStyles {
    /// Header row.
    pub header: Style,
    /// Row under the cursor.
    pub cursor_row: Style,
    /// Checked rows.
    pub checked_row: Style,
    /// Loading and empty-page notices.
    pub notice: Style,
}

impl Default for TableStyles {
    fn default() -> Self {
        Self {
            header: Style::new().bold(true),
            cursor_row: Style::new().foreground(Color::from("212")),
            checked_row: Style::new().foreground(Color::from("86")),
            notice: Style::new().foreground(Color::from("241")).italic(true),
        }
    }
}

/// The table model.
///
/// # Examples
///
/// ```rust
/// use artworks_table::table::{Column, Model, Row, SelectionEdited};
///
/// let mut table = Model::new(vec![Column::new("Title").with_width(12)]);
/// table.set_rows(vec![
///     Row::new(1, vec!["Nighthawks".into()]),
///     Row::new(2, vec!["The Bedroom".into()]),
/// ]);
/// table.set_checked([2]);
///
/// assert_eq!(table.toggle_cursor_row(), Some(SelectionEdited(vec![1, 2])));
/// assert_eq!(table.toggle_all(), Some(SelectionEdited(vec![])));
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    columns: Vec<Column>,
    rows: Vec<Row>,
    cursor: usize,
    checked: HashSet<RecordId>,
    loading: bool,
    /// Key bindings.
    pub keymap: TableKeyMap,
    /// Styles.
    pub styles: TableStyles,
}

impl Model {
    /// Creates an empty table.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            cursor: 0,
            checked: HashSet::new(),
            loading: false,
            keymap: TableKeyMap::default(),
            styles: TableStyles::default(),
        }
    }

    /// Sets the rows (builder pattern).
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.set_rows(rows);
        self
    }

    /// Replaces the rows with a new page. The cursor returns to the top and
    /// checkmarks for rows that are gone are dropped.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.cursor = 0;
        let ids: HashSet<RecordId> = self.rows.iter().map(|r| r.id).collect();
        self.checked.retain(|id| ids.contains(id));
    }

    /// The rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Checks exactly the given rows. Ids that are not visible are ignored.
    pub fn set_checked<I: IntoIterator<Item = RecordId>>(&mut self, ids: I) {
        let visible: HashSet<RecordId> = self.rows.iter().map(|r| r.id).collect();
        self.checked = ids.into_iter().filter(|id| visible.contains(id)).collect();
    }

    /// Checked row ids, in row order.
    pub fn checked_ids(&self) -> Vec<RecordId> {
        self.rows
            .iter()
            .map(|r| r.id)
            .filter(|id| self.checked.contains(id))
            .collect()
    }

    /// Returns true if the row `id` is checked.
    pub fn is_checked(&self, id: RecordId) -> bool {
        self.checked.contains(&id)
    }

    /// Shows or hides the loading notice.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Returns true while the loading notice is shown.
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Index of the row under the cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The row under the cursor.
    pub fn cursor_row(&self) -> Option<&Row> {
        self.rows.get(self.cursor)
    }

    /// Moves the cursor down, wrapping to the top.
    pub fn select_next(&mut self) {
        if !self.rows.is_empty() {
            self.cursor = (self.cursor + 1) % self.rows.len();
        }
    }

    /// Moves the cursor up, wrapping to the bottom.
    pub fn select_prev(&mut self) {
        if !self.rows.is_empty() {
            self.cursor = if self.cursor == 0 {
                self.rows.len() - 1
            } else {
                self.cursor - 1
            };
        }
    }

    /// Flips the checkbox under the cursor.
    pub fn toggle_cursor_row(&mut self) -> Option<SelectionEdited> {
        let id = self.cursor_row()?.id;
        if !self.checked.remove(&id) {
            self.checked.insert(id);
        }
        Some(SelectionEdited(self.checked_ids()))
    }

    /// Checks every visible row, or unchecks all of them when they already are.
    pub fn toggle_all(&mut self) -> Option<SelectionEdited> {
        if self.rows.is_empty() {
            return None;
        }
        if self.all_checked() {
            self.checked.clear();
        } else {
            self.checked = self.rows.iter().map(|r| r.id).collect();
        }
        Some(SelectionEdited(self.checked_ids()))
    }

    fn all_checked(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|r| self.checked.contains(&r.id))
    }

    /// Handles cursor and checkbox keys. Returns the new page selection when a
    /// checkbox changed.
    pub fn update(&mut self, msg: &Msg) -> Option<SelectionEdited> {
        let key_msg = msg.downcast_ref::<KeyMsg>()?;
        if self.keymap.cursor_down.matches(key_msg) {
            self.select_next();
        } else if self.keymap.cursor_up.matches(key_msg) {
            self.select_prev();
        } else if self.keymap.toggle_row.matches(key_msg) {
            return self.toggle_cursor_row();
        } else if self.keymap.toggle_all.matches(key_msg) {
            return self.toggle_all();
        }
        None
    }

    fn header_checkbox(&self) -> &'static str {
        if self.all_checked() {
            "[x]"
        } else if self.checked.is_empty() {
            "[ ]"
        } else {
            "[-]"
        }
    }

    fn render_cells(&self, cells: &[String]) -> String {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                fit(cell, column.display_width())
            })
            .collect::<Vec<_>>()
            .join(COLUMN_SEPARATOR)
    }

    /// Renders the header, a separator and one line per row.
    pub fn view(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 3);

        let titles: Vec<String> = self.columns.iter().map(|c| c.title.clone()).collect();
        let header = format!("  {} {}", self.header_checkbox(), self.render_cells(&titles));
        lines.push(self.styles.header.clone().render(&header));

        let rule = self
            .columns
            .iter()
            .map(|c| "─".repeat(c.display_width()))
            .collect::<Vec<_>>()
            .join("─┼─");
        lines.push(format!("──────{}", rule));

        if self.loading {
            lines.push(self.styles.notice.clone().render("  Loading…"));
        } else if self.rows.is_empty() {
            lines.push(self.styles.notice.clone().render("  No records found."));
        }

        for (index, row) in self.rows.iter().enumerate() {
            let checked = self.checked.contains(&row.id);
            let line = format!(
                "{} {} {}",
                if index == self.cursor { ">" } else { " " },
                if checked { "[x]" } else { "[ ]" },
                self.render_cells(&row.cells)
            );
            let line = if index == self.cursor {
                self.styles.cursor_row.clone().render(&line)
            } else if checked {
                self.styles.checked_row.clone().render(&line)
            } else {
                line
            };
            lines.push(line);
        }

        lines.join("\n")
    }
}

/// Pads or truncates `text` to exactly `width` display columns.
///
/// Line breaks become spaces; truncated text ends in an ellipsis.
///
/// ```rust
/// use artworks_table::table::fit;
///
/// assert_eq!(fit("Monet", 8), "Monet   ");
/// assert_eq!(fit("Water Lilies", 8), "Water L…");
/// ```
pub fn fit(text: &str, width: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let full = UnicodeWidthStr::width(flat.as_str());
    if full <= width {
        return format!("{}{}", flat, " ".repeat(width - full));
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for grapheme in flat.graphemes(true) {
        let w = UnicodeWidthStr::width(grapheme);
        if used + w > width - 1 {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    out.push_str(ELLIPSIS);
    used += 1;
    format!("{}{}", out, " ".repeat(width.saturating_sub(used)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(code: KeyCode) -> Msg {
        Box::new(KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        }) as Msg
    }

    fn plain(s: &str) -> String {
        strip_ansi_escapes::strip_str(s)
    }

    fn table() -> Model {
        Model::new(vec![Column::new("Title").with_width(10)]).with_rows(vec![
            Row::new(11, vec!["Nighthawks".to_string()]),
            Row::new(12, vec!["American Gothic".to_string()]),
            Row::new(13, vec!["The Bedroom".to_string()]),
        ])
    }

    #[test]
    fn test_cursor_wraps() {
        let mut table = table();
        assert_eq!(table.cursor(), 0);
        table.select_prev();
        assert_eq!(table.cursor(), 2);
        table.select_next();
        assert_eq!(table.cursor(), 0);
        assert_eq!(table.cursor_row().map(|r| r.id), Some(11));
    }

    #[test]
    fn test_toggle_reports_whole_page_selection() {
        let mut table = table();
        table.set_checked([13]);
        assert_eq!(
            table.update(&key(KeyCode::Char(' '))),
            Some(SelectionEdited(vec![11, 13]))
        );
        table.update(&key(KeyCode::Down));
        table.update(&key(KeyCode::Down));
        assert_eq!(
            table.update(&key(KeyCode::Char('x'))),
            Some(SelectionEdited(vec![11]))
        );
    }

    #[test]
    fn test_toggle_all() {
        let mut table = table();
        table.set_checked([12]);
        assert_eq!(
            table.update(&key(KeyCode::Char('a'))),
            Some(SelectionEdited(vec![11, 12, 13]))
        );
        assert_eq!(
            table.update(&key(KeyCode::Char('a'))),
            Some(SelectionEdited(vec![]))
        );
    }

    #[test]
    fn test_navigation_keys_do_not_edit() {
        let mut table = table();
        assert_eq!(table.update(&key(KeyCode::Down)), None);
        assert_eq!(table.update(&key(KeyCode::Char('k'))), None);
        assert_eq!(table.cursor(), 0);
    }

    #[test]
    fn test_empty_table_has_nothing_to_toggle() {
        let mut table = Model::new(artwork_columns());
        assert_eq!(table.toggle_cursor_row(), None);
        assert_eq!(table.toggle_all(), None);
    }

    #[test]
    fn test_set_checked_ignores_hidden_rows() {
        let mut table = table();
        table.set_checked([12, 99]);
        assert_eq!(table.checked_ids(), vec![12]);
        assert!(!table.is_checked(99));
    }

    #[test]
    fn test_new_rows_reset_cursor_and_drop_stale_checks() {
        let mut table = table();
        table.set_checked([11, 12]);
        table.select_next();
        table.set_rows(vec![Row::new(12, vec!["American Gothic".to_string()])]);
        assert_eq!(table.cursor(), 0);
        assert_eq!(table.checked_ids(), vec![12]);
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("Georges Seurat\nFrench", 20), "Georges Seurat Fren…");
        assert_eq!(fit("日本の版画", 6), "日本… ");
        assert_eq!(fit("anything", 0), "");
    }

    #[test]
    fn test_view() {
        let mut table = table();
        table.set_checked([12]);
        let view = plain(&table.view());
        let lines: Vec<&str> = view.lines().collect();
        assert_eq!(lines[0], "  [-] Title     ");
        assert_eq!(lines[2], "> [ ] Nighthawks");
        assert_eq!(lines[3], "  [x] American …");
        assert_eq!(lines[4], "  [ ] The Bedro…");
    }

    #[test]
    fn test_view_notices() {
        let mut table = Model::new(artwork_columns());
        assert!(plain(&table.view()).contains("No records found."));
        table.set_loading(true);
        assert!(plain(&table.view()).contains("Loading…"));
        assert!(table.loading());
    }

    #[test]
    fn test_artwork_row() {
        let artwork = Artwork::new(5, "Nighthawks");
        let row = Row::from(&artwork);
        assert_eq!(row.id, 5);
        assert_eq!(row.cells.len(), artwork_columns().len());
        assert_eq!(row.cells[1], crate::artwork::EMPTY_CELL);
    }
}
