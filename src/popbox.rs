//! The "Select Multiple Rows" overlay.
//!
//! A small text prompt asking how many rows to select across all pages. It
//! accepts free text; deciding whether the text is a usable count is left to
//! [`parse_bulk_count`](crate::selection::parse_bulk_count).

use crate::key::{self, KeyMap as KeyMapTrait};
use crate::Component;
use bubbletea_rs::{Cmd, KeyMsg, Msg};
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;

/// What the user did with the popbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopboxEvent {
    /// Enter was pressed with this text.
    Submitted(String),
    /// The popbox was closed without submitting.
    Dismissed,
}

/// Key bindings for the popbox.
#[derive(Debug, Clone)]
pub struct PopboxKeyMap {
    /// Submit the typed count.
    pub submit: key::Binding,
    /// Close without submitting.
    pub dismiss: key::Binding,
    /// Delete the last character.
    pub backspace: key::Binding,
}

impl Default for PopboxKeyMap {
    fn default() -> Self {
        Self {
            submit: key::new_binding(vec![
                key::with_keys_str(&["enter"]),
                key::with_help("enter", "select"),
            ]),
            dismiss: key::new_binding(vec![
                key::with_keys_str(&["esc"]),
                key::with_help("esc", "close"),
            ]),
            backspace: key::new_binding(vec![key::with_keys_str(&["backspace"])]),
        }
    }
}

impl KeyMapTrait for PopboxKeyMap {
    fn short_help(&self) -> Vec<&key::Binding> {
        vec![&self.submit, &self.dismiss]
    }

    fn full_help(&self) -> Vec<Vec<&key::Binding>> {
        vec![self.short_help()]
    }
}

/// Popbox state.
///
/// ```rust
/// use artworks_table::popbox::{Model, PopboxEvent};
/// use bubbletea_rs::{KeyMsg, Msg};
/// use crossterm::event::{KeyCode, KeyModifiers};
///
/// let press = |code| Box::new(KeyMsg { key: code, modifiers: KeyModifiers::NONE }) as Msg;
///
/// let mut popbox = Model::new();
/// popbox.open();
/// popbox.update(&press(KeyCode::Char('2')));
/// popbox.update(&press(KeyCode::Char('0')));
///
/// assert_eq!(
///     popbox.update(&press(KeyCode::Enter)),
///     Some(PopboxEvent::Submitted("20".to_string()))
/// );
/// assert!(!popbox.is_open());
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    open: bool,
    value: String,
    /// Heading line.
    pub title: String,
    /// Explanation under the heading.
    pub subtitle: String,
    /// Shown while the input is empty.
    pub placeholder: String,
    /// Maximum number of characters accepted.
    pub char_limit: usize,
    /// Key bindings.
    pub keymap: PopboxKeyMap,
    /// Frame around the popbox.
    pub frame_style: Style,
    /// Heading style.
    pub title_style: Style,
    /// Placeholder style.
    pub placeholder_style: Style,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            open: false,
            value: String::new(),
            title: "Select Multiple Rows".to_string(),
            subtitle: "Enter number of rows to select across all pages".to_string(),
            placeholder: "e.g. 20".to_string(),
            char_limit: 9,
            keymap: PopboxKeyMap::default(),
            frame_style: Style::new()
                .border_style(lipgloss::normal_border())
                .border_top(true)
                .border_bottom(true)
                .border_left(true)
                .border_right(true)
                .border_foreground(Color::from("62"))
                .padding(0, 1, 0, 1),
            title_style: Style::new().bold(true),
            placeholder_style: Style::new().foreground(Color::from("240")),
        }
    }
}

impl Model {
    /// Creates a closed popbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the popbox.
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closes the popbox, keeping any typed text.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Returns true while the popbox is shown and capturing keys.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The typed text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the typed text, truncated to `char_limit`.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.chars().take(self.char_limit).collect();
    }

    /// Handles keys while open. Submitting clears the text and closes.
    pub fn update(&mut self, msg: &Msg) -> Option<PopboxEvent> {
        if !self.open {
            return None;
        }
        let key_msg = msg.downcast_ref::<KeyMsg>()?;

        if self.keymap.submit.matches(key_msg) {
            self.open = false;
            return Some(PopboxEvent::Submitted(std::mem::take(&mut self.value)));
        }
        if self.keymap.dismiss.matches(key_msg) {
            self.open = false;
            return Some(PopboxEvent::Dismissed);
        }
        if self.keymap.backspace.matches(key_msg) {
            self.value.pop();
            return None;
        }

        if let KeyCode::Char(c) = key_msg.key {
            let plain = key_msg.modifiers.difference(KeyModifiers::SHIFT).is_empty();
            if plain && !c.is_control() && self.value.chars().count() < self.char_limit {
                self.value.push(c);
            }
        }
        None
    }

    /// Renders the popbox, or nothing while closed.
    pub fn view(&self) -> String {
        if !self.open {
            return String::new();
        }
        let input = if self.value.is_empty() {
            format!("> {}", self.placeholder_style.clone().render(&self.placeholder))
        } else {
            format!("> {}█", self.value)
        };
        let help = key::short_help_view(&self.keymap.short_help());
        let body = format!(
            "{}\n{}\n\n{}\n{}",
            self.title_style.clone().render(&self.title),
            self.subtitle,
            input,
            help
        );
        self.frame_style.clone().render(&body)
    }
}

impl Component for Model {
    fn focus(&mut self) -> Option<Cmd> {
        self.open();
        None
    }

    fn blur(&mut self) {
        self.close();
    }

    fn focused(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Msg {
        Box::new(KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        }) as Msg
    }

    fn type_text(popbox: &mut Model, text: &str) {
        for c in text.chars() {
            popbox.update(&key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_closed_popbox_ignores_keys() {
        let mut popbox = Model::new();
        type_text(&mut popbox, "12");
        assert_eq!(popbox.value(), "");
        assert_eq!(popbox.update(&key(KeyCode::Enter)), None);
        assert_eq!(popbox.view(), "");
    }

    #[test]
    fn test_non_numeric_text_passes_through() {
        let mut popbox = Model::new();
        popbox.open();
        type_text(&mut popbox, "abc");
        assert_eq!(
            popbox.update(&key(KeyCode::Enter)),
            Some(PopboxEvent::Submitted("abc".to_string()))
        );
        assert_eq!(popbox.value(), "");
    }

    #[test]
    fn test_backspace_and_limit() {
        let mut popbox = Model::new();
        popbox.char_limit = 3;
        popbox.open();
        type_text(&mut popbox, "12345");
        assert_eq!(popbox.value(), "123");
        popbox.update(&key(KeyCode::Backspace));
        assert_eq!(popbox.value(), "12");
    }

    #[test]
    fn test_control_chords_are_not_typed() {
        let mut popbox = Model::new();
        popbox.open();
        popbox.update(&(Box::new(KeyMsg {
            key: KeyCode::Char('u'),
            modifiers: KeyModifiers::CONTROL,
        }) as Msg));
        assert_eq!(popbox.value(), "");
    }

    #[test]
    fn test_dismiss_keeps_text() {
        let mut popbox = Model::new();
        assert!(popbox.focus().is_none());
        assert!(popbox.focused());
        type_text(&mut popbox, "7");
        assert_eq!(
            popbox.update(&key(KeyCode::Esc)),
            Some(PopboxEvent::Dismissed)
        );
        assert!(!popbox.focused());
        assert_eq!(popbox.value(), "7");

        popbox.focus();
        popbox.blur();
        assert!(!popbox.is_open());
    }

    #[test]
    fn test_view_shows_prompt() {
        let mut popbox = Model::new();
        popbox.open();
        let view = strip_ansi_escapes::strip_str(popbox.view());
        assert!(view.contains("Select Multiple Rows"));
        assert!(view.contains("Enter number of rows to select across all pages"));
        assert!(view.contains("> e.g. 20"));

        popbox.set_value("15");
        let view = strip_ansi_escapes::strip_str(popbox.view());
        assert!(view.contains("> 15█"));
        assert!(view.contains("enter select"));
    }
}
