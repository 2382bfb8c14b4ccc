//! Key bindings shared by the table widgets.
//!
//! A [`Binding`] is a set of key presses plus the help text shown for them.
//! Bindings are built from option functions, the same way in every widget:
//!
//! ```rust
//! use artworks_table::key::{new_binding, with_help, with_keys_str};
//! use bubbletea_rs::KeyMsg;
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! let quit = new_binding(vec![
//!     with_keys_str(&["q", "ctrl+c"]),
//!     with_help("q", "quit"),
//! ]);
//!
//! let ctrl_c = KeyMsg { key: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL };
//! assert!(quit.matches(&ctrl_c));
//! assert_eq!(quit.help().key, "q");
//! ```

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// A single key press: a code plus modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    /// The key.
    pub code: KeyCode,
    /// Held modifiers.
    pub modifiers: KeyModifiers,
}

impl KeyPress {
    /// A key press without modifiers.
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn matches(&self, msg: &KeyMsg) -> bool {
        self.code == msg.key && normalize(self.code, self.modifiers) == normalize(msg.key, msg.modifiers)
    }
}

// Terminals report shift on upper-case letters inconsistently.
fn normalize(code: KeyCode, modifiers: KeyModifiers) -> KeyModifiers {
    match code {
        KeyCode::Char(_) => modifiers.difference(KeyModifiers::SHIFT),
        _ => modifiers,
    }
}

/// Parses key names such as `"left"`, `"pgdown"`, `"ctrl+c"` or `"G"`.
///
/// Returns `None` for names it does not know.
pub fn parse_key(name: &str) -> Option<KeyPress> {
    let mut modifiers = KeyModifiers::NONE;
    let mut rest = name;
    loop {
        if let Some(stripped) = rest.strip_prefix("ctrl+") {
            modifiers |= KeyModifiers::CONTROL;
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("alt+") {
            modifiers |= KeyModifiers::ALT;
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("shift+") {
            modifiers |= KeyModifiers::SHIFT;
            rest = stripped;
        } else {
            break;
        }
    }

    let code = match rest {
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "pgup" => KeyCode::PageUp,
        "pgdown" => KeyCode::PageDown,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "enter" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "space" | " " => KeyCode::Char(' '),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };
    Some(KeyPress { code, modifiers })
}

/// Help text for a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// Short key label, e.g. `"←/h"`.
    pub key: String,
    /// What the key does.
    pub desc: String,
}

/// A set of keys bound to one action.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    keys: Vec<KeyPress>,
    help: Help,
    disabled: bool,
}

/// Option applied by [`new_binding`].
pub type BindingOpt = Box<dyn FnOnce(&mut Binding)>;

/// Builds a binding from options.
pub fn new_binding(opts: Vec<BindingOpt>) -> Binding {
    let mut binding = Binding::default();
    for opt in opts {
        opt(&mut binding);
    }
    binding
}

/// Binds the named keys. Unknown names are skipped.
pub fn with_keys_str(keys: &[&str]) -> BindingOpt {
    let parsed: Vec<KeyPress> = keys.iter().filter_map(|k| parse_key(k)).collect();
    Box::new(move |b: &mut Binding| b.keys = parsed)
}

/// Sets the binding's help text.
pub fn with_help(key: &str, desc: &str) -> BindingOpt {
    let help = Help {
        key: key.to_string(),
        desc: desc.to_string(),
    };
    Box::new(move |b: &mut Binding| b.help = help)
}

impl Binding {
    /// Returns true if the binding is enabled and `msg` is one of its keys.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        !self.disabled && self.keys.iter().any(|k| k.matches(msg))
    }

    /// The bound key presses.
    pub fn keys(&self) -> &[KeyPress] {
        &self.keys
    }

    /// The binding's help text.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// Enables or disables the binding.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    /// Returns true unless the binding has been disabled.
    pub fn enabled(&self) -> bool {
        !self.disabled
    }
}

/// Returns true if `msg` matches any of `bindings`.
pub fn matches(msg: &KeyMsg, bindings: &[&Binding]) -> bool {
    bindings.iter().any(|b| b.matches(msg))
}

/// Widgets expose their bindings for help rendering through this trait.
pub trait KeyMap {
    /// Bindings for the one-line help.
    fn short_help(&self) -> Vec<&Binding>;
    /// Bindings grouped in columns for the expanded help.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}

/// Renders bindings as `key desc • key desc`, skipping disabled ones.
pub fn short_help_view(bindings: &[&Binding]) -> String {
    bindings
        .iter()
        .filter(|b| b.enabled() && !b.help.key.is_empty())
        .map(|b| format!("{} {}", b.help.key, b.help.desc))
        .collect::<Vec<_>>()
        .join(" • ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyMsg {
        KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(parse_key("pgdown"), Some(KeyPress::plain(KeyCode::PageDown)));
        assert_eq!(parse_key("space"), Some(KeyPress::plain(KeyCode::Char(' '))));
        assert_eq!(
            parse_key("ctrl+c"),
            Some(KeyPress {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL
            })
        );
        assert_eq!(parse_key("G"), Some(KeyPress::plain(KeyCode::Char('G'))));
        assert_eq!(parse_key("hyper"), None);
    }

    #[test]
    fn test_binding_matches() {
        let binding = new_binding(vec![with_keys_str(&["left", "h"]), with_help("←/h", "prev")]);
        assert!(binding.matches(&key(KeyCode::Left)));
        assert!(binding.matches(&key(KeyCode::Char('h'))));
        assert!(!binding.matches(&key(KeyCode::Char('l'))));
        // Control-h is a different key
        assert!(!binding.matches(&KeyMsg {
            key: KeyCode::Char('h'),
            modifiers: KeyModifiers::CONTROL
        }));
    }

    #[test]
    fn test_shift_is_ignored_for_characters() {
        let binding = new_binding(vec![with_keys_str(&["G"])]);
        assert!(binding.matches(&KeyMsg {
            key: KeyCode::Char('G'),
            modifiers: KeyModifiers::SHIFT
        }));
    }

    #[test]
    fn test_disabled_binding_never_matches() {
        let mut binding = new_binding(vec![with_keys_str(&["q"]), with_help("q", "quit")]);
        binding.set_enabled(false);
        assert!(!binding.matches(&key(KeyCode::Char('q'))));
        assert_eq!(short_help_view(&[&binding]), "");
    }

    #[test]
    fn test_short_help_view() {
        let prev = new_binding(vec![with_keys_str(&["left"]), with_help("←", "prev page")]);
        let next = new_binding(vec![with_keys_str(&["right"]), with_help("→", "next page")]);
        assert_eq!(short_help_view(&[&prev, &next]), "← prev page • → next page");
        assert!(matches(&key(KeyCode::Right), &[&prev, &next]));
    }
}
