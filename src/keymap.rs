use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier for a bindable key or mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
    Function(u8),
    /// Mouse button, left button is zero.
    Mouse(u8),
}

impl KeyCode {
    /// Parses a key name as written in `bind` commands, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        if let Some(button) = parse_mouse_button(name) {
            return Some(button);
        }
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if ch.is_ascii_alphabetic() {
                return Some(Self::Character(ch.to_ascii_uppercase()));
            }
            if ch.is_ascii_digit() {
                return Some(Self::Digit(ch as u8 - b'0'));
            }
            return None;
        }
        let function = name.strip_prefix('F').or_else(|| name.strip_prefix('f'))?;
        match function.parse::<u8>() {
            Ok(index) if (1..=25).contains(&index) => Some(Self::Function(index)),
            _ => None,
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Named(key) => f.write_str(key.as_str()),
            KeyCode::Character(ch) => write!(f, "{ch}"),
            KeyCode::Digit(digit) => write!(f, "{digit}"),
            KeyCode::Function(index) => write!(f, "F{index}"),
            KeyCode::Mouse(index) => write!(f, "Mouse{}", u16::from(*index) + 1),
        }
    }
}

fn parse_named_key(name: &str) -> Option<KeyCode> {
    use NamedKey::*;
    let key = match name.to_ascii_lowercase().as_str() {
        "space" => Space,
        "enter" | "return" => Enter,
        "tab" => Tab,
        "left" => Left,
        "right" => Right,
        "up" => Up,
        "down" => Down,
        "escape" | "esc" => Escape,
        "backspace" => Backspace,
        "home" => Home,
        "end" => End,
        "pageup" => PageUp,
        "pagedown" => PageDown,
        "leftshift" | "lshift" => LeftShift,
        "rightshift" | "rshift" => RightShift,
        "leftctrl" | "lcontrol" | "lctrl" => LeftCtrl,
        "rightctrl" | "rcontrol" | "rctrl" => RightCtrl,
        "leftalt" | "lalt" => LeftAlt,
        "rightalt" | "ralt" => RightAlt,
        _ => return None,
    };
    Some(KeyCode::Named(key))
}

fn parse_mouse_button(name: &str) -> Option<KeyCode> {
    let prefix = name.get(..5)?;
    if !prefix.eq_ignore_ascii_case("mouse") {
        return None;
    }
    // Buttons are numbered from 1, so Mouse1..Mouse256 cover every index.
    let number = name[5..].parse::<u16>().ok()?;
    let index = u8::try_from(number.checked_sub(1)?).ok()?;
    Some(KeyCode::Mouse(index))
}

/// Friendly names for the non-printable keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Backspace,
    Home,
    End,
    PageUp,
    PageDown,
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
}

impl NamedKey {
    pub fn as_str(self) -> &'static str {
        use NamedKey::*;
        match self {
            Space => "Space",
            Enter => "Enter",
            Tab => "Tab",
            Left => "Left",
            Right => "Right",
            Up => "Up",
            Down => "Down",
            Escape => "Escape",
            Backspace => "Backspace",
            Home => "Home",
            End => "End",
            PageUp => "PageUp",
            PageDown => "PageDown",
            LeftShift => "LeftShift",
            RightShift => "RightShift",
            LeftCtrl => "LeftCtrl",
            RightCtrl => "RightCtrl",
            LeftAlt => "LeftAlt",
            RightAlt => "RightAlt",
        }
    }
}

/// Key → command line table plus the set of keys currently held down.
#[derive(Debug, Default, Clone)]
pub struct KeyBindings {
    actions: IndexMap<KeyCode, String>,
    held: HashSet<KeyCode>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, key: KeyCode, action: impl Into<String>) {
        self.actions.insert(key, action.into());
    }

    pub fn unbind(&mut self, key: KeyCode) -> Option<String> {
        self.actions.shift_remove(&key)
    }

    pub fn action(&self, key: KeyCode) -> Option<&str> {
        self.actions.get(&key).map(String::as_str)
    }

    /// Bindings in the order they were first made.
    pub fn iter(&self) -> impl Iterator<Item = (KeyCode, &str)> {
        self.actions.iter().map(|(key, action)| (*key, action.as_str()))
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Records an input event and returns the action to run for a real edge.
    ///
    /// Auto-repeated presses of a held key and releases of a key that was
    /// never pressed yield `None`.
    pub fn edge(&mut self, key: KeyCode, is_down: bool) -> Option<String> {
        let changed = if is_down {
            self.held.insert(key)
        } else {
            self.held.remove(&key)
        };
        if !changed {
            return None;
        }
        self.actions.get(&key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_character_keys() {
        assert_eq!(
            KeyCode::from_name("Space"),
            Some(KeyCode::Named(NamedKey::Space))
        );
        assert_eq!(
            KeyCode::from_name("SPACE"),
            Some(KeyCode::Named(NamedKey::Space))
        );
        assert_eq!(KeyCode::from_name("a"), Some(KeyCode::Character('A')));
        assert_eq!(KeyCode::from_name("7"), Some(KeyCode::Digit(7)));
        assert_eq!(KeyCode::from_name("F12"), Some(KeyCode::Function(12)));
        assert_eq!(KeyCode::from_name("F26"), None);
        assert_eq!(KeyCode::from_name("?"), None);
    }

    #[test]
    fn mouse_names_are_supported() {
        assert_eq!(KeyCode::from_name("Mouse1"), Some(KeyCode::Mouse(0)));
        assert_eq!(KeyCode::from_name("MOUSE3"), Some(KeyCode::Mouse(2)));
        assert_eq!(KeyCode::from_name("Mouse256"), Some(KeyCode::Mouse(255)));
        assert_eq!(KeyCode::from_name("Mouse0"), None);
        assert_eq!(KeyCode::from_name("Mouse257"), None);
        assert_eq!(KeyCode::from_name("mouse"), None);
    }

    #[test]
    fn display_round_trips_through_from_name() {
        for key in [
            KeyCode::Named(NamedKey::PageDown),
            KeyCode::Character('Q'),
            KeyCode::Digit(0),
            KeyCode::Function(5),
            KeyCode::Mouse(0),
            KeyCode::Mouse(1),
            KeyCode::Mouse(255),
        ] {
            assert_eq!(KeyCode::from_name(&key.to_string()), Some(key));
        }
    }

    #[test]
    fn only_real_edges_yield_actions() {
        let mut bindings = KeyBindings::new();
        let space = KeyCode::Named(NamedKey::Space);
        bindings.bind(space, "jump");
        assert_eq!(bindings.edge(space, false), None);
        assert_eq!(bindings.edge(space, true).as_deref(), Some("jump"));
        assert!(bindings.is_held(space));
        assert_eq!(bindings.edge(space, true), None);
        assert_eq!(bindings.edge(space, false).as_deref(), Some("jump"));
        assert!(!bindings.is_held(space));
    }

    #[test]
    fn unbind_removes_the_action() {
        let mut bindings = KeyBindings::new();
        let key = KeyCode::Character('W');
        bindings.bind(key, "forward");
        assert_eq!(bindings.unbind(key).as_deref(), Some("forward"));
        assert_eq!(bindings.edge(key, true), None);
    }
}
