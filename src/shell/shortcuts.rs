//! Keyboard Shortcuts
//!
//! Fixed table on the accelerator modifier (Ctrl, or Cmd on macOS):
//!
//! | Combo    | Action              |
//! |----------|---------------------|
//! | `Ctrl+R` | refresh dashboard   |
//! | `Ctrl+P` | print dashboard     |
//! | `Ctrl+S` | export data as JSON |

use std::str::FromStr;
use thiserror::Error;

/// A key press with its modifier state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            ctrl: true,
            ..Self::new(key)
        }
    }

    pub fn meta(key: impl Into<String>) -> Self {
        Self {
            meta: true,
            ..Self::new(key)
        }
    }

    /// Ctrl or Cmd held
    pub fn accelerator(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("empty key combination")]
    Empty,

    #[error("unknown modifier: {0}")]
    UnknownModifier(String),
}

impl FromStr for KeyEvent {
    type Err = KeyParseError;

    /// Parse combos like `ctrl+r`, `cmd+s` or `p`
    fn from_str(combo: &str) -> Result<Self, Self::Err> {
        let mut parts: Vec<&str> = combo.trim().split('+').map(str::trim).collect();
        let key = match parts.pop() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(KeyParseError::Empty),
        };

        let mut event = KeyEvent::new(key);
        for modifier in parts {
            match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => event.ctrl = true,
                "cmd" | "meta" | "super" => event.meta = true,
                "alt" | "option" => event.alt = true,
                "shift" => event.shift = true,
                _ => return Err(KeyParseError::UnknownModifier(modifier.to_string())),
            }
        }
        Ok(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Refresh,
    Print,
    ExportJson,
}

/// Action bound to `event`, if any
pub fn shortcut_for(event: &KeyEvent) -> Option<ShortcutAction> {
    if !event.accelerator() {
        return None;
    }
    match event.key.as_str() {
        "r" => Some(ShortcutAction::Refresh),
        "p" => Some(ShortcutAction::Print),
        "s" => Some(ShortcutAction::ExportJson),
        _ => None,
    }
}

/// What handling a key press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    pub action: Option<ShortcutAction>,
    /// The default handling of the combo is suppressed
    pub prevent_default: bool,
}

impl KeyOutcome {
    pub fn ignored() -> Self {
        Self {
            action: None,
            prevent_default: false,
        }
    }

    pub fn handled(action: ShortcutAction) -> Self {
        Self {
            action: Some(action),
            prevent_default: true,
        }
    }
}
