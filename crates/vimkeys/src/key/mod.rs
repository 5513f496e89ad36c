//! Keystroke vocabulary shared by the dispatcher and the conflict resolver.
//!
//! A [`KeyStroke`] is a plain value (key code + modifier mask) that is hashed,
//! compared and ordered structurally. Ordering is by key code first and by
//! modifier bits second, which is also the order conflict reports use.
//!
//! Keystrokes are normalised on construction: a plain character never carries
//! `SHIFT` (the case lives in the character), and a command-modified ASCII
//! letter is always lower case with `SHIFT` kept as a modifier, so `<C-W>` and
//! `<C-w>` are the same stroke while `<C-S-w>` is another one.

mod notation;

pub use notation::{parse_keys, parse_keys_set, NotationError};

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use bitflags::bitflags;
use crossterm::event::{KeyCode as TermKeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

/// First code used for named (non-character) keys. Everything below is a
/// Unicode scalar value.
const NAMED_BASE: u32 = 0x11_0000;
/// Function keys live at `FUNCTION_BASE + n`.
const FUNCTION_BASE: u32 = NAMED_BASE + 0x100;
/// Highest supported function key.
const MAX_FUNCTION_KEY: u8 = 24;

/// A key code: either a typed character or a named key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyCode(u32);

impl KeyCode {
    pub const BACKSPACE: KeyCode = KeyCode(NAMED_BASE + 1);
    pub const TAB: KeyCode = KeyCode(NAMED_BASE + 2);
    pub const ENTER: KeyCode = KeyCode(NAMED_BASE + 3);
    pub const ESCAPE: KeyCode = KeyCode(NAMED_BASE + 4);
    pub const INSERT: KeyCode = KeyCode(NAMED_BASE + 5);
    pub const DELETE: KeyCode = KeyCode(NAMED_BASE + 6);
    pub const HOME: KeyCode = KeyCode(NAMED_BASE + 7);
    pub const END: KeyCode = KeyCode(NAMED_BASE + 8);
    pub const PAGE_UP: KeyCode = KeyCode(NAMED_BASE + 9);
    pub const PAGE_DOWN: KeyCode = KeyCode(NAMED_BASE + 10);
    pub const UP: KeyCode = KeyCode(NAMED_BASE + 11);
    pub const DOWN: KeyCode = KeyCode(NAMED_BASE + 12);
    pub const LEFT: KeyCode = KeyCode(NAMED_BASE + 13);
    pub const RIGHT: KeyCode = KeyCode(NAMED_BASE + 14);
    /// Terminal keys we have no name for.
    pub const UNKNOWN: KeyCode = KeyCode(NAMED_BASE + 0xFF);

    /// Key code of a typed character.
    pub const fn from_char(c: char) -> Self {
        KeyCode(c as u32)
    }

    /// Function key `F<n>`. Returns `None` outside `F1..=F24`.
    pub fn function(n: u8) -> Option<Self> {
        (1..=MAX_FUNCTION_KEY)
            .contains(&n)
            .then(|| KeyCode(FUNCTION_BASE + u32::from(n)))
    }

    /// The raw integer code.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The character for character keys.
    pub fn as_char(self) -> Option<char> {
        char::from_u32(self.0)
    }

    /// The function key number for `F1..=F24`.
    pub fn function_number(self) -> Option<u8> {
        let n = self.0.checked_sub(FUNCTION_BASE)?;
        u8::try_from(n)
            .ok()
            .filter(|n| (1..=MAX_FUNCTION_KEY).contains(n))
    }

    /// Returns true for named keys (anything that is not a typed character).
    pub fn is_named(self) -> bool {
        self.0 >= NAMED_BASE
    }

    /// Human readable label used in shortcut text.
    fn label(self) -> String {
        if let Some(c) = self.as_char() {
            return match c {
                ' ' => "Space".to_string(),
                c => c.to_uppercase().to_string(),
            };
        }
        if let Some(n) = self.function_number() {
            return format!("F{}", n);
        }
        let label = match self {
            KeyCode::BACKSPACE => "Backspace",
            KeyCode::TAB => "Tab",
            KeyCode::ENTER => "Enter",
            KeyCode::ESCAPE => "Esc",
            KeyCode::INSERT => "Insert",
            KeyCode::DELETE => "Delete",
            KeyCode::HOME => "Home",
            KeyCode::END => "End",
            KeyCode::PAGE_UP => "PgUp",
            KeyCode::PAGE_DOWN => "PgDn",
            KeyCode::UP => "Up",
            KeyCode::DOWN => "Down",
            KeyCode::LEFT => "Left",
            KeyCode::RIGHT => "Right",
            _ => "?",
        };
        label.to_string()
    }
}

bitflags! {
    /// Modifier mask carried by a keystroke.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CONTROL = 0b0010;
        const ALT = 0b0100;
        const META = 0b1000;
    }
}

impl Modifiers {
    /// Modifiers that turn a typed character into a shortcut.
    fn command_mask() -> Self {
        Modifiers::CONTROL | Modifiers::ALT | Modifiers::META
    }
}

/// A single key press: key code plus modifier mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyStroke {
    code: KeyCode,
    modifiers: Modifiers,
}

impl KeyStroke {
    pub const ESCAPE: KeyStroke = KeyStroke::named(KeyCode::ESCAPE);
    pub const ENTER: KeyStroke = KeyStroke::named(KeyCode::ENTER);
    pub const BACKSPACE: KeyStroke = KeyStroke::named(KeyCode::BACKSPACE);

    /// Creates a normalised keystroke.
    ///
    /// A plain character carries its shift in its case, so `SHIFT` is dropped.
    /// Once control, alt or meta is held, `SHIFT` is part of the stroke and an
    /// ASCII letter is stored lower case: `<C-S-f>` and `<C-f>` differ. An upper
    /// case letter under alt or meta alone implies shift; under control it does
    /// not, so `<C-W>` stays `<C-w>`.
    pub fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        let Some(c) = code.as_char() else {
            return Self { code, modifiers };
        };

        let mut modifiers = modifiers;
        if !modifiers.intersects(Modifiers::command_mask()) {
            modifiers.remove(Modifiers::SHIFT);
            return Self { code, modifiers };
        }
        if !c.is_ascii_uppercase() {
            return Self { code, modifiers };
        }
        if !modifiers.contains(Modifiers::CONTROL) {
            modifiers |= Modifiers::SHIFT;
        }
        Self {
            code: KeyCode::from_char(c.to_ascii_lowercase()),
            modifiers,
        }
    }

    /// An unmodified named key.
    pub const fn named(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// A typed character.
    pub fn char(c: char) -> Self {
        Self::new(KeyCode::from_char(c), Modifiers::empty())
    }

    /// `<C-c>`.
    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::from_char(c), Modifiers::CONTROL)
    }

    /// `<A-c>`.
    pub fn alt(c: char) -> Self {
        Self::new(KeyCode::from_char(c), Modifiers::ALT)
    }

    pub fn code(&self) -> KeyCode {
        self.code
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// The character this stroke types, if it is a plain character key.
    pub fn typed_char(&self) -> Option<char> {
        if self.modifiers.intersects(Modifiers::command_mask()) {
            return None;
        }
        self.code.as_char()
    }

    /// Returns true if the stroke can collide with a host shortcut: it is a
    /// named key or carries a control, alt or meta modifier.
    pub fn requires_shortcut(&self) -> bool {
        self.code.is_named() || self.modifiers.intersects(Modifiers::command_mask())
    }

    /// IDE-style label such as `Ctrl+Shift+F1`.
    pub fn shortcut_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.modifiers.contains(Modifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.contains(Modifiers::ALT) {
            parts.push("Alt".to_string());
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.modifiers.contains(Modifiers::META) {
            parts.push("Meta".to_string());
        }
        parts.push(self.code.label());
        parts.join("+")
    }
}

impl Ord for KeyStroke {
    fn cmp(&self, other: &Self) -> Ordering {
        self.code
            .cmp(&other.code)
            .then_with(|| self.modifiers.bits().cmp(&other.modifiers.bits()))
    }
}

impl PartialOrd for KeyStroke {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&notation::format_stroke(self))
    }
}

impl FromStr for KeyStroke {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keys = parse_keys(s)?;
        match keys.as_slice() {
            [key] => Ok(*key),
            _ => Err(NotationError::NotSingleStroke {
                input: s.to_string(),
                count: keys.len(),
            }),
        }
    }
}

impl TryFrom<String> for KeyStroke {
    type Error = NotationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyStroke> for String {
    fn from(key: KeyStroke) -> Self {
        key.to_string()
    }
}

impl From<KeyEvent> for KeyStroke {
    fn from(event: KeyEvent) -> Self {
        let mut modifiers = Modifiers::empty();
        if event.modifiers.contains(KeyModifiers::SHIFT) {
            modifiers |= Modifiers::SHIFT;
        }
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            modifiers |= Modifiers::CONTROL;
        }
        if event.modifiers.contains(KeyModifiers::ALT) {
            modifiers |= Modifiers::ALT;
        }
        if event
            .modifiers
            .intersects(KeyModifiers::SUPER | KeyModifiers::META)
        {
            modifiers |= Modifiers::META;
        }

        let code = match event.code {
            TermKeyCode::Char(c) => KeyCode::from_char(c),
            TermKeyCode::Backspace => KeyCode::BACKSPACE,
            TermKeyCode::Enter => KeyCode::ENTER,
            TermKeyCode::Tab => KeyCode::TAB,
            TermKeyCode::BackTab => {
                modifiers |= Modifiers::SHIFT;
                KeyCode::TAB
            }
            TermKeyCode::Esc => KeyCode::ESCAPE,
            TermKeyCode::Insert => KeyCode::INSERT,
            TermKeyCode::Delete => KeyCode::DELETE,
            TermKeyCode::Home => KeyCode::HOME,
            TermKeyCode::End => KeyCode::END,
            TermKeyCode::PageUp => KeyCode::PAGE_UP,
            TermKeyCode::PageDown => KeyCode::PAGE_DOWN,
            TermKeyCode::Up => KeyCode::UP,
            TermKeyCode::Down => KeyCode::DOWN,
            TermKeyCode::Left => KeyCode::LEFT,
            TermKeyCode::Right => KeyCode::RIGHT,
            TermKeyCode::F(n) => KeyCode::function(n).unwrap_or(KeyCode::UNKNOWN),
            _ => KeyCode::UNKNOWN,
        };

        KeyStroke::new(code, modifiers)
    }
}

/// An ordered list of keystrokes typed one after another, such as `gq`.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct KeySequence(Vec<KeyStroke>);

impl KeySequence {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, key: KeyStroke) {
        self.0.push(key);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn as_slice(&self) -> &[KeyStroke] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<KeyStroke> {
        self.0
    }
}

impl Deref for KeySequence {
    type Target = [KeyStroke];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<KeyStroke>> for KeySequence {
    fn from(keys: Vec<KeyStroke>) -> Self {
        Self(keys)
    }
}

impl From<&[KeyStroke]> for KeySequence {
    fn from(keys: &[KeyStroke]) -> Self {
        Self(keys.to_vec())
    }
}

impl FromIterator<KeyStroke> for KeySequence {
    fn from_iter<I: IntoIterator<Item = KeyStroke>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.0 {
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

impl FromStr for KeySequence {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_keys(s)
    }
}

impl TryFrom<String> for KeySequence {
    type Error = NotationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeySequence> for String {
    fn from(keys: KeySequence) -> Self {
        keys.to_string()
    }
}
