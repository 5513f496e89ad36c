//! Vim key notation.
//!
//! ```text
//! sequence = stroke*
//! stroke   = "<" modifier* key ">" | char
//! modifier = ("C" | "S" | "A" | "M" | "D") "-"
//! key      = named-key | "F" digit digit? | char
//! ```
//!
//! Names and modifier letters are case-insensitive. An `<` with no closing
//! `>` is a literal `<`.

use std::collections::BTreeSet;

use super::{KeyCode, KeySequence, KeyStroke, Modifiers};

/// Error produced while parsing key notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("empty key notation")]
    Empty,
    #[error("unknown key name <{name}> at position {position}")]
    UnknownKey { name: String, position: usize },
    #[error("expected a single keystroke in {input:?}, found {count}")]
    NotSingleStroke { input: String, count: usize },
}

/// Named keys: notation names accepted by the parser, first one is canonical.
const NAMED_KEYS: &[(KeyCode, &[&str])] = &[
    (KeyCode::ESCAPE, &["Esc", "Escape"]),
    (KeyCode::ENTER, &["CR", "Enter", "Return"]),
    (KeyCode::TAB, &["Tab"]),
    (KeyCode::BACKSPACE, &["BS", "Backspace"]),
    (KeyCode::INSERT, &["Insert", "Ins"]),
    (KeyCode::DELETE, &["Del", "Delete"]),
    (KeyCode::HOME, &["Home"]),
    (KeyCode::END, &["End"]),
    (KeyCode::PAGE_UP, &["PageUp"]),
    (KeyCode::PAGE_DOWN, &["PageDown"]),
    (KeyCode::UP, &["Up"]),
    (KeyCode::DOWN, &["Down"]),
    (KeyCode::LEFT, &["Left"]),
    (KeyCode::RIGHT, &["Right"]),
];

/// Characters that need a bracketed name.
const NAMED_CHARS: &[(char, &[&str])] = &[
    ('<', &["lt"]),
    ('>', &["gt"]),
    (' ', &["Space"]),
    ('|', &["Bar"]),
    ('\\', &["Bslash"]),
];

/// Parses a key-sequence such as `gq`, `<C-w>j` or `<Esc>`.
pub fn parse_keys(input: &str) -> Result<KeySequence, NotationError> {
    if input.is_empty() {
        return Err(NotationError::Empty);
    }

    let mut keys = KeySequence::new();
    let mut rest = input;
    let mut position = 0;

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some(close) = rest[1..].find('>') {
                // `<>` is a literal `<` followed by `>`.
                let body = &rest[1..1 + close];
                if !body.is_empty() {
                    keys.push(parse_bracketed(body, position)?);
                    let consumed = close + 2;
                    rest = &rest[consumed..];
                    position += consumed;
                    continue;
                }
            }
        }
        keys.push(KeyStroke::char(c));
        rest = &rest[c.len_utf8()..];
        position += c.len_utf8();
    }

    Ok(keys)
}

/// Parses each notation string into a key-sequence set.
pub fn parse_keys_set(inputs: &[&str]) -> Result<BTreeSet<KeySequence>, NotationError> {
    inputs.iter().map(|input| parse_keys(input)).collect()
}

fn parse_bracketed(body: &str, position: usize) -> Result<KeyStroke, NotationError> {
    let mut modifiers = Modifiers::empty();
    let mut name = body;

    // `<C-->` is control plus minus, so a modifier needs something after the dash.
    while name.len() > 2 && name.as_bytes()[1] == b'-' {
        let modifier = match name.as_bytes()[0].to_ascii_uppercase() {
            b'C' => Modifiers::CONTROL,
            b'S' => Modifiers::SHIFT,
            b'A' | b'M' => Modifiers::ALT,
            b'D' => Modifiers::META,
            _ => break,
        };
        modifiers |= modifier;
        name = &name[2..];
    }

    let unknown = || NotationError::UnknownKey {
        name: body.to_string(),
        position,
    };

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        let c = if modifiers.contains(Modifiers::SHIFT) && !modifiers.contains(Modifiers::CONTROL)
        {
            c.to_uppercase().next().unwrap_or(c)
        } else {
            c
        };
        return Ok(KeyStroke::new(KeyCode::from_char(c), modifiers));
    }

    if let Some(code) = lookup_named(name) {
        return Ok(KeyStroke::new(code, modifiers));
    }
    if let Some(c) = lookup_named_char(name) {
        return Ok(KeyStroke::new(KeyCode::from_char(c), modifiers));
    }
    if let Some(n) = name
        .strip_prefix(['F', 'f'])
        .and_then(|digits| digits.parse::<u8>().ok())
    {
        return KeyCode::function(n)
            .map(|code| KeyStroke::new(code, modifiers))
            .ok_or_else(unknown);
    }

    Err(unknown())
}

fn lookup_named(name: &str) -> Option<KeyCode> {
    NAMED_KEYS
        .iter()
        .find(|(_, names)| names.iter().any(|n| n.eq_ignore_ascii_case(name)))
        .map(|(code, _)| *code)
}

fn lookup_named_char(name: &str) -> Option<char> {
    NAMED_CHARS
        .iter()
        .find(|(_, names)| names.iter().any(|n| n.eq_ignore_ascii_case(name)))
        .map(|(c, _)| *c)
}

/// Formats a single stroke in key notation.
pub(super) fn format_stroke(key: &KeyStroke) -> String {
    let code = key.code();
    let modifiers = key.modifiers();

    let name = if let Some(c) = code.as_char() {
        let bracketed = NAMED_CHARS.iter().find(|(named, _)| *named == c);
        match bracketed {
            // Only `<` and space are ambiguous when written bare.
            Some((_, names)) if !modifiers.is_empty() || matches!(c, '<' | ' ') => {
                names[0].to_string()
            }
            _ if modifiers.is_empty() => return c.to_string(),
            _ => c.to_string(),
        }
    } else if let Some(n) = code.function_number() {
        format!("F{}", n)
    } else {
        NAMED_KEYS
            .iter()
            .find(|(named, _)| *named == code)
            .map(|(_, names)| names[0].to_string())
            .unwrap_or_else(|| "Nop".to_string())
    };

    let mut out = String::from("<");
    if modifiers.contains(Modifiers::CONTROL) {
        out.push_str("C-");
    }
    if modifiers.contains(Modifiers::SHIFT) {
        out.push_str("S-");
    }
    if modifiers.contains(Modifiers::ALT) {
        out.push_str("A-");
    }
    if modifiers.contains(Modifiers::META) {
        out.push_str("D-");
    }
    out.push_str(&name);
    out.push('>');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(input: &str) -> Vec<KeyStroke> {
        parse_keys(input).unwrap().into_inner()
    }

    #[test]
    fn test_parse_plain_characters() {
        assert_eq!(keys("gq"), vec![KeyStroke::char('g'), KeyStroke::char('q')]);
    }

    #[test]
    fn test_parse_modifiers() {
        assert_eq!(keys("<C-w>"), vec![KeyStroke::ctrl('w')]);
        assert_eq!(keys("<c-W>"), vec![KeyStroke::ctrl('w')]);
        assert_eq!(keys("<A-x>"), vec![KeyStroke::alt('x')]);
        assert_eq!(keys("<M-x>"), vec![KeyStroke::alt('x')]);
        assert_eq!(
            keys("<C-S-F1>"),
            vec![KeyStroke::new(
                KeyCode::function(1).unwrap(),
                Modifiers::CONTROL | Modifiers::SHIFT
            )]
        );
    }

    #[test]
    fn test_parse_shifted_character() {
        assert_eq!(keys("<S-a>"), vec![KeyStroke::char('A')]);
    }

    #[test]
    fn test_parse_control_shift_letter() {
        let ctrl_shift_f = keys("<C-S-f>");
        assert_ne!(ctrl_shift_f, keys("<C-f>"));
        assert_eq!(ctrl_shift_f, keys("<C-S-F>"));
        assert_eq!(keys("<A-S-x>"), keys("<A-X>"));
    }

    #[test]
    fn test_parse_control_minus() {
        assert_eq!(
            keys("<C-->"),
            vec![KeyStroke::new(KeyCode::from_char('-'), Modifiers::CONTROL)]
        );
    }

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(keys("<Esc>"), vec![KeyStroke::ESCAPE]);
        assert_eq!(keys("<cr>"), vec![KeyStroke::ENTER]);
        assert_eq!(keys("<Enter>"), vec![KeyStroke::ENTER]);
        assert_eq!(keys("<BS>"), vec![KeyStroke::BACKSPACE]);
        assert_eq!(keys("<lt>"), vec![KeyStroke::char('<')]);
        assert_eq!(keys("<Space>"), vec![KeyStroke::char(' ')]);
        assert_eq!(
            keys("<F12>"),
            vec![KeyStroke::named(KeyCode::function(12).unwrap())]
        );
    }

    #[test]
    fn test_unterminated_bracket_is_literal() {
        assert_eq!(
            keys("a<b"),
            vec![
                KeyStroke::char('a'),
                KeyStroke::char('<'),
                KeyStroke::char('b'),
            ]
        );
        assert_eq!(keys("<>"), vec![KeyStroke::char('<'), KeyStroke::char('>')]);
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        assert_eq!(
            parse_keys("g<Bogus>"),
            Err(NotationError::UnknownKey {
                name: "Bogus".to_string(),
                position: 1,
            })
        );
        assert!(parse_keys("<F99>").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_keys(""), Err(NotationError::Empty));
    }

    #[test]
    fn test_format_round_trips_through_parse() {
        let inputs = [
            "gq", "<C-w>j", "<Esc>", "<lt>", "<C-S-F1>", "<A-x>", "<Space>", "<C-S-f>",
            "<S-A-x>",
        ];
        for input in inputs {
            let parsed = parse_keys(input).unwrap();
            assert_eq!(parsed.to_string(), input);
        }
    }

    #[test]
    fn test_parse_keys_set() {
        let set = parse_keys_set(&["gq", "<C-w>"]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(parse_keys_set(&["gq", ""]).is_err());
    }
}
