//! The `:echo` command.

use super::{Access, ArgumentFlag, ExCommand, ExFlags, ExHandler, RangeFlag};

/// Sink for text produced by ex commands.
pub trait ExOutput {
    fn output(&mut self, text: &str);
}

/// `:ec[ho] {expr1} ..` prints its string literals separated by spaces.
/// Anything that is not a string literal prints as `ERROR`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Echo;

impl Echo {
    pub const FLAGS: ExFlags =
        ExFlags::new(RangeFlag::Forbidden, ArgumentFlag::Optional, Access::ReadOnly);
}

impl<C: ExOutput> ExHandler<C> for Echo {
    fn execute(&self, ctx: &mut C, command: &ExCommand) -> bool {
        ctx.output(&echo_text(&command.argument));
        true
    }
}

/// Text `:echo` prints for `argument`, newline terminated.
pub fn echo_text(argument: &str) -> String {
    let mut words = Vec::new();
    let mut rest = argument.trim_start();
    while !rest.is_empty() {
        let (word, tail) = expression(rest);
        words.push(word);
        rest = tail.trim_start();
    }
    let mut text = words.join(" ");
    text.push('\n');
    text
}

/// Evaluates the leading expression of `text`. Returns its value and the
/// remaining input.
fn expression(text: &str) -> (String, &str) {
    let mut chars = text.char_indices();
    let Some((_, quote)) = chars.next() else {
        return (String::new(), text);
    };

    match quote {
        '"' => {
            let mut value = String::new();
            while let Some((i, c)) = chars.next() {
                match c {
                    '"' => return (value, &text[i + 1..]),
                    '\\' => match chars.next() {
                        Some((_, 'n')) => value.push('\n'),
                        Some((_, 't')) => value.push('\t'),
                        Some((_, escaped)) => value.push(escaped),
                        None => break,
                    },
                    c => value.push(c),
                }
            }
            ("ERROR".to_string(), "")
        }
        '\'' => {
            let mut value = String::new();
            let mut chars = chars.peekable();
            while let Some((i, c)) = chars.next() {
                if c != '\'' {
                    value.push(c);
                } else if chars.next_if(|(_, next)| *next == '\'').is_some() {
                    value.push('\'');
                } else {
                    return (value, &text[i + 1..]);
                }
            }
            ("ERROR".to_string(), "")
        }
        _ => {
            let end = text.find(char::is_whitespace).unwrap_or(text.len());
            ("ERROR".to_string(), &text[end..])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ex::{ExCommandName, ExRegistry};

    #[derive(Default)]
    struct Output(String);

    impl ExOutput for Output {
        fn output(&mut self, text: &str) {
            self.0.push_str(text);
        }
    }

    #[test]
    fn test_echo_literals() {
        assert_eq!(echo_text(r#""hello" 'world'"#), "hello world\n");
        assert_eq!(echo_text(r#""a\"b\tc""#), "a\"b\tc\n");
        assert_eq!(echo_text("'it''s'"), "it's\n");
        assert_eq!(echo_text(""), "\n");
    }

    #[test]
    fn test_echo_non_literals() {
        assert_eq!(echo_text(r#"1 + "x""#), "ERROR ERROR x\n");
        assert_eq!(echo_text(r#""unterminated"#), "ERROR\n");
    }

    #[test]
    fn test_echo_handler() {
        let mut registry: ExRegistry<Output> = ExRegistry::new();
        registry
            .register(ExCommandName::new("ec", "ho"), Echo::FLAGS, Echo)
            .unwrap();

        let mut output = Output::default();
        assert_eq!(registry.execute(&mut output, ":echo 'hi'", true), Ok(true));
        assert_eq!(output.0, "hi\n");
    }
}
