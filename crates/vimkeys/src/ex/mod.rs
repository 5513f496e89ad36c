//! Ex command lines (`:echo "hi"`, `:%s/a/b/`).
//!
//! A line is split into an optional range, a command name, an optional `!`
//! and the argument text. Commands are looked up by name, where each name has
//! a required prefix and an optional completion (`ec[ho]`), and are checked
//! against their flags before the handler runs.

mod echo;

use std::fmt;
use std::sync::Arc;

pub use echo::{echo_text, Echo, ExOutput};

/// Errors from parsing or running an ex command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExError {
    #[error("no command name in {0:?}")]
    MissingCommand(String),
    #[error("not an editor command: {0}")]
    UnknownCommand(String),
    #[error("no range allowed for {0}")]
    RangeNotAllowed(String),
    #[error("{0} requires a range")]
    RangeRequired(String),
    #[error("{0} requires an argument")]
    ArgumentRequired(String),
    #[error("trailing characters: {0}")]
    TrailingCharacters(String),
    #[error("{0} cannot run in a read-only buffer")]
    ReadOnly(String),
    #[error("{new} overlaps with already registered {existing}")]
    DuplicateCommand { new: String, existing: String },
}

/// Whether a command accepts a line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeFlag {
    Forbidden,
    Optional,
    Required,
}

/// Whether a command accepts argument text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentFlag {
    Forbidden,
    Optional,
    Required,
}

/// Whether a command may modify the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExFlags {
    pub range: RangeFlag,
    pub argument: ArgumentFlag,
    pub access: Access,
}

impl ExFlags {
    pub const fn new(range: RangeFlag, argument: ArgumentFlag, access: Access) -> Self {
        Self {
            range,
            argument,
            access,
        }
    }
}

/// A command name: the shortest accepted abbreviation plus the rest of the
/// full name. `ExCommandName::new("ec", "ho")` accepts `ec`, `ech` and `echo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExCommandName {
    required: String,
    optional: String,
}

impl ExCommandName {
    pub fn new(required: impl Into<String>, optional: impl Into<String>) -> Self {
        Self {
            required: required.into(),
            optional: optional.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}{}", self.required, self.optional)
    }

    pub fn matches(&self, name: &str) -> bool {
        name.len() >= self.required.len()
            && name.starts_with(&self.required)
            && self.full_name().starts_with(name)
    }

    /// Every accepted spelling, shortest first.
    pub fn spellings(&self) -> impl Iterator<Item = String> + '_ {
        let full = self.full_name();
        let boundaries: Vec<usize> = full
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(full.len()))
            .filter(|i| *i >= self.required.len())
            .collect();
        boundaries.into_iter().map(move |i| full[..i].to_string())
    }

    fn overlaps(&self, other: &ExCommandName) -> bool {
        self.spellings().any(|spelling| other.matches(&spelling))
    }
}

impl fmt::Display for ExCommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional.is_empty() {
            write!(f, "{}", self.required)
        } else {
            write!(f, "{}[{}]", self.required, self.optional)
        }
    }
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExCommand {
    /// Range text as typed (`%`, `1,5`, `'a,'b`).
    pub range: Option<String>,
    pub name: String,
    /// `!` typed right after an alphabetic name.
    pub bang: bool,
    /// Remaining text, trimmed.
    pub argument: String,
}

/// Splits a command line into range, name, bang and argument.
pub fn parse_command_line(line: &str) -> Result<ExCommand, ExError> {
    let rest = line.trim_start().trim_start_matches(':').trim_start();

    let range_len = range_length(rest);
    let (range, rest) = rest.split_at(range_len);
    let rest = rest.trim_start();

    let name_len = match rest.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len()),
        Some(c) if "!&<>=~@#*".contains(c) => c.len_utf8(),
        _ => 0,
    };
    if name_len == 0 {
        return Err(ExError::MissingCommand(line.to_string()));
    }
    let (name, rest) = rest.split_at(name_len);

    let alphabetic = name.starts_with(|c: char| c.is_ascii_alphabetic());
    let (bang, rest) = match rest.strip_prefix('!') {
        Some(rest) if alphabetic => (true, rest),
        _ => (false, rest),
    };

    Ok(ExCommand {
        range: (!range.is_empty()).then(|| range.to_string()),
        name: name.to_string(),
        bang,
        argument: rest.trim().to_string(),
    })
}

/// Length in bytes of the range prefix of `text`.
fn range_length(text: &str) -> usize {
    let mut chars = text.char_indices();
    let mut end = 0;
    while let Some((i, c)) = chars.next() {
        match c {
            '%' | '.' | '$' | '+' | '-' | ',' | ';' => end = i + 1,
            c if c.is_ascii_digit() => end = i + 1,
            '\'' => match chars.next() {
                Some((j, mark)) => end = j + mark.len_utf8(),
                None => break,
            },
            _ => break,
        }
    }
    end
}

/// Implementation of an ex command.
pub trait ExHandler<C> {
    fn execute(&self, ctx: &mut C, command: &ExCommand) -> bool;
}

impl<C, F> ExHandler<C> for F
where
    F: Fn(&mut C, &ExCommand) -> bool,
{
    fn execute(&self, ctx: &mut C, command: &ExCommand) -> bool {
        self(ctx, command)
    }
}

struct ExEntry<C> {
    name: ExCommandName,
    flags: ExFlags,
    handler: Arc<dyn ExHandler<C>>,
}

/// Ex commands by name.
pub struct ExRegistry<C> {
    entries: Vec<ExEntry<C>>,
}

impl<C> Default for ExRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ExRegistry<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register<H>(
        &mut self,
        name: ExCommandName,
        flags: ExFlags,
        handler: H,
    ) -> Result<(), ExError>
    where
        H: ExHandler<C> + 'static,
    {
        if let Some(existing) = self
            .entries
            .iter()
            .find(|entry| entry.name.overlaps(&name) || name.overlaps(&entry.name))
        {
            return Err(ExError::DuplicateCommand {
                new: name.to_string(),
                existing: existing.name.to_string(),
            });
        }
        tracing::debug!(command = %name, "registered ex command");
        self.entries.push(ExEntry {
            name,
            flags,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// Flags of the command `name` resolves to.
    pub fn flags(&self, name: &str) -> Option<ExFlags> {
        self.find(name).map(|entry| entry.flags)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses and runs a command line. Returns the handler's result, or an
    /// error if the line does not satisfy the command's flags.
    pub fn execute(&self, ctx: &mut C, line: &str, read_only: bool) -> Result<bool, ExError> {
        let command = parse_command_line(line)?;
        let entry = self
            .find(&command.name)
            .ok_or_else(|| ExError::UnknownCommand(command.name.clone()))?;
        let full_name = entry.name.full_name();

        match (entry.flags.range, &command.range) {
            (RangeFlag::Forbidden, Some(_)) => return Err(ExError::RangeNotAllowed(full_name)),
            (RangeFlag::Required, None) => return Err(ExError::RangeRequired(full_name)),
            _ => {}
        }
        match entry.flags.argument {
            ArgumentFlag::Forbidden if !command.argument.is_empty() => {
                return Err(ExError::TrailingCharacters(command.argument));
            }
            ArgumentFlag::Required if command.argument.is_empty() => {
                return Err(ExError::ArgumentRequired(full_name));
            }
            _ => {}
        }
        if read_only && entry.flags.access == Access::Write {
            return Err(ExError::ReadOnly(full_name));
        }

        tracing::debug!(command = %full_name, range = ?command.range, "executing ex command");
        Ok(entry.handler.execute(ctx, &command))
    }

    fn find(&self, name: &str) -> Option<&ExEntry<C>> {
        self.entries.iter().find(|entry| entry.name.matches(name))
    }
}
