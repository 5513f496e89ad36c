//! Arguments produced for commands that need one.

use std::sync::Arc;

use super::{ArgumentType, CommandDescriptor};

/// A half-open range of buffer offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Creates a range, swapping the ends if they are reversed.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A motion resolved against the buffer for an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionArgument {
    /// The motion command that produced the range.
    pub descriptor: Arc<CommandDescriptor>,
    /// Range the motion covers from the caret.
    pub range: TextRange,
    /// The motion's own repeat count (`2` in `3d2w`), at least 1.
    pub count: usize,
}

/// Argument handed to a command's handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Motion(MotionArgument),
    Character(char),
    ExString(String),
}

impl Argument {
    /// The argument kind this value satisfies.
    pub fn argument_type(&self) -> ArgumentType {
        match self {
            Argument::Motion(_) => ArgumentType::Motion,
            Argument::Character(_) => ArgumentType::Character,
            Argument::ExString(_) => ArgumentType::ExString,
        }
    }

    pub fn as_motion(&self) -> Option<&MotionArgument> {
        match self {
            Argument::Motion(motion) => Some(motion),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Argument::Character(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Argument::ExString(text) => Some(text),
            _ => None,
        }
    }
}
